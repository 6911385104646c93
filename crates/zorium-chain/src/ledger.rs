//! On-chain verification behind the admin ZRM ledger.

use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::SolEvent;

use crate::contracts::IERC20;
use crate::error::{ChainError, ChainResult};
use crate::reader::{ChainReader, ReceiptSummary};

/// A ZRM transfer confirmed against a mined receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedTransfer {
    pub tx_hash: B256,
    pub from: Address,
    pub to: Address,
    pub amount: U256,
    pub block_number: Option<u64>,
}

/// Find the ZRM `Transfer(from -> to, amount)` in `receipt`.
///
/// Logs from other contracts and transfers between other parties are ignored.
/// A transfer between the right parties with a different value is reported
/// as [`ChainError::AmountMismatch`].
pub fn verify_transfer(
    receipt: &ReceiptSummary,
    token: Address,
    expected_from: Address,
    expected_to: Address,
    expected_amount: U256,
) -> ChainResult<VerifiedTransfer> {
    let hash = format!("{:#x}", receipt.tx_hash);
    if !receipt.success {
        return Err(ChainError::TransactionFailed(hash));
    }

    let mut mismatch = None;
    for log in receipt.logs.iter().filter(|l| l.address == token) {
        let Ok(transfer) = IERC20::Transfer::decode_log_data(&log.data) else {
            continue;
        };
        if transfer.from != expected_from || transfer.to != expected_to {
            continue;
        }
        if transfer.value == expected_amount {
            return Ok(VerifiedTransfer {
                tx_hash: receipt.tx_hash,
                from: transfer.from,
                to: transfer.to,
                amount: transfer.value,
                block_number: receipt.block_number,
            });
        }
        mismatch.get_or_insert(transfer.value);
    }

    match mismatch {
        Some(actual) => Err(ChainError::AmountMismatch {
            expected: expected_amount.to_string(),
            actual: actual.to_string(),
        }),
        None => Err(ChainError::TransferNotFound(hash)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreasurySnapshot {
    pub treasury_balance: U256,
    pub allocation_balance: U256,
    pub block_number: u64,
}

/// Read both reward wallets' ZRM balances at the current head.
pub async fn treasury_snapshot(
    reader: &dyn ChainReader,
    treasury: Address,
    allocation: Address,
) -> ChainResult<TreasurySnapshot> {
    let (block_number, treasury_balance, allocation_balance) = tokio::try_join!(
        reader.block_number(),
        reader.zrm_balance_of(treasury),
        reader.zrm_balance_of(allocation),
    )?;
    Ok(TreasurySnapshot {
        treasury_balance,
        allocation_balance,
        block_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockChainReader, transfer_log};

    fn receipt(success: bool, logs: Vec<alloy::primitives::Log>) -> ReceiptSummary {
        ReceiptSummary {
            tx_hash: B256::with_last_byte(9),
            success,
            from: Address::with_last_byte(1),
            to: Some(Address::with_last_byte(0xee)),
            block_number: Some(42),
            logs,
        }
    }

    const TOKEN: Address = Address::with_last_byte(0xee);
    const TREASURY: Address = Address::with_last_byte(0x10);
    const ALLOCATION: Address = Address::with_last_byte(0x20);

    #[test]
    fn finds_matching_transfer() {
        let amount = U256::from(5_000u64);
        let r = receipt(true, vec![transfer_log(TOKEN, TREASURY, ALLOCATION, amount)]);
        let verified = verify_transfer(&r, TOKEN, TREASURY, ALLOCATION, amount).unwrap();
        assert_eq!(verified.amount, amount);
        assert_eq!(verified.block_number, Some(42));
    }

    #[test]
    fn reverted_transaction_fails() {
        let amount = U256::from(1u64);
        let r = receipt(false, vec![transfer_log(TOKEN, TREASURY, ALLOCATION, amount)]);
        assert!(matches!(
            verify_transfer(&r, TOKEN, TREASURY, ALLOCATION, amount),
            Err(ChainError::TransactionFailed(_))
        ));
    }

    #[test]
    fn ignores_transfers_of_other_tokens() {
        let amount = U256::from(7u64);
        let other_token = Address::with_last_byte(0xab);
        let r = receipt(true, vec![transfer_log(other_token, TREASURY, ALLOCATION, amount)]);
        assert!(matches!(
            verify_transfer(&r, TOKEN, TREASURY, ALLOCATION, amount),
            Err(ChainError::TransferNotFound(_))
        ));
    }

    #[test]
    fn wrong_recipient_is_not_found() {
        let amount = U256::from(7u64);
        let r = receipt(
            true,
            vec![transfer_log(TOKEN, TREASURY, Address::with_last_byte(0x99), amount)],
        );
        assert!(matches!(
            verify_transfer(&r, TOKEN, TREASURY, ALLOCATION, amount),
            Err(ChainError::TransferNotFound(_))
        ));
    }

    #[test]
    fn reports_amount_mismatch() {
        let r = receipt(
            true,
            vec![transfer_log(TOKEN, TREASURY, ALLOCATION, U256::from(3u64))],
        );
        match verify_transfer(&r, TOKEN, TREASURY, ALLOCATION, U256::from(4u64)) {
            Err(ChainError::AmountMismatch { expected, actual }) => {
                assert_eq!(expected, "4");
                assert_eq!(actual, "3");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn later_exact_match_wins_over_earlier_mismatch() {
        let r = receipt(
            true,
            vec![
                transfer_log(TOKEN, TREASURY, ALLOCATION, U256::from(3u64)),
                transfer_log(TOKEN, TREASURY, ALLOCATION, U256::from(4u64)),
            ],
        );
        assert!(verify_transfer(&r, TOKEN, TREASURY, ALLOCATION, U256::from(4u64)).is_ok());
    }

    #[tokio::test]
    async fn snapshot_reads_both_wallets() {
        let reader = MockChainReader::new();
        reader.set_balance(TREASURY, U256::from(100u64));
        reader.set_balance(ALLOCATION, U256::from(25u64));
        reader.set_block_number(77);

        let snap = treasury_snapshot(&reader, TREASURY, ALLOCATION).await.unwrap();
        assert_eq!(snap.treasury_balance, U256::from(100u64));
        assert_eq!(snap.allocation_balance, U256::from(25u64));
        assert_eq!(snap.block_number, 77);
    }
}
