//! In-memory [`ChainReader`] for development and tests.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy::primitives::{Address, B256, Log, U256};
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use dashmap::DashMap;

use crate::contracts::IERC20;
use crate::error::{ChainError, ChainResult};
use crate::reader::{ChainReader, OnChainCollection, OnChainToken, ReceiptSummary};

#[derive(Debug, Default)]
pub struct MockChainReader {
    block_number: AtomicU64,
    balances: DashMap<Address, U256>,
    receipts: DashMap<B256, ReceiptSummary>,
    collections: DashMap<Address, (u64, OnChainCollection)>,
    /// Listed by the factory, but every contract read fails.
    unreadable: DashMap<Address, u64>,
    next_seq: AtomicU64,
}

impl MockChainReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A reader preloaded with one demo collection.
    pub fn with_sample_data() -> Self {
        let reader = Self::new();
        reader.set_block_number(1);
        reader.add_collection(OnChainCollection {
            address: Address::with_last_byte(0xc1),
            name: "Zorium Genesis".to_string(),
            symbol: Some("ZGEN".to_string()),
            owner: Some(Address::with_last_byte(0x01)),
            contract_uri: Some("ipfs://zorium/genesis/contract.json".to_string()),
            tokens: (1u64..=3)
                .map(|id| OnChainToken {
                    token_id: U256::from(id),
                    uri: Some(format!("ipfs://zorium/genesis/{id}.json")),
                    total_supply: U256::from(10 * id),
                })
                .collect(),
        });
        reader
    }

    pub fn set_block_number(&self, block: u64) {
        self.block_number.store(block, Ordering::Relaxed);
    }

    pub fn set_balance(&self, holder: Address, balance: U256) {
        self.balances.insert(holder, balance);
    }

    pub fn add_receipt(&self, receipt: ReceiptSummary) {
        self.receipts.insert(receipt.tx_hash, receipt);
    }

    /// Seed a successful receipt carrying a single ZRM transfer.
    pub fn add_transfer(
        &self,
        tx_hash: B256,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) {
        self.add_receipt(ReceiptSummary {
            tx_hash,
            success: true,
            from,
            to: Some(token),
            block_number: Some(self.block_number.load(Ordering::Relaxed)),
            logs: vec![transfer_log(token, from, to, amount)],
        });
    }

    pub fn add_collection(&self, collection: OnChainCollection) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.collections.insert(collection.address, (seq, collection));
    }

    /// List `address` in the factory without a readable contract behind it.
    pub fn add_unreadable_collection(&self, address: Address) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.unreadable.insert(address, seq);
    }
}

/// An ERC-20 `Transfer` log emitted by `token`.
pub fn transfer_log(token: Address, from: Address, to: Address, value: U256) -> Log {
    Log {
        address: token,
        data: IERC20::Transfer { from, to, value }.encode_log_data(),
    }
}

#[async_trait]
impl ChainReader for MockChainReader {
    async fn block_number(&self) -> ChainResult<u64> {
        Ok(self.block_number.load(Ordering::Relaxed))
    }

    async fn zrm_balance_of(&self, holder: Address) -> ChainResult<U256> {
        Ok(self.balances.get(&holder).map(|b| *b).unwrap_or_default())
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> ChainResult<ReceiptSummary> {
        self.receipts
            .get(&tx_hash)
            .map(|r| r.clone())
            .ok_or_else(|| ChainError::ReceiptNotFound(format!("{tx_hash:#x}")))
    }

    async fn factory_collections(&self) -> ChainResult<Vec<Address>> {
        let mut entries: Vec<(u64, Address)> = self
            .collections
            .iter()
            .map(|e| (e.value().0, *e.key()))
            .chain(self.unreadable.iter().map(|e| (*e.value(), *e.key())))
            .collect();
        entries.sort_unstable();
        Ok(entries.into_iter().map(|(_, addr)| addr).collect())
    }

    async fn collection_info(&self, address: Address) -> ChainResult<OnChainCollection> {
        self.collections
            .get(&address)
            .map(|e| e.value().1.clone())
            .ok_or_else(|| ChainError::Contract(format!("no collection at {address:#x}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_balance_is_zero() {
        let reader = MockChainReader::new();
        assert_eq!(
            reader.zrm_balance_of(Address::with_last_byte(1)).await.unwrap(),
            U256::ZERO
        );
    }

    #[tokio::test]
    async fn missing_receipt_is_reported() {
        let reader = MockChainReader::new();
        assert!(matches!(
            reader.transaction_receipt(B256::with_last_byte(1)).await,
            Err(ChainError::ReceiptNotFound(_))
        ));
    }

    #[tokio::test]
    async fn seeded_transfer_round_trips_through_receipt() {
        let reader = MockChainReader::new();
        let token = Address::with_last_byte(0xee);
        let hash = B256::with_last_byte(7);
        reader.add_transfer(
            hash,
            token,
            Address::with_last_byte(1),
            Address::with_last_byte(2),
            U256::from(9u64),
        );

        let receipt = reader.transaction_receipt(hash).await.unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.logs.len(), 1);
        assert_eq!(receipt.logs[0].address, token);
    }

    #[tokio::test]
    async fn collections_keep_insertion_order() {
        let reader = MockChainReader::with_sample_data();
        let mut second = reader
            .collection_info(Address::with_last_byte(0xc1))
            .await
            .unwrap();
        second.address = Address::with_last_byte(0x02);
        reader.add_collection(second);

        let all = reader.factory_collections().await.unwrap();
        assert_eq!(
            all,
            vec![Address::with_last_byte(0xc1), Address::with_last_byte(0x02)]
        );
    }

    #[tokio::test]
    async fn unreadable_collection_is_listed_but_fails_to_read() {
        let reader = MockChainReader::with_sample_data();
        let broken = Address::with_last_byte(0xbb);
        reader.add_unreadable_collection(broken);

        let all = reader.factory_collections().await.unwrap();
        assert_eq!(all, vec![Address::with_last_byte(0xc1), broken]);
        assert!(matches!(
            reader.collection_info(broken).await,
            Err(ChainError::Contract(_))
        ));
    }

    #[tokio::test]
    async fn sample_collection_has_tokens() {
        let reader = MockChainReader::with_sample_data();
        let info = reader
            .collection_info(Address::with_last_byte(0xc1))
            .await
            .unwrap();
        assert_eq!(info.tokens.len(), 3);
        assert_eq!(info.tokens[2].total_supply, U256::from(30u64));
    }
}
