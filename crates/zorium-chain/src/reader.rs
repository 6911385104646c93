//! The read-only view of the chain that the rest of Zorium depends on.

use alloy::primitives::{Address, B256, Log, U256};
use async_trait::async_trait;

use crate::error::ChainResult;

/// The parts of a transaction receipt the ledger needs.
#[derive(Debug, Clone)]
pub struct ReceiptSummary {
    pub tx_hash: B256,
    pub success: bool,
    pub from: Address,
    pub to: Option<Address>,
    pub block_number: Option<u64>,
    pub logs: Vec<Log>,
}

/// One token of an ERC-1155 collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnChainToken {
    pub token_id: U256,
    pub uri: Option<String>,
    pub total_supply: U256,
}

/// Collection-level data plus its tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnChainCollection {
    pub address: Address,
    pub name: String,
    pub symbol: Option<String>,
    pub owner: Option<Address>,
    pub contract_uri: Option<String>,
    pub tokens: Vec<OnChainToken>,
}

#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Latest block number, also used as a liveness check.
    async fn block_number(&self) -> ChainResult<u64>;

    /// ZRM token balance of `holder` in base units.
    async fn zrm_balance_of(&self, holder: Address) -> ChainResult<U256>;

    /// Receipt of a mined transaction.
    async fn transaction_receipt(&self, tx_hash: B256) -> ChainResult<ReceiptSummary>;

    /// Every collection deployed through the factory, in deployment order.
    async fn factory_collections(&self) -> ChainResult<Vec<Address>>;

    /// Collection metadata and tokens.
    async fn collection_info(&self, address: Address) -> ChainResult<OnChainCollection>;
}
