//! # zorium-chain
//!
//! Everything Zorium reads from EVM chains (Base / Zora):
//! - ZRM balances and transfer receipts for the admin ledger
//! - ERC-1155 factory and collection contracts for collection sync
//! - EIP-191 wallet signatures for nonce-based sign-in
//!
//! All access goes through the [`ChainReader`] trait so development setups
//! and tests can run against [`MockChainReader`] instead of an RPC node.

pub mod contracts;
pub mod error;
pub mod ledger;
pub mod mock;
pub mod provider;
pub mod reader;
pub mod rpc;
pub mod wallet;
pub mod zrm;

use std::sync::Arc;

use alloy::primitives::Address;
use zorium_common::config::ChainConfig;

pub use error::{ChainError, ChainResult};
pub use mock::MockChainReader;
pub use reader::{ChainReader, OnChainCollection, OnChainToken, ReceiptSummary};
pub use rpc::RpcChainReader;
pub use wallet::{NonceChallenge, NonceStore};

/// Parse an optional configured address, naming the config key on failure.
pub fn parse_configured(value: Option<&str>, key: &str) -> ChainResult<Option<Address>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<Address>()
            .map(Some)
            .map_err(|_| ChainError::InvalidAddress(format!("{key}: {raw}"))),
    }
}

/// Build the chain reader described by the configuration.
pub fn reader_from_config(config: &ChainConfig) -> ChainResult<Arc<dyn ChainReader>> {
    if config.mock {
        tracing::warn!("Chain access is mocked; on-chain data is synthetic");
        return Ok(Arc::new(MockChainReader::with_sample_data()));
    }

    let reader = RpcChainReader::connect(
        &config.rpc_url,
        parse_configured(config.zrm_token_address.as_deref(), "chain.zrm_token_address")?,
        parse_configured(config.factory_address.as_deref(), "chain.factory_address")?,
    )?;
    tracing::info!(rpc = %config.rpc_url, chain_id = config.chain_id, "Chain reader ready");
    Ok(Arc::new(reader))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_configured_skips_blank_values() {
        assert_eq!(parse_configured(None, "k").unwrap(), None);
        assert_eq!(parse_configured(Some("  "), "k").unwrap(), None);
    }

    #[test]
    fn parse_configured_reports_key() {
        let err = parse_configured(Some("0xnope"), "chain.treasury_address").unwrap_err();
        assert!(err.to_string().contains("chain.treasury_address"));
    }

    #[test]
    fn parse_configured_accepts_lowercase_hex() {
        let addr = parse_configured(Some("0x00000000000000000000000000000000000000aa"), "k")
            .unwrap()
            .unwrap();
        assert_eq!(addr, Address::with_last_byte(0xaa));
    }
}
