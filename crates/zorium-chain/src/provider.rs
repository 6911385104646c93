//! RPC provider construction.

use alloy::network::Ethereum;
use alloy::providers::RootProvider;
use url::Url;

use crate::error::{ChainError, ChainResult};

pub type HttpProvider = RootProvider<Ethereum>;

pub struct ConnectionFactory;

impl ConnectionFactory {
    pub fn http(rpc_url: &str) -> ChainResult<HttpProvider> {
        let url = Url::parse(rpc_url)
            .map_err(|e| ChainError::Rpc(format!("Invalid RPC URL {rpc_url}: {e}")))?;

        Ok(RootProvider::new_http(url))
    }
}
