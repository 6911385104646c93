//! [`ChainReader`] backed by a JSON-RPC node.

use alloy::primitives::{Address, B256, U256};
use alloy::providers::Provider;
use async_trait::async_trait;

use crate::contracts::{IERC20, IZoriumCollection, IZoriumFactory};
use crate::error::{ChainError, ChainResult};
use crate::provider::{ConnectionFactory, HttpProvider};
use crate::reader::{ChainReader, OnChainCollection, OnChainToken, ReceiptSummary};

/// Upper bound on tokens read per collection in one sync.
pub const MAX_TOKENS_PER_COLLECTION: u64 = 500;

pub struct RpcChainReader {
    provider: HttpProvider,
    zrm_token: Option<Address>,
    factory: Option<Address>,
}

impl RpcChainReader {
    pub fn connect(
        rpc_url: &str,
        zrm_token: Option<Address>,
        factory: Option<Address>,
    ) -> ChainResult<Self> {
        Ok(Self {
            provider: ConnectionFactory::http(rpc_url)?,
            zrm_token,
            factory,
        })
    }

    async fn read_tokens(
        &self,
        collection: &IZoriumCollection::IZoriumCollectionInstance<HttpProvider>,
        address: Address,
    ) -> ChainResult<Vec<OnChainToken>> {
        let next = collection
            .nextTokenId()
            .call()
            .await
            .map_err(|e| ChainError::Contract(format!("nextTokenId on {address}: {e}")))?;

        let last = next.saturating_to::<u64>().min(MAX_TOKENS_PER_COLLECTION + 1);
        if next > U256::from(MAX_TOKENS_PER_COLLECTION + 1) {
            tracing::warn!(
                collection = %address,
                next_token_id = %next,
                "Collection exceeds sync cap; reading the first {MAX_TOKENS_PER_COLLECTION} tokens"
            );
        }

        let mut tokens = Vec::new();
        // Token ids start at 1; id 0 is reserved for contract-level permissions.
        for id in 1..last {
            let token_id = U256::from(id);
            let uri = collection.uri(token_id).call().await.ok().filter(|u| !u.is_empty());
            let total_supply = collection
                .totalSupply(token_id)
                .call()
                .await
                .unwrap_or(U256::ZERO);
            tokens.push(OnChainToken {
                token_id,
                uri,
                total_supply,
            });
        }
        Ok(tokens)
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn block_number(&self) -> ChainResult<u64> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn zrm_balance_of(&self, holder: Address) -> ChainResult<U256> {
        let token = self
            .zrm_token
            .ok_or(ChainError::NotConfigured("chain.zrm_token_address"))?;
        IERC20::new(token, self.provider.clone())
            .balanceOf(holder)
            .call()
            .await
            .map_err(|e| ChainError::Contract(format!("balanceOf({holder}): {e}")))
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> ChainResult<ReceiptSummary> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?
            .ok_or_else(|| ChainError::ReceiptNotFound(format!("{tx_hash:#x}")))?;

        Ok(ReceiptSummary {
            tx_hash,
            success: receipt.status(),
            from: receipt.from,
            to: receipt.to,
            block_number: receipt.block_number,
            logs: receipt.inner.logs().iter().map(|l| l.inner.clone()).collect(),
        })
    }

    async fn factory_collections(&self) -> ChainResult<Vec<Address>> {
        let factory_address = self
            .factory
            .ok_or(ChainError::NotConfigured("chain.factory_address"))?;
        let factory = IZoriumFactory::new(factory_address, self.provider.clone());

        let count = factory
            .collectionCount()
            .call()
            .await
            .map_err(|e| ChainError::Contract(format!("collectionCount: {e}")))?;

        let mut addresses = Vec::new();
        for index in 0..count.saturating_to::<u64>() {
            let address = factory
                .collectionAt(U256::from(index))
                .call()
                .await
                .map_err(|e| ChainError::Contract(format!("collectionAt({index}): {e}")))?;
            addresses.push(address);
        }
        Ok(addresses)
    }

    async fn collection_info(&self, address: Address) -> ChainResult<OnChainCollection> {
        let collection = IZoriumCollection::new(address, self.provider.clone());

        let name = collection
            .name()
            .call()
            .await
            .map_err(|e| ChainError::Contract(format!("name on {address}: {e}")))?;

        // Optional extensions; older collections may not implement them.
        let symbol = collection.symbol().call().await.ok().filter(|s| !s.is_empty());
        let owner = collection.owner().call().await.ok();
        let contract_uri = collection
            .contractURI()
            .call()
            .await
            .ok()
            .filter(|s| !s.is_empty());

        let tokens = self.read_tokens(&collection, address).await?;

        Ok(OnChainCollection {
            address,
            name,
            symbol,
            owner,
            contract_uri,
            tokens,
        })
    }
}
