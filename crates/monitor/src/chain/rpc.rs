//! [`ChainClient`] over the legacy `state_*` JSON-RPC methods.

use super::{ChainClient, ChainError, Connector, PalletInfo, decode_hex, pallets_from_metadata};
use crate::types::Network;
use async_trait::async_trait;
use std::sync::Arc;
use subxt_rpcs::{RpcClient, rpc_params};

/// Keys requested per `state_getKeysPaged` call.
pub const KEYS_PAGE_SIZE: u32 = 1000;

#[derive(Clone)]
pub struct RpcChainClient {
    rpc: RpcClient,
    page_size: u32,
}

impl RpcChainClient {
    pub fn new(rpc: RpcClient) -> Self {
        Self {
            rpc,
            page_size: KEYS_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub async fn connect(url: &str) -> Result<Self, ChainError> {
        let rpc = RpcClient::from_insecure_url(url)
            .await
            .map_err(|source| ChainError::ConnectFailed {
                url: url.to_string(),
                source,
            })?;
        Ok(Self::new(rpc))
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn fetch_latest_metadata(&self) -> Result<Vec<PalletInfo>, ChainError> {
        let metadata_hex: String = self
            .rpc
            .request("state_getMetadata", rpc_params![])
            .await
            .map_err(|source| ChainError::RpcFailed {
                method: "state_getMetadata",
                source,
            })?;

        pallets_from_metadata(&decode_hex(&metadata_hex)?)
    }

    async fn get_storage(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ChainError> {
        let key_hex = format!("0x{}", hex::encode(key));
        let value: Option<String> = self
            .rpc
            .request("state_getStorage", rpc_params![key_hex])
            .await
            .map_err(|source| ChainError::RpcFailed {
                method: "state_getStorage",
                source,
            })?;

        value.map(|v| decode_hex(&v)).transpose()
    }

    async fn list_keys_by_prefix(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>, ChainError> {
        let prefix_hex = format!("0x{}", hex::encode(prefix));
        let mut keys = Vec::new();
        let mut cursor: Option<Vec<u8>> = None;

        loop {
            let start_key = cursor.as_ref().map(|c| format!("0x{}", hex::encode(c)));
            let page: Vec<String> = self
                .rpc
                .request(
                    "state_getKeysPaged",
                    rpc_params![&prefix_hex, self.page_size, &start_key],
                )
                .await
                .map_err(|source| ChainError::RpcFailed {
                    method: "state_getKeysPaged",
                    source,
                })?;

            let full_page = page.len() >= self.page_size as usize;
            let mut advanced = false;
            for key in &page {
                let key = decode_hex(key)?;
                // Keys at or before the cursor were already returned.
                if cursor.as_ref().is_some_and(|c| key <= *c) {
                    continue;
                }
                cursor = Some(key.clone());
                keys.push(key);
                advanced = true;
            }

            if !full_page || !advanced {
                break;
            }
        }

        Ok(keys)
    }
}

/// Opens websocket or HTTP connections from a network's `rpc_url`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RpcConnector;

#[async_trait]
impl Connector for RpcConnector {
    async fn connect(&self, network: &Network) -> Result<Arc<dyn ChainClient>, ChainError> {
        let client = RpcChainClient::connect(&network.rpc_url).await?;
        Ok(Arc::new(client))
    }
}
