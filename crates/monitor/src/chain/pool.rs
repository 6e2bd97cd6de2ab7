// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! One lazily-created client per network, cached by network name.
//!
//! Every client handed out by the pool is wrapped so that calls to one
//! network run one at a time, no matter how many cycles share it.

use super::{ChainClient, ChainError, Connector, PalletInfo};
use crate::types::Network;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell, RwLock};

type ClientCell = Arc<OnceCell<Arc<dyn ChainClient>>>;

/// Holds a per-network lock around each call to the wrapped client.
struct SerialClient {
    inner: Arc<dyn ChainClient>,
    in_flight: Mutex<()>,
}

impl SerialClient {
    fn wrap(inner: Arc<dyn ChainClient>) -> Arc<dyn ChainClient> {
        Arc::new(Self {
            inner,
            in_flight: Mutex::new(()),
        })
    }
}

#[async_trait]
impl ChainClient for SerialClient {
    async fn fetch_latest_metadata(&self) -> Result<Vec<PalletInfo>, ChainError> {
        let _turn = self.in_flight.lock().await;
        self.inner.fetch_latest_metadata().await
    }

    async fn get_storage(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ChainError> {
        let _turn = self.in_flight.lock().await;
        self.inner.get_storage(key).await
    }

    async fn list_keys_by_prefix(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>, ChainError> {
        let _turn = self.in_flight.lock().await;
        self.inner.list_keys_by_prefix(prefix).await
    }
}

pub struct ClientPool {
    connector: Arc<dyn Connector>,
    clients: RwLock<HashMap<String, ClientCell>>,
}

impl ClientPool {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Client for `network`, connecting on first use.
    ///
    /// Concurrent callers for the same network share a single connection
    /// attempt and a single in-flight call. A failed attempt leaves nothing
    /// cached, so the next call retries.
    pub async fn get(&self, network: &Network) -> Result<Arc<dyn ChainClient>, ChainError> {
        let cell = self.cell(&network.name).await;

        let client = cell
            .get_or_try_init(|| async {
                tracing::info!(
                    network = %network.name,
                    url = %network.rpc_url,
                    "Connecting to network"
                );
                self.connector.connect(network).await.map(SerialClient::wrap)
            })
            .await?;

        Ok(client.clone())
    }

    async fn cell(&self, name: &str) -> ClientCell {
        if let Some(cell) = self.clients.read().await.get(name) {
            return cell.clone();
        }

        self.clients
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    /// Number of networks with an established client.
    pub async fn connected(&self) -> usize {
        self.clients
            .read()
            .await
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }
}
