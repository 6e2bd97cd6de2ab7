// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::chain::{ClientPool, Connector, RpcConnector};
use crate::ledger::{FileLedger, LedgerError, LedgerStore, MemoryLedger};
use crate::notify::{self, Notifier};
use crate::reconcile::{AlertPolicy, Reconciler};
use crate::registry::{Registry, RegistryError};
use crate::resolver::BalanceResolver;
use chrono::{DateTime, Utc};
use config::MonitorConfig;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Failed to open ledger: {0}")]
    Ledger(#[from] LedgerError),
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<MonitorConfig>,
    pub registry: Arc<Registry>,
    pub pool: Arc<ClientPool>,
    pub ledger: Arc<dyn LedgerStore>,
    pub notifier: Arc<dyn Notifier>,
    pub reconciler: Arc<Reconciler>,
    pub started_at: Instant,
    pub last_balance_cycle: Arc<RwLock<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Load the registry, open the ledger and wire RPC-backed components.
    pub async fn new(config: MonitorConfig) -> Result<Self, StateError> {
        let registry = Registry::load(&config.storage.registry_path)?;

        let ledger: Arc<dyn LedgerStore> = match &config.storage.ledger_path {
            Some(path) => Arc::new(FileLedger::open(path).await?),
            None => {
                tracing::warn!("No ledger path configured, balances are kept in memory only");
                Arc::new(MemoryLedger::new())
            }
        };

        let notifier = notify::from_config(&config.notify);
        Ok(Self::from_parts(
            config,
            registry,
            Arc::new(RpcConnector),
            ledger,
            notifier,
        ))
    }

    pub fn from_parts(
        config: MonitorConfig,
        registry: Registry,
        connector: Arc<dyn Connector>,
        ledger: Arc<dyn LedgerStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let pool = Arc::new(ClientPool::new(connector));
        let reconciler = Reconciler::new(
            BalanceResolver::new(pool.clone()),
            ledger.clone(),
            notifier.clone(),
            AlertPolicy::from(&config.notify),
        );

        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            pool,
            ledger,
            notifier,
            reconciler: Arc::new(reconciler),
            started_at: Instant::now(),
            last_balance_cycle: Arc::new(RwLock::new(None)),
        }
    }
}
