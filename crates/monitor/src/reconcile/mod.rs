// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Balance reconciliation.
//!
//! Each observation is compared with the stored balance for its
//! (account, network, token) triple. A nonzero delta appends a history record
//! and then replaces the stored balance; whether an alert goes out is decided
//! separately by [`AlertPolicy`].

pub mod cycle;
pub mod portfolio;
pub mod threshold;

pub use cycle::{CycleSummary, run_balance_cycle};
pub use portfolio::{AccountHoldings, Holding, NetChange, PortfolioBuilder, PortfolioReport, SymbolTotal};
pub use threshold::{AlertPolicy, HumanAmount, threshold_units};

use crate::ledger::{LedgerError, LedgerStore};
use crate::metrics::registry::{ALERTS_SENT, BALANCE_CHANGES};
use crate::notify::{BalanceAlert, Notifier};
use crate::resolver::{BalanceResolver, ResolveError};
use crate::types::{Account, Balance, BalanceChange, BalanceKey, Delta, Network, Token};
use crate::utils::KeyedMutex;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Ledger write failed: {0}")]
    Ledger(#[from] LedgerError),
}

impl ReconcileError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ReconcileError::Resolve(e) if e.is_transport())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub balance: Balance,
    pub delta: Delta,
    /// History record written for this observation, if the total moved.
    pub change: Option<BalanceChange>,
    pub alerted: bool,
}

pub struct Reconciler {
    resolver: BalanceResolver,
    ledger: Arc<dyn LedgerStore>,
    notifier: Arc<dyn Notifier>,
    policy: AlertPolicy,
    locks: KeyedMutex<BalanceKey>,
}

impl Reconciler {
    pub fn new(
        resolver: BalanceResolver,
        ledger: Arc<dyn LedgerStore>,
        notifier: Arc<dyn Notifier>,
        policy: AlertPolicy,
    ) -> Self {
        Self {
            resolver,
            ledger,
            notifier,
            policy,
            locks: KeyedMutex::new(),
        }
    }

    pub fn policy(&self) -> AlertPolicy {
        self.policy
    }

    /// Resolve the current balance from chain and reconcile it.
    pub async fn reconcile(
        &self,
        account: &Account,
        network: &Network,
        token: &Token,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let observed = self
            .resolver
            .resolve(network, &account.address, token)
            .await?;
        self.record_observation(account, network, token, observed).await
    }

    /// Reconcile an already-resolved balance against the ledger.
    pub async fn record_observation(
        &self,
        account: &Account,
        network: &Network,
        token: &Token,
        observed: Balance,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let key = BalanceKey::new(account, network, token);
        let _guard = self.locks.lock(&key).await;

        let previous = self.ledger.balance(&key).await?.unwrap_or_default();
        let Some(change) = BalanceChange::between(key.clone(), &previous, &observed, Utc::now()) else {
            return Ok(ReconcileOutcome {
                balance: observed,
                delta: Delta::Zero,
                change: None,
                alerted: false,
            });
        };

        self.ledger.record_change(&observed, &change).await?;
        BALANCE_CHANGES.with_label_values(&[network.name.as_str()]).inc();

        tracing::info!(
            network = %network.name,
            account = %account.label(),
            symbol = %token.symbol,
            direction = %change.direction,
            delta = %change.delta,
            "Balance changed"
        );

        let alerted = if self
            .policy
            .should_alert(change.delta, token.decimals, account.notify)
        {
            self.send_alert(&BalanceAlert::new(account, network, token, &change))
                .await
        } else {
            false
        };

        Ok(ReconcileOutcome {
            balance: observed,
            delta: change.signed_delta(),
            change: Some(change),
            alerted,
        })
    }

    async fn send_alert(&self, alert: &BalanceAlert) -> bool {
        match self.notifier.send_balance_change(alert).await {
            Ok(()) => {
                ALERTS_SENT.inc();
                true
            }
            Err(e) => {
                tracing::warn!(
                    network = %alert.network,
                    account = %alert.account_label,
                    error = %e,
                    "Failed to deliver balance alert"
                );
                false
            }
        }
    }
}
