// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Delivery of balance alerts and the periodic portfolio digest.
//!
//! Delivery is best-effort: callers log failures and carry on.

pub mod format;
pub mod log;
pub mod webhook;

pub use log::LogNotifier;
pub use webhook::WebhookNotifier;

use crate::reconcile::PortfolioReport;
use crate::types::{Account, BalanceChange, Delta, Network, Token, TokenKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use primitive_types::U256;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Webhook rejected message with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Everything needed to render one balance change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceAlert {
    pub account_label: String,
    pub account_address: String,
    pub network: String,
    pub kind: TokenKind,
    pub symbol: String,
    pub decimals: u8,
    pub before: U256,
    pub after: U256,
    pub delta: Delta,
    pub recorded_at: DateTime<Utc>,
}

impl BalanceAlert {
    pub fn new(account: &Account, network: &Network, token: &Token, change: &BalanceChange) -> Self {
        Self {
            account_label: account.label().to_string(),
            account_address: account.address.clone(),
            network: network.label().to_string(),
            kind: token.kind,
            symbol: token.symbol.clone(),
            decimals: token.decimals,
            before: change.total_before,
            after: change.total_after,
            delta: change.signed_delta(),
            recorded_at: change.recorded_at,
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_balance_change(&self, alert: &BalanceAlert) -> Result<(), NotifyError>;

    async fn send_daily_summary(&self, report: &PortfolioReport) -> Result<(), NotifyError>;
}

/// Webhook delivery when a URL is configured, log output otherwise.
pub fn from_config(notify: &config::NotifyConfig) -> Arc<dyn Notifier> {
    match &notify.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
        None => {
            tracing::info!("No webhook configured, alerts will only be logged");
            Arc::new(LogNotifier)
        }
    }
}
