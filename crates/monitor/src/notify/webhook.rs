// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Discord-compatible webhook delivery (`{"content": "..."}` payloads).

use super::format::{MESSAGE_LIMIT, render_balance_alert, render_daily_summary, split_message};
use super::{BalanceAlert, Notifier, NotifyError};
use crate::reconcile::PortfolioReport;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                Client::new()
            });
        Self { client, url }
    }

    async fn post(&self, content: &str) -> Result<(), NotifyError> {
        let payload = serde_json::json!({ "content": content });
        let response = self.client.post(&self.url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("Webhook message delivered");
        Ok(())
    }

    async fn post_split(&self, text: &str) -> Result<(), NotifyError> {
        for chunk in split_message(text, MESSAGE_LIMIT) {
            self.post(&chunk).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send_balance_change(&self, alert: &BalanceAlert) -> Result<(), NotifyError> {
        self.post_split(&render_balance_alert(alert)).await
    }

    async fn send_daily_summary(&self, report: &PortfolioReport) -> Result<(), NotifyError> {
        self.post_split(&render_daily_summary(report)).await
    }
}
