// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Balance state and change history.
//!
//! The ledger keeps exactly one current [`Balance`] per [`BalanceKey`] and an
//! append-only list of [`BalanceChange`] records. It also remembers the tokens
//! and pallets found by discovery.

pub mod file;
pub mod memory;

pub use file::FileLedger;
pub use memory::MemoryLedger;

use crate::chain::PalletInfo;
use crate::types::{Balance, BalanceChange, BalanceKey, Token};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Ledger file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ledger file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn balance(&self, key: &BalanceKey) -> Result<Option<Balance>, LedgerError>;

    /// Insert or replace the current balance for `key`.
    async fn upsert_balance(&self, key: &BalanceKey, balance: &Balance) -> Result<(), LedgerError>;

    /// Append a history record. Re-appending a record, or one repeating the
    /// latest transition for its key, is a no-op.
    async fn append_balance_change(&self, change: &BalanceChange) -> Result<(), LedgerError>;

    /// Store an observed change: history first, then the current balance.
    ///
    /// If the balance write fails the stored balance keeps its old value, so
    /// the next observation sees the same transition and completes it without
    /// duplicating the history record.
    async fn record_change(&self, balance: &Balance, change: &BalanceChange) -> Result<(), LedgerError> {
        self.append_balance_change(change).await?;
        self.upsert_balance(&change.key, balance).await
    }

    /// History for `key`, oldest first.
    async fn balance_changes(&self, key: &BalanceKey) -> Result<Vec<BalanceChange>, LedgerError>;

    async fn balance_count(&self) -> Result<usize, LedgerError>;

    /// Insert a token, or refresh symbol, name and decimals of a known one.
    async fn upsert_token(&self, network_id: u32, token: &Token) -> Result<(), LedgerError>;

    async fn tokens(&self, network_id: u32) -> Result<Vec<Token>, LedgerError>;

    async fn record_pallets(&self, network_id: u32, pallets: &[PalletInfo]) -> Result<(), LedgerError>;

    async fn pallets(&self, network_id: u32) -> Result<Vec<PalletInfo>, LedgerError>;
}
