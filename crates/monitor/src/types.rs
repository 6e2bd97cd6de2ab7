// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Domain records shared by the resolvers, the ledger and the notifier.

use chrono::{DateTime, Utc};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw 32-byte account identifier.
pub type AccountId = [u8; 32];

fn default_true() -> bool {
    true
}

/// A chain the monitor talks to. Operator-managed, read-only at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub rpc_url: String,
    pub ss58_prefix: u16,
    pub decimals: u8,
    pub symbol: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Network {
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: u32,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub monitor_enabled: bool,
    /// Per-account opt-in for balance alerts.
    #[serde(default = "default_true")]
    pub notify: bool,
}

impl Account {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.address)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Native,
    Asset,
    ForeignAsset,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Native => "native",
            TokenKind::Asset => "asset",
            TokenKind::ForeignAsset => "foreign_asset",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fungible unit on one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Decimal `u32` or `0x`-prefixed raw key bytes. `None` for native tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    pub symbol: String,
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pallet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Token {
    pub fn native(network: &Network) -> Self {
        Self {
            kind: TokenKind::Native,
            token_id: None,
            symbol: network.symbol.clone(),
            decimals: network.decimals,
            pallet: Some(crate::consts::BALANCES_PALLET.to_string()),
            name: None,
        }
    }

    pub fn key(&self) -> TokenKey {
        TokenKey {
            kind: self.kind,
            token_id: self.token_id.clone(),
        }
    }
}

/// Identity of a token within a network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenKey {
    pub kind: TokenKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
}

/// The (account, network, token) triple a balance row is unique on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BalanceKey {
    pub account: u32,
    pub network: u32,
    pub token: TokenKey,
}

impl BalanceKey {
    pub fn new(account: &Account, network: &Network, token: &Token) -> Self {
        Self {
            account: account.id,
            network: network.id,
            token: token.key(),
        }
    }
}

impl fmt::Display for BalanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.account, self.network, self.token.kind
        )?;
        if let Some(id) = &self.token.token_id {
            write!(f, ":{id}")?;
        }
        Ok(())
    }
}

/// Balance snapshot in minimal chain units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub free: U256,
    pub reserved: U256,
    pub misc_frozen: U256,
    pub fee_frozen: U256,
    pub bonded: U256,
    pub total: U256,
}

impl Balance {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Balance decoded from a `System::Account` record.
    pub fn from_native(free: u128, reserved: u128, misc_frozen: u128) -> Self {
        let free = U256::from(free);
        let reserved = U256::from(reserved);
        Self {
            free,
            reserved,
            misc_frozen: U256::from(misc_frozen),
            fee_frozen: U256::zero(),
            bonded: U256::zero(),
            total: free + reserved,
        }
    }

    /// Balance decoded from an asset account record.
    pub fn from_asset(balance: u128) -> Self {
        let balance = U256::from(balance);
        Self {
            free: balance,
            total: balance,
            ..Self::default()
        }
    }

    pub fn is_zero(&self) -> bool {
        self.total.is_zero() && self.free.is_zero() && self.reserved.is_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDirection {
    Increase,
    Decrease,
}

impl fmt::Display for ChangeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeDirection::Increase => f.write_str("increase"),
            ChangeDirection::Decrease => f.write_str("decrease"),
        }
    }
}

/// Signed difference between two unsigned totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delta {
    Zero,
    Increase(U256),
    Decrease(U256),
}

impl Delta {
    pub fn between(before: U256, after: U256) -> Self {
        match after.cmp(&before) {
            std::cmp::Ordering::Equal => Delta::Zero,
            std::cmp::Ordering::Greater => Delta::Increase(after - before),
            std::cmp::Ordering::Less => Delta::Decrease(before - after),
        }
    }

    pub fn magnitude(&self) -> U256 {
        match self {
            Delta::Zero => U256::zero(),
            Delta::Increase(v) | Delta::Decrease(v) => *v,
        }
    }

    pub fn direction(&self) -> Option<ChangeDirection> {
        match self {
            Delta::Zero => None,
            Delta::Increase(_) => Some(ChangeDirection::Increase),
            Delta::Decrease(_) => Some(ChangeDirection::Decrease),
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Delta::Zero)
    }
}

/// Append-only history record of one observed change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChange {
    pub key: BalanceKey,
    pub free_before: U256,
    pub free_after: U256,
    pub total_before: U256,
    pub total_after: U256,
    pub delta: U256,
    pub direction: ChangeDirection,
    pub recorded_at: DateTime<Utc>,
}

impl BalanceChange {
    /// `None` when the totals are equal.
    pub fn between(
        key: BalanceKey,
        before: &Balance,
        after: &Balance,
        recorded_at: DateTime<Utc>,
    ) -> Option<Self> {
        let delta = Delta::between(before.total, after.total);
        let direction = delta.direction()?;
        Some(Self {
            key,
            free_before: before.free,
            free_after: after.free,
            total_before: before.total,
            total_after: after.total,
            delta: delta.magnitude(),
            direction,
            recorded_at,
        })
    }

    pub fn signed_delta(&self) -> Delta {
        match self.direction {
            ChangeDirection::Increase => Delta::Increase(self.delta),
            ChangeDirection::Decrease => Delta::Decrease(self.delta),
        }
    }

    /// Same key and same before/after amounts, whenever each was seen.
    pub fn same_transition(&self, other: &BalanceChange) -> bool {
        self.key == other.key
            && self.free_before == other.free_before
            && self.free_after == other.free_after
            && self.total_before == other.total_before
            && self.total_after == other.total_after
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}
