//! Per-symbol rollup of balances and changes for the periodic digest.

use crate::types::{Account, Balance, Delta, Network, Token, TokenKind};
use chrono::{DateTime, Utc};
use primitive_types::U256;
use std::collections::{BTreeMap, BTreeSet};

/// Sum of signed deltas, kept as separate increase and decrease totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetChange {
    pub increase: U256,
    pub decrease: U256,
}

impl NetChange {
    pub fn add(&mut self, delta: Delta) {
        match delta {
            Delta::Zero => {}
            Delta::Increase(v) => self.increase = self.increase.saturating_add(v),
            Delta::Decrease(v) => self.decrease = self.decrease.saturating_add(v),
        }
    }

    pub fn net(&self) -> Delta {
        Delta::between(self.decrease, self.increase)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTotal {
    pub symbol: String,
    /// Decimals of the first token seen with this symbol.
    pub decimals: u8,
    pub total: U256,
    pub change: NetChange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holding {
    pub network: String,
    pub kind: TokenKind,
    pub symbol: String,
    pub decimals: u8,
    pub balance: U256,
    pub delta: Delta,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountHoldings {
    pub account_id: u32,
    pub label: String,
    pub address: String,
    pub holdings: Vec<Holding>,
    pub totals: BTreeMap<String, SymbolTotal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioReport {
    pub generated_at: DateTime<Utc>,
    pub accounts: Vec<AccountHoldings>,
    pub totals: BTreeMap<String, SymbolTotal>,
    pub networks: usize,
}

impl PortfolioReport {
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

fn accumulate(
    totals: &mut BTreeMap<String, SymbolTotal>,
    token: &Token,
    balance: U256,
    delta: Delta,
) {
    let entry = totals
        .entry(token.symbol.clone())
        .or_insert_with(|| SymbolTotal {
            symbol: token.symbol.clone(),
            decimals: token.decimals,
            total: U256::zero(),
            change: NetChange::default(),
        });
    entry.total = entry.total.saturating_add(balance);
    entry.change.add(delta);
}

#[derive(Debug, Default)]
pub struct PortfolioBuilder {
    accounts: BTreeMap<u32, AccountHoldings>,
    totals: BTreeMap<String, SymbolTotal>,
    networks: BTreeSet<u32>,
}

impl PortfolioBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one reconciled balance. Zero balances that did not move are left
    /// out of the report.
    pub fn record(
        &mut self,
        account: &Account,
        network: &Network,
        token: &Token,
        balance: &Balance,
        delta: Delta,
    ) {
        self.networks.insert(network.id);
        if balance.total.is_zero() && delta.is_zero() {
            return;
        }

        let holdings = self
            .accounts
            .entry(account.id)
            .or_insert_with(|| AccountHoldings {
                account_id: account.id,
                label: account.label().to_string(),
                address: account.address.clone(),
                holdings: Vec::new(),
                totals: BTreeMap::new(),
            });

        holdings.holdings.push(Holding {
            network: network.label().to_string(),
            kind: token.kind,
            symbol: token.symbol.clone(),
            decimals: token.decimals,
            balance: balance.total,
            delta,
        });
        accumulate(&mut holdings.totals, token, balance.total, delta);
        accumulate(&mut self.totals, token, balance.total, delta);
    }

    pub fn finish(self, generated_at: DateTime<Utc>) -> PortfolioReport {
        PortfolioReport {
            generated_at,
            accounts: self.accounts.into_values().collect(),
            totals: self.totals,
            networks: self.networks.len(),
        }
    }
}
