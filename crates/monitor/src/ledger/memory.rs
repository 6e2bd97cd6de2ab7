use super::{LedgerError, LedgerStore};
use crate::chain::PalletInfo;
use crate::types::{Balance, BalanceChange, BalanceKey, Token, TokenKey};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct BalanceRow {
    pub key: BalanceKey,
    pub balance: Balance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TokenRow {
    pub network_id: u32,
    pub token: Token,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PalletRow {
    pub network_id: u32,
    pub pallets: Vec<PalletInfo>,
}

/// Serialized current state, as written by [`super::FileLedger`]. History is
/// kept apart in its own journal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct LedgerSnapshot {
    #[serde(default)]
    pub balances: Vec<BalanceRow>,
    #[serde(default)]
    pub tokens: Vec<TokenRow>,
    #[serde(default)]
    pub pallets: Vec<PalletRow>,
}

/// Current balances, tokens and pallets. Everything but history.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    balances: BTreeMap<BalanceKey, Balance>,
    tokens: BTreeMap<(u32, TokenKey), Token>,
    pallets: BTreeMap<u32, Vec<PalletInfo>>,
}

impl Tables {
    fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let mut tables = Self::default();
        for row in snapshot.balances {
            tables.balances.insert(row.key, row.balance);
        }
        for row in snapshot.tokens {
            tables.tokens.insert((row.network_id, row.token.key()), row.token);
        }
        for row in snapshot.pallets {
            tables.pallets.insert(row.network_id, row.pallets);
        }
        tables
    }

    pub(crate) fn to_snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            balances: self
                .balances
                .iter()
                .map(|(key, balance)| BalanceRow {
                    key: key.clone(),
                    balance: *balance,
                })
                .collect(),
            tokens: self
                .tokens
                .iter()
                .map(|((network_id, _), token)| TokenRow {
                    network_id: *network_id,
                    token: token.clone(),
                })
                .collect(),
            pallets: self
                .pallets
                .iter()
                .map(|(network_id, pallets)| PalletRow {
                    network_id: *network_id,
                    pallets: pallets.clone(),
                })
                .collect(),
        }
    }

    pub(crate) fn set_balance(&mut self, key: &BalanceKey, balance: &Balance) {
        self.balances.insert(key.clone(), *balance);
    }

    pub(crate) fn set_token(&mut self, network_id: u32, token: &Token) {
        self.tokens
            .entry((network_id, token.key()))
            .and_modify(|existing| {
                existing.symbol = token.symbol.clone();
                existing.name = token.name.clone();
                existing.decimals = token.decimals;
            })
            .or_insert_with(|| token.clone());
    }

    pub(crate) fn set_pallets(&mut self, network_id: u32, pallets: &[PalletInfo]) {
        self.pallets.insert(network_id, pallets.to_vec());
    }
}

#[derive(Debug, Default)]
struct History(HashMap<BalanceKey, Vec<BalanceChange>>);

impl History {
    fn is_recorded(&self, change: &BalanceChange) -> bool {
        self.0.get(&change.key).is_some_and(|records| {
            records.last().is_some_and(|last| last.same_transition(change))
                || records.contains(change)
        })
    }

    /// `false` when the record was already there.
    fn push(&mut self, change: &BalanceChange) -> bool {
        if self.is_recorded(change) {
            return false;
        }
        self.0.entry(change.key.clone()).or_default().push(change.clone());
        true
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    tables: Tables,
    history: History,
}

/// Process-local ledger.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: RwLock<LedgerState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(snapshot: LedgerSnapshot, history: Vec<BalanceChange>) -> Self {
        let mut state = LedgerState {
            tables: Tables::from_snapshot(snapshot),
            history: History::default(),
        };
        for change in &history {
            state.history.push(change);
        }
        Self {
            state: RwLock::new(state),
        }
    }

    /// A copy of the current tables with `update` applied. The live state is
    /// left untouched.
    pub(crate) async fn staged(&self, update: impl FnOnce(&mut Tables)) -> Tables {
        let mut tables = self.state.read().await.tables.clone();
        update(&mut tables);
        tables
    }

    pub(crate) async fn install(&self, tables: Tables) {
        self.state.write().await.tables = tables;
    }

    pub(crate) async fn is_recorded(&self, change: &BalanceChange) -> bool {
        self.state.read().await.history.is_recorded(change)
    }

    pub(crate) async fn history_len(&self) -> usize {
        self.state.read().await.history.0.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn balance(&self, key: &BalanceKey) -> Result<Option<Balance>, LedgerError> {
        Ok(self.state.read().await.tables.balances.get(key).copied())
    }

    async fn upsert_balance(&self, key: &BalanceKey, balance: &Balance) -> Result<(), LedgerError> {
        self.state.write().await.tables.set_balance(key, balance);
        Ok(())
    }

    async fn append_balance_change(&self, change: &BalanceChange) -> Result<(), LedgerError> {
        self.state.write().await.history.push(change);
        Ok(())
    }

    async fn record_change(&self, balance: &Balance, change: &BalanceChange) -> Result<(), LedgerError> {
        let mut state = self.state.write().await;
        state.history.push(change);
        state.tables.set_balance(&change.key, balance);
        Ok(())
    }

    async fn balance_changes(&self, key: &BalanceKey) -> Result<Vec<BalanceChange>, LedgerError> {
        Ok(self
            .state
            .read()
            .await
            .history
            .0
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn balance_count(&self) -> Result<usize, LedgerError> {
        Ok(self.state.read().await.tables.balances.len())
    }

    async fn upsert_token(&self, network_id: u32, token: &Token) -> Result<(), LedgerError> {
        self.state.write().await.tables.set_token(network_id, token);
        Ok(())
    }

    async fn tokens(&self, network_id: u32) -> Result<Vec<Token>, LedgerError> {
        Ok(self
            .state
            .read()
            .await
            .tables
            .tokens
            .iter()
            .filter(|((id, _), _)| *id == network_id)
            .map(|(_, token)| token.clone())
            .collect())
    }

    async fn record_pallets(&self, network_id: u32, pallets: &[PalletInfo]) -> Result<(), LedgerError> {
        self.state.write().await.tables.set_pallets(network_id, pallets);
        Ok(())
    }

    async fn pallets(&self, network_id: u32) -> Result<Vec<PalletInfo>, LedgerError> {
        Ok(self
            .state
            .read()
            .await
            .tables
            .pallets
            .get(&network_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TokenKind, ChangeDirection};
    use chrono::Utc;
    use primitive_types::U256;

    fn key(account: u32) -> BalanceKey {
        BalanceKey {
            account,
            network: 1,
            token: TokenKey {
                kind: TokenKind::Native,
                token_id: None,
            },
        }
    }

    fn asset(id: &str, symbol: &str) -> Token {
        Token {
            kind: TokenKind::Asset,
            token_id: Some(id.to_string()),
            symbol: symbol.to_string(),
            decimals: 6,
            pallet: Some("Assets".to_string()),
            name: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_balance_keeps_one_row() {
        let ledger = MemoryLedger::new();
        ledger.upsert_balance(&key(1), &Balance::from_native(1, 0, 0)).await.unwrap();
        ledger.upsert_balance(&key(1), &Balance::from_native(2, 0, 0)).await.unwrap();

        assert_eq!(ledger.balance_count().await.unwrap(), 1);
        assert_eq!(
            ledger.balance(&key(1)).await.unwrap().unwrap().total,
            U256::from(2u8)
        );
        assert!(ledger.balance(&key(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_change_is_idempotent() {
        let ledger = MemoryLedger::new();
        let change = BalanceChange {
            key: key(1),
            free_before: U256::zero(),
            free_after: U256::from(5u8),
            total_before: U256::zero(),
            total_after: U256::from(5u8),
            delta: U256::from(5u8),
            direction: ChangeDirection::Increase,
            recorded_at: Utc::now(),
        };

        ledger.append_balance_change(&change).await.unwrap();
        ledger.append_balance_change(&change).await.unwrap();
        assert_eq!(ledger.balance_changes(&key(1)).await.unwrap(), vec![change.clone()]);
        assert!(ledger.balance_changes(&key(2)).await.unwrap().is_empty());

        // The same transition seen again later is not a new record.
        let seen_again = BalanceChange {
            recorded_at: change.recorded_at + chrono::Duration::seconds(60),
            ..change.clone()
        };
        ledger.append_balance_change(&seen_again).await.unwrap();
        assert_eq!(ledger.balance_changes(&key(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_record_change_writes_history_and_balance() {
        let ledger = MemoryLedger::new();
        let after = Balance::from_native(7, 0, 0);
        let change = BalanceChange::between(key(1), &Balance::zero(), &after, Utc::now()).unwrap();

        ledger.record_change(&after, &change).await.unwrap();
        ledger.record_change(&after, &change).await.unwrap();

        assert_eq!(ledger.balance(&key(1)).await.unwrap(), Some(after));
        assert_eq!(ledger.balance_changes(&key(1)).await.unwrap(), vec![change]);
        assert_eq!(ledger.history_len().await, 1);
    }

    #[tokio::test]
    async fn test_upsert_token_refreshes_metadata() {
        let ledger = MemoryLedger::new();
        ledger.upsert_token(1, &asset("7", "ASSET7")).await.unwrap();
        ledger.upsert_token(1, &asset("7", "USDX")).await.unwrap();
        ledger.upsert_token(2, &asset("7", "OTHER")).await.unwrap();

        let tokens = ledger.tokens(1).await.unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].symbol, "USDX");
        assert_eq!(ledger.tokens(2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let ledger = MemoryLedger::new();
        ledger.upsert_balance(&key(1), &Balance::from_native(9, 1, 0)).await.unwrap();
        ledger.upsert_token(1, &asset("1984", "USDT")).await.unwrap();
        ledger
            .record_pallets(1, &[PalletInfo { name: "Assets".to_string(), index: 50 }])
            .await
            .unwrap();

        let restored = MemoryLedger::from_parts(ledger.staged(|_| {}).await.to_snapshot(), Vec::new());
        assert_eq!(restored.balance(&key(1)).await.unwrap(), ledger.balance(&key(1)).await.unwrap());
        assert_eq!(restored.tokens(1).await.unwrap(), ledger.tokens(1).await.unwrap());
        assert_eq!(restored.pallets(1).await.unwrap()[0].index, 50);
    }
}
