//! JSON-file ledger.
//!
//! Current balances, tokens and pallets live in one JSON document that is
//! rewritten through a temporary file renamed over the target. History goes
//! to a JSON-lines journal next to it (`ledger.json` keeps its history in
//! `ledger.history.jsonl`) and is only ever appended to.
//!
//! Every write reaches disk before the in-memory copy changes, so a failed
//! write leaves memory agreeing with what a restart would load.

use super::memory::{LedgerSnapshot, MemoryLedger, Tables};
use super::{LedgerError, LedgerStore};
use crate::chain::PalletInfo;
use crate::types::{Balance, BalanceChange, BalanceKey, Token};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug)]
pub struct FileLedger {
    inner: MemoryLedger,
    path: PathBuf,
    journal: PathBuf,
    write_lock: Mutex<()>,
}

impl FileLedger {
    /// Open the ledger at `path`, starting empty when the file does not exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let journal = path.with_extension("history.jsonl");

        let snapshot = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => LedgerSnapshot::default(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => LedgerSnapshot::default(),
            Err(e) => return Err(e.into()),
        };
        let history = read_journal(&journal).await?;

        let inner = MemoryLedger::from_parts(snapshot, history);
        tracing::info!(
            path = %path.display(),
            balances = inner.balance_count().await?,
            history = inner.history_len().await,
            "Opened ledger"
        );

        Ok(Self {
            inner,
            path,
            journal,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent(&self) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Caller holds `write_lock`.
    async fn write_tables(&self, tables: &Tables) -> Result<(), LedgerError> {
        let bytes = serde_json::to_vec_pretty(&tables.to_snapshot())?;
        self.ensure_parent().await?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Caller holds `write_lock`.
    async fn append_journal(&self, change: &BalanceChange) -> Result<(), LedgerError> {
        let mut line = serde_json::to_vec(change)?;
        line.push(b'\n');
        self.ensure_parent().await?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.journal)
            .await?;
        file.write_all(&line).await?;
        file.sync_data().await?;
        Ok(())
    }

    /// Write the tables with `update` applied, then make them live.
    async fn commit(&self, update: impl FnOnce(&mut Tables)) -> Result<(), LedgerError> {
        let _guard = self.write_lock.lock().await;
        let tables = self.inner.staged(update).await;
        self.write_tables(&tables).await?;
        self.inner.install(tables).await;
        Ok(())
    }

    /// Caller holds `write_lock`.
    async fn journal_change(&self, change: &BalanceChange) -> Result<(), LedgerError> {
        if self.inner.is_recorded(change).await {
            return Ok(());
        }
        self.append_journal(change).await?;
        self.inner.append_balance_change(change).await
    }
}

/// Load every journal record. A final line cut short by a crash is dropped
/// and truncated away, and a final record missing only its newline gets one,
/// so later appends start on a clean line.
async fn read_journal(journal: &Path) -> Result<Vec<BalanceChange>, LedgerError> {
    let bytes = match tokio::fs::read(journal).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut history = Vec::new();
    let mut offset = 0usize;
    for line in bytes.split_inclusive(|b| *b == b'\n') {
        let complete = line.ends_with(b"\n");
        let body = line.strip_suffix(b"\n").unwrap_or(line);
        if body.iter().all(u8::is_ascii_whitespace) {
            offset += line.len();
            continue;
        }
        match serde_json::from_slice::<BalanceChange>(body) {
            Ok(change) if !complete => {
                history.push(change);
                let mut file = tokio::fs::OpenOptions::new().append(true).open(journal).await?;
                file.write_all(b"\n").await?;
            }
            Ok(change) => history.push(change),
            Err(e) if !complete => {
                tracing::warn!(
                    path = %journal.display(),
                    error = %e,
                    "Dropping incomplete trailing history record"
                );
                let file = tokio::fs::OpenOptions::new().write(true).open(journal).await?;
                file.set_len(offset as u64).await?;
                break;
            }
            Err(e) => return Err(e.into()),
        }
        offset += line.len();
    }
    Ok(history)
}

#[async_trait]
impl LedgerStore for FileLedger {
    async fn balance(&self, key: &BalanceKey) -> Result<Option<Balance>, LedgerError> {
        self.inner.balance(key).await
    }

    async fn upsert_balance(&self, key: &BalanceKey, balance: &Balance) -> Result<(), LedgerError> {
        self.commit(|tables| tables.set_balance(key, balance)).await
    }

    async fn append_balance_change(&self, change: &BalanceChange) -> Result<(), LedgerError> {
        let _guard = self.write_lock.lock().await;
        self.journal_change(change).await
    }

    async fn record_change(&self, balance: &Balance, change: &BalanceChange) -> Result<(), LedgerError> {
        let _guard = self.write_lock.lock().await;
        self.journal_change(change).await?;
        let tables = self
            .inner
            .staged(|tables| tables.set_balance(&change.key, balance))
            .await;
        self.write_tables(&tables).await?;
        self.inner.install(tables).await;
        Ok(())
    }

    async fn balance_changes(&self, key: &BalanceKey) -> Result<Vec<BalanceChange>, LedgerError> {
        self.inner.balance_changes(key).await
    }

    async fn balance_count(&self) -> Result<usize, LedgerError> {
        self.inner.balance_count().await
    }

    async fn upsert_token(&self, network_id: u32, token: &Token) -> Result<(), LedgerError> {
        self.commit(|tables| tables.set_token(network_id, token)).await
    }

    async fn tokens(&self, network_id: u32) -> Result<Vec<Token>, LedgerError> {
        self.inner.tokens(network_id).await
    }

    async fn record_pallets(&self, network_id: u32, pallets: &[PalletInfo]) -> Result<(), LedgerError> {
        self.commit(|tables| tables.set_pallets(network_id, pallets)).await
    }

    async fn pallets(&self, network_id: u32) -> Result<Vec<PalletInfo>, LedgerError> {
        self.inner.pallets(network_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChangeDirection, TokenKey, TokenKind};
    use chrono::Utc;
    use primitive_types::U256;

    fn key() -> BalanceKey {
        BalanceKey {
            account: 1,
            network: 2,
            token: TokenKey {
                kind: TokenKind::Asset,
                token_id: Some("1984".to_string()),
            },
        }
    }

    fn change(before: u128, after: u128) -> (Balance, BalanceChange) {
        let after = Balance::from_asset(after);
        let change =
            BalanceChange::between(key(), &Balance::from_asset(before), &after, Utc::now()).unwrap();
        (after, change)
    }

    #[tokio::test]
    async fn test_missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FileLedger::open(dir.path().join("ledger.json")).await.unwrap();
        assert_eq!(ledger.balance_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.json");

        {
            let ledger = FileLedger::open(&path).await.unwrap();
            let (after, first) = change(0, 1_000_000);
            ledger.record_change(&after, &first).await.unwrap();
        }

        let reopened = FileLedger::open(&path).await.unwrap();
        let balance = reopened.balance(&key()).await.unwrap().unwrap();
        assert_eq!(balance.total, U256::from(1_000_000u32));

        let history = reopened.balance_changes(&key()).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].direction, ChangeDirection::Increase);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_history_is_appended_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let ledger = FileLedger::open(&path).await.unwrap();

        let (after, first) = change(0, 10);
        ledger.record_change(&after, &first).await.unwrap();
        let (after, second) = change(10, 4);
        ledger.record_change(&after, &second).await.unwrap();

        let snapshot: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert!(snapshot.get("history").is_none());

        let journal = std::fs::read_to_string(path.with_extension("history.jsonl")).unwrap();
        let lines: Vec<&str> = journal.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(serde_json::from_str::<BalanceChange>(lines[1]).unwrap(), second);
    }

    #[tokio::test]
    async fn test_failed_snapshot_write_keeps_old_balance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let ledger = FileLedger::open(&path).await.unwrap();

        // A directory in place of the snapshot makes the rename fail.
        std::fs::create_dir(&path).unwrap();
        let (after, first) = change(0, 500);
        assert!(matches!(
            ledger.record_change(&after, &first).await,
            Err(LedgerError::Io(_))
        ));
        assert!(ledger.balance(&key()).await.unwrap().is_none());
        assert_eq!(ledger.balance_changes(&key()).await.unwrap().len(), 1);

        // The next observation of the same transition completes the write.
        std::fs::remove_dir(&path).unwrap();
        let (after, retried) = change(0, 500);
        ledger.record_change(&after, &retried).await.unwrap();
        assert_eq!(ledger.balance(&key()).await.unwrap(), Some(after));
        assert_eq!(ledger.balance_changes(&key()).await.unwrap(), vec![first.clone()]);

        let reopened = FileLedger::open(&path).await.unwrap();
        assert_eq!(reopened.balance(&key()).await.unwrap(), Some(after));
        assert_eq!(reopened.balance_changes(&key()).await.unwrap(), vec![first]);
    }

    #[tokio::test]
    async fn test_torn_journal_tail_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let journal = path.with_extension("history.jsonl");

        let (_, first) = change(0, 10);
        let mut contents = serde_json::to_string(&first).unwrap();
        contents.push('\n');
        contents.push_str(r#"{"key":{"account":1"#);
        std::fs::write(&journal, contents).unwrap();

        let ledger = FileLedger::open(&path).await.unwrap();
        assert_eq!(ledger.balance_changes(&key()).await.unwrap(), vec![first.clone()]);

        let (after, second) = change(10, 20);
        ledger.record_change(&after, &second).await.unwrap();
        drop(ledger);

        let reopened = FileLedger::open(&path).await.unwrap();
        assert_eq!(reopened.balance_changes(&key()).await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(FileLedger::open(&path).await, Err(LedgerError::Json(_))));
    }
}
