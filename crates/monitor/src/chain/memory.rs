//! In-process chain state, used in tests and local dry runs.

use super::{ChainClient, ChainError, PalletInfo};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct InMemoryChain {
    storage: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    pallets: RwLock<Vec<PalletInfo>>,
    unavailable: AtomicBool,
}

impl InMemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pallets<'a>(self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.set_pallets(names);
        self
    }

    pub fn set_pallets<'a>(&self, names: impl IntoIterator<Item = &'a str>) {
        let pallets = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| PalletInfo {
                name: name.to_string(),
                index: index as u8,
            })
            .collect();
        if let Ok(mut guard) = self.pallets.write() {
            *guard = pallets;
        }
    }

    pub fn insert(&self, key: Vec<u8>, value: Vec<u8>) {
        if let Ok(mut storage) = self.storage.write() {
            storage.insert(key, value);
        }
    }

    pub fn remove(&self, key: &[u8]) {
        if let Ok(mut storage) = self.storage.write() {
            storage.remove(key);
        }
    }

    /// Make every call fail as a transport error would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), ChainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ChainError::Unavailable("in-memory chain offline".to_string()));
        }
        Ok(())
    }

    fn poisoned() -> ChainError {
        ChainError::Unavailable("in-memory chain lock poisoned".to_string())
    }
}

#[async_trait]
impl ChainClient for InMemoryChain {
    async fn fetch_latest_metadata(&self) -> Result<Vec<PalletInfo>, ChainError> {
        self.check_available()?;
        let pallets = self.pallets.read().map_err(|_| Self::poisoned())?;
        Ok(pallets.clone())
    }

    async fn get_storage(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ChainError> {
        self.check_available()?;
        let storage = self.storage.read().map_err(|_| Self::poisoned())?;
        Ok(storage.get(key).cloned())
    }

    async fn list_keys_by_prefix(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>, ChainError> {
        self.check_available()?;
        let storage = self.storage.read().map_err(|_| Self::poisoned())?;
        Ok(storage
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}
