use crate::ConfigError;
use std::path::PathBuf;

/// Locations of the operator registry and the balance ledger.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// JSON file listing networks, accounts and native tokens
    ///
    /// Env: AM_REGISTRY_PATH
    /// Default: ./registry.json
    pub registry_path: PathBuf,

    /// JSON snapshot of balances and history. Memory only when unset.
    ///
    /// Env: AM_LEDGER_PATH
    pub ledger_path: Option<PathBuf>,
}

pub(crate) fn default_registry_path() -> String {
    "./registry.json".to_string()
}

impl StorageConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.registry_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidateError(
                "Registry path cannot be empty".to_string(),
            ));
        }

        if let Some(path) = &self.ledger_path
            && path.as_os_str().is_empty()
        {
            return Err(ConfigError::ValidateError(
                "Ledger path cannot be empty when set".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            registry_path: PathBuf::from(default_registry_path()),
            ledger_path: None,
        }
    }
}
