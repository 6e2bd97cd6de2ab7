//! Operator-managed networks, accounts and tokens.
//!
//! The registry is a JSON document loaded once at startup and read-only
//! afterwards:
//!
//! ```json
//! {
//!   "networks": [{ "id": 1, "name": "polkadot", "rpc_url": "wss://rpc.polkadot.io",
//!                  "ss58_prefix": 0, "decimals": 10, "symbol": "DOT" }],
//!   "accounts": [{ "id": 1, "address": "15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5" }],
//!   "tokens":   [{ "network": "asset-hub-polkadot", "kind": "asset", "token_id": "1984",
//!                  "symbol": "USDT", "decimals": 6, "pallet": "Assets" }]
//! }
//! ```

use crate::codec::{Ss58Error, ss58};
use crate::types::{Account, Network, Token};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read registry '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid registry document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown network '{0}'")]
    UnknownNetwork(String),

    #[error("Duplicate {kind} '{value}'")]
    Duplicate { kind: &'static str, value: String },

    #[error("Invalid address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: Ss58Error,
    },
}

/// A token configured by hand for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryToken {
    /// Name of the owning network.
    pub network: String,
    #[serde(flatten)]
    pub token: Token,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub networks: Vec<Network>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub tokens: Vec<RegistryToken>,
}

impl Registry {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let registry = Self::from_json(&raw)?;
        tracing::info!(
            path = %path.display(),
            networks = registry.networks.len(),
            accounts = registry.accounts.len(),
            tokens = registry.tokens.len(),
            "Registry loaded"
        );
        Ok(registry)
    }

    pub fn from_json(raw: &str) -> Result<Self, RegistryError> {
        let registry: Registry = serde_json::from_str(raw)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Reject duplicate ids and names, unknown token networks and addresses
    /// that do not decode at all. A bad SS58 checksum or a prefix that does
    /// not match any configured network is only reported.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for network in &self.networks {
            if !ids.insert(network.id) {
                return Err(RegistryError::Duplicate {
                    kind: "network id",
                    value: network.id.to_string(),
                });
            }
            if !names.insert(network.name.as_str()) {
                return Err(RegistryError::Duplicate {
                    kind: "network name",
                    value: network.name.clone(),
                });
            }
        }

        let prefixes: HashSet<u16> = self.networks.iter().map(|n| n.ss58_prefix).collect();
        let mut account_ids = HashSet::new();
        for account in &self.accounts {
            if !account_ids.insert(account.id) {
                return Err(RegistryError::Duplicate {
                    kind: "account id",
                    value: account.id.to_string(),
                });
            }

            match ss58::decode_checked(&account.address) {
                Ok((_, Some(prefix))) if !prefixes.contains(&prefix) && !prefixes.is_empty() => {
                    tracing::warn!(
                        account = %account.label(),
                        prefix,
                        "Address prefix matches no configured network"
                    );
                }
                Ok(_) => {}
                Err(Ss58Error::InvalidChecksum) => {
                    tracing::warn!(account = %account.label(), "Address has an invalid SS58 checksum");
                }
                Err(checked) => {
                    if let Err(source) = ss58::decode(&account.address) {
                        return Err(RegistryError::InvalidAddress {
                            address: account.address.clone(),
                            source,
                        });
                    }
                    tracing::warn!(account = %account.label(), error = %checked, "Address only decodes leniently");
                }
            }
        }

        for entry in &self.tokens {
            if !names.contains(entry.network.as_str()) {
                return Err(RegistryError::UnknownNetwork(entry.network.clone()));
            }
        }

        Ok(())
    }

    pub fn network(&self, name: &str) -> Result<&Network, RegistryError> {
        self.networks
            .iter()
            .find(|n| n.name == name)
            .ok_or_else(|| RegistryError::UnknownNetwork(name.to_string()))
    }

    pub fn active_networks(&self) -> impl Iterator<Item = &Network> {
        self.networks.iter().filter(|n| n.active)
    }

    pub fn monitored_accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter().filter(|a| a.monitor_enabled)
    }

    pub fn configured_tokens<'a>(&'a self, network: &'a str) -> impl Iterator<Item = &'a Token> {
        self.tokens
            .iter()
            .filter(move |t| t.network == network)
            .map(|t| &t.token)
    }
}
