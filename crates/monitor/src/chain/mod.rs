// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Access to chain state.
//!
//! Everything the monitor reads goes through [`ChainClient`]: the pallet list
//! from runtime metadata, single storage values and key listings under a
//! prefix. Keys are derived by the caller, see [`crate::storage`].

pub mod memory;
pub mod pool;
pub mod rpc;

pub use memory::InMemoryChain;
pub use pool::ClientPool;
pub use rpc::{RpcChainClient, RpcConnector};

use crate::types::Network;
use async_trait::async_trait;
use frame_metadata::{RuntimeMetadata, RuntimeMetadataPrefixed};
use parity_scale_codec::Decode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// A pallet as listed in runtime metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PalletInfo {
    pub name: String,
    pub index: u8,
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Failed to connect to {url}")]
    ConnectFailed {
        url: String,
        #[source]
        source: subxt_rpcs::Error,
    },

    #[error("RPC call {method} failed")]
    RpcFailed {
        method: &'static str,
        #[source]
        source: subxt_rpcs::Error,
    },

    #[error("Invalid hex in RPC response")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Failed to decode runtime metadata")]
    MetadataDecodeFailed(#[from] parity_scale_codec::Error),

    #[error("Unsupported runtime metadata version {0}")]
    UnsupportedMetadata(u32),

    #[error("Chain unavailable: {0}")]
    Unavailable(String),
}

/// Read-only view of one chain's latest state.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Pallets present in the latest runtime.
    async fn fetch_latest_metadata(&self) -> Result<Vec<PalletInfo>, ChainError>;

    /// Value stored under `key`, `None` when the entry does not exist.
    async fn get_storage(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ChainError>;

    /// Every key starting with `prefix`.
    async fn list_keys_by_prefix(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>, ChainError>;
}

/// Opens a [`ChainClient`] for a network.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, network: &Network) -> Result<Arc<dyn ChainClient>, ChainError>;
}

/// Decode `0x`-prefixed (or bare) hex from an RPC response.
pub(crate) fn decode_hex(value: &str) -> Result<Vec<u8>, ChainError> {
    let hex_str = value.strip_prefix("0x").unwrap_or(value);
    Ok(hex::decode(hex_str)?)
}

/// List the pallets in SCALE-encoded `RuntimeMetadataPrefixed`.
pub fn pallets_from_metadata(bytes: &[u8]) -> Result<Vec<PalletInfo>, ChainError> {
    let metadata = RuntimeMetadataPrefixed::decode(&mut &bytes[..])?;

    let pallets = match &metadata.1 {
        RuntimeMetadata::V14(m) => m
            .pallets
            .iter()
            .map(|p| PalletInfo {
                name: p.name.clone(),
                index: p.index,
            })
            .collect(),
        RuntimeMetadata::V15(m) => m
            .pallets
            .iter()
            .map(|p| PalletInfo {
                name: p.name.clone(),
                index: p.index,
            })
            .collect(),
        other => return Err(ChainError::UnsupportedMetadata(other.version())),
    };

    Ok(pallets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hex_accepts_both_forms() {
        assert_eq!(decode_hex("0x0102").unwrap(), vec![1, 2]);
        assert_eq!(decode_hex("0102").unwrap(), vec![1, 2]);
        assert_eq!(decode_hex("0x").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_hex_rejects_garbage() {
        assert!(matches!(decode_hex("0xzz"), Err(ChainError::InvalidHex(_))));
    }

    #[test]
    fn test_pallets_from_garbage_metadata() {
        let result = pallets_from_metadata(&[0x6d, 0x65, 0x74, 0x61]);
        assert!(matches!(result, Err(ChainError::MetadataDecodeFailed(_))));
    }
}
