// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Asset metadata (`name`, `symbol`, `decimals`) read from pallet storage.
//!
//! The stored record is `(deposit: u128, name: Vec<u8>, symbol: Vec<u8>,
//! decimals: u8, is_frozen: bool)`. Decoding keeps every field that parsed
//! before the first failure and fills the rest from the placeholder.

use crate::chain::{ChainClient, ChainError};
use crate::codec::ScaleInput;
use crate::consts::{DEFAULT_ASSET_DECIMALS, FOREIGN_ASSETS_PALLET, METADATA_DEPOSIT_LEN, METADATA_ITEM};
use crate::storage::{StorageHasher, map_key};
use crate::types::AssetMetadata;

/// Metadata reported for an asset whose record is absent or unreadable.
pub fn placeholder_metadata(pallet: &str, asset_label: &str) -> AssetMetadata {
    let symbol_prefix = if pallet == FOREIGN_ASSETS_PALLET {
        "FA"
    } else {
        "ASSET"
    };

    AssetMetadata {
        name: format!("Asset #{asset_label}"),
        symbol: format!("{symbol_prefix}{asset_label}"),
        decimals: DEFAULT_ASSET_DECIMALS,
    }
}

/// Decode a metadata record over `placeholder`.
pub fn decode_asset_metadata(bytes: &[u8], placeholder: AssetMetadata) -> AssetMetadata {
    let mut meta = placeholder;
    let mut input = ScaleInput::new(bytes);

    if input.skip(METADATA_DEPOSIT_LEN).is_err() {
        return meta;
    }

    match input.read_bytes() {
        Ok(name) => meta.name = String::from_utf8_lossy(&name).into_owned(),
        Err(_) => return meta,
    }

    match input.read_bytes() {
        Ok(symbol) => meta.symbol = String::from_utf8_lossy(&symbol).into_owned(),
        Err(_) => return meta,
    }

    if let Ok(decimals) = input.read_u8() {
        meta.decimals = decimals;
    }

    meta
}

pub struct AssetMetadataResolver<'a> {
    client: &'a dyn ChainClient,
}

impl<'a> AssetMetadataResolver<'a> {
    pub fn new(client: &'a dyn ChainClient) -> Self {
        Self { client }
    }

    /// Metadata of a `u32`-keyed asset.
    pub async fn resolve(&self, pallet: &str, asset_id: u32) -> Result<AssetMetadata, ChainError> {
        self.resolve_raw(pallet, &asset_id.to_le_bytes(), &asset_id.to_string())
            .await
    }

    /// Metadata of an asset keyed by arbitrary SCALE-encoded bytes, such as
    /// a foreign asset location.
    ///
    /// Only transport failures are errors; a missing or malformed record
    /// yields the placeholder.
    pub async fn resolve_raw(
        &self,
        pallet: &str,
        raw_key: &[u8],
        asset_label: &str,
    ) -> Result<AssetMetadata, ChainError> {
        let placeholder = placeholder_metadata(pallet, asset_label);
        let key = map_key(pallet, METADATA_ITEM, raw_key, StorageHasher::Blake2_128Concat);

        match self.client.get_storage(&key).await? {
            Some(bytes) => Ok(decode_asset_metadata(&bytes, placeholder)),
            None => {
                tracing::debug!(pallet, asset = asset_label, "No metadata stored for asset");
                Ok(placeholder)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::InMemoryChain;
    use parity_scale_codec::Encode;

    fn record(name: &str, symbol: &str, decimals: u8) -> Vec<u8> {
        (1_000u128, name.as_bytes().to_vec(), symbol.as_bytes().to_vec(), decimals, false).encode()
    }

    fn metadata_key(pallet: &str, id: u32) -> Vec<u8> {
        map_key(pallet, METADATA_ITEM, &id.to_le_bytes(), StorageHasher::Blake2_128Concat)
    }

    #[test]
    fn test_decode_full_record() {
        let meta = decode_asset_metadata(
            &record("Tether USD", "USDT", 6),
            placeholder_metadata("Assets", "1984"),
        );
        assert_eq!(
            meta,
            AssetMetadata {
                name: "Tether USD".to_string(),
                symbol: "USDT".to_string(),
                decimals: 6,
            }
        );
    }

    #[test]
    fn test_decode_keeps_fields_parsed_before_failure() {
        let full = record("Tether USD", "USDT", 6);
        let placeholder = placeholder_metadata("Assets", "1984");

        // Cut inside the symbol: name survives, symbol and decimals fall back.
        let cut = 16 + 1 + "Tether USD".len() + 2;
        let meta = decode_asset_metadata(&full[..cut], placeholder.clone());
        assert_eq!(meta.name, "Tether USD");
        assert_eq!(meta.symbol, "ASSET1984");
        assert_eq!(meta.decimals, 10);

        // Missing decimals byte only.
        let cut = 16 + 1 + "Tether USD".len() + 1 + "USDT".len();
        let meta = decode_asset_metadata(&full[..cut], placeholder.clone());
        assert_eq!(meta.symbol, "USDT");
        assert_eq!(meta.decimals, 10);

        // Shorter than the deposit.
        assert_eq!(decode_asset_metadata(&full[..8], placeholder.clone()), placeholder);
    }

    #[test]
    fn test_decode_ignores_trailing_fields() {
        let mut bytes = record("Polkadot", "DOT", 10);
        bytes.extend_from_slice(&[1, 2, 3, 4]);
        let meta = decode_asset_metadata(&bytes, placeholder_metadata("Assets", "0"));
        assert_eq!(meta.symbol, "DOT");
        assert_eq!(meta.decimals, 10);
    }

    #[test]
    fn test_decode_invalid_utf8_is_lossy() {
        let bytes = (0u128, vec![0xffu8, b'A'], b"X".to_vec(), 2u8).encode();
        let meta = decode_asset_metadata(&bytes, placeholder_metadata("Assets", "5"));
        assert_eq!(meta.name, "\u{fffd}A");
        assert_eq!(meta.decimals, 2);
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            placeholder_metadata("Assets", "7"),
            AssetMetadata {
                name: "Asset #7".to_string(),
                symbol: "ASSET7".to_string(),
                decimals: 10,
            }
        );
        assert_eq!(placeholder_metadata("ForeignAssets", "7").symbol, "FA7");
    }

    #[tokio::test]
    async fn test_resolve_absent_returns_placeholder() {
        let chain = InMemoryChain::new();
        let meta = AssetMetadataResolver::new(&chain)
            .resolve("Assets", 7)
            .await
            .unwrap();
        assert_eq!(meta.name, "Asset #7");
        assert_eq!(meta.symbol, "ASSET7");
        assert_eq!(meta.decimals, 10);
    }

    #[tokio::test]
    async fn test_resolve_present() {
        let chain = InMemoryChain::new();
        chain.insert(metadata_key("Assets", 1984), record("Tether USD", "USDT", 6));

        let meta = AssetMetadataResolver::new(&chain)
            .resolve("Assets", 1984)
            .await
            .unwrap();
        assert_eq!(meta.symbol, "USDT");
        assert_eq!(meta.decimals, 6);
    }

    #[tokio::test]
    async fn test_resolve_empty_value_returns_placeholder() {
        let chain = InMemoryChain::new();
        chain.insert(metadata_key("ForeignAssets", 3), Vec::new());

        let meta = AssetMetadataResolver::new(&chain)
            .resolve("ForeignAssets", 3)
            .await
            .unwrap();
        assert_eq!(meta, placeholder_metadata("ForeignAssets", "3"));
    }

    #[tokio::test]
    async fn test_resolve_transport_error() {
        let chain = InMemoryChain::new();
        chain.set_unavailable(true);
        assert!(AssetMetadataResolver::new(&chain).resolve("Assets", 1).await.is_err());
    }
}
