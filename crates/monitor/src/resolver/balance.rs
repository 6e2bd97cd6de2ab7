// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Native and asset balances of an account.
//!
//! Records are decoded against fixed layouts:
//! - `System::Account`: `(nonce, consumers, providers, sufficients: u32,
//!   free, reserved, frozen, flags: u128)`
//! - `Assets::Account` / `ForeignAssets::Account`: `(balance: u128,
//!   status: u8, reason, extra)`

use crate::chain::{ChainClient, ChainError, ClientPool};
use crate::codec::{ScaleError, ScaleInput, Ss58Error, ss58};
use crate::consts::{ACCOUNT_ITEM, ASSET_PALLETS, FOREIGN_ASSETS_PALLET, SYSTEM_PALLET};
use crate::storage::{StorageHasher, double_map_key, map_key};
use crate::types::{Balance, Network, Token, TokenKind};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssetIdError {
    #[error("Asset id is empty")]
    Empty,

    #[error("Asset id '{0}' is neither a u32 nor 0x-prefixed hex")]
    InvalidNumber(String),

    #[error("Asset id '{0}' is not valid hex")]
    InvalidHex(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid address: {0}")]
    Address(#[from] Ss58Error),

    #[error("Invalid asset id: {0}")]
    AssetId(#[from] AssetIdError),

    #[error("Token {0} has no asset id")]
    MissingAssetId(String),

    #[error("Malformed account record: {0}")]
    Decode(#[from] ScaleError),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl ResolveError {
    /// Transport failures abandon the whole network for the cycle; anything
    /// else only affects the entity being resolved.
    pub fn is_transport(&self) -> bool {
        matches!(self, ResolveError::Chain(_))
    }
}

/// Raw map key bytes of an asset id: a decimal `u32` encodes little-endian,
/// `0x` hex is used verbatim.
pub fn parse_asset_id(asset_id: &str) -> Result<Vec<u8>, AssetIdError> {
    let asset_id = asset_id.trim();
    if asset_id.is_empty() {
        return Err(AssetIdError::Empty);
    }

    if let Some(hex_str) = asset_id.strip_prefix("0x") {
        if hex_str.is_empty() {
            return Err(AssetIdError::Empty);
        }
        return hex::decode(hex_str).map_err(|_| AssetIdError::InvalidHex(asset_id.to_string()));
    }

    asset_id
        .parse::<u32>()
        .map(|id| id.to_le_bytes().to_vec())
        .map_err(|_| AssetIdError::InvalidNumber(asset_id.to_string()))
}

/// `free`, `reserved` and `misc_frozen` of a `System::Account` record.
pub fn decode_account_info(bytes: &[u8]) -> Result<Balance, ScaleError> {
    let mut input = ScaleInput::new(bytes);
    let _nonce = input.read_u32()?;
    let _consumers = input.read_u32()?;
    let _providers = input.read_u32()?;
    let _sufficients = input.read_u32()?;

    let free = input.read_u128()?;
    let reserved = input.read_u128()?;
    let misc_frozen = input.read_u128()?;

    Ok(Balance::from_native(free, reserved, misc_frozen))
}

/// Balance of an asset account record.
pub fn decode_asset_account(bytes: &[u8]) -> Result<Balance, ScaleError> {
    let mut input = ScaleInput::new(bytes);
    let balance = input.read_u128()?;
    let _status = input.read_u8()?;
    Ok(Balance::from_asset(balance))
}

pub async fn resolve_native(client: &dyn ChainClient, address: &str) -> Result<Balance, ResolveError> {
    let account = ss58::decode(address)?;
    let key = map_key(
        SYSTEM_PALLET,
        ACCOUNT_ITEM,
        &account,
        StorageHasher::Blake2_128Concat,
    );

    match client.get_storage(&key).await? {
        Some(bytes) => Ok(decode_account_info(&bytes)?),
        None => Ok(Balance::zero()),
    }
}

/// Asset balance from the first of `pallets` holding a readable record.
pub async fn resolve_asset_in(
    client: &dyn ChainClient,
    pallets: &[&str],
    address: &str,
    asset_id: &str,
) -> Result<Balance, ResolveError> {
    let account = ss58::decode(address)?;
    let asset_key = parse_asset_id(asset_id)?;

    for pallet in pallets {
        let key = double_map_key(
            pallet,
            ACCOUNT_ITEM,
            (&asset_key, StorageHasher::Blake2_128Concat),
            (&account, StorageHasher::Blake2_128Concat),
        );

        let Some(bytes) = client.get_storage(&key).await? else {
            continue;
        };

        match decode_asset_account(&bytes) {
            Ok(balance) => return Ok(balance),
            Err(e) => {
                tracing::warn!(pallet, asset_id, error = %e, "Unreadable asset account record");
            }
        }
    }

    Ok(Balance::zero())
}

/// Asset balance, looked up in `Assets` then `ForeignAssets`.
pub async fn resolve_asset(
    client: &dyn ChainClient,
    address: &str,
    asset_id: &str,
) -> Result<Balance, ResolveError> {
    resolve_asset_in(client, ASSET_PALLETS, address, asset_id).await
}

/// Pallets searched for an asset token: the asset pallet it names, otherwise
/// `Assets` then `ForeignAssets`, or `ForeignAssets` alone for a foreign asset.
fn asset_pallets(token: &Token) -> &'static [&'static str] {
    if let Some(named) = token.pallet.as_deref() {
        match ASSET_PALLETS.iter().position(|p| *p == named) {
            Some(i) => return &ASSET_PALLETS[i..=i],
            None => tracing::warn!(
                symbol = %token.symbol,
                pallet = named,
                "Token names a pallet that holds no assets, using the default lookup"
            ),
        }
    }

    match token.kind {
        TokenKind::ForeignAsset => &[FOREIGN_ASSETS_PALLET],
        _ => ASSET_PALLETS,
    }
}

/// Balance of `token` held by `address`.
pub async fn resolve(
    client: &dyn ChainClient,
    address: &str,
    token: &Token,
) -> Result<Balance, ResolveError> {
    match token.kind {
        TokenKind::Native => resolve_native(client, address).await,
        TokenKind::Asset | TokenKind::ForeignAsset => {
            let asset_id = token
                .token_id
                .as_deref()
                .ok_or_else(|| ResolveError::MissingAssetId(token.symbol.clone()))?;
            resolve_asset_in(client, asset_pallets(token), address, asset_id).await
        }
    }
}

/// Resolves balances through the network's pooled client.
#[derive(Clone)]
pub struct BalanceResolver {
    pool: Arc<ClientPool>,
}

impl BalanceResolver {
    pub fn new(pool: Arc<ClientPool>) -> Self {
        Self { pool }
    }

    pub async fn resolve_native(&self, network: &Network, address: &str) -> Result<Balance, ResolveError> {
        let client = self.pool.get(network).await?;
        resolve_native(client.as_ref(), address).await
    }

    pub async fn resolve_asset(
        &self,
        network: &Network,
        address: &str,
        asset_id: &str,
    ) -> Result<Balance, ResolveError> {
        let client = self.pool.get(network).await?;
        resolve_asset(client.as_ref(), address, asset_id).await
    }

    pub async fn resolve(
        &self,
        network: &Network,
        address: &str,
        token: &Token,
    ) -> Result<Balance, ResolveError> {
        let client = self.pool.get(network).await?;
        resolve(client.as_ref(), address, token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::InMemoryChain;
    use parity_scale_codec::Encode;
    use primitive_types::U256;

    const ALICE: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

    #[derive(Encode)]
    struct AccountData {
        free: u128,
        reserved: u128,
        frozen: u128,
        flags: u128,
    }

    #[derive(Encode)]
    struct AccountInfo {
        nonce: u32,
        consumers: u32,
        providers: u32,
        sufficients: u32,
        data: AccountData,
    }

    fn account_info(free: u128, reserved: u128, frozen: u128) -> Vec<u8> {
        AccountInfo {
            nonce: 12,
            consumers: 1,
            providers: 1,
            sufficients: 0,
            data: AccountData {
                free,
                reserved,
                frozen,
                flags: 1 << 127,
            },
        }
        .encode()
    }

    fn alice_id() -> [u8; 32] {
        ss58::decode(ALICE).unwrap()
    }

    fn asset_account_key(pallet: &str, asset_key: &[u8]) -> Vec<u8> {
        double_map_key(
            pallet,
            ACCOUNT_ITEM,
            (asset_key, StorageHasher::Blake2_128Concat),
            (&alice_id(), StorageHasher::Blake2_128Concat),
        )
    }

    fn asset_record(balance: u128) -> Vec<u8> {
        // balance, status (Liquid), reason (Consumer), extra
        (balance, 0u8, 0u8, ()).encode()
    }

    #[test]
    fn test_parse_asset_id() {
        assert_eq!(parse_asset_id("1984").unwrap(), vec![0xc0, 0x07, 0, 0]);
        assert_eq!(parse_asset_id(" 7 ").unwrap(), vec![7, 0, 0, 0]);
        assert_eq!(parse_asset_id("0x0102ff").unwrap(), vec![1, 2, 0xff]);
        assert_eq!(parse_asset_id(""), Err(AssetIdError::Empty));
        assert_eq!(parse_asset_id("0x"), Err(AssetIdError::Empty));
        assert!(matches!(parse_asset_id("USDT"), Err(AssetIdError::InvalidNumber(_))));
        assert!(matches!(parse_asset_id("4294967296"), Err(AssetIdError::InvalidNumber(_))));
        assert!(matches!(parse_asset_id("0xabc"), Err(AssetIdError::InvalidHex(_))));
    }

    #[test]
    fn test_decode_account_info_total() {
        let balance = decode_account_info(&account_info(u128::MAX, 5, 9)).unwrap();
        assert_eq!(balance.free, U256::from(u128::MAX));
        assert_eq!(balance.reserved, U256::from(5u8));
        assert_eq!(balance.misc_frozen, U256::from(9u8));
        assert_eq!(balance.total, balance.free + balance.reserved);
    }

    #[test]
    fn test_decode_account_info_truncated() {
        let bytes = account_info(1, 2, 3);
        assert!(decode_account_info(&bytes[..40]).is_err());
    }

    #[tokio::test]
    async fn test_resolve_native() {
        let chain = InMemoryChain::new();
        let key = map_key(
            SYSTEM_PALLET,
            ACCOUNT_ITEM,
            &alice_id(),
            StorageHasher::Blake2_128Concat,
        );
        chain.insert(key, account_info(1_000_000_000_000, 500, 0));

        let balance = resolve_native(&chain, ALICE).await.unwrap();
        assert_eq!(balance.free, U256::from(1_000_000_000_000u64));
        assert_eq!(balance.total, U256::from(1_000_000_000_500u64));
    }

    #[tokio::test]
    async fn test_resolve_native_missing_is_zero() {
        let chain = InMemoryChain::new();
        let balance = resolve_native(&chain, ALICE).await.unwrap();
        assert!(balance.is_zero());
    }

    #[tokio::test]
    async fn test_resolve_native_bad_address() {
        let chain = InMemoryChain::new();
        let result = resolve_native(&chain, "not-an-address").await;
        assert!(matches!(result, Err(ResolveError::Address(_))));
    }

    #[tokio::test]
    async fn test_resolve_asset_prefers_assets_pallet() {
        let chain = InMemoryChain::new();
        let id = 1984u32.to_le_bytes();
        chain.insert(asset_account_key("Assets", &id), asset_record(250));
        chain.insert(asset_account_key("ForeignAssets", &id), asset_record(999));

        let balance = resolve_asset(&chain, ALICE, "1984").await.unwrap();
        assert_eq!(balance.total, U256::from(250u32));
        assert_eq!(balance.free, balance.total);
    }

    #[tokio::test]
    async fn test_resolve_asset_falls_back_to_foreign_assets() {
        let chain = InMemoryChain::new();
        let location = vec![1u8, 0, 3, 0xaa];
        chain.insert(asset_account_key("ForeignAssets", &location), asset_record(42));

        let balance = resolve_asset(&chain, ALICE, "0x010003aa").await.unwrap();
        assert_eq!(balance.total, U256::from(42u32));
    }

    #[tokio::test]
    async fn test_resolve_asset_skips_unreadable_record() {
        let chain = InMemoryChain::new();
        let id = 5u32.to_le_bytes();
        chain.insert(asset_account_key("Assets", &id), vec![1, 2, 3]);
        chain.insert(asset_account_key("ForeignAssets", &id), asset_record(77));

        let balance = resolve_asset(&chain, ALICE, "5").await.unwrap();
        assert_eq!(balance.total, U256::from(77u32));
    }

    #[tokio::test]
    async fn test_resolve_asset_absent_everywhere_is_zero() {
        let chain = InMemoryChain::new();
        let balance = resolve_asset(&chain, ALICE, "31337").await.unwrap();
        assert!(balance.is_zero());
    }

    #[tokio::test]
    async fn test_resolve_dispatches_on_kind() {
        let chain = InMemoryChain::new();
        let id = 3u32.to_le_bytes();
        chain.insert(asset_account_key("Assets", &id), asset_record(10));

        let asset = Token {
            kind: TokenKind::Asset,
            token_id: Some("3".to_string()),
            symbol: "X".to_string(),
            decimals: 0,
            pallet: Some("Assets".to_string()),
            name: None,
        };
        assert_eq!(resolve(&chain, ALICE, &asset).await.unwrap().total, U256::from(10u8));

        let foreign = Token {
            kind: TokenKind::ForeignAsset,
            pallet: None,
            ..asset.clone()
        };
        assert!(resolve(&chain, ALICE, &foreign).await.unwrap().is_zero());

        let missing_id = Token {
            token_id: None,
            ..asset
        };
        assert!(matches!(
            resolve(&chain, ALICE, &missing_id).await,
            Err(ResolveError::MissingAssetId(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_reads_only_the_named_pallet() {
        let chain = InMemoryChain::new();
        let id = 1984u32.to_le_bytes();
        chain.insert(asset_account_key("ForeignAssets", &id), asset_record(999));

        let mut usdt = Token {
            kind: TokenKind::Asset,
            token_id: Some("1984".to_string()),
            symbol: "USDT".to_string(),
            decimals: 6,
            pallet: Some("Assets".to_string()),
            name: None,
        };
        assert!(resolve(&chain, ALICE, &usdt).await.unwrap().is_zero());

        usdt.pallet = Some("ForeignAssets".to_string());
        assert_eq!(resolve(&chain, ALICE, &usdt).await.unwrap().total, U256::from(999u32));

        usdt.pallet = None;
        assert_eq!(resolve(&chain, ALICE, &usdt).await.unwrap().total, U256::from(999u32));
    }

    #[tokio::test]
    async fn test_resolve_ignores_non_asset_pallet_name() {
        let chain = InMemoryChain::new();
        let id = 8u32.to_le_bytes();
        chain.insert(asset_account_key("Assets", &id), asset_record(5));

        let token = Token {
            kind: TokenKind::Asset,
            token_id: Some("8".to_string()),
            symbol: "EIGHT".to_string(),
            decimals: 0,
            pallet: Some("Balances".to_string()),
            name: None,
        };
        assert_eq!(resolve(&chain, ALICE, &token).await.unwrap().total, U256::from(5u8));
    }

    #[tokio::test]
    async fn test_transport_error_is_flagged() {
        let chain = InMemoryChain::new();
        chain.set_unavailable(true);
        let err = resolve_native(&chain, ALICE).await.unwrap_err();
        assert!(err.is_transport());
    }
}
