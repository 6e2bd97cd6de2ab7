// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Pallet detection and asset enumeration.
//!
//! Discovery reads runtime metadata to learn which pallets exist, then lists
//! every key of `<pallet>::Asset` for the asset pallets present and resolves
//! each asset's metadata into a [`Token`].

use crate::chain::{ChainClient, ChainError, PalletInfo};
use crate::consts::{ASSET_ITEM, ASSET_PALLETS, FOREIGN_ASSETS_PALLET, TRACKED_PALLETS};
use crate::ledger::LedgerError;
use crate::metrics;
use crate::resolver::AssetMetadataResolver;
use crate::state::AppState;
use crate::storage::{BLAKE2_128_LEN, enumeration_prefix, extract_map_key_suffix};
use crate::types::{Network, Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Tracked pallets present on the chain.
    pub pallets: Vec<PalletInfo>,
    pub tokens: Vec<Token>,
}

impl DiscoveryReport {
    pub fn has_pallet(&self, name: &str) -> bool {
        self.pallets.iter().any(|p| p.name == name)
    }
}

fn token_kind(pallet: &str) -> TokenKind {
    if pallet == FOREIGN_ASSETS_PALLET {
        TokenKind::ForeignAsset
    } else {
        TokenKind::Asset
    }
}

/// Token id text and display label for the raw key of an asset entry.
///
/// `Assets` keys are `u32`; anything else (foreign asset locations) is kept as
/// hex so balance lookups can use it verbatim.
fn asset_identity(pallet: &str, raw_key: &[u8]) -> Option<(String, String)> {
    if pallet != FOREIGN_ASSETS_PALLET && raw_key.len() == 4 {
        let id = u32::from_le_bytes([raw_key[0], raw_key[1], raw_key[2], raw_key[3]]);
        return Some((id.to_string(), id.to_string()));
    }

    if raw_key.is_empty() {
        return None;
    }

    let hex_id = format!("0x{}", hex::encode(raw_key));
    let label = format!("0x{}", hex::encode(&raw_key[..raw_key.len().min(4)]));
    Some((hex_id, label))
}

/// Every asset registered in `pallet`.
pub async fn discover_assets(client: &dyn ChainClient, pallet: &str) -> Result<Vec<Token>, ChainError> {
    let prefix = enumeration_prefix(pallet, ASSET_ITEM);
    let keys = client.list_keys_by_prefix(&prefix).await?;
    let metadata = AssetMetadataResolver::new(client);

    let mut tokens = Vec::with_capacity(keys.len());
    for key in keys {
        let Some((raw, (token_id, label))) = extract_map_key_suffix(&key, BLAKE2_128_LEN)
            .and_then(|raw| Some((raw, asset_identity(pallet, raw)?)))
        else {
            tracing::warn!(pallet, key = %hex::encode(&key), "Skipping malformed asset key");
            continue;
        };

        let meta = metadata.resolve_raw(pallet, raw, &label).await?;

        tracing::debug!(pallet, asset = %token_id, symbol = %meta.symbol, "Discovered asset");
        tokens.push(Token {
            kind: token_kind(pallet),
            token_id: Some(token_id),
            symbol: meta.symbol,
            decimals: meta.decimals,
            pallet: Some(pallet.to_string()),
            name: Some(meta.name),
        });
    }

    Ok(tokens)
}

/// Detect tracked pallets and enumerate assets on one chain.
pub async fn discover_network(client: &dyn ChainClient) -> Result<DiscoveryReport, ChainError> {
    let pallets: Vec<PalletInfo> = client
        .fetch_latest_metadata()
        .await?
        .into_iter()
        .filter(|p| TRACKED_PALLETS.contains(&p.name.as_str()))
        .collect();

    let mut report = DiscoveryReport {
        pallets,
        tokens: Vec::new(),
    };

    for pallet in ASSET_PALLETS {
        if report.has_pallet(pallet) {
            let tokens = discover_assets(client, pallet).await?;
            report.tokens.extend(tokens);
        }
    }

    Ok(report)
}

async fn refresh_network(state: &AppState, network: &Network) -> Result<DiscoveryReport, DiscoveryError> {
    let client = state.pool.get(network).await?;
    let report = discover_network(client.as_ref()).await?;

    state.ledger.record_pallets(network.id, &report.pallets).await?;
    for token in &report.tokens {
        state.ledger.upsert_token(network.id, token).await?;
    }

    Ok(report)
}

/// Refresh pallets and assets of every active network.
///
/// Networks are walked one at a time; a failing network is logged and
/// skipped.
pub async fn run_discovery_cycle(state: &AppState) {
    tracing::info!("Starting network discovery");
    metrics::registry::DISCOVERY_CYCLES.inc();

    for network in state.registry.active_networks() {
        match refresh_network(state, network).await {
            Ok(report) => {
                tracing::info!(
                    network = %network.name,
                    pallets = report.pallets.len(),
                    assets = report.tokens.len(),
                    "Network discovery complete"
                );
            }
            Err(e) => {
                metrics::registry::CHAIN_ERRORS
                    .with_label_values(&[network.name.as_str()])
                    .inc();
                tracing::warn!(network = %network.name, error = %e, "Network discovery failed");
            }
        }
    }
}
