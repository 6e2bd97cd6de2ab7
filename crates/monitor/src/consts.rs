// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Pallet and storage item names the monitor addresses by hand.

pub const SYSTEM_PALLET: &str = "System";
pub const BALANCES_PALLET: &str = "Balances";
pub const ASSETS_PALLET: &str = "Assets";
pub const FOREIGN_ASSETS_PALLET: &str = "ForeignAssets";

/// `System::Account` and `Assets::Account` share the item name.
pub const ACCOUNT_ITEM: &str = "Account";
pub const ASSET_ITEM: &str = "Asset";
pub const METADATA_ITEM: &str = "Metadata";

/// Pallets recorded during discovery.
pub const TRACKED_PALLETS: &[&str] = &[
    "System",
    "Balances",
    "Assets",
    "ForeignAssets",
    "Bounties",
    "ChildBounties",
    "Staking",
    "ParachainStaking",
    "CollatorSelection",
    "Proxy",
    "Identity",
];

/// Pallets holding dynamically registered fungible assets, in lookup order.
pub const ASSET_PALLETS: &[&str] = &[ASSETS_PALLET, FOREIGN_ASSETS_PALLET];

/// Decimals assumed for an asset whose metadata cannot be read.
pub const DEFAULT_ASSET_DECIMALS: u8 = 10;

/// Size of the `deposit` balance leading an asset metadata record.
pub const METADATA_DEPOSIT_LEN: usize = 16;
