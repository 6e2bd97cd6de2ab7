// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Storage key derivation from pallet and item names.
//!
//! Every storage item lives under `twox128(pallet) ++ twox128(item)`. Map
//! entries append the hashed key; with `Blake2_128Concat` the raw key is
//! appended after its digest so it can be recovered from enumerated keys.

use sp_crypto_hashing::{blake2_128, twox_128};

/// `twox128(pallet) ++ twox128(item)`.
pub const STORAGE_PREFIX_LEN: usize = 32;
pub const BLAKE2_128_LEN: usize = 16;

/// Hashers the monitor can derive map keys for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageHasher {
    Blake2_128Concat,
    Identity,
}

impl StorageHasher {
    /// Bytes the hasher places before the raw key.
    pub fn hash_len(&self) -> usize {
        match self {
            StorageHasher::Blake2_128Concat => BLAKE2_128_LEN,
            StorageHasher::Identity => 0,
        }
    }

    /// Append the hashed form of `raw_key` to `out`.
    pub fn hash_into(&self, raw_key: &[u8], out: &mut Vec<u8>) {
        match self {
            StorageHasher::Blake2_128Concat => {
                out.extend_from_slice(&blake2_128(raw_key));
                out.extend_from_slice(raw_key);
            }
            StorageHasher::Identity => out.extend_from_slice(raw_key),
        }
    }
}

/// The 16-byte Twox128 hash of a pallet or storage item name.
pub fn twox_prefix(name: &str) -> [u8; 16] {
    twox_128(name.as_bytes())
}

/// Key of a plain (non-map) storage value.
pub fn plain_key(pallet: &str, item: &str) -> [u8; STORAGE_PREFIX_LEN] {
    let mut key = [0u8; STORAGE_PREFIX_LEN];
    key[..16].copy_from_slice(&twox_prefix(pallet));
    key[16..].copy_from_slice(&twox_prefix(item));
    key
}

/// Prefix shared by every entry of a storage map, for key listing.
pub fn enumeration_prefix(pallet: &str, item: &str) -> [u8; STORAGE_PREFIX_LEN] {
    plain_key(pallet, item)
}

/// Key of one entry in a single-key storage map.
pub fn map_key(pallet: &str, item: &str, raw_key: &[u8], hasher: StorageHasher) -> Vec<u8> {
    let mut key = Vec::with_capacity(STORAGE_PREFIX_LEN + hasher.hash_len() + raw_key.len());
    key.extend_from_slice(&plain_key(pallet, item));
    hasher.hash_into(raw_key, &mut key);
    key
}

/// Key of one entry in a double map such as `Assets::Account(asset, who)`.
pub fn double_map_key(
    pallet: &str,
    item: &str,
    first: (&[u8], StorageHasher),
    second: (&[u8], StorageHasher),
) -> Vec<u8> {
    let mut key = map_key(pallet, item, first.0, first.1);
    second.1.hash_into(second.0, &mut key);
    key
}

/// Raw key bytes trailing the prefix and hasher digest of an enumerated key.
///
/// Returns `None` when `full_key` is too short to hold them.
pub fn extract_map_key_suffix(full_key: &[u8], hash_len: usize) -> Option<&[u8]> {
    full_key.get(STORAGE_PREFIX_LEN + hash_len..)
}
