// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! SS58 address handling.
//!
//! Accepted input forms, tried in order:
//! 1. `0x`-prefixed hex of the raw account id
//! 2. bare 64-character hex
//! 3. SS58 base58 with a one- or two-byte network prefix

use crate::types::AccountId;
use sp_crypto_hashing::blake2_512;
use thiserror::Error;

const ACCOUNT_ID_LEN: usize = 32;
const CHECKSUM_LEN: usize = 2;
const CHECKSUM_PREIMAGE: &[u8] = b"SS58PRE";
/// Prefixes above this do not fit the two-byte scheme.
const MAX_PREFIX: u16 = 0b0011_1111_1111_1111;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Ss58Error {
    #[error("Invalid address encoding: {0}")]
    InvalidEncoding(String),

    #[error("Invalid decoded address length {0}, expected 35 or 36 bytes (or 32 for hex)")]
    InvalidLength(usize),

    #[error("Address truncated: only {0} bytes follow the network prefix")]
    Truncated(usize),

    #[error("Address checksum mismatch")]
    InvalidChecksum,

    #[error("Network prefix {0} cannot be SS58 encoded")]
    InvalidPrefix(u16),
}

fn is_hex_account(s: &str) -> bool {
    s.len() == ACCOUNT_ID_LEN * 2 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn account_id_from_hex(hex_str: &str) -> Result<AccountId, Ss58Error> {
    let bytes = hex::decode(hex_str).map_err(|e| Ss58Error::InvalidEncoding(e.to_string()))?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| Ss58Error::InvalidLength(len))
}

/// Length of the network prefix carried by a decoded SS58 payload.
fn prefix_len(payload: &[u8]) -> Result<usize, Ss58Error> {
    match payload.len() {
        35 => Ok(1),
        36 => Ok(2),
        other => Err(Ss58Error::InvalidLength(other)),
    }
}

/// Extracts the 32 bytes following the network prefix.
fn account_id_from_payload(payload: &[u8]) -> Result<AccountId, Ss58Error> {
    let offset = prefix_len(payload)?;
    let rest = &payload[offset..];
    if rest.len() < ACCOUNT_ID_LEN {
        return Err(Ss58Error::Truncated(rest.len()));
    }

    let mut id = [0u8; ACCOUNT_ID_LEN];
    id.copy_from_slice(&rest[..ACCOUNT_ID_LEN]);
    Ok(id)
}

fn base58_payload(address: &str) -> Result<Vec<u8>, Ss58Error> {
    bs58::decode(address)
        .into_vec()
        .map_err(|e| Ss58Error::InvalidEncoding(e.to_string()))
}

/// Decode address text into a raw account id.
///
/// The SS58 checksum is not verified here; see [`decode_checked`].
pub fn decode(address: &str) -> Result<AccountId, Ss58Error> {
    let address = address.trim();

    if let Some(hex_str) = address.strip_prefix("0x") {
        return account_id_from_hex(hex_str);
    }

    if is_hex_account(address) {
        return account_id_from_hex(address);
    }

    account_id_from_payload(&base58_payload(address)?)
}

/// Decode address text, verifying the SS58 checksum.
///
/// Returns the network prefix for SS58 input and `None` for the hex forms,
/// which carry no checksum.
pub fn decode_checked(address: &str) -> Result<(AccountId, Option<u16>), Ss58Error> {
    let address = address.trim();
    if address.starts_with("0x") || is_hex_account(address) {
        return decode(address).map(|id| (id, None));
    }

    let payload = base58_payload(address)?;
    let id = account_id_from_payload(&payload)?;

    let body_len = payload.len() - CHECKSUM_LEN;
    let hash = blake2_512(&[CHECKSUM_PREIMAGE, &payload[..body_len]].concat());
    if hash[..CHECKSUM_LEN] != payload[body_len..] {
        return Err(Ss58Error::InvalidChecksum);
    }

    let prefix = match prefix_len(&payload)? {
        1 => u16::from(payload[0]),
        _ => {
            let lower = (payload[0] << 2) | (payload[1] >> 6);
            let upper = payload[1] & 0b0011_1111;
            u16::from(lower) | (u16::from(upper) << 8)
        }
    };

    Ok((id, Some(prefix)))
}

/// Encode an account id as SS58 text for the given network prefix.
pub fn encode(account: &AccountId, prefix: u16) -> Result<String, Ss58Error> {
    let mut payload = match prefix {
        0..=63 => vec![prefix as u8],
        64..=MAX_PREFIX => {
            let first = ((prefix & 0b0000_0000_1111_1100) as u8) >> 2;
            let second = ((prefix >> 8) as u8) | (((prefix & 0b0000_0000_0000_0011) as u8) << 6);
            vec![first | 0b0100_0000, second]
        }
        _ => return Err(Ss58Error::InvalidPrefix(prefix)),
    };

    payload.extend_from_slice(account);
    let hash = blake2_512(&[CHECKSUM_PREIMAGE, &payload[..]].concat());
    payload.extend_from_slice(&hash[..CHECKSUM_LEN]);

    Ok(bs58::encode(payload).into_string())
}
