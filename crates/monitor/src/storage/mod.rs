//! Raw storage addressing.

pub mod keys;

pub use keys::{
    BLAKE2_128_LEN, STORAGE_PREFIX_LEN, StorageHasher, double_map_key, enumeration_prefix,
    extract_map_key_suffix, map_key, plain_key, twox_prefix,
};
