//! Fetch-and-decode of asset metadata and account balances.

pub mod balance;
pub mod metadata;

pub use balance::{AssetIdError, BalanceResolver, ResolveError, parse_asset_id};
pub use metadata::{AssetMetadataResolver, placeholder_metadata};
