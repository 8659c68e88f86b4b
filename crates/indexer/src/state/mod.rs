//! Indexed entities.
//!
//! All entities are keyed, so persisting one is an upsert of the record
//! under its key, see [`crate::store::Store`].

mod position;
mod price_point;
mod registry;
mod vault;

pub use position::{PositionKey, UserPosition};
pub use price_point::{PricePointKey, SharePricePoint};
pub use registry::VaultRegistry;
pub use vault::{LatestSnapshot, Vault};

use alloy::primitives::Address;

/// Lowercased `0x`-prefixed hex rendering used in entity IDs.
pub(crate) fn id_hex(address: Address) -> String { address.to_string().to_lowercase() }

#[cfg(feature = "display")]
pub(crate) fn price_cell(price: alloy::primitives::U256) -> String {
    crate::num::PRICE_CONVERTER.from_unsigned(price).to_string()
}
