use std::fmt::Display;

use alloy::primitives::{Address, U256};

use crate::{num, types};

/// Identity of a [`SharePricePoint`].
///
/// Different triggers within the same block produce distinct points, while
/// re-running the same trigger lands on the same key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PricePointKey {
    pub vault: Address,
    pub block_number: u64,
    pub source: types::SnapshotSource,
}

impl Display for PricePointKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", super::id_hex(self.vault), self.block_number, self.source)
    }
}

/// Share price and TVL of a vault measured at a particular block.
#[derive(Clone, Copy, derive_more::Debug, PartialEq, Eq)]
pub struct SharePricePoint {
    vault: Address,
    instant: types::StateInstant,
    source: types::SnapshotSource,
    #[debug("{price}")]
    price: U256,
    #[debug("{tvl}")]
    tvl: U256,
    #[debug("{total_supply}")]
    total_supply: U256,
}

impl SharePricePoint {
    /// Computes the point from raw `totalAssets()`/`totalSupply()` values.
    pub fn compute(
        vault: Address,
        instant: types::StateInstant,
        source: types::SnapshotSource,
        total_assets: U256,
        total_supply: U256,
    ) -> Self {
        Self {
            vault,
            instant,
            source,
            price: num::share_price(total_assets, total_supply),
            tvl: total_assets,
            total_supply,
        }
    }

    pub fn key(&self) -> PricePointKey {
        PricePointKey {
            vault: self.vault,
            block_number: self.instant.block_number(),
            source: self.source,
        }
    }

    /// Entity ID, `<vault>-<block>-<source>`.
    pub fn id(&self) -> String { self.key().to_string() }

    pub fn vault(&self) -> Address { self.vault }

    /// Block the vault state was read at.
    pub fn instant(&self) -> types::StateInstant { self.instant }

    pub fn block_number(&self) -> u64 { self.instant.block_number() }

    pub fn timestamp(&self) -> u64 { self.instant.block_timestamp() }

    pub fn source(&self) -> types::SnapshotSource { self.source }

    /// Share price, fixed-point with [`num::PRICE_DECIMALS`] decimals.
    pub fn price(&self) -> U256 { self.price }

    /// Total value locked, raw `totalAssets()`.
    pub fn tvl(&self) -> U256 { self.tvl }

    /// Raw `totalSupply()` the price was derived from.
    pub fn total_supply(&self) -> U256 { self.total_supply }
}

#[cfg(feature = "display")]
impl Display for SharePricePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} {} price: {} tvl: {}]",
            self.vault,
            self.source,
            super::price_cell(self.price),
            self.tvl
        )
    }
}

#[cfg(feature = "display")]
impl tabled::Tabled for SharePricePoint {
    const LENGTH: usize = 6;

    fn fields(&self) -> Vec<std::borrow::Cow<'_, str>> {
        use colored::Colorize;

        vec![
            self.vault.to_string().into(),
            self.instant.to_string().into(),
            self.source.to_string().into(),
            super::price_cell(self.price).green().to_string().into(),
            self.tvl.to_string().into(),
            self.total_supply.to_string().into(),
        ]
    }

    fn headers() -> Vec<std::borrow::Cow<'static, str>> {
        vec![
            "Vault".into(),
            "Block".into(),
            "Source".into(),
            "Price".into(),
            "TVL".into(),
            "Total Supply".into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    #[test]
    fn test_price_point_id() {
        let point = SharePricePoint::compute(
            address!("0x00000000000000000000000000000000000000ab"),
            types::StateInstant::new(42, 1_700_000_000),
            types::SnapshotSource::ExternalRebalance,
            U256::from(1000),
            U256::from(1000),
        );
        assert_eq!(point.id(), "0x00000000000000000000000000000000000000ab-42-rebalanced");
        assert_eq!(point.price(), num::SCALE);
        assert_eq!(point.tvl(), U256::from(1000));
    }
}
