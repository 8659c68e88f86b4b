use alloy::primitives::{Address, U256};

use super::SharePricePoint;
use crate::types;

/// The most recent successful share price snapshot of a vault.
#[derive(Clone, Copy, derive_more::Debug, PartialEq, Eq)]
pub struct LatestSnapshot {
    pub instant: types::StateInstant,
    #[debug("{price}")]
    pub price: U256,
    #[debug("{tvl}")]
    pub tvl: U256,
}

/// Vault clone deployed by one of the tracked factories.
///
/// Created once on `VaultCreated`, never deleted. Latest snapshot fields are a
/// best-effort cache of the vault's [`SharePricePoint`] series.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vault {
    address: Address,
    owner: Address,
    factory: Address,
    created: types::StateInstant,
    updated: types::StateInstant,
    active: bool,
    latest: Option<LatestSnapshot>,
}

impl Vault {
    pub(crate) fn created(
        instant: types::StateInstant,
        address: Address,
        owner: Address,
        factory: Address,
    ) -> Self {
        Self {
            address,
            owner,
            factory,
            created: instant,
            updated: instant,
            active: true,
            latest: None,
        }
    }

    /// Address of the vault contract.
    pub fn address(&self) -> Address { self.address }

    /// Entity ID, the lowercased vault address.
    pub fn id(&self) -> String { super::id_hex(self.address) }

    /// User the vault was created for.
    pub fn owner(&self) -> Address { self.owner }

    /// Factory that created the vault.
    pub fn factory(&self) -> Address { self.factory }

    /// Instant the vault was created at.
    pub fn created_at(&self) -> types::StateInstant { self.created }

    /// Instant the vault record was last updated at.
    pub fn instant(&self) -> types::StateInstant { self.updated }

    /// Cleared once the share balance of a withdrawing user drops to zero.
    pub fn is_active(&self) -> bool { self.active }

    /// The most recent successful snapshot, if any.
    pub fn latest(&self) -> Option<&LatestSnapshot> { self.latest.as_ref() }

    pub fn latest_price(&self) -> Option<U256> { self.latest.map(|l| l.price) }

    pub fn latest_tvl(&self) -> Option<U256> { self.latest.map(|l| l.tvl) }

    pub fn latest_snapshot_block(&self) -> Option<u64> {
        self.latest.map(|l| l.instant.block_number())
    }

    /// Records the point as the latest snapshot, unless a snapshot from a
    /// later block is already recorded.
    pub(crate) fn update_latest(&mut self, point: &SharePricePoint) -> bool {
        if self
            .latest
            .is_some_and(|l| l.instant.block_number() > point.instant().block_number())
        {
            return false;
        }
        self.latest = Some(LatestSnapshot {
            instant: point.instant(),
            price: point.price(),
            tvl: point.tvl(),
        });
        self.updated = self.updated.max(point.instant());
        true
    }

    pub(crate) fn deactivate(&mut self, instant: types::StateInstant) {
        self.active = false;
        self.updated = instant;
    }
}

#[cfg(feature = "display")]
impl std::fmt::Display for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use colored::Colorize;

        write!(
            f,
            "{} {} owner: {} factory: {} created: {}",
            format!("Vault {}", self.address).blue(),
            if self.active { "ACTIVE".green() } else { "INACTIVE".bright_red() },
            self.owner,
            self.factory,
            self.created,
        )?;
        if let Some(latest) = &self.latest {
            write!(
                f,
                "\n    Price: {} | TVL: {} | Snapshot: {}",
                super::price_cell(latest.price).green(),
                latest.tvl,
                latest.instant,
            )?;
        }
        Ok(())
    }
}

#[cfg(feature = "display")]
impl tabled::Tabled for Vault {
    const LENGTH: usize = 7;

    fn fields(&self) -> Vec<std::borrow::Cow<'_, str>> {
        use colored::Colorize;

        vec![
            self.address.to_string().into(),
            self.owner.to_string().into(),
            if self.active {
                "yes".green().to_string().into()
            } else {
                "no".bright_red().to_string().into()
            },
            self.created.block_number().to_string().into(),
            self.latest
                .map(|l| super::price_cell(l.price))
                .unwrap_or_else(|| "-".to_string())
                .into(),
            self.latest.map(|l| l.tvl.to_string()).unwrap_or_else(|| "-".to_string()).into(),
            self.latest
                .map(|l| l.instant.block_number().to_string())
                .unwrap_or_else(|| "-".to_string())
                .into(),
        ]
    }

    fn headers() -> Vec<std::borrow::Cow<'static, str>> {
        vec![
            "Vault".into(),
            "Owner".into(),
            "Active".into(),
            "Created".into(),
            "Price".into(),
            "TVL".into(),
            "Snapshot Block".into(),
        ]
    }
}
