//! Persistence of indexed entities.

use alloy::primitives::Address;
use dashmap::{DashMap, mapref::entry::Entry};
use itertools::Itertools;

use crate::{
    registry::Registration,
    state::{PositionKey, PricePointKey, SharePricePoint, UserPosition, Vault, VaultRegistry},
};

/// Key-value store of indexed entities with last-write-wins semantics per
/// entity key.
///
/// No cross-entity transactions are assumed: every `put_*` is an independent
/// upsert.
pub trait Store: Send + Sync {
    fn vault(&self, address: Address) -> Option<Vault>;

    fn put_vault(&self, vault: Vault);

    fn price_point(&self, key: &PricePointKey) -> Option<SharePricePoint>;

    fn put_price_point(&self, point: SharePricePoint);

    fn position(&self, key: &PositionKey) -> Option<UserPosition>;

    fn put_position(&self, position: UserPosition);

    fn registry(&self, factory: Address) -> Option<VaultRegistry>;

    /// Factory the vault is registered under, if any.
    fn vault_factory(&self, vault: Address) -> Option<Address>;

    /// Appends the vault to the factory registry.
    ///
    /// Must be atomic with respect to concurrent registrations: a vault ends
    /// up in exactly one registry, exactly once.
    fn register_vault(&self, factory: Address, vault: Address) -> Registration;
}

/// In-memory [`Store`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    vaults: DashMap<Address, Vault>,
    price_points: DashMap<PricePointKey, SharePricePoint>,
    positions: DashMap<PositionKey, UserPosition>,
    registries: DashMap<Address, VaultRegistry>,
    vault_factories: DashMap<Address, Address>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// All vaults, in the order of creation.
    pub fn vaults(&self) -> Vec<Vault> {
        self.vaults
            .iter()
            .map(|v| v.value().clone())
            .sorted_by_key(|v| (v.created_at(), v.address()))
            .collect()
    }

    /// Share price time series of the vault, ordered by block.
    pub fn price_history(&self, vault: Address) -> Vec<SharePricePoint> {
        self.price_points
            .iter()
            .filter(|p| p.key().vault == vault)
            .map(|p| *p.value())
            .sorted_by_key(|p| p.key())
            .collect()
    }

    /// Number of share price points across all vaults.
    pub fn num_price_points(&self) -> usize { self.price_points.len() }

    /// Positions held in the vault, ordered by user.
    pub fn positions(&self, vault: Address) -> Vec<UserPosition> {
        self.positions
            .iter()
            .filter(|p| p.key().vault == vault)
            .map(|p| *p.value())
            .sorted_by_key(|p| p.user())
            .collect()
    }
}

impl Store for MemoryStore {
    fn vault(&self, address: Address) -> Option<Vault> {
        self.vaults.get(&address).map(|v| v.clone())
    }

    fn put_vault(&self, vault: Vault) { self.vaults.insert(vault.address(), vault); }

    fn price_point(&self, key: &PricePointKey) -> Option<SharePricePoint> {
        self.price_points.get(key).map(|p| *p)
    }

    fn put_price_point(&self, point: SharePricePoint) {
        self.price_points.insert(point.key(), point);
    }

    fn position(&self, key: &PositionKey) -> Option<UserPosition> {
        self.positions.get(key).map(|p| *p)
    }

    fn put_position(&self, position: UserPosition) {
        self.positions.insert(position.key(), position);
    }

    fn registry(&self, factory: Address) -> Option<VaultRegistry> {
        self.registries.get(&factory).map(|r| r.clone())
    }

    fn vault_factory(&self, vault: Address) -> Option<Address> {
        self.vault_factories.get(&vault).map(|f| *f)
    }

    fn register_vault(&self, factory: Address, vault: Address) -> Registration {
        // Vault index entry is held locked until the registry is appended to,
        // lock order is always index -> registry
        match self.vault_factories.entry(vault) {
            Entry::Occupied(entry) if *entry.get() == factory => Registration::AlreadyRegistered,
            Entry::Occupied(entry) => Registration::Conflict { registered_under: *entry.get() },
            Entry::Vacant(entry) => {
                self.registries
                    .entry(factory)
                    .or_insert_with(|| VaultRegistry::new(factory))
                    .append(vault);
                entry.insert(factory);
                Registration::Registered
            },
        }
    }
}
