//! Per-factory registry of known vaults, used for discovery by the periodic
//! sweep.

use alloy::primitives::Address;
use itertools::Itertools;

use crate::store::Store;

/// Result of a vault registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// Vault appended to the factory registry.
    Registered,
    /// Vault is already in the factory registry, e.g. on event replay.
    AlreadyRegistered,
    /// Vault is already registered under another factory and was left there.
    Conflict { registered_under: Address },
}

/// Registers the vault under the factory, if not already tracked.
pub fn register<S: Store + ?Sized>(store: &S, factory: Address, vault: Address) -> Registration {
    let registration = store.register_vault(factory, vault);
    match registration {
        Registration::Registered => {
            tracing::info!(%factory, %vault, "vault registered");
        },
        Registration::AlreadyRegistered => {
            tracing::debug!(%factory, %vault, "vault already registered");
        },
        Registration::Conflict { registered_under } => {
            tracing::warn!(
                %factory,
                %vault,
                %registered_under,
                "vault is already registered under another factory"
            );
        },
    }
    registration
}

/// Vaults registered under the factory, in the order of registration.
pub fn list_vaults<S: Store + ?Sized>(store: &S, factory: Address) -> Vec<Address> {
    store
        .registry(factory)
        .map(|registry| registry.vaults().to_vec())
        .unwrap_or_default()
}

/// Union of vaults registered under any of the factories.
pub fn all_vaults<S: Store + ?Sized>(store: &S, factories: &[Address]) -> Vec<Address> {
    factories
        .iter()
        .flat_map(|factory| list_vaults(store, *factory))
        .unique()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_all_vaults_unions_factories() {
        let store = MemoryStore::new();
        let (f1, f2, f3) =
            (Address::repeat_byte(0xf1), Address::repeat_byte(0xf2), Address::repeat_byte(0xf3));
        let (v1, v2, v3) =
            (Address::repeat_byte(1), Address::repeat_byte(2), Address::repeat_byte(3));

        register(&store, f1, v1);
        register(&store, f2, v2);
        register(&store, f1, v3);
        register(&store, f1, v1);

        assert_eq!(list_vaults(&store, f1), vec![v1, v3]);
        assert_eq!(list_vaults(&store, f3), Vec::<Address>::new());
        assert_eq!(all_vaults(&store, &[f1, f2, f3]), vec![v1, v3, v2]);
        assert_eq!(all_vaults(&store, &[f2]), vec![v2]);
        assert!(all_vaults(&store, &[]).is_empty());
    }
}
