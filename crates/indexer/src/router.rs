//! Reactions to factory and vault events.

use alloy::primitives::{Address, U256};

use crate::{
    abi::{
        IVault::{self, IVaultEvents},
        IVaultFactory::{self, IVaultFactoryEvents},
    },
    reader::ChainReader,
    registry,
    snapshot::SnapshotWriter,
    state::{PositionKey, SharePricePoint, UserPosition, Vault},
    store::Store,
    stream::RawEvent,
    types::{self, ChainEvent, SnapshotSource, WatchTarget},
};

/// Result of applying a single event.
///
/// Entities are already persisted by the time the outcome is returned, watch
/// targets are for the event delivery runtime to consume.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// Vault record created or updated by the event.
    pub vault: Option<Vault>,
    /// Snapshot taken on the event, `None` if the vault read failed or the
    /// event does not trigger one.
    pub snapshot: Option<SharePricePoint>,
    /// Position updated by the event.
    pub position: Option<UserPosition>,
    /// Contracts to start routing events from.
    pub watch: Vec<WatchTarget>,
}

/// Applies factory and vault events.
///
/// Reactions are independent per event kind and keyed on vault identity.
/// Emitters are expected to be already filtered: factory events from tracked
/// factories, vault events from registered vaults.
#[derive(Clone, Debug)]
pub struct EventRouter<R, S> {
    snapshots: SnapshotWriter<R, S>,
}

impl<R: ChainReader, S: Store> EventRouter<R, S> {
    pub fn new(snapshots: SnapshotWriter<R, S>) -> Self { Self { snapshots } }

    pub async fn route(&self, instant: types::StateInstant, event: &RawEvent) -> EventOutcome {
        let emitter = event.address();
        match event.event() {
            ChainEvent::Factory(IVaultFactoryEvents::VaultCreated(e)) => {
                self.on_vault_created(instant, emitter, e)
            },
            ChainEvent::Vault(IVaultEvents::Deposit(e)) => {
                self.on_deposit(instant, emitter, e).await
            },
            ChainEvent::Vault(IVaultEvents::Withdraw(e)) => {
                self.on_withdraw(instant, emitter, e).await
            },
            ChainEvent::Vault(IVaultEvents::Rebalance(_)) => {
                self.on_rebalance(instant, emitter, SnapshotSource::OwnerRebalance).await
            },
            ChainEvent::Vault(IVaultEvents::Rebalanced(_)) => {
                self.on_rebalance(instant, emitter, SnapshotSource::ExternalRebalance).await
            },
        }
    }

    fn store(&self) -> &S { self.snapshots.store() }

    fn on_vault_created(
        &self,
        instant: types::StateInstant,
        factory: Address,
        e: &IVaultFactory::VaultCreated,
    ) -> EventOutcome {
        let vault = match self.store().vault(e.vault) {
            Some(existing) => {
                tracing::debug!(vault = %e.vault, "vault already exists, creation replayed");
                existing
            },
            None => {
                let vault = Vault::created(instant, e.vault, e.user, factory);
                self.store().put_vault(vault.clone());
                vault
            },
        };
        registry::register(self.store(), factory, e.vault);

        EventOutcome {
            vault: Some(vault),
            watch: vec![WatchTarget { factory, vault: e.vault }],
            ..Default::default()
        }
    }

    async fn on_deposit(
        &self,
        instant: types::StateInstant,
        vault: Address,
        e: &IVault::Deposit,
    ) -> EventOutcome {
        let snapshot = self.snapshots.snapshot(vault, instant, SnapshotSource::Deposit).await;

        let mut position = self.position(instant, e.user, vault);
        position.deposit(instant, e.quoteAmount, e.sharesMinted);
        self.store().put_position(position);

        EventOutcome { snapshot, position: Some(position), ..Default::default() }
    }

    async fn on_withdraw(
        &self,
        instant: types::StateInstant,
        vault: Address,
        e: &IVault::Withdraw,
    ) -> EventOutcome {
        let snapshot = self.snapshots.snapshot(vault, instant, SnapshotSource::Withdraw).await;

        let mut position = self.position(instant, e.user, vault);
        if let Some(shortfall) =
            position.withdraw(instant, e.quoteReturned, e.baseReturned, e.sharesBurned)
        {
            tracing::warn!(
                user = %e.user,
                %vault,
                block = instant.block_number(),
                burned = %e.sharesBurned,
                %shortfall,
                "burned shares exceed recorded balance, clamped to zero"
            );
        }
        self.store().put_position(position);

        // Fully exited
        let mut updated_vault = None;
        if position.shares() == U256::ZERO
            && let Some(mut record) = self.store().vault(vault)
            && record.is_active()
        {
            record.deactivate(instant);
            self.store().put_vault(record.clone());
            updated_vault = Some(record);
        }

        EventOutcome {
            vault: updated_vault,
            snapshot,
            position: Some(position),
            ..Default::default()
        }
    }

    async fn on_rebalance(
        &self,
        instant: types::StateInstant,
        vault: Address,
        source: SnapshotSource,
    ) -> EventOutcome {
        let snapshot = self.snapshots.snapshot(vault, instant, source).await;
        EventOutcome { snapshot, ..Default::default() }
    }

    fn position(
        &self,
        instant: types::StateInstant,
        user: Address,
        vault: Address,
    ) -> UserPosition {
        self.store()
            .position(&PositionKey { user, vault })
            .unwrap_or_else(|| UserPosition::empty(instant, user, vault))
    }
}

#[cfg(all(test, feature = "testing"))]
mod tests {
    use std::sync::Arc;

    use alloy::primitives::address;

    use super::*;
    use crate::{
        store::MemoryStore,
        testing::{MockChain, events},
        types::StateInstant,
    };

    const FACTORY: Address = address!("0xfafafafafafafafafafafafafafafafafafafafa");
    const VAULT: Address = address!("0x0101010101010101010101010101010101010101");
    const USER: Address = address!("0x0202020202020202020202020202020202020202");

    fn setup() -> (Arc<MockChain>, Arc<MemoryStore>, EventRouter<MockChain, MemoryStore>) {
        let chain = Arc::new(MockChain::new());
        let store = Arc::new(MemoryStore::new());
        let router = EventRouter::new(SnapshotWriter::new(chain.clone(), store.clone()));
        (chain, store, router)
    }

    #[tokio::test]
    async fn test_vault_created() {
        let (chain, store, router) = setup();
        let instant = StateInstant::new(100, 1000);

        let outcome = router.route(instant, &events::vault_created(FACTORY, USER, VAULT)).await;

        let vault = store.vault(VAULT).unwrap();
        assert_eq!(vault.owner(), USER);
        assert_eq!(vault.factory(), FACTORY);
        assert_eq!(vault.created_at(), instant);
        assert!(vault.is_active());
        assert_eq!(vault.latest(), None);
        assert_eq!(outcome.vault, Some(vault));
        assert_eq!(outcome.watch, vec![WatchTarget { factory: FACTORY, vault: VAULT }]);
        assert_eq!(outcome.snapshot, None);
        assert_eq!(store.registry(FACTORY).unwrap().vaults(), &[VAULT]);
        assert_eq!(chain.num_reads(), 0);
    }

    #[tokio::test]
    async fn test_vault_created_replay_keeps_state() {
        let (chain, store, router) = setup();
        chain.set_state(VAULT, 100, U256::from(10), U256::from(10));

        router
            .route(StateInstant::new(100, 1000), &events::vault_created(FACTORY, USER, VAULT))
            .await;
        router.route(StateInstant::new(101, 1010), &events::rebalance(VAULT)).await;
        let outcome = router
            .route(StateInstant::new(100, 1000), &events::vault_created(FACTORY, USER, VAULT))
            .await;

        assert_eq!(outcome.watch.len(), 1);
        let vault = store.vault(VAULT).unwrap();
        assert_eq!(vault.created_at(), StateInstant::new(100, 1000));
        assert_eq!(vault.latest_snapshot_block(), Some(101));
        assert_eq!(store.registry(FACTORY).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_deposit_with_failed_read_still_updates_position() {
        let (_, store, router) = setup();
        router.route(StateInstant::new(1, 10), &events::vault_created(FACTORY, USER, VAULT)).await;

        let outcome = router
            .route(
                StateInstant::new(2, 20),
                &events::deposit(VAULT, USER, U256::from(500), U256::from(400)),
            )
            .await;

        assert_eq!(outcome.snapshot, None);
        let position = store.position(&PositionKey { user: USER, vault: VAULT }).unwrap();
        assert_eq!(position.quote_deposited(), U256::from(500));
        assert_eq!(position.shares(), U256::from(400));
        assert_eq!(store.num_price_points(), 0);
    }

    #[tokio::test]
    async fn test_adversarial_burn_clamps_shares() {
        let (chain, store, router) = setup();
        chain.set_state(VAULT, 1, U256::from(100), U256::from(100));
        router.route(StateInstant::new(1, 10), &events::vault_created(FACTORY, USER, VAULT)).await;
        router
            .route(
                StateInstant::new(2, 20),
                &events::deposit(VAULT, USER, U256::from(100), U256::from(100)),
            )
            .await;

        let outcome = router
            .route(
                StateInstant::new(3, 30),
                &events::withdraw(VAULT, USER, U256::from(90), U256::from(1), U256::MAX),
            )
            .await;

        let position = outcome.position.unwrap();
        assert_eq!(position.shares(), U256::ZERO);
        assert_eq!(position.quote_withdrawn(), U256::from(90));
        assert_eq!(position.base_returned(), U256::from(1));
        assert!(!store.vault(VAULT).unwrap().is_active());
    }

    #[tokio::test]
    async fn test_partial_withdraw_keeps_vault_active() {
        let (chain, store, router) = setup();
        chain.set_state(VAULT, 1, U256::from(100), U256::from(100));
        router.route(StateInstant::new(1, 10), &events::vault_created(FACTORY, USER, VAULT)).await;
        router
            .route(
                StateInstant::new(2, 20),
                &events::deposit(VAULT, USER, U256::from(100), U256::from(100)),
            )
            .await;

        let outcome = router
            .route(
                StateInstant::new(3, 30),
                &events::withdraw(VAULT, USER, U256::from(40), U256::ZERO, U256::from(40)),
            )
            .await;

        assert_eq!(outcome.vault, None);
        assert_eq!(outcome.position.unwrap().shares(), U256::from(60));
        assert!(store.vault(VAULT).unwrap().is_active());
        assert_eq!(outcome.snapshot.unwrap().source(), SnapshotSource::Withdraw);
    }

    #[tokio::test]
    async fn test_rebalance_sources() {
        let (chain, store, router) = setup();
        chain.set_state(VAULT, 1, U256::from(1200), U256::from(1000));
        router.route(StateInstant::new(1, 10), &events::vault_created(FACTORY, USER, VAULT)).await;

        let owner = router.route(StateInstant::new(5, 50), &events::rebalance(VAULT)).await;
        let external = router.route(StateInstant::new(5, 50), &events::rebalanced(VAULT)).await;

        assert_eq!(owner.snapshot.unwrap().source(), SnapshotSource::OwnerRebalance);
        assert_eq!(external.snapshot.unwrap().source(), SnapshotSource::ExternalRebalance);
        assert_eq!(owner.position, None);
        assert_eq!(external.position, None);
        assert_eq!(store.price_history(VAULT).len(), 2);
        assert!(store.positions(VAULT).is_empty());
    }
}
