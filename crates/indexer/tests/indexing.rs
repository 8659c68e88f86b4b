use alloy::primitives::{Address, U256, address};
use vault_indexer::{
    num,
    state::PositionKey,
    store::Store,
    testing::{TestIndexer, events},
    types::{SnapshotSource, StateInstant},
};

const FACTORY: Address = address!("0xfafafafafafafafafafafafafafafafafafafafa");
const OTHER_FACTORY: Address = address!("0xfbfbfbfbfbfbfbfbfbfbfbfbfbfbfbfbfbfbfbfb");
const VAULT: Address = address!("0x0101010101010101010101010101010101010101");
const OTHER_VAULT: Address = address!("0x0303030303030303030303030303030303030303");
const USER: Address = address!("0x0202020202020202020202020202020202020202");

/// Tests the lifecycle of a vault: creation, deposit, full withdrawal.
#[tokio::test]
async fn test_deposit_then_full_withdraw() {
    let mut t = TestIndexer::new(vec![FACTORY], 0);
    let n = 1_000;

    t.chain
        .set_state(VAULT, n, U256::from(1000), U256::from(1000))
        .set_state(VAULT, n + 10, U256::ZERO, U256::ZERO);

    t.indexer
        .apply_block(&events::block(n - 5, 9_950, vec![events::vault_created(
            FACTORY, USER, VAULT,
        )]))
        .await
        .unwrap();

    let outcome = t
        .indexer
        .apply_block(&events::block(n, 10_000, vec![events::deposit(
            VAULT,
            USER,
            U256::from(1000),
            U256::from(1000),
        )]))
        .await
        .unwrap();

    let point = outcome.events()[0].event().snapshot.unwrap();
    assert_eq!(point.block_number(), n);
    assert_eq!(point.timestamp(), 10_000);
    assert_eq!(point.source(), SnapshotSource::Deposit);
    assert_eq!(point.price(), U256::from(1_000_000_000_000_000_000u128));
    assert_eq!(point.tvl(), U256::from(1000));

    let key = PositionKey { user: USER, vault: VAULT };
    let position = t.store.position(&key).unwrap();
    assert_eq!(position.quote_deposited(), U256::from(1000));
    assert_eq!(position.shares(), U256::from(1000));

    let vault = t.store.vault(VAULT).unwrap();
    assert_eq!(vault.latest_price(), Some(num::SCALE));
    assert_eq!(vault.latest_snapshot_block(), Some(n));
    assert!(vault.is_active());

    t.indexer
        .apply_block(&events::block(n + 10, 10_100, vec![events::withdraw(
            VAULT,
            USER,
            U256::from(1050),
            U256::ZERO,
            U256::from(1000),
        )]))
        .await
        .unwrap();

    let position = t.store.position(&key).unwrap();
    assert_eq!(position.shares(), U256::ZERO);
    assert_eq!(position.quote_withdrawn(), U256::from(1050));
    assert_eq!(position.quote_deposited(), U256::from(1000));
    assert_eq!(position.instant(), StateInstant::new(n + 10, 10_100));

    let vault = t.store.vault(VAULT).unwrap();
    assert!(!vault.is_active());
    // Drained vault has no shares issued
    assert_eq!(vault.latest_price(), Some(U256::ZERO));
    assert_eq!(vault.latest_snapshot_block(), Some(n + 10));

    let history = t.store.price_history(VAULT);
    assert_eq!(
        history.iter().map(|p| (p.block_number(), p.source())).collect::<Vec<_>>(),
        vec![(n, SnapshotSource::Deposit), (n + 10, SnapshotSource::Withdraw)]
    );
}

/// Tests the periodic sweep over vaults of several factories, with one of
/// the reads reverting.
#[tokio::test]
async fn test_periodic_sweep_with_reverting_vault() {
    let mut t = TestIndexer::new(vec![FACTORY, OTHER_FACTORY], 100);

    t.chain
        .set_state(VAULT, 1, U256::from(2000), U256::from(1000))
        .revert_from(OTHER_VAULT, 1)
        .set_timestamp(200, 2_000);

    t.indexer
        .apply_block(&events::block(150, 1_500, vec![
            events::vault_created(FACTORY, USER, VAULT),
            events::vault_created(OTHER_FACTORY, USER, OTHER_VAULT),
        ]))
        .await
        .unwrap();

    // Not a cadence boundary
    let outcome = t.indexer.apply_block(&events::block(199, 1_990, vec![])).await.unwrap();
    assert!(outcome.sweep().is_none());

    let outcome = t.indexer.apply_block(&events::block(200, 2_000, vec![])).await.unwrap();
    let sweep = outcome.sweep().unwrap();
    assert_eq!(sweep.num_vaults, 2);
    assert_eq!(sweep.points.len(), 1);

    assert_eq!(t.store.num_price_points(), 1);
    let point = t.store.price_history(VAULT)[0];
    assert_eq!(point.source(), SnapshotSource::Periodic);
    assert_eq!(point.price(), U256::from(2) * num::SCALE);
    assert!(t.store.price_history(OTHER_VAULT).is_empty());
    assert_eq!(t.store.vault(OTHER_VAULT).unwrap().latest(), None);
}

/// Tests that a missing block timestamp skips the whole sweep tick.
#[tokio::test]
async fn test_sweep_tick_skipped_on_missing_timestamp() {
    let mut t = TestIndexer::new(vec![FACTORY], 100);
    t.chain.set_state(VAULT, 1, U256::from(1), U256::from(1));

    t.indexer
        .apply_block(&events::block(50, 500, vec![events::vault_created(FACTORY, USER, VAULT)]))
        .await
        .unwrap();
    let outcome = t.indexer.apply_block(&events::block(100, 1_000, vec![])).await.unwrap();

    assert!(outcome.sweep().is_none());
    assert_eq!(t.store.num_price_points(), 0);
}

/// Tests that replayed creation does not duplicate registry entries.
#[tokio::test]
async fn test_replayed_creation_registers_once() {
    let mut t = TestIndexer::new(vec![FACTORY], 0);

    let outcome = t
        .indexer
        .apply_block(&events::block(10, 100, vec![
            events::vault_created(FACTORY, USER, VAULT),
            events::vault_created(FACTORY, USER, VAULT),
        ]))
        .await
        .unwrap();

    assert_eq!(outcome.events().len(), 2);
    assert!(outcome.events().iter().all(|e| e.event().watch.len() == 1));
    assert_eq!(t.store.registry(FACTORY).unwrap().count(), 1);
    assert_eq!(t.store.vaults().len(), 1);
}
