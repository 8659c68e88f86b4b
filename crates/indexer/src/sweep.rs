//! Periodic re-snapshot of all known vaults.

use alloy::primitives::Address;
use futures::future;

use crate::{
    reader::ChainReader,
    registry,
    snapshot::SnapshotWriter,
    state::SharePricePoint,
    store::Store,
    types::{self, SnapshotSource},
};

/// Result of a completed sweep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepOutcome {
    pub instant: types::StateInstant,
    /// Number of vaults a snapshot was attempted for.
    pub num_vaults: usize,
    /// Successful snapshots, reads of the remaining vaults failed.
    pub points: Vec<SharePricePoint>,
}

impl SweepOutcome {
    pub fn num_skipped(&self) -> usize { self.num_vaults - self.points.len() }
}

/// Re-snapshots every vault registered under any of the tracked factories
/// each `interval_blocks` blocks, bounding the gap between consecutive points
/// of a vault's series.
#[derive(Clone, Debug)]
pub struct PeriodicSweeper<R, S> {
    factories: Vec<Address>,
    interval_blocks: u64,
    snapshots: SnapshotWriter<R, S>,
}

impl<R: ChainReader, S: Store> PeriodicSweeper<R, S> {
    pub fn new(
        factories: Vec<Address>,
        interval_blocks: u64,
        snapshots: SnapshotWriter<R, S>,
    ) -> Self {
        Self { factories, interval_blocks, snapshots }
    }

    /// Indicates the block is a sweep cadence boundary.
    pub fn is_due(&self, block_number: u64) -> bool {
        self.interval_blocks > 0 && block_number % self.interval_blocks == 0
    }

    /// Block tick handler, sweeps on cadence boundaries.
    pub async fn on_block(&self, block_number: u64) -> Option<SweepOutcome> {
        if !self.is_due(block_number) {
            return None;
        }
        self.sweep(block_number).await
    }

    /// Snapshots all registered vaults at the block concurrently.
    ///
    /// Returns `None` if the block timestamp can not be resolved, in which case
    /// the whole sweep is skipped until the next cadence boundary. Individual
    /// failed reads are skipped without affecting the others.
    pub async fn sweep(&self, block_number: u64) -> Option<SweepOutcome> {
        let timestamp = match self.snapshots.reader().block_timestamp(block_number).await {
            Ok(timestamp) => timestamp,
            Err(err) => {
                tracing::warn!(
                    block = block_number,
                    %err,
                    "block timestamp lookup failed, sweep skipped"
                );
                return None;
            },
        };
        let instant = types::StateInstant::new(block_number, timestamp);

        let vaults = registry::all_vaults(self.snapshots.store().as_ref(), &self.factories);
        if vaults.is_empty() {
            tracing::debug!(block = block_number, "no vaults registered, nothing to sweep");
            return Some(SweepOutcome { instant, num_vaults: 0, points: Vec::new() });
        }

        let points: Vec<_> = future::join_all(
            vaults
                .iter()
                .map(|vault| self.snapshots.snapshot(*vault, instant, SnapshotSource::Periodic)),
        )
        .await
        .into_iter()
        .flatten()
        .collect();

        let outcome = SweepOutcome { instant, num_vaults: vaults.len(), points };
        tracing::info!(
            block = block_number,
            vaults = outcome.num_vaults,
            skipped = outcome.num_skipped(),
            "periodic sweep completed"
        );
        Some(outcome)
    }
}

#[cfg(all(test, feature = "testing"))]
mod tests {
    use std::sync::Arc;

    use alloy::primitives::U256;

    use super::*;
    use crate::{num, store::MemoryStore, testing::MockChain};

    const F1: Address = Address::new([0xf1; 20]);
    const F2: Address = Address::new([0xf2; 20]);

    fn setup(
        interval: u64,
    ) -> (Arc<MockChain>, Arc<MemoryStore>, PeriodicSweeper<MockChain, MemoryStore>) {
        let chain = Arc::new(MockChain::new());
        let store = Arc::new(MemoryStore::new());
        let sweeper = PeriodicSweeper::new(
            vec![F1, F2],
            interval,
            SnapshotWriter::new(chain.clone(), store.clone()),
        );
        (chain, store, sweeper)
    }

    #[tokio::test]
    async fn test_sweep_cadence() {
        let (chain, _, sweeper) = setup(100);
        chain.set_timestamp(200, 2000).set_timestamp(250, 2500);

        assert!(sweeper.is_due(0));
        assert!(sweeper.is_due(200));
        assert!(!sweeper.is_due(250));
        assert!(sweeper.on_block(250).await.is_none());
        assert!(sweeper.on_block(200).await.is_some());
    }

    #[tokio::test]
    async fn test_zero_interval_disables_sweeps() {
        let (chain, _, sweeper) = setup(0);
        chain.set_timestamp(100, 1000);
        assert!(!sweeper.is_due(100));
        assert!(sweeper.on_block(100).await.is_none());
    }

    #[tokio::test]
    async fn test_sweep_isolates_failed_reads() {
        let (chain, store, sweeper) = setup(100);
        let (ok, reverting) = (Address::repeat_byte(1), Address::repeat_byte(2));
        store.register_vault(F1, ok);
        store.register_vault(F2, reverting);
        chain
            .set_state(ok, 1, U256::from(3000), U256::from(2000))
            .revert_from(reverting, 1)
            .set_timestamp(300, 3000);

        let outcome = sweeper.on_block(300).await.unwrap();

        assert_eq!(outcome.num_vaults, 2);
        assert_eq!(outcome.num_skipped(), 1);
        assert_eq!(outcome.points.len(), 1);
        let point = outcome.points[0];
        assert_eq!(point.vault(), ok);
        assert_eq!(point.source(), SnapshotSource::Periodic);
        assert_eq!(point.instant(), types::StateInstant::new(300, 3000));
        assert_eq!(point.price(), U256::from(15) * num::SCALE / U256::from(10));
        assert_eq!(store.price_history(ok), vec![point]);
        assert!(store.price_history(reverting).is_empty());
    }

    #[tokio::test]
    async fn test_sweep_skipped_without_timestamp() {
        let (chain, store, sweeper) = setup(100);
        let vault = Address::repeat_byte(1);
        store.register_vault(F1, vault);
        chain.set_state(vault, 1, U256::from(1), U256::from(1));

        assert!(sweeper.on_block(400).await.is_none());
        assert_eq!(chain.num_reads(), 0);
        assert_eq!(store.num_price_points(), 0);
    }

    #[tokio::test]
    async fn test_sweep_without_vaults_is_noop() {
        let (chain, store, sweeper) = setup(100);
        chain.set_timestamp(500, 5000);

        let outcome = sweeper.on_block(500).await.unwrap();
        assert_eq!(outcome.num_vaults, 0);
        assert!(outcome.points.is_empty());
        assert_eq!(chain.num_reads(), 0);
        assert_eq!(store.num_price_points(), 0);
    }
}
