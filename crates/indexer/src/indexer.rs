use std::{collections::HashSet, sync::Arc};

use alloy::primitives::Address;

use crate::{
    Deployment,
    error::IndexerError,
    reader::ChainReader,
    registry,
    router::{EventOutcome, EventRouter},
    snapshot::SnapshotWriter,
    store::Store,
    stream::{RawBlockEvents, RawEvent},
    sweep::{PeriodicSweeper, SweepOutcome},
    types::{self, ChainEvent},
};

/// Result of applying a block.
#[derive(Clone, Debug)]
pub struct BlockOutcome {
    instant: types::StateInstant,
    events: Vec<types::EventContext<EventOutcome>>,
    sweep: Option<SweepOutcome>,
    num_ignored: usize,
}

impl BlockOutcome {
    pub fn instant(&self) -> types::StateInstant { self.instant }

    /// Outcomes of the applied events, in the order of emission.
    pub fn events(&self) -> &[types::EventContext<EventOutcome>] { &self.events }

    /// Periodic sweep performed at the block, if any.
    pub fn sweep(&self) -> Option<&SweepOutcome> { self.sweep.as_ref() }

    /// Number of events emitted by untracked contracts.
    pub fn num_ignored(&self) -> usize { self.num_ignored }
}

/// Sequential driver of the indexing.
///
/// Applies blocks strictly in chain order: events of the block first, in the
/// order of emission, then the block tick. Consumes dynamic registrations
/// produced by events, so events of a vault created earlier in the same block
/// are already routed.
pub struct Indexer<R, S> {
    deployment: Deployment,
    router: EventRouter<R, S>,
    sweeper: PeriodicSweeper<R, S>,
    watched: HashSet<Address>,
    last_block: Option<u64>,
}

impl<R: ChainReader, S: Store> Indexer<R, S> {
    /// Creates the indexer, resuming tracking of vaults already registered in
    /// the store.
    pub fn new(deployment: Deployment, reader: Arc<R>, store: Arc<S>) -> Self {
        let watched: HashSet<_> =
            registry::all_vaults(store.as_ref(), deployment.factories()).into_iter().collect();
        if !watched.is_empty() {
            tracing::info!(vaults = watched.len(), "resuming tracking of registered vaults");
        }

        let snapshots = SnapshotWriter::new(reader, store);
        Self {
            router: EventRouter::new(snapshots.clone()),
            sweeper: PeriodicSweeper::new(
                deployment.factories().to_vec(),
                deployment.sweep_interval_blocks(),
                snapshots,
            ),
            deployment,
            watched,
            last_block: None,
        }
    }

    pub fn deployment(&self) -> &Deployment { &self.deployment }

    /// Vaults events are currently routed from.
    pub fn watched(&self) -> &HashSet<Address> { &self.watched }

    /// Last applied block.
    pub fn last_block(&self) -> Option<u64> { self.last_block }

    /// Indicates events from the emitter are routed.
    pub fn is_tracked(&self, event: &RawEvent) -> bool {
        match event.event() {
            ChainEvent::Factory(_) => self.deployment.is_factory(event.address()),
            ChainEvent::Vault(_) => self.watched.contains(&event.address()),
        }
    }

    /// Applies events and the block tick of the next block.
    ///
    /// Fails only if the block does not follow the previously applied one,
    /// failed vault reads are skipped.
    pub async fn apply_block(
        &mut self,
        block: &RawBlockEvents,
    ) -> Result<BlockOutcome, IndexerError> {
        let instant = block.instant();
        if let Some(last) = self.last_block
            && instant.block_number() <= last
        {
            return Err(IndexerError::InvalidArgument(format!(
                "block #{} is not after already applied block #{}",
                instant.block_number(),
                last
            )));
        }

        let mut events = Vec::new();
        let mut num_ignored = 0;
        for event in block.events() {
            if !self.is_tracked(event) {
                num_ignored += 1;
                continue;
            }
            let outcome = self.router.route(instant, event).await;
            for target in &outcome.watch {
                self.watched.insert(target.vault);
            }
            events.push(event.pass(outcome));
        }

        let sweep = self.sweeper.on_block(instant.block_number()).await;
        self.last_block = Some(instant.block_number());

        if num_ignored > 0 {
            tracing::trace!(
                block = instant.block_number(),
                num_ignored,
                "ignored untracked events"
            );
        }
        Ok(BlockOutcome { instant, events, sweep, num_ignored })
    }
}
