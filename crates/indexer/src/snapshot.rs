//! Share price snapshots.

use std::sync::Arc;

use alloy::primitives::Address;

use crate::{
    reader::{ChainReader, VaultReading},
    state::SharePricePoint,
    store::Store,
    types,
};

/// Measures vault share price at a block and persists it as a
/// [`SharePricePoint`], updating the latest snapshot fields of the vault.
#[derive(Debug)]
pub struct SnapshotWriter<R, S> {
    reader: Arc<R>,
    store: Arc<S>,
}

impl<R, S> Clone for SnapshotWriter<R, S> {
    fn clone(&self) -> Self { Self { reader: self.reader.clone(), store: self.store.clone() } }
}

impl<R: ChainReader, S: Store> SnapshotWriter<R, S> {
    pub fn new(reader: Arc<R>, store: Arc<S>) -> Self { Self { reader, store } }

    pub fn reader(&self) -> &Arc<R> { &self.reader }

    pub fn store(&self) -> &Arc<S> { &self.store }

    /// Reads the vault state at the instant's block and records the snapshot.
    ///
    /// Returns `None` if the read failed, in which case nothing is written and
    /// the gap is left for a later trigger to cover.
    pub async fn snapshot(
        &self,
        vault: Address,
        instant: types::StateInstant,
        source: types::SnapshotSource,
    ) -> Option<SharePricePoint> {
        match self.reader.read_vault(vault, instant.block_number()).await {
            Ok(reading) => Some(self.record(vault, instant, source, reading)),
            Err(err) => {
                tracing::debug!(
                    %vault,
                    block = instant.block_number(),
                    %source,
                    %err,
                    "vault read failed, snapshot skipped"
                );
                None
            },
        }
    }

    /// Records the snapshot computed from an already performed read.
    ///
    /// The point is written first, so the vault's latest fields may lag behind
    /// the series but never run ahead of it.
    pub fn record(
        &self,
        vault: Address,
        instant: types::StateInstant,
        source: types::SnapshotSource,
        reading: VaultReading,
    ) -> SharePricePoint {
        let point = SharePricePoint::compute(
            vault,
            instant,
            source,
            reading.total_assets,
            reading.total_supply,
        );
        self.store.put_price_point(point);

        if let Some(mut record) = self.store.vault(vault)
            && record.update_latest(&point)
        {
            self.store.put_vault(record);
        }

        tracing::trace!(
            %vault,
            block = instant.block_number(),
            %source,
            price = %point.price(),
            "snapshot recorded"
        );
        point
    }
}
