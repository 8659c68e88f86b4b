use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use alloy::primitives::{Address, U256};
use dashmap::DashMap;

use crate::{
    error::IndexerError,
    reader::{ChainReader, VaultReading},
};

/// Scripted [`ChainReader`].
///
/// Vault state is versioned by block: a state set from block N is observed at
/// N and every later block until the next change. Reads of a vault with no
/// state set revert, as do reads of unknown block timestamps.
#[derive(Debug, Default)]
pub struct MockChain {
    vaults: DashMap<Address, BTreeMap<u64, Option<VaultReading>>>,
    timestamps: DashMap<u64, u64>,
    num_reads: AtomicUsize,
}

impl MockChain {
    pub fn new() -> Self { Self::default() }

    /// Sets vault state observed from the block onwards.
    pub fn set_state(
        &self,
        vault: Address,
        from_block: u64,
        total_assets: U256,
        total_supply: U256,
    ) -> &Self {
        self.vaults
            .entry(vault)
            .or_default()
            .insert(from_block, Some(VaultReading { total_assets, total_supply }));
        self
    }

    /// Makes vault reads revert from the block onwards.
    pub fn revert_from(&self, vault: Address, from_block: u64) -> &Self {
        self.vaults.entry(vault).or_default().insert(from_block, None);
        self
    }

    pub fn set_timestamp(&self, block_number: u64, timestamp: u64) -> &Self {
        self.timestamps.insert(block_number, timestamp);
        self
    }

    /// Number of vault reads performed so far.
    pub fn num_reads(&self) -> usize { self.num_reads.load(Ordering::Relaxed) }

    fn state_at(&self, vault: Address, block_number: u64) -> Option<VaultReading> {
        let states = self.vaults.get(&vault)?;
        states.range(..=block_number).next_back().and_then(|(_, state)| *state)
    }
}

impl ChainReader for MockChain {
    async fn read_vault(
        &self,
        vault: Address,
        block_number: u64,
    ) -> Result<VaultReading, IndexerError> {
        self.num_reads.fetch_add(1, Ordering::Relaxed);
        self.state_at(vault, block_number)
            .ok_or(IndexerError::Reverted { vault, block: block_number })
    }

    async fn block_timestamp(&self, block_number: u64) -> Result<u64, IndexerError> {
        self.timestamps
            .get(&block_number)
            .map(|ts| *ts)
            .ok_or(IndexerError::MissingBlock(block_number))
    }
}
