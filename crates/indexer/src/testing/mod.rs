//! Offline testing environment: scripted chain reader and event builders.

pub mod events;
mod mock_chain;

use std::sync::Arc;

use alloy::primitives::Address;
pub use mock_chain::MockChain;

use crate::{Deployment, Indexer, store::MemoryStore};

/// Indexer wired to a [`MockChain`] and a [`MemoryStore`].
pub struct TestIndexer {
    pub chain: Arc<MockChain>,
    pub store: Arc<MemoryStore>,
    pub indexer: Indexer<MockChain, MemoryStore>,
}

impl TestIndexer {
    pub fn new(factories: Vec<Address>, sweep_interval_blocks: u64) -> Self {
        let chain = Arc::new(MockChain::new());
        let store = Arc::new(MemoryStore::new());
        let deployment = Deployment::custom(31337, factories, 0, sweep_interval_blocks);
        let indexer = Indexer::new(deployment, chain.clone(), store.clone());
        Self { chain, store, indexer }
    }

    /// Indexer restarted over the same chain and store.
    pub fn restarted(self) -> Self {
        let deployment = self.indexer.deployment().clone();
        let indexer = Indexer::new(deployment, self.chain.clone(), self.store.clone());
        Self { indexer, ..self }
    }
}
