//! Vault share-price indexer.
//!
//! # Overview
//!
//! Derives a queryable time series of per-vault share price and TVL, plus
//! per-user position accounting, from vault factory and vault events and
//! historical `totalAssets()`/`totalSupply()` reads.
//!
//! Use [`stream::raw`] to receive factory/vault events batched per block,
//! then feed every batch, in chain order, into [`Indexer::apply_block`].
//! Indexed entities are persisted into a [`store::Store`].
//!
//! # Limitations/follow-ups
//!
//! * Chain reorganizations are not reconciled, the delivered block sequence is
//!   assumed to be final.
//!
//! * Failed historical reads are skipped, not retried in-process. Configure
//!   transport-level retries with
//!   [`alloy::transports::layers::RetryBackoffLayer`].
//!
//! # Features
//!
//! | Feature | Default | Description |
//! | --- | --- | --- |
//! | `display` | yes | Enables [`std::fmt::Display`] implementation for state types. |
//! | `testing` | yes | Enables [`testing`] module. |

pub mod abi;
pub mod error;
mod indexer;
pub mod num;
pub mod reader;
pub mod registry;
pub mod router;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod stream;
pub mod sweep;
#[cfg(feature = "testing")]
pub mod testing;
pub mod types;

use alloy::primitives::Address;
pub use indexer::{BlockOutcome, Indexer};

/// Default number of blocks between periodic sweeps.
pub const DEFAULT_SWEEP_INTERVAL_BLOCKS: u64 = 600;

#[derive(Clone, Debug)]
/// Deployment the indexer is tracking.
pub struct Deployment {
    chain_id: u64,
    factories: Vec<Address>,
    deployed_at_block: u64,
    sweep_interval_blocks: u64,
}

impl Deployment {
    pub fn custom(
        chain_id: u64,
        factories: Vec<Address>,
        deployed_at_block: u64,
        sweep_interval_blocks: u64,
    ) -> Self {
        Self { chain_id, factories, deployed_at_block, sweep_interval_blocks }
    }

    pub fn chain_id(&self) -> u64 { self.chain_id }

    /// Vault factories whose `VaultCreated` events are tracked.
    pub fn factories(&self) -> &[Address] { &self.factories }

    pub fn is_factory(&self, address: Address) -> bool { self.factories.contains(&address) }

    /// Block of the earliest factory deployment, a reasonable block to start
    /// indexing from.
    pub fn deployed_at_block(&self) -> u64 { self.deployed_at_block }

    /// Number of blocks between periodic sweeps, 0 disables sweeps.
    pub fn sweep_interval_blocks(&self) -> u64 { self.sweep_interval_blocks }
}
