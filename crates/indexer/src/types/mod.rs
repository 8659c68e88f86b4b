mod event;

use std::fmt::Display;

use alloy::{
    primitives::{Address, B256, Log},
    sol_types::{SolEvent, SolEventInterface},
};
use chrono::{DateTime, Utc};
pub use event::*;

use crate::abi::{
    IVault::{self, IVaultEvents},
    IVaultFactory::{self, IVaultFactoryEvents},
};

/// Instant in chain history the state/event is up to date with.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Eq, Ord, Hash, Default)]
pub struct StateInstant {
    block_number: u64,
    block_timestamp: u64,
}

impl StateInstant {
    pub fn new(block_number: u64, block_timestamp: u64) -> Self {
        Self { block_number, block_timestamp }
    }

    pub fn block_number(&self) -> u64 { self.block_number }

    pub fn block_timestamp(&self) -> u64 { self.block_timestamp }

    pub fn next(&self) -> Self {
        Self { block_number: self.block_number + 1, block_timestamp: self.block_timestamp }
    }
}

impl Display for StateInstant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match DateTime::<Utc>::from_timestamp(self.block_timestamp as i64, 0) {
            Some(ts) => write!(f, "#{} @ {}", self.block_number, ts.format("%Y-%m-%d %H:%M:%S")),
            None => write!(f, "#{}", self.block_number),
        }
    }
}

/// Trigger a share price snapshot was taken on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SnapshotSource {
    Deposit,
    Withdraw,
    /// `Rebalance` issued by the vault owner.
    OwnerRebalance,
    /// Permissionless `Rebalanced`.
    ExternalRebalance,
    Periodic,
}

impl SnapshotSource {
    /// Stable tag the source is stored under.
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotSource::Deposit => "deposit",
            SnapshotSource::Withdraw => "withdraw",
            SnapshotSource::OwnerRebalance => "rebalance",
            SnapshotSource::ExternalRebalance => "rebalanced",
            SnapshotSource::Periodic => "periodic",
        }
    }
}

impl Display for SnapshotSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event emitted either by a vault factory or by a vault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainEvent {
    Factory(IVaultFactoryEvents),
    Vault(IVaultEvents),
}

impl ChainEvent {
    /// Signatures of all the events the indexer consumes.
    pub fn signatures() -> Vec<B256> {
        vec![
            IVaultFactory::VaultCreated::SIGNATURE_HASH,
            IVault::Deposit::SIGNATURE_HASH,
            IVault::Withdraw::SIGNATURE_HASH,
            IVault::Rebalance::SIGNATURE_HASH,
            IVault::Rebalanced::SIGNATURE_HASH,
        ]
    }

    /// Decodes the log, if it matches any of the consumed events.
    ///
    /// Any contract may emit a log with the same signature, so the emitter
    /// is not checked here.
    pub fn decode(log: &Log) -> Result<Self, alloy::sol_types::Error> {
        match IVaultFactoryEvents::decode_log(log) {
            Ok(decoded) => Ok(ChainEvent::Factory(decoded.data)),
            Err(_) => IVaultEvents::decode_log(log).map(|decoded| ChainEvent::Vault(decoded.data)),
        }
    }
}

/// Contract address the event delivery runtime should start routing
/// events from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WatchTarget {
    pub factory: Address,
    pub vault: Address,
}
