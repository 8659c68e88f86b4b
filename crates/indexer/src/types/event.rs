use alloy::primitives::{Address, TxHash};

use super::StateInstant;

/// Event with the context it was emitted in.
#[derive(Clone, Debug)]
pub struct EventContext<T> {
    address: Address,
    tx_hash: TxHash,
    tx_index: u64,
    log_index: u64,
    event: T,
}

impl<T> EventContext<T> {
    pub fn new(address: Address, tx_hash: TxHash, tx_index: u64, log_index: u64, event: T) -> Self {
        Self { address, tx_hash, tx_index, log_index, event }
    }

    /// Address of the contract that emitted the event.
    pub fn address(&self) -> Address { self.address }

    pub fn tx_hash(&self) -> TxHash { self.tx_hash }

    pub fn tx_index(&self) -> u64 { self.tx_index }

    pub fn log_index(&self) -> u64 { self.log_index }

    pub fn event(&self) -> &T { &self.event }

    /// Passes the context on to the event derived from this one.
    pub fn pass<U>(&self, event: U) -> EventContext<U> {
        EventContext {
            address: self.address,
            tx_hash: self.tx_hash,
            tx_index: self.tx_index,
            log_index: self.log_index,
            event,
        }
    }
}

/// Events of a single block, in the order of emission.
#[derive(Clone, Debug)]
pub struct BlockEvents<T> {
    instant: StateInstant,
    events: Vec<T>,
}

impl<T> BlockEvents<T> {
    pub fn new(instant: StateInstant, events: Vec<T>) -> Self { Self { instant, events } }

    pub fn instant(&self) -> StateInstant { self.instant }

    pub fn events(&self) -> &[T] { &self.events }
}
