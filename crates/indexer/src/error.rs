use alloy::primitives::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("contract call failed: {0}")]
    Contract(#[from] alloy::contract::Error),

    #[error("transport error: {0}")]
    Transport(#[from] alloy::transports::TransportError),

    #[error("failed to decode event: {0}")]
    Decode(#[from] alloy::sol_types::Error),

    #[error("block #{0} is not available")]
    MissingBlock(u64),

    #[error("read of vault {vault} reverted at block #{block}")]
    Reverted { vault: Address, block: u64 },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl IndexerError {
    /// Indicates the requested block does not exist yet, so the request is
    /// worth repeating later.
    pub fn is_block_pending(&self) -> bool { matches!(self, IndexerError::MissingBlock(_)) }
}
