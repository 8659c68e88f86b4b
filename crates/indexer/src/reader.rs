//! Point-in-time reads of vault state.

use alloy::{
    eips::BlockId,
    primitives::{Address, U256},
    providers::Provider,
};

use crate::{abi::IVault, error::IndexerError};

/// Raw vault state at a particular block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VaultReading {
    pub total_assets: U256,
    pub total_supply: U256,
}

/// Historical chain state reader.
///
/// Reads are always performed at the exact requested block height and must
/// not be cached across heights.
///
/// Reads of freshly created vaults commonly revert, callers should treat any
/// error as a reason to skip the measurement, not to stop.
pub trait ChainReader: Send + Sync {
    /// Reads `totalAssets()` and `totalSupply()` of the vault at the block.
    fn read_vault(
        &self,
        vault: Address,
        block_number: u64,
    ) -> impl Future<Output = Result<VaultReading, IndexerError>> + Send;

    /// Timestamp of the block.
    fn block_timestamp(
        &self,
        block_number: u64,
    ) -> impl Future<Output = Result<u64, IndexerError>> + Send;
}

/// [`ChainReader`] backed by an RPC [`Provider`].
///
/// It is recommended to setup provider with
/// [`alloy::transports::layers::RetryBackoffLayer`], as failed reads are not
/// retried.
#[derive(Clone, Debug)]
pub struct RpcReader<P> {
    provider: P,
}

impl<P: Provider> RpcReader<P> {
    pub fn new(provider: P) -> Self { Self { provider } }
}

impl<P: Provider> ChainReader for RpcReader<P> {
    async fn read_vault(
        &self,
        vault: Address,
        block_number: u64,
    ) -> Result<VaultReading, IndexerError> {
        let instance = IVault::new(vault, &self.provider);
        let block = BlockId::number(block_number);
        let total_assets = instance.totalAssets().block(block);
        let total_supply = instance.totalSupply().block(block);
        let (total_assets, total_supply) = futures::try_join!(
            total_assets.call().into_future(),
            total_supply.call().into_future()
        )?;
        Ok(VaultReading { total_assets, total_supply })
    }

    async fn block_timestamp(&self, block_number: u64) -> Result<u64, IndexerError> {
        let block = self
            .provider
            .get_block(BlockId::number(block_number))
            .await?
            .ok_or(IndexerError::MissingBlock(block_number))?;
        Ok(block.header.timestamp)
    }
}
