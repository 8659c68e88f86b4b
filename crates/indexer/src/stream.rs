use std::time::Duration;

use alloy::{
    eips::BlockId,
    providers::Provider,
    rpc::types::{Filter, Log},
};
use futures::{Stream, stream};

use crate::{
    error::IndexerError,
    types::{self, ChainEvent},
};

pub type RawEvent = types::EventContext<ChainEvent>;
pub type RawBlockEvents = types::BlockEvents<RawEvent>;

/// Returns stream of factory and vault events, batched per block, starting
/// from the specified block.
///
/// Every block is yielded, including blocks without events, so the stream
/// doubles as the block tick source of the periodic sweep.
///
/// Logs are selected by event signature only, since vault addresses are not
/// known in advance. Filtering by emitter is left to [`crate::Indexer`], which
/// knows which factories are tracked and which vaults were registered so far.
///
/// Polls logs via the given [`Provider`] to produce strictly continuous
/// event sequence, with [`Provider`]-configured interval.
///
/// It is recommended to setup provider with
/// [`alloy::transports::layers::FallbackLayer`]
/// and/or [`alloy::transports::layers::RetryBackoffLayer`].
pub fn raw<P, S, SFut>(
    provider: P,
    from: types::StateInstant,
    sleep: S,
) -> impl Stream<Item = Result<RawBlockEvents, IndexerError>>
where
    P: Provider,
    S: Fn(Duration) -> SFut + Copy,
    SFut: Future<Output = ()>,
{
    stream::unfold((provider, from.block_number()), move |(provider, mut block_num)| async move {
        let filter = Filter::new()
            .event_signature(ChainEvent::signatures())
            .from_block(block_num)
            .to_block(block_num);
        loop {
            // Anvil node, and maybe some RPC providers, produce empty response instead of
            // error in case the block in the filter does not exist yet,
            // so checking the block presence explicitly
            let result = futures::try_join!(
                provider.get_block(BlockId::number(block_num)).into_future(),
                provider.get_logs(&filter)
            )
            .map_err(IndexerError::from)
            .and_then(|(block, logs)| {
                let block_header = block.ok_or(IndexerError::MissingBlock(block_num))?.header;
                Ok(RawBlockEvents::new(
                    types::StateInstant::new(block_num, block_header.timestamp),
                    decode_logs(&logs),
                ))
            });
            if result.is_ok() {
                block_num += 1;
                return Some((result, (provider, block_num)));
            }
            if result.as_ref().is_err_and(IndexerError::is_block_pending) {
                sleep(provider.client().poll_interval()).await;
                continue;
            }
            return Some((result, (provider, block_num)));
        }
    })
}

/// Decodes logs of the consumed events, preserving their order.
///
/// Logs matching a consumed event signature but not its layout are skipped.
pub fn decode_logs(logs: &[Log]) -> Vec<RawEvent> {
    let mut events = Vec::with_capacity(logs.len());
    for log in logs {
        match ChainEvent::decode(&log.inner) {
            Ok(event) => events.push(RawEvent::new(
                log.address(),
                log.transaction_hash.unwrap_or_default(),
                log.transaction_index.unwrap_or_default(),
                log.log_index.unwrap_or_default(),
                event,
            )),
            Err(err) => {
                // Same signature emitted by an unrelated contract
                tracing::debug!(
                    block = ?log.block_number,
                    address = %log.address(),
                    %err,
                    "skipping undecodable log"
                );
            },
        }
    }
    events
}
