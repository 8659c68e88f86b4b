use alloy::{eips::BlockId, providers::Provider, rpc::types::Filter};
use colored::Colorize;
use vault_indexer::{error::IndexerError, stream, types::ChainEvent};

pub(crate) async fn render<P: Provider + Clone>(
    provider: P,
    block_number: u64,
) -> anyhow::Result<()> {
    provider
        .get_block(BlockId::number(block_number))
        .await
        .map_err(IndexerError::from)?
        .ok_or(IndexerError::MissingBlock(block_number))?;

    let filter = Filter::new()
        .event_signature(ChainEvent::signatures())
        .from_block(block_number)
        .to_block(block_number);
    let logs = provider.get_logs(&filter).await.map_err(IndexerError::from)?;

    let events = stream::decode_logs(&logs);

    println!("\n{}\n", format!("**** Block #{}", block_number).bold().purple());

    let mut prev_tx = None;
    for event in events {
        if prev_tx.is_none_or(|tx| tx < event.tx_index()) {
            println!(
                "\n{}\n",
                format!("**** Tx #{} ({})", event.tx_index(), event.tx_hash()).bright_blue()
            );
        }
        prev_tx = Some(event.tx_index());

        match event.event() {
            ChainEvent::Factory(factory_event) => println!(
                "{}",
                format!("  {}: {} {:?}", event.log_index(), event.address(), factory_event).cyan()
            ),
            ChainEvent::Vault(vault_event) => println!(
                "{}",
                format!("   ↳ {}: {} {:?}", event.log_index(), event.address(), vault_event)
                    .bright_cyan()
            ),
        }
    }

    println!();

    Ok(())
}
