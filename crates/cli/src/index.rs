use std::{pin::pin, sync::Arc};

use alloy::providers::Provider;
use colored::Colorize;
use futures::StreamExt;
use tabled::{Table, settings::Style};
use tokio_util::sync::CancellationToken;
use vault_indexer::{
    BlockOutcome, Deployment, Indexer, reader::RpcReader, store::MemoryStore, stream, types,
};

pub(crate) async fn render<P: Provider + Clone>(
    provider: P,
    deployment: Deployment,
    num_blocks: Option<u64>,
    cancellation_token: CancellationToken,
) -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let reader = Arc::new(RpcReader::new(provider.clone()));
    let from = types::StateInstant::new(deployment.deployed_at_block(), 0);

    println!(
        "{}\n",
        format!(
            "{:#^144}",
            format!(
                " Indexing {} factories on chain {} from #{} ",
                deployment.factories().len(),
                deployment.chain_id(),
                from.block_number()
            )
        )
        .bold()
        .purple()
    );

    let mut indexer = Indexer::new(deployment, reader, store.clone());
    let stream = stream::raw(provider, from, tokio::time::sleep);
    let mut stream = pin!(stream);

    let mut blocks_left = num_blocks;

    while let Some(res) = stream.next().await {
        if cancellation_token.is_cancelled() || blocks_left.is_some_and(|count| count == 0) {
            break;
        }

        let block_events = res?;
        let outcome = indexer.apply_block(&block_events).await?;
        render_outcome(&outcome);

        if let Some(ref mut count) = blocks_left {
            *count -= 1;
        }
    }

    println!("\n{}\n", format!("{:#^144}", " Final State ").bold().purple());
    render_state(&store);

    Ok(())
}

fn render_outcome(outcome: &BlockOutcome) {
    if outcome.events().is_empty() && outcome.sweep().is_none() {
        return;
    }

    println!("\n{}", format!("{}", outcome.instant()).bold().purple());

    for event in outcome.events() {
        let applied = event.event();
        println!(
            "{}",
            format!("  {}: {} ({})", event.log_index(), event.address(), event.tx_hash()).cyan()
        );
        for target in &applied.watch {
            println!("{}", format!("      ↳ watching vault {}", target.vault).bright_blue());
        }
        match &applied.snapshot {
            Some(point) => println!("{}", format!("      ↳ {}", point).bright_green()),
            None if applied.watch.is_empty() => {
                println!("{}", "      ↳ snapshot skipped".yellow())
            },
            None => (),
        }
        if let Some(position) = &applied.position {
            println!("{}", format!("      ↳ {}", position).bright_green());
        }
        if let Some(vault) = &applied.vault
            && !vault.is_active()
        {
            println!("{}", format!("      ↳ vault {} inactive", vault.address()).bright_red());
        }
    }

    if let Some(sweep) = outcome.sweep() {
        println!(
            "{}",
            format!(
                "  > periodic sweep: {} vaults, {} snapshots, {} skipped",
                sweep.num_vaults,
                sweep.points.len(),
                sweep.num_skipped()
            )
            .bright_cyan()
        );
    }
}

fn render_state(store: &MemoryStore) {
    let vaults = store.vaults();
    if vaults.is_empty() {
        println!("No vaults indexed");
        return;
    }

    let mut vaults_table = Table::new(&vaults);
    vaults_table.with(Style::sharp());
    println!("{}", vaults_table);

    let positions: Vec<_> = vaults.iter().flat_map(|v| store.positions(v.address())).collect();
    if !positions.is_empty() {
        let mut positions_table = Table::new(positions);
        positions_table.with(Style::sharp());
        println!("\n{}", positions_table);
    }

    for vault in &vaults {
        let history = store.price_history(vault.address());
        if history.is_empty() {
            continue;
        }
        println!("\n{}", format!("{}", vault).bold());
        let mut history_table = Table::new(history);
        history_table.with(Style::sharp());
        println!("{}", history_table);
    }
}
