pub mod args;
mod block;
mod index;
mod price;

use std::time::Duration;

use alloy::{
    providers::{Provider, ProviderBuilder},
    rpc::client::RpcClient,
    transports::layers::{RetryBackoffLayer, ThrottleLayer},
};
use anyhow::Context;
use args::{Cli, Commands};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use vault_indexer::Deployment;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    init_tracing(&cli.log_filter);

    let client = if let Some(throttle) = cli.rpc_throttle {
        RpcClient::builder()
            .layer(ThrottleLayer::new(throttle))
            .layer(RetryBackoffLayer::new(10, 100, 200))
            .connect(&cli.rpc)
            .await
            .context("connecting to RPC")?
    } else {
        RpcClient::builder()
            .layer(RetryBackoffLayer::new(10, 100, 200))
            .connect(&cli.rpc)
            .await
            .context("connecting to RPC")?
    };
    client.set_poll_interval(Duration::from_millis(100));
    let provider = ProviderBuilder::new().connect_client(client);

    let cancellation_signal = CancellationToken::new();
    let cancellation_token = cancellation_signal.child_token();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C signal handler");
        cancellation_signal.cancel();
    });

    match cli.command {
        Commands::Index { factories, from_block, sweep_interval, num_blocks } => {
            let from_block = match from_block {
                Some(block) => block,
                None => provider.get_block_number().await.context("fetching latest block")?,
            };
            let deployment = Deployment::custom(
                provider.get_chain_id().await.context("fetching chain ID")?,
                factories,
                from_block,
                sweep_interval,
            );
            index::render(provider, deployment, num_blocks, cancellation_token).await?
        },
        Commands::Price { vault, block } => price::render(provider, vault, block).await?,
        Commands::Block { block } => block::render(provider, block).await?,
    }

    Ok(())
}

fn init_tracing(log_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
