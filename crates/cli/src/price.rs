use alloy::{primitives::Address, providers::Provider};
use colored::Colorize;
use vault_indexer::{
    num,
    reader::{ChainReader, RpcReader},
};

pub(crate) async fn render<P: Provider + Clone>(
    provider: P,
    vault: Address,
    block: Option<u64>,
) -> anyhow::Result<()> {
    let block_number = match block {
        Some(block) => block,
        None => provider.get_block_number().await?,
    };

    let reader = RpcReader::new(provider);
    let (reading, timestamp) = futures::try_join!(
        reader.read_vault(vault, block_number),
        reader.block_timestamp(block_number)
    )?;

    let price = num::share_price(reading.total_assets, reading.total_supply);

    println!(
        "\n{}\n",
        format!("**** Vault {} @ #{} ({})", vault, block_number, timestamp).bold().purple()
    );
    println!(
        "{}",
        format!("  share price:  {}", num::PRICE_CONVERTER.from_unsigned(price)).bright_green()
    );
    println!("{}", format!("  total assets: {}", reading.total_assets).cyan());
    println!("{}", format!("  total supply: {}", reading.total_supply).cyan());
    if reading.total_supply.is_zero() {
        println!("{}", "  no shares issued".yellow());
    }
    println!();

    Ok(())
}
