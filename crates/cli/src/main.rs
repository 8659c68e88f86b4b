use clap::Parser;

#[tokio::main]
async fn main() {
    if let Err(err) = vault_indexer_cli::run(vault_indexer_cli::args::Cli::parse()).await {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
