use alloy::primitives::Address;
use clap::{Parser, Subcommand};

pub(crate) const DEFAULT_RPC_PROVIDER: &str = "http://localhost:8545";

#[derive(Parser, Debug)]
#[command(name = "vault-indexer", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// RPC endpoint to connect to
    #[arg(
        long,
        global = true,
        env = "VAULT_INDEXER_RPC",
        default_value_t = DEFAULT_RPC_PROVIDER.to_string()
    )]
    pub rpc: String,

    /// RPC throttling (req/sec) [default: none]
    #[arg(long, global = true, env = "VAULT_INDEXER_RPC_THROTTLE")]
    pub rpc_throttle: Option<u32>,

    /// Log filter directives, used when `RUST_LOG` is not set
    #[arg(long, global = true, env = "VAULT_INDEXER_LOG", default_value = "info")]
    pub log_filter: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index vault share prices and positions, starting from a particular
    /// block, then print the final state
    Index {
        /// Vault factory smart contract address to track (repeatable)
        #[arg(
            long = "factory",
            env = "VAULT_INDEXER_FACTORIES",
            value_delimiter = ',',
            required = true
        )]
        factories: Vec<Address>,

        /// Block number to start indexing from [default: latest block]
        #[arg(long)]
        from_block: Option<u64>,

        /// Number of blocks between periodic sweeps of all vaults (0 = no
        /// sweeps)
        #[arg(
            long,
            env = "VAULT_INDEXER_SWEEP_INTERVAL",
            default_value_t = vault_indexer::DEFAULT_SWEEP_INTERVAL_BLOCKS
        )]
        sweep_interval: u64,

        /// Number of blocks to index [default: unlimited, until terminated by
        /// (Ctrl+C)]
        #[arg(long)]
        num_blocks: Option<u64>,
    },
    /// Read share price of a vault at a particular block height
    Price {
        /// Vault smart contract address
        #[arg(long)]
        vault: Address,

        /// Block number to read at [default: latest block]
        #[arg(long)]
        block: Option<u64>,
    },
    /// Show factory and vault events emitted in a particular block
    Block {
        /// Block number
        #[arg(long)]
        block: u64,
    },
}
