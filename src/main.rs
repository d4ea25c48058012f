//! Faucet Sweeper - provision testnet wallets, drip the faucet, sweep balances
//!
//! # WARNING
//! - Transfers are final. Double-check the destination address.
//! - A failed run is not resumable: wallets funded but not yet swept keep
//!   their balances until swept by hand.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

// Use the library crate
use faucet_sweeper::cli::commands;
use faucet_sweeper::config::{Config, ConfigOverrides};

/// Faucet Sweeper - bulk wallet provisioning and balance sweeping
#[derive(Parser)]
#[command(name = "sweeper")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "sweeper.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

/// Run parameters shared by `run` and `plan`
#[derive(clap::Args)]
struct RunArgs {
    /// Destination address where to send crypto
    #[arg(long = "dest")]
    destination: Option<String>,

    /// Blockchain. Examples: MATIC-AMOY, ETH-SEPOLIA
    #[arg(long)]
    blockchain: Option<String>,

    /// Percent of the native balance kept in each wallet for fees
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    fee_reserve: Option<u8>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create wallets, fund them from the faucet and sweep to the destination
    Run {
        #[command(flatten)]
        args: RunArgs,

        /// Number of intermediate wallets to create
        #[arg(short = 'n')]
        wallets: Option<u32>,

        /// Seconds between balance checks
        #[arg(long)]
        poll_interval: Option<u64>,

        /// Give up after this many balance checks per wallet (0 = never)
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Provision and fund, but only log the transfers
        #[arg(long)]
        dry_run: bool,

        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Show the sweep an existing wallet would get
    Plan {
        /// Wallet id
        wallet_id: String,

        #[command(flatten)]
        args: RunArgs,
    },

    /// Fetch and print the platform's entity public key
    PublicKey,

    /// Show current configuration (secrets masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing (LOG_FORMAT=json for machine-readable output)
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("faucet_sweeper=info".parse()?);
    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    // Parse CLI arguments
    let cli = Cli::parse();

    let overrides = match &cli.command {
        Commands::Run {
            args,
            wallets,
            poll_interval,
            max_attempts,
            ..
        } => ConfigOverrides {
            destination_address: args.destination.clone(),
            wallet_count: *wallets,
            blockchain: args.blockchain.clone(),
            native_fee_reserve_percent: args.fee_reserve,
            balance_poll_interval_secs: *poll_interval,
            balance_max_attempts: *max_attempts,
        },
        Commands::Plan { args, .. } => ConfigOverrides {
            destination_address: args.destination.clone(),
            blockchain: args.blockchain.clone(),
            native_fee_reserve_percent: args.fee_reserve,
            ..Default::default()
        },
        _ => ConfigOverrides::default(),
    };

    // Load configuration
    let config = match Config::load(&cli.config, &overrides) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Run { dry_run, yes, .. } => commands::run(&config, dry_run, yes).await,
        Commands::Plan { wallet_id, .. } => commands::plan(&config, &wallet_id).await,
        Commands::PublicKey => commands::public_key(&config).await,
        Commands::Config => commands::show_config(&config),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
