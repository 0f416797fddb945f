//! Mintkit launcher
//!
//! Creates or reuses an SPL token mint, attaches metadata and runs the
//! configured supply operations against a Solana cluster.

use std::{path::PathBuf, str::FromStr, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use mintkit_sdk::{
    launch, BundlrUploader, FileIdentity, LaunchConfig, LaunchReport, RpcLedger,
};
use solana_sdk::pubkey::Pubkey;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "mintkit")]
#[command(about = "Launch an SPL token with metadata")]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RPC URL for the Solana cluster
    #[arg(short, long)]
    rpc_url: Option<String>,

    /// Keypair file path
    #[arg(short, long)]
    keypair: Option<String>,

    /// Existing mint to attach metadata to
    #[arg(short, long)]
    mint: Option<String>,

    /// Override log level
    #[arg(long)]
    log_level: Option<String>,

    /// Dry run mode (validate config and exit)
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match execute(cli).await {
        Ok(()) => println!("Finished successfully"),
        Err(e) => {
            println!("{:#}", e);
            std::process::exit(1);
        }
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    init_logging(&config.log_level);

    info!("RPC URL: {}", config.rpc_endpoint());
    info!("Keypair: {}", config.identity.keypair_path);

    if cli.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    let ledger = Arc::new(RpcLedger::new(
        &config.rpc_endpoint(),
        config.commitment_config()?,
    ));
    let uploader = Arc::new(BundlrUploader::new(&config.storage, ledger.clone())?);
    let mut identity_config = config.identity.clone();
    identity_config.airdrop &= config.cluster.supports_airdrop();
    let identity = FileIdentity::from_config(&identity_config)?;

    let report = launch::run(&config, ledger, uploader, &identity).await?;
    log_report(&report);

    Ok(())
}

fn load_config(cli: &Cli) -> Result<LaunchConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let path = path.to_string_lossy();
            LaunchConfig::load(&path)
                .with_context(|| format!("Failed to load configuration from {}", path))?
        }
        None => LaunchConfig::default(),
    };

    if let Some(rpc_url) = &cli.rpc_url {
        config.rpc_url = Some(rpc_url.clone());
    }
    if let Some(keypair) = &cli.keypair {
        config.identity.keypair_path = keypair.clone();
    }
    if let Some(mint) = &cli.mint {
        let mint = Pubkey::from_str(mint).with_context(|| format!("Invalid mint address: {}", mint))?;
        config.token.mint = Some(mint);
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn init_logging(log_level: &str) {
    let log_level = log_level.parse().unwrap_or(tracing::Level::INFO);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("mintkit={},mintkit_sdk={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn log_report(report: &LaunchReport) {
    info!("Mint: {}", report.mint);
    if let Some(signature) = report.metadata_signature {
        info!("Metadata signature: {}", signature);
    }
    if let Some(account) = report.token_account {
        info!("Token account: {}", account);
    }
    for (label, signature) in [
        ("Mint", report.mint_signature),
        ("Transfer", report.transfer_signature),
        ("Burn", report.burn_signature),
    ] {
        if let Some(signature) = signature {
            info!("{} signature: {}", label, signature);
        }
    }
}
