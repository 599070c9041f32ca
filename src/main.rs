// src/main.rs
//! Terra wallet CLI entry point.
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use terra_client::cli::{Cli, Commands};
use terra_client::core::amount::asset_to_base;
use terra_client::core::asset::{Asset, TERRA_DECIMAL};
use terra_client::core::config::ClientConfig;
use terra_client::core::domain::{FeeParams, TransferParams, TxHistoryParams};
use terra_client::{ClientParams, TerraClient};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging()?;

    let config = load_config(cli.config.clone())?;
    let phrase = std::env::var("PHRASE").ok().filter(|p| !p.trim().is_empty());
    let mut client = TerraClient::new(ClientParams { phrase, network: cli.network, config })?;

    match cli.command {
        Commands::Address { index } => {
            print_json(&serde_json::json!({ "index": index, "address": client.get_address(index)? }))?;
        }
        Commands::Balance { address } => {
            print_json(&client.get_balance(&address, None).await?)?;
        }
        Commands::Tx { hash } => {
            print_json(&client.get_transaction_data(&hash).await?)?;
        }
        Commands::Txs { address, offset, limit } => {
            let params = TxHistoryParams { offset, limit, ..TxHistoryParams::new(&address) };
            print_json(&client.get_transactions(params).await?)?;
        }
        Commands::Fees { sender, recipient, amount, asset, fee_asset, memo } => {
            let asset: Asset = asset.parse()?;
            let fee_asset = match fee_asset {
                Some(a) => a.parse()?,
                None => asset.clone(),
            };
            let params = FeeParams {
                sender,
                recipient,
                amount: asset_to_base(&amount, TERRA_DECIMAL)?,
                asset,
                fee_asset,
                memo,
            };
            print_json(&client.get_fees(params).await?)?;
        }
        Commands::Transfer { recipient, amount, asset, fee_asset, memo, index } => {
            let asset: Asset = asset.parse()?;
            let mut params =
                TransferParams::new(index, asset, asset_to_base(&amount, TERRA_DECIMAL)?, &recipient);
            if let Some(memo) = memo {
                params = params.with_memo(&memo);
            }
            if let Some(fee_asset) = fee_asset {
                params = params.with_fee_asset(fee_asset.parse()?);
            }
            let hash = client.transfer(params).await?;
            info!("Transfer broadcast: {}", client.get_explorer_tx_url(&hash));
            print_json(&serde_json::json!({ "hash": hash, "url": client.get_explorer_tx_url(&hash) }))?;
        }
        Commands::Explorer { hash, address } => {
            print_json(&serde_json::json!({
                "explorer": client.get_explorer_url(),
                "tx": hash.map(|h| client.get_explorer_tx_url(&h)),
                "address": address.map(|a| client.get_explorer_address_url(&a)),
            }))?;
        }
    }

    client.purge_client();
    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=info,reqwest=info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Loads the TOML config from `--config`, else CONFIG_PATH, else defaults.
fn load_config(path: Option<PathBuf>) -> Result<ClientConfig> {
    let path = path.or_else(|| std::env::var("CONFIG_PATH").ok().map(PathBuf::from));
    let config = match path {
        Some(path) => ClientConfig::load(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => {
            info!("No config file given, using defaults");
            ClientConfig::default()
        }
    };
    Ok(config.apply_env()?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
