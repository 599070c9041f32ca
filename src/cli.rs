use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::config::Network;

/// Terra wallet CLI (library-facing definitions)
#[derive(Debug, Parser)]
#[command(name = "terra_wallet", about = "Terra chain client", version)]
pub struct Cli {
    /// Network to use; defaults to the config file value
    #[arg(long, global = true)]
    pub network: Option<Network>,

    /// TOML config path; falls back to CONFIG_PATH
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the address derived from PHRASE
    Address {
        #[arg(long, default_value_t = 0)]
        index: u32,
    },
    Balance {
        #[arg(long)]
        address: String,
    },
    /// Show one transaction
    Tx {
        #[arg(long)]
        hash: String,
    },
    /// List transactions sent or received by an address
    Txs {
        #[arg(long)]
        address: String,
        #[arg(long)]
        offset: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    Fees {
        #[arg(long)]
        sender: String,
        #[arg(long)]
        recipient: String,
        /// Amount in whole units, e.g. 0.01
        #[arg(long)]
        amount: String,
        /// Asset such as TERRA.LUNA
        #[arg(long)]
        asset: String,
        #[arg(long)]
        fee_asset: Option<String>,
        #[arg(long)]
        memo: Option<String>,
    },
    /// Sign and broadcast a transfer from the PHRASE wallet
    Transfer {
        #[arg(long)]
        recipient: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        asset: String,
        #[arg(long)]
        fee_asset: Option<String>,
        #[arg(long)]
        memo: Option<String>,
        #[arg(long, default_value_t = 0)]
        index: u32,
    },
    /// Print explorer links
    Explorer {
        #[arg(long)]
        hash: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
}
