// src/lib.rs

pub mod blockchain;
pub mod cli;
pub mod core;
pub mod crypto;

pub use crate::blockchain::terra::{get_estimated_fee, ClientParams, EstimateFeeParams, TerraClient};
pub use crate::blockchain::ChainClient;
pub use crate::core::asset::{Asset, Chain};
pub use crate::core::config::{ClientConfig, Network, NetworkConfig};
pub use crate::core::errors::ClientError;
