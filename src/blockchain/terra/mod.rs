//! Terra (Cosmos SDK) chain support.

pub mod client;
pub mod fees;
pub mod lcd;
pub mod parser;
pub mod tx_builder;

pub use client::{ClientParams, TerraClient, DEFAULT_TX_LIMIT};
pub use fees::{get_estimated_fee, EstimateFeeParams};
