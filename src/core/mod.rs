pub mod amount;
pub mod asset;
pub mod config;
pub mod domain;
pub mod errors;

pub use errors::{ClientError, Result};
