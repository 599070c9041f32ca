pub mod terra;
pub mod traits;

pub use terra::{ClientParams, TerraClient};
pub use traits::ChainClient;
