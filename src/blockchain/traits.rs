use async_trait::async_trait;

use crate::core::asset::Asset;
use crate::core::config::{Network, NetworkConfig};
use crate::core::domain::{Balance, FeeParams, Fees, TransferParams, Tx, TxHistoryParams, TxPage};
use crate::core::errors::ClientError;

/// Defines the standard interface for interacting with a chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Switches endpoints and chain id to `network`.
    fn set_network(&mut self, network: Network) -> Result<(), ClientError>;

    fn get_network(&self) -> Network;

    /// Effective settings of the current network.
    fn get_config(&self) -> NetworkConfig;

    fn get_explorer_url(&self) -> String;

    fn get_explorer_address_url(&self, address: &str) -> String;

    fn get_explorer_tx_url(&self, tx_hash: &str) -> String;

    /// Address of the HD account at `index`.
    fn get_address(&self, index: u32) -> Result<String, ClientError>;

    fn validate_address(&self, address: &str) -> bool;

    /// Retrieves balances of `address`, optionally restricted to `assets`.
    async fn get_balance(
        &self,
        address: &str,
        assets: Option<&[Asset]>,
    ) -> Result<Vec<Balance>, ClientError>;

    /// Retrieves a page of transactions sent or received by an address.
    async fn get_transactions(&self, params: TxHistoryParams) -> Result<TxPage, ClientError>;

    async fn get_transaction_data(&self, tx_hash: &str) -> Result<Tx, ClientError>;

    /// Quotes average/fast/fastest fees for a transfer.
    async fn get_fees(&self, params: FeeParams) -> Result<Fees, ClientError>;

    /// Signs and broadcasts a transfer, returning its hash.
    async fn transfer(&self, params: TransferParams) -> Result<String, ClientError>;

    /// Forgets the phrase. Key operations fail afterwards.
    fn purge_client(&mut self);
}
