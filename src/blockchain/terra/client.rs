//! Terra chain client
//!
//! Read operations go straight to the LCD of the selected network. Keys are
//! derived from the phrase on demand and dropped after each signature.

use async_trait::async_trait;
use cosmrs::crypto::PublicKey;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::blockchain::terra::fees::{self, GasQuote};
use crate::blockchain::terra::lcd::{LcdClient, SearchTxsResponse};
use crate::blockchain::terra::parser::parse_tx;
use crate::blockchain::terra::tx_builder::{build_send_body, coin, sign_tx, tx_hash};
use crate::blockchain::traits::ChainClient;
use crate::core::amount::BaseAmount;
use crate::core::asset::{asset_for_denom, denom_for_asset, Asset, TERRA_DECIMAL};
use crate::core::config::{ClientConfig, Network, NetworkConfig};
use crate::core::domain::{
    Balance, EstimatedFee, FeeParams, Fees, TransferParams, Tx, TxHistoryParams, TxPage,
};
use crate::core::errors::{ClientError, Result};
use crate::crypto::derivation::{self, TerraKey};

/// Page size used when the caller does not set one.
pub const DEFAULT_TX_LIMIT: u32 = 10;

/// Upper bound on search pages fetched per history call with an asset filter.
const MAX_SEARCH_PAGES: usize = 20;

/// Constructor arguments of [`TerraClient`].
#[derive(Default)]
pub struct ClientParams {
    pub phrase: Option<String>,
    /// Overrides `config.network` when set.
    pub network: Option<Network>,
    pub config: ClientConfig,
}

pub struct TerraClient {
    config: ClientConfig,
    network: Network,
    network_config: NetworkConfig,
    lcd: LcdClient,
    phrase: Option<SecretString>,
}

impl TerraClient {
    pub fn new(params: ClientParams) -> Result<Self> {
        let network = params.network.unwrap_or(params.config.network);
        let network_config = params.config.network_config(network);
        let lcd = LcdClient::new(&network_config.cosmos_api_url, params.config.timeout())?;
        let mut client = Self { config: params.config, network, network_config, lcd, phrase: None };
        if let Some(phrase) = params.phrase {
            client.set_phrase(&phrase, 0)?;
        }
        info!(
            network = %client.network,
            chain_id = %client.network_config.chain_id,
            lcd = %client.lcd.base_url(),
            "Terra client ready"
        );
        Ok(client)
    }

    pub fn set_network(&mut self, network: Network) -> Result<()> {
        let network_config = self.config.network_config(network);
        self.lcd = LcdClient::new(&network_config.cosmos_api_url, self.config.timeout())?;
        self.network = network;
        self.network_config = network_config;
        info!(network = %network, chain_id = %self.network_config.chain_id, "Switched network");
        Ok(())
    }

    pub fn get_network(&self) -> Network {
        self.network
    }

    pub fn get_config(&self) -> NetworkConfig {
        self.network_config.clone()
    }

    pub fn get_explorer_url(&self) -> String {
        self.network_config.explorer_url.clone()
    }

    pub fn get_explorer_address_url(&self, address: &str) -> String {
        format!("{}/address/{}", self.network_config.explorer_url, address)
    }

    pub fn get_explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.network_config.explorer_url, tx_hash)
    }

    /// Stores a new phrase and returns the address at `index`.
    pub fn set_phrase(&mut self, phrase: &str, index: u32) -> Result<String> {
        let address = TerraKey::from_phrase(phrase, index)?.address();
        self.phrase = Some(SecretString::new(phrase.trim().to_string()));
        Ok(address)
    }

    fn key(&self, index: u32) -> Result<TerraKey> {
        let phrase = self.phrase.as_ref().ok_or(ClientError::MissingPhrase)?;
        TerraKey::from_phrase(phrase.expose_secret(), index)
    }

    pub fn get_address(&self, index: u32) -> Result<String> {
        Ok(self.key(index)?.address())
    }

    pub fn validate_address(&self, address: &str) -> bool {
        derivation::validate_address(address)
    }

    pub async fn get_balance(&self, address: &str, assets: Option<&[Asset]>) -> Result<Vec<Balance>> {
        derivation::parse_address(address)?;
        let coins = self.lcd.get_balances(address).await?;
        let mut balances = Vec::with_capacity(coins.len());
        for c in coins {
            let Some(asset) = asset_for_denom(&c.denom) else {
                debug!(denom = %c.denom, "Skipping non-native balance");
                continue;
            };
            if let Some(wanted) = assets {
                if !wanted.contains(&asset) {
                    continue;
                }
            }
            let amount: u128 = c
                .amount
                .parse()
                .map_err(|_| ClientError::Decode(format!("balance amount '{}'", c.amount)))?;
            balances.push(Balance { asset, amount: BaseAmount::new(amount, TERRA_DECIMAL) });
        }
        Ok(balances)
    }

    /// Merges txs sent and received by `params.address`, newest first.
    ///
    /// Without an asset filter `total` counts matches reported by the LCD, each
    /// hash once. With a filter both searches are paged until the window is
    /// filled or they run dry, and `total` counts the matching txs collected.
    pub async fn get_transactions(&self, params: TxHistoryParams) -> Result<TxPage> {
        derivation::parse_address(&params.address)?;
        let offset = params.offset.unwrap_or(0);
        let limit = params.limit.unwrap_or(DEFAULT_TX_LIMIT);
        let window = offset.saturating_add(limit);
        let page_size = window.max(1);

        let events = [
            format!("message.sender='{}'", params.address),
            format!("transfer.recipient='{}'", params.address),
        ];
        let mut cursors = [0u32; 2];
        let mut exhausted = [false; 2];
        let mut reported = 0u64;
        let mut seen = HashSet::new();
        let mut duplicates = 0u64;
        let mut txs = Vec::new();

        for page in 0..MAX_SEARCH_PAGES {
            let (sent, received) = futures::try_join!(
                self.search_page(&events[0], cursors[0], page_size, exhausted[0]),
                self.search_page(&events[1], cursors[1], page_size, exhausted[1]),
            )?;
            for (i, resp) in [sent, received].into_iter().enumerate() {
                let Some(resp) = resp else { continue };
                let total = resp.total();
                if page == 0 {
                    reported = reported.saturating_add(total);
                }
                let pairs = resp.into_pairs();
                let fetched = u32::try_from(pairs.len()).unwrap_or(u32::MAX);
                cursors[i] = cursors[i].saturating_add(fetched);
                exhausted[i] = fetched < page_size || u64::from(cursors[i]) >= total;
                for resp in pairs {
                    if !seen.insert(resp.tx_response.txhash.clone()) {
                        duplicates += 1;
                        continue;
                    }
                    txs.push(parse_tx(&resp)?);
                }
            }

            let Some(asset) = &params.asset else { break };
            let matches = txs.iter().filter(|tx| tx.involves(asset)).count();
            if matches >= window as usize || exhausted.iter().all(|done| *done) {
                break;
            }
            if page + 1 == MAX_SEARCH_PAGES {
                warn!(address = %params.address, asset = %asset, matches, "History search stopped at page limit");
            }
        }
        debug!(address = %params.address, fetched = txs.len(), reported, duplicates, "Fetched transaction history");

        txs.sort_by(|a, b| b.date.cmp(&a.date));
        let total = match &params.asset {
            Some(asset) => {
                txs.retain(|tx| tx.involves(asset));
                txs.len() as u64
            }
            None => reported.saturating_sub(duplicates),
        };
        let txs = txs.into_iter().skip(offset as usize).take(limit as usize).collect();
        Ok(TxPage { total, txs })
    }

    async fn search_page(
        &self,
        event: &str,
        offset: u32,
        limit: u32,
        exhausted: bool,
    ) -> Result<Option<SearchTxsResponse>> {
        if exhausted {
            return Ok(None);
        }
        self.lcd.search_txs(event, offset, limit).await.map(Some)
    }

    pub async fn get_transaction_data(&self, tx_hash: &str) -> Result<Tx> {
        let resp = self.lcd.get_tx(tx_hash).await?;
        parse_tx(&resp)
    }

    /// Public key of `sender` when it is the wallet's first account.
    fn sender_public_key(&self, sender: &str) -> Option<PublicKey> {
        self.key(0).ok().filter(|k| k.address() == sender).map(|k| k.public_key())
    }

    pub async fn get_estimated_fee(&self, params: &FeeParams) -> Result<EstimatedFee> {
        let public_key = self.sender_public_key(&params.sender);
        fees::estimate_fee(&self.lcd, &self.network_config, public_key, params).await
    }

    pub async fn get_fees(&self, params: FeeParams) -> Result<Fees> {
        let public_key = self.sender_public_key(&params.sender);
        let quote = fees::quote_gas(&self.lcd, &self.network_config, public_key, &params).await?;
        fees::tiered_fees(quote, params.fee_asset)
    }

    pub async fn transfer(&self, params: TransferParams) -> Result<String> {
        let tx_bytes = self.sign_transfer(&params).await?;
        let local_hash = tx_hash(&tx_bytes);
        let hash = self.lcd.broadcast(&tx_bytes).await?;
        if hash != local_hash {
            warn!(node = %hash, local = %local_hash, "Node reported a different tx hash");
        }
        Ok(hash)
    }

    /// Resolves the fee, then returns the signed `TxRaw` bytes of a transfer
    /// without broadcasting it.
    ///
    /// The fee asset defaults to the transferred asset. A pinned gas limit
    /// without a fee amount is priced at the current gas price; no gas limit
    /// means the transfer is simulated first.
    pub async fn sign_transfer(&self, params: &TransferParams) -> Result<Vec<u8>> {
        let (sender, public_key) = {
            let key = self.key(params.wallet_index)?;
            (key.address(), key.public_key())
        };
        let recipient = derivation::parse_address(&params.recipient)?;
        let denom = denom_for_asset(&params.asset)
            .ok_or_else(|| ClientError::UnknownAsset(params.asset.to_string()))?;
        let fee_asset = params.fee_asset.clone().unwrap_or_else(|| params.asset.clone());
        let fee_denom = denom_for_asset(&fee_asset)
            .ok_or_else(|| ClientError::UnsupportedFeeAsset(fee_asset.to_string()))?;
        let memo = params.memo.clone().unwrap_or_default();

        let (gas_limit, fee) = match (params.gas_limit, params.fee_amount) {
            (Some(gas_limit), Some(fee)) => (gas_limit, fee),
            (Some(gas_limit), None) => {
                let gas_price = fees::gas_price_for(&self.lcd, &self.network_config, &fee_denom).await?;
                (gas_limit, GasQuote { gas_limit, gas_price }.fee(Decimal::ONE)?)
            }
            (None, fee) => {
                let fee_params = FeeParams {
                    sender: sender.clone(),
                    recipient: params.recipient.clone(),
                    amount: params.amount,
                    asset: params.asset.clone(),
                    fee_asset: fee_asset.clone(),
                    memo: params.memo.clone(),
                };
                let quote =
                    fees::quote_gas(&self.lcd, &self.network_config, Some(public_key), &fee_params).await?;
                let fee = match fee {
                    Some(fee) => fee,
                    None => quote.fee(Decimal::ONE)?,
                };
                (quote.gas_limit, fee)
            }
        };

        let account = self.lcd.get_account(&sender).await?.unwrap_or_default();
        // The signing key never lives across an await.
        let tx_bytes = {
            let key = self.key(params.wallet_index)?;
            let body = build_send_body(
                key.account_id(),
                &recipient,
                vec![coin(&denom, params.amount.amount)?],
                &memo,
            )?;
            sign_tx(
                &key,
                &body,
                coin(&fee_denom, fee.amount)?,
                gas_limit,
                account,
                &self.network_config.chain_id,
            )?
        };

        info!(
            from = %sender,
            to = %params.recipient,
            amount = %params.amount,
            denom = %denom,
            fee = %fee,
            fee_denom = %fee_denom,
            gas_limit,
            "Signed transfer"
        );
        Ok(tx_bytes)
    }

    /// Drops the phrase. The secret is zeroized on drop.
    pub fn purge_client(&mut self) {
        self.phrase = None;
        debug!("Client purged");
    }
}

#[async_trait]
impl ChainClient for TerraClient {
    fn set_network(&mut self, network: Network) -> Result<()> {
        TerraClient::set_network(self, network)
    }

    fn get_network(&self) -> Network {
        TerraClient::get_network(self)
    }

    fn get_config(&self) -> NetworkConfig {
        TerraClient::get_config(self)
    }

    fn get_explorer_url(&self) -> String {
        TerraClient::get_explorer_url(self)
    }

    fn get_explorer_address_url(&self, address: &str) -> String {
        TerraClient::get_explorer_address_url(self, address)
    }

    fn get_explorer_tx_url(&self, tx_hash: &str) -> String {
        TerraClient::get_explorer_tx_url(self, tx_hash)
    }

    fn get_address(&self, index: u32) -> Result<String> {
        TerraClient::get_address(self, index)
    }

    fn validate_address(&self, address: &str) -> bool {
        TerraClient::validate_address(self, address)
    }

    async fn get_balance(&self, address: &str, assets: Option<&[Asset]>) -> Result<Vec<Balance>> {
        TerraClient::get_balance(self, address, assets).await
    }

    async fn get_transactions(&self, params: TxHistoryParams) -> Result<TxPage> {
        TerraClient::get_transactions(self, params).await
    }

    async fn get_transaction_data(&self, tx_hash: &str) -> Result<Tx> {
        TerraClient::get_transaction_data(self, tx_hash).await
    }

    async fn get_fees(&self, params: FeeParams) -> Result<Fees> {
        TerraClient::get_fees(self, params).await
    }

    async fn transfer(&self, params: TransferParams) -> Result<String> {
        TerraClient::transfer(self, params).await
    }

    fn purge_client(&mut self) {
        TerraClient::purge_client(self)
    }
}
