//! Fee estimation: simulate a send, then price the adjusted gas.

use cosmrs::crypto::PublicKey;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use crate::blockchain::terra::lcd::LcdClient;
use crate::blockchain::terra::tx_builder::{build_send_body, coin, simulation_bytes};
use crate::core::amount::BaseAmount;
use crate::core::asset::{denom_for_asset, Asset, TERRA_DECIMAL};
use crate::core::config::NetworkConfig;
use crate::core::domain::{EstimatedFee, FeeParams, FeeType, Fees};
use crate::core::errors::{ClientError, Result};
use crate::crypto::derivation::parse_address;

/// Gas price multiplier of the `fast` tier.
pub const FAST_MULTIPLIER: Decimal = Decimal::from_parts(125, 0, 0, false, 2);
/// Gas price multiplier of the `fastest` tier.
pub const FASTEST_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Inputs of a standalone fee estimate.
#[derive(Debug, Clone)]
pub struct EstimateFeeParams {
    pub chain_id: String,
    pub cosmos_api_url: String,
    pub sender: String,
    pub recipient: String,
    pub amount: BaseAmount,
    pub asset: Asset,
    pub fee_asset: Asset,
    pub memo: Option<String>,
    /// Gas prices and adjustment; endpoint fields are taken from above.
    pub network: NetworkConfig,
    /// Sender public key, when known. Simulation works without it.
    pub public_key: Option<PublicKey>,
    pub timeout: Duration,
}

impl EstimateFeeParams {
    pub fn new(network: &NetworkConfig, fee: FeeParams) -> Self {
        Self {
            chain_id: network.chain_id.clone(),
            cosmos_api_url: network.cosmos_api_url.clone(),
            sender: fee.sender,
            recipient: fee.recipient,
            amount: fee.amount,
            asset: fee.asset,
            fee_asset: fee.fee_asset,
            memo: fee.memo,
            network: network.clone(),
            public_key: None,
            timeout: Duration::from_secs(30),
        }
    }

    fn fee_params(&self) -> FeeParams {
        FeeParams {
            sender: self.sender.clone(),
            recipient: self.recipient.clone(),
            amount: self.amount,
            asset: self.asset.clone(),
            fee_asset: self.fee_asset.clone(),
            memo: self.memo.clone(),
        }
    }
}

/// Estimates the fee of a transfer without a client instance.
pub async fn get_estimated_fee(params: EstimateFeeParams) -> Result<EstimatedFee> {
    let lcd = LcdClient::new(&params.cosmos_api_url, params.timeout)?;
    let mut network = params.network.clone();
    network.chain_id = params.chain_id.clone();
    network.cosmos_api_url = lcd.base_url().to_string();
    estimate_fee(&lcd, &network, params.public_key, &params.fee_params()).await
}

/// Gas limit and gas price backing a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasQuote {
    pub gas_limit: u64,
    pub gas_price: Decimal,
}

impl GasQuote {
    /// `ceil(gas_limit * gas_price * multiplier)` in base units.
    pub fn fee(&self, multiplier: Decimal) -> Result<BaseAmount> {
        let out_of_range = || {
            ClientError::InvalidAmount(format!(
                "fee of {} gas at {} x {} out of range",
                self.gas_limit, self.gas_price, multiplier
            ))
        };
        let fee = Decimal::from(self.gas_limit)
            .checked_mul(self.gas_price)
            .and_then(|f| f.checked_mul(multiplier))
            .ok_or_else(out_of_range)?
            .ceil();
        let amount = fee.to_u128().ok_or_else(out_of_range)?;
        Ok(BaseAmount::new(amount, TERRA_DECIMAL))
    }
}

/// `ceil(gas_used * adjustment)`.
pub fn adjusted_gas_limit(gas_used: u64, adjustment: Decimal) -> Result<u64> {
    let out_of_range =
        || ClientError::InvalidAmount(format!("gas limit {} x {} out of range", gas_used, adjustment));
    Decimal::from(gas_used)
        .checked_mul(adjustment)
        .ok_or_else(out_of_range)?
        .ceil()
        .to_u64()
        .ok_or_else(out_of_range)
}

/// Looks up the gas price of `denom`, preferring the live FCD table.
pub async fn gas_price_for(lcd: &LcdClient, network: &NetworkConfig, denom: &str) -> Result<Decimal> {
    let live = match &network.gas_prices_url {
        Some(url) => match lcd.get_gas_prices(url).await {
            Ok(prices) => prices.get(denom).cloned(),
            Err(e) => {
                warn!(url = %url, error = %e, "Gas price endpoint failed, using static table");
                None
            }
        },
        None => None,
    };
    let price = live
        .or_else(|| network.gas_prices.get(denom).cloned())
        .ok_or_else(|| ClientError::UnsupportedFeeAsset(denom.to_string()))?;
    Decimal::from_str(price.trim())
        .map_err(|e| ClientError::Decode(format!("gas price '{}' for {}: {}", price, denom, e)))
}

/// Simulates the transfer described by `params` and prices its gas.
pub async fn quote_gas(
    lcd: &LcdClient,
    network: &NetworkConfig,
    public_key: Option<PublicKey>,
    params: &FeeParams,
) -> Result<GasQuote> {
    let from = parse_address(&params.sender)?;
    let to = parse_address(&params.recipient)?;
    let denom = denom_for_asset(&params.asset)
        .ok_or_else(|| ClientError::UnknownAsset(params.asset.to_string()))?;
    let fee_denom = denom_for_asset(&params.fee_asset)
        .ok_or_else(|| ClientError::UnsupportedFeeAsset(params.fee_asset.to_string()))?;

    let account = lcd.get_account(&params.sender).await?.unwrap_or_default();
    let body = build_send_body(
        &from,
        &to,
        vec![coin(&denom, params.amount.amount)?],
        params.memo.as_deref().unwrap_or_default(),
    )?;
    let tx_bytes = simulation_bytes(body, public_key, account.sequence, coin(&fee_denom, 0)?)?;
    let gas_used = lcd.simulate(&tx_bytes).await?;
    let gas_limit = adjusted_gas_limit(gas_used, network.gas_adjustment)?;
    let gas_price = gas_price_for(lcd, network, &fee_denom).await?;

    debug!(
        chain_id = %network.chain_id,
        gas_used,
        gas_limit,
        gas_price = %gas_price,
        fee_denom = %fee_denom,
        "Simulated transfer"
    );
    Ok(GasQuote { gas_limit, gas_price })
}

pub async fn estimate_fee(
    lcd: &LcdClient,
    network: &NetworkConfig,
    public_key: Option<PublicKey>,
    params: &FeeParams,
) -> Result<EstimatedFee> {
    let quote = quote_gas(lcd, network, public_key, params).await?;
    Ok(EstimatedFee {
        amount: quote.fee(Decimal::ONE)?,
        gas_limit: quote.gas_limit,
        asset: params.fee_asset.clone(),
    })
}

/// Average, fast and fastest fees for one simulated gas limit.
pub fn tiered_fees(quote: GasQuote, fee_asset: Asset) -> Result<Fees> {
    Ok(Fees {
        fee_type: FeeType::Base,
        average: quote.fee(Decimal::ONE)?,
        fast: quote.fee(FAST_MULTIPLIER)?,
        fastest: quote.fee(FASTEST_MULTIPLIER)?,
        gas_limit: quote.gas_limit,
        asset: fee_asset,
    })
}
