//! Turns LCD transactions into the from/to ledger model.
//!
//! Bank messages are flattened in message order: every coin of a `MsgSend`
//! yields one debit and one credit, `MsgMultiSend` inputs become debits and
//! outputs credits, each in the order the chain reports them. Non-bank
//! messages contribute nothing.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::blockchain::terra::lcd::{GetTxResponse, LcdCoin};
use crate::core::amount::BaseAmount;
use crate::core::asset::{asset_for_denom, Asset, Chain, TERRA_DECIMAL};
use crate::core::domain::{Tx, TxFrom, TxTo, TxType};
use crate::core::errors::{ClientError, Result};

pub const MSG_SEND: &str = "/cosmos.bank.v1beta1.MsgSend";
pub const MSG_MULTI_SEND: &str = "/cosmos.bank.v1beta1.MsgMultiSend";

#[derive(Debug, Deserialize)]
struct MultiSendLeg {
    address: String,
    #[serde(default)]
    coins: Vec<LcdCoin>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "@type")]
enum BankMsg {
    #[serde(rename = "/cosmos.bank.v1beta1.MsgSend")]
    Send {
        from_address: String,
        to_address: String,
        #[serde(default)]
        amount: Vec<LcdCoin>,
    },
    #[serde(rename = "/cosmos.bank.v1beta1.MsgMultiSend")]
    MultiSend {
        #[serde(default)]
        inputs: Vec<MultiSendLeg>,
        #[serde(default)]
        outputs: Vec<MultiSendLeg>,
    },
}

fn parse_bank_msg(msg: &Value) -> Result<Option<BankMsg>> {
    let type_url = msg.get("@type").and_then(Value::as_str).unwrap_or_default();
    if type_url != MSG_SEND && type_url != MSG_MULTI_SEND {
        debug!(type_url, "Skipping non-bank message");
        return Ok(None);
    }
    serde_json::from_value(msg.clone())
        .map(Some)
        .map_err(|e| ClientError::Decode(format!("{}: {}", type_url, e)))
}

fn coin_amount(coin: &LcdCoin) -> Result<(BaseAmount, Option<Asset>)> {
    let amount: u128 = coin
        .amount
        .parse()
        .map_err(|_| ClientError::Decode(format!("coin amount '{}'", coin.amount)))?;
    Ok((BaseAmount::new(amount, TERRA_DECIMAL), asset_for_denom(&coin.denom)))
}

fn parse_timestamp(ts: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| ClientError::Decode(format!("timestamp '{}': {}", ts, e)))
}

/// Converts one LCD transaction into a [`Tx`].
pub fn parse_tx(resp: &GetTxResponse) -> Result<Tx> {
    let mut from = Vec::new();
    let mut to = Vec::new();
    let mut bank_msgs = 0usize;

    for msg in &resp.tx.body.messages {
        let Some(bank) = parse_bank_msg(msg)? else {
            continue;
        };
        bank_msgs += 1;
        match bank {
            BankMsg::Send { from_address, to_address, amount: coins } => {
                for coin in &coins {
                    let (amount, asset) = coin_amount(coin)?;
                    from.push(TxFrom { from: from_address.clone(), amount, asset: asset.clone() });
                    to.push(TxTo { to: to_address.clone(), amount, asset });
                }
            }
            BankMsg::MultiSend { inputs, outputs } => {
                for input in &inputs {
                    for coin in &input.coins {
                        let (amount, asset) = coin_amount(coin)?;
                        from.push(TxFrom { from: input.address.clone(), amount, asset });
                    }
                }
                for output in &outputs {
                    for coin in &output.coins {
                        let (amount, asset) = coin_amount(coin)?;
                        to.push(TxTo { to: output.address.clone(), amount, asset });
                    }
                }
            }
        }
    }

    let tx_type = if bank_msgs > 0 { TxType::Transfer } else { TxType::Unknown };
    Ok(Tx {
        asset: Asset::empty(Chain::Terra),
        from,
        to,
        date: parse_timestamp(&resp.tx_response.timestamp)?,
        tx_type,
        hash: resp.tx_response.txhash.clone(),
    })
}
