//! Protobuf transaction assembly and SIGN_MODE_DIRECT signing.

use cosmrs::bank::MsgSend;
use cosmrs::crypto::PublicKey;
use cosmrs::proto::cosmos::tx::v1beta1::TxRaw;
use cosmrs::tendermint::chain::Id as ChainId;
use cosmrs::tx::{Body, Fee, Msg, Raw, SignDoc, SignerInfo};
use cosmrs::{AccountId, Coin, Denom};
use sha2::{Digest, Sha256};
use std::str::FromStr;

use crate::blockchain::terra::lcd::AccountInfo;
use crate::core::errors::{ClientError, Result};
use crate::crypto::derivation::TerraKey;

fn signing_err(context: &str) -> impl Fn(cosmrs::ErrorReport) -> ClientError + '_ {
    move |e| ClientError::Signing(format!("{}: {}", context, e))
}

/// Cosmos SDK denom rule: `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
pub fn is_valid_denom(denom: &str) -> bool {
    let mut chars = denom.chars();
    (3..=128).contains(&denom.len())
        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-'))
}

pub fn coin(denom: &str, amount: u128) -> Result<Coin> {
    if !is_valid_denom(denom) {
        return Err(ClientError::UnknownAsset(format!("invalid denom '{}'", denom)));
    }
    let denom = Denom::from_str(denom)
        .map_err(|e| ClientError::UnknownAsset(format!("denom '{}': {}", denom, e)))?;
    Ok(Coin { denom, amount })
}

/// Body with a single `MsgSend` and no timeout height.
pub fn build_send_body(from: &AccountId, to: &AccountId, coins: Vec<Coin>, memo: &str) -> Result<Body> {
    let msg = MsgSend { from_address: from.clone(), to_address: to.clone(), amount: coins };
    let any = msg.to_any().map_err(signing_err("MsgSend encoding"))?;
    Ok(Body::new(vec![any], memo, 0u32))
}

/// Signs `body` for one signer and returns the encoded `TxRaw`.
pub fn sign_tx(
    key: &TerraKey,
    body: &Body,
    fee: Coin,
    gas_limit: u64,
    account: AccountInfo,
    chain_id: &str,
) -> Result<Vec<u8>> {
    let chain_id = ChainId::from_str(chain_id)
        .map_err(|e| ClientError::Signing(format!("chain id '{}': {}", chain_id, e)))?;
    let auth_info = SignerInfo::single_direct(Some(key.public_key()), account.sequence)
        .auth_info(Fee::from_amount_and_gas(fee, gas_limit));
    let sign_doc = SignDoc::new(body, &auth_info, &chain_id, account.account_number)
        .map_err(signing_err("sign doc"))?;
    let raw = sign_doc.sign(key.signing_key()).map_err(signing_err("sign"))?;
    raw.to_bytes().map_err(signing_err("tx encoding"))
}

/// Unsigned tx for `/simulate`: zero fee and one empty signature.
pub fn simulation_bytes(body: Body, public_key: Option<PublicKey>, sequence: u64, fee: Coin) -> Result<Vec<u8>> {
    let auth_info = SignerInfo::single_direct(public_key, sequence).auth_info(Fee::from_amount_and_gas(fee, 0u64));
    let raw: Raw = TxRaw {
        body_bytes: body.into_bytes().map_err(signing_err("body encoding"))?,
        auth_info_bytes: auth_info.into_bytes().map_err(signing_err("auth info encoding"))?,
        signatures: vec![Vec::new()],
    }
    .into();
    raw.to_bytes().map_err(signing_err("tx encoding"))
}

/// Uppercase hex sha256 of the encoded tx, as used for tx hashes.
pub fn tx_hash(tx_bytes: &[u8]) -> String {
    hex::encode_upper(Sha256::digest(tx_bytes))
}
