use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::amount::BaseAmount;
use crate::core::asset::Asset;

/// Transaction types recognised by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Transfer,
    Unknown,
}

/// One debit leg of a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxFrom {
    pub from: String,
    pub amount: BaseAmount,
    pub asset: Option<Asset>,
}

/// One credit leg of a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxTo {
    pub to: String,
    pub amount: BaseAmount,
    pub asset: Option<Asset>,
}

/// Ledger view of a chain transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tx {
    pub asset: Asset,
    pub from: Vec<TxFrom>,
    pub to: Vec<TxTo>,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    pub hash: String,
}

impl Tx {
    /// Whether any leg moves `asset`.
    pub fn involves(&self, asset: &Asset) -> bool {
        self.from.iter().any(|f| f.asset.as_ref() == Some(asset))
            || self.to.iter().any(|t| t.asset.as_ref() == Some(asset))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxPage {
    pub total: u64,
    pub txs: Vec<Tx>,
}

/// Query parameters for transaction history.
#[derive(Debug, Clone, Default)]
pub struct TxHistoryParams {
    pub address: String,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub asset: Option<Asset>,
}

impl TxHistoryParams {
    pub fn new(address: &str) -> Self {
        Self { address: address.to_string(), ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub asset: Asset,
    pub amount: BaseAmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeOption {
    Average,
    Fast,
    Fastest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeType {
    Base,
}

/// Tiered fee quote. All tiers share the simulated gas limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fees {
    #[serde(rename = "type")]
    pub fee_type: FeeType,
    pub average: BaseAmount,
    pub fast: BaseAmount,
    pub fastest: BaseAmount,
    pub gas_limit: u64,
    pub asset: Asset,
}

impl Fees {
    pub fn get(&self, option: FeeOption) -> BaseAmount {
        match option {
            FeeOption::Average => self.average,
            FeeOption::Fast => self.fast,
            FeeOption::Fastest => self.fastest,
        }
    }
}

/// Fee amount plus the gas limit it was priced for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatedFee {
    pub amount: BaseAmount,
    pub gas_limit: u64,
    pub asset: Asset,
}

#[derive(Debug, Clone)]
pub struct FeeParams {
    pub sender: String,
    pub recipient: String,
    pub amount: BaseAmount,
    pub asset: Asset,
    pub fee_asset: Asset,
    pub memo: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TransferParams {
    pub wallet_index: u32,
    pub asset: Asset,
    pub amount: BaseAmount,
    pub recipient: String,
    pub memo: Option<String>,
    pub fee_asset: Option<Asset>,
    pub fee_amount: Option<BaseAmount>,
    pub gas_limit: Option<u64>,
}

impl TransferParams {
    pub fn new(wallet_index: u32, asset: Asset, amount: BaseAmount, recipient: &str) -> Self {
        Self {
            wallet_index,
            asset,
            amount,
            recipient: recipient.to_string(),
            memo: None,
            fee_asset: None,
            fee_amount: None,
            gas_limit: None,
        }
    }

    pub fn with_memo(mut self, memo: &str) -> Self {
        self.memo = Some(memo.to_string());
        self
    }

    pub fn with_fee_asset(mut self, fee_asset: Asset) -> Self {
        self.fee_asset = Some(fee_asset);
        self
    }

    /// Pins both the fee and the gas limit, skipping estimation.
    pub fn with_fee(mut self, fee_amount: BaseAmount, gas_limit: u64) -> Self {
        self.fee_amount = Some(fee_amount);
        self.gas_limit = Some(gas_limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::amount::base_amount;
    use crate::core::asset::{Chain, TERRA_DECIMAL};

    #[test]
    fn test_tx_serializes_type_field() {
        let tx = Tx {
            asset: Asset::empty(Chain::Terra),
            from: vec![],
            to: vec![],
            date: Utc::now(),
            tx_type: TxType::Transfer,
            hash: "ABC".to_string(),
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "transfer");
        assert_eq!(json["asset"]["chain"], "TERRA");
    }

    #[test]
    fn test_tx_involves() {
        let tx = Tx {
            asset: Asset::empty(Chain::Terra),
            from: vec![TxFrom {
                from: "a".into(),
                amount: base_amount(1, TERRA_DECIMAL),
                asset: Some(Asset::luna()),
            }],
            to: vec![],
            date: Utc::now(),
            tx_type: TxType::Transfer,
            hash: "H".into(),
        };
        assert!(tx.involves(&Asset::luna()));
        assert!(!tx.involves(&Asset::ust()));
    }

    #[test]
    fn test_fees_get() {
        let fees = Fees {
            fee_type: FeeType::Base,
            average: base_amount(1, 6),
            fast: base_amount(2, 6),
            fastest: base_amount(3, 6),
            gas_limit: 100,
            asset: Asset::luna(),
        };
        assert_eq!(fees.get(FeeOption::Fast).amount, 2);
        assert_eq!(fees.get(FeeOption::Fastest).amount, 3);
    }
}
