//! Fixed-point amounts: integer base units and decimal asset units.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::errors::{ClientError, Result};

/// Integer amount in the smallest unit of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BaseAmount {
    pub amount: u128,
    pub decimal: u8,
}

impl BaseAmount {
    pub fn new(amount: u128, decimal: u8) -> Self {
        Self { amount, decimal }
    }

    /// Integer rendering without separators or exponent.
    pub fn to_fixed(&self) -> String {
        self.amount.to_string()
    }

    pub fn to_asset_amount(&self) -> Result<AssetAmount> {
        let amount = i128::try_from(self.amount)
            .ok()
            .and_then(|v| Decimal::try_from_i128_with_scale(v, self.decimal as u32).ok())
            .ok_or_else(|| {
                ClientError::InvalidAmount(format!("{} does not fit a decimal", self.amount))
            })?;
        Ok(AssetAmount { amount: amount.normalize(), decimal: self.decimal })
    }

    pub fn checked_add(&self, other: &BaseAmount) -> Result<BaseAmount> {
        if self.decimal != other.decimal {
            return Err(ClientError::InvalidAmount(format!(
                "decimal mismatch: {} vs {}",
                self.decimal, other.decimal
            )));
        }
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or_else(|| ClientError::InvalidAmount("amount overflow".to_string()))?;
        Ok(BaseAmount::new(amount, self.decimal))
    }
}

impl fmt::Display for BaseAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.amount)
    }
}

/// Decimal amount expressed in whole asset units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAmount {
    pub amount: Decimal,
    pub decimal: u8,
}

impl AssetAmount {
    pub fn new(amount: Decimal, decimal: u8) -> Self {
        Self { amount, decimal }
    }

    /// Scales by `10^decimal`, truncating toward zero.
    pub fn to_base(&self) -> Result<BaseAmount> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(ClientError::InvalidAmount(format!("negative amount {}", self.amount)));
        }
        let factor = 10u64
            .checked_pow(self.decimal as u32)
            .map(Decimal::from)
            .ok_or_else(|| ClientError::InvalidAmount(format!("decimal {} too large", self.decimal)))?;
        let scaled = self
            .amount
            .checked_mul(factor)
            .ok_or_else(|| ClientError::InvalidAmount(format!("{} overflows", self.amount)))?;
        let base = scaled
            .trunc()
            .to_u128()
            .ok_or_else(|| ClientError::InvalidAmount(format!("{} overflows", self.amount)))?;
        Ok(BaseAmount::new(base, self.decimal))
    }
}

impl fmt::Display for AssetAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.amount.normalize())
    }
}

pub fn base_amount(amount: u128, decimal: u8) -> BaseAmount {
    BaseAmount::new(amount, decimal)
}

/// Parses a decimal string such as `"0.01"` into an [`AssetAmount`].
pub fn asset_amount(value: &str, decimal: u8) -> Result<AssetAmount> {
    let amount = Decimal::from_str(value.trim())
        .map_err(|e| ClientError::InvalidAmount(format!("'{}': {}", value, e)))?;
    Ok(AssetAmount::new(amount, decimal))
}

/// Shorthand for `asset_amount(value, decimal)?.to_base()`.
pub fn asset_to_base(value: &str, decimal: u8) -> Result<BaseAmount> {
    asset_amount(value, decimal)?.to_base()
}
