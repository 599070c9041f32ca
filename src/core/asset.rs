//! Multi-chain asset model and Terra denomination mapping.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::errors::ClientError;

/// Number of decimals of every Terra native denomination (`u` = micro).
pub const TERRA_DECIMAL: u8 = 6;

/// Chains known to the asset model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    #[serde(rename = "TERRA")]
    Terra,
}

impl Chain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Terra => "TERRA",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TERRA" => Ok(Chain::Terra),
            other => Err(ClientError::UnknownAsset(format!("unknown chain '{}'", other))),
        }
    }
}

/// An asset as seen by the multi-chain model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub chain: Chain,
    pub symbol: String,
    pub ticker: String,
    pub synth: bool,
}

impl Asset {
    pub fn new(chain: Chain, symbol: &str) -> Self {
        Self { chain, symbol: symbol.to_string(), ticker: symbol.to_string(), synth: false }
    }

    /// Placeholder asset for transactions that may carry several denominations.
    pub fn empty(chain: Chain) -> Self {
        Self { chain, symbol: String::new(), ticker: String::new(), synth: false }
    }

    pub fn luna() -> Self {
        Self::new(Chain::Terra, "LUNA")
    }

    pub fn ust() -> Self {
        Self::new(Chain::Terra, "UST")
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.synth { '/' } else { '.' };
        write!(f, "{}{}{}", self.chain, sep, self.symbol)
    }
}

impl FromStr for Asset {
    type Err = ClientError;

    /// Parses `TERRA.LUNA` (native) or `TERRA/LUNA` (synth).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chain, symbol, synth) = if let Some((c, sym)) = s.split_once('.') {
            (c, sym, false)
        } else if let Some((c, sym)) = s.split_once('/') {
            (c, sym, true)
        } else {
            return Err(ClientError::UnknownAsset(format!("malformed asset '{}'", s)));
        };
        if symbol.is_empty() {
            return Err(ClientError::UnknownAsset(format!("missing symbol in '{}'", s)));
        }
        let symbol = symbol.to_ascii_uppercase();
        // Ticker drops any contract suffix, e.g. `ETH-0x...`.
        let ticker = symbol.split('-').next().unwrap_or(&symbol).to_string();
        Ok(Self { chain: chain.parse()?, symbol, ticker, synth })
    }
}

/// Known native denominations and their display symbols.
const DENOMS: &[(&str, &str)] = &[
    ("uluna", "LUNA"),
    ("uusd", "UST"),
    ("ukrw", "KRW"),
    ("ueur", "EUT"),
    ("usdr", "SDT"),
    ("umnt", "MNT"),
    ("ujpy", "JPT"),
    ("ugbp", "GBT"),
    ("ucny", "CNT"),
    ("ucad", "CAT"),
    ("uchf", "CHT"),
    ("uaud", "AUT"),
    ("usgd", "SGT"),
    ("uthb", "THT"),
    ("usek", "SET"),
    ("unok", "NOT"),
    ("udkk", "DKT"),
    ("uinr", "INT"),
    ("uhkd", "HKT"),
];

/// Symbols accepted in addition to the table above.
const SYMBOL_ALIASES: &[(&str, &str)] = &[("KRT", "ukrw")];

/// Maps a Terra asset to its native denomination.
pub fn denom_for_asset(asset: &Asset) -> Option<String> {
    if asset.chain != Chain::Terra || asset.synth || asset.symbol.is_empty() {
        return None;
    }
    let symbol = asset.symbol.to_ascii_uppercase();
    if let Some((denom, _)) = DENOMS.iter().find(|(_, s)| *s == symbol) {
        return Some(denom.to_string());
    }
    if let Some((_, denom)) = SYMBOL_ALIASES.iter().find(|(s, _)| *s == symbol) {
        return Some(denom.to_string());
    }
    if symbol.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(format!("u{}", symbol.to_ascii_lowercase()));
    }
    None
}

/// Maps a native denomination back to an asset. IBC and contract denoms yield `None`.
pub fn asset_for_denom(denom: &str) -> Option<Asset> {
    if let Some((_, symbol)) = DENOMS.iter().find(|(d, _)| *d == denom) {
        return Some(Asset::new(Chain::Terra, symbol));
    }
    let rest = denom.strip_prefix('u')?;
    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_lowercase()) {
        return None;
    }
    Some(Asset::new(Chain::Terra, &rest.to_ascii_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_display_and_parse() {
        assert_eq!(Asset::luna().to_string(), "TERRA.LUNA");
        let parsed: Asset = "terra.ust".parse().unwrap();
        assert_eq!(parsed, Asset::ust());

        let synth: Asset = "TERRA/LUNA".parse().unwrap();
        assert!(synth.synth);
        assert_eq!(synth.to_string(), "TERRA/LUNA");
    }

    #[test]
    fn test_asset_parse_errors() {
        assert!("LUNA".parse::<Asset>().is_err());
        assert!("TERRA.".parse::<Asset>().is_err());
        assert!("BNB.BNB".parse::<Asset>().is_err());
    }

    #[test]
    fn test_denom_mapping() {
        assert_eq!(denom_for_asset(&Asset::luna()).as_deref(), Some("uluna"));
        assert_eq!(denom_for_asset(&Asset::ust()).as_deref(), Some("uusd"));
        assert_eq!(denom_for_asset(&Asset::new(Chain::Terra, "EUT")).as_deref(), Some("ueur"));
        assert_eq!(denom_for_asset(&Asset::new(Chain::Terra, "KRT")).as_deref(), Some("ukrw"));
        assert_eq!(denom_for_asset(&Asset::new(Chain::Terra, "KRW")).as_deref(), Some("ukrw"));
        assert_eq!(denom_for_asset(&Asset::empty(Chain::Terra)), None);
    }

    #[test]
    fn test_synth_has_no_denom() {
        let mut synth = Asset::luna();
        synth.synth = true;
        assert_eq!(denom_for_asset(&synth), None);
    }

    #[test]
    fn test_asset_for_denom() {
        assert_eq!(asset_for_denom("uluna").unwrap().symbol, "LUNA");
        assert_eq!(asset_for_denom("ukrw").unwrap().ticker, "KRW");
        assert_eq!(asset_for_denom("uusd").unwrap().symbol, "UST");
        assert_eq!(asset_for_denom("uxyz").unwrap().symbol, "XYZ");
        assert!(asset_for_denom("ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2").is_none());
        assert!(asset_for_denom("u").is_none());
    }
}
