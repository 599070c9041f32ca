use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::core::errors::{ClientError, Result};

/// Networks a client can be pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Stagenet,
    Testnet,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Network::Mainnet => "mainnet",
            Network::Stagenet => "stagenet",
            Network::Testnet => "testnet",
        };
        f.write_str(s)
    }
}

impl FromStr for Network {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "stagenet" => Ok(Network::Stagenet),
            "testnet" => Ok(Network::Testnet),
            other => Err(ClientError::Config(format!("unknown network '{}'", other))),
        }
    }
}

/// Endpoint and fee settings of one network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub chain_id: String,
    pub cosmos_api_url: String,
    pub explorer_url: String,
    /// FCD gas price endpoint; `None` uses `gas_prices` only.
    pub gas_prices_url: Option<String>,
    /// Static gas prices per denom, used when the endpoint is absent or fails.
    pub gas_prices: BTreeMap<String, String>,
    pub gas_adjustment: Decimal,
}

impl NetworkConfig {
    pub fn default_for(network: Network) -> Self {
        let (chain_id, lcd, explorer, fcd) = match network {
            Network::Mainnet | Network::Stagenet => (
                "columbus-5",
                "https://lcd.terra.dev",
                "https://finder.terra.money/mainnet",
                "https://fcd.terra.dev",
            ),
            Network::Testnet => (
                "bombay-12",
                "https://bombay-lcd.terra.dev",
                "https://finder.terra.money/testnet",
                "https://bombay-fcd.terra.dev",
            ),
        };
        Self {
            chain_id: chain_id.to_string(),
            cosmos_api_url: lcd.to_string(),
            explorer_url: explorer.to_string(),
            gas_prices_url: Some(format!("{}/v1/txs/gas_prices", fcd)),
            gas_prices: default_gas_prices(),
            gas_adjustment: Decimal::new(15, 1),
        }
    }
}

fn default_gas_prices() -> BTreeMap<String, String> {
    [
        ("uluna", "0.01133"),
        ("uusd", "0.15"),
        ("ukrw", "169.77"),
        ("ueur", "0.125"),
        ("usdr", "0.104938"),
        ("umnt", "428.571"),
        ("ujpy", "16.37"),
        ("ugbp", "0.11"),
        ("ucny", "0.97"),
        ("ucad", "0.19"),
        ("uchf", "0.14"),
        ("uaud", "0.19"),
        ("usgd", "0.2"),
        ("uthb", "4.62"),
        ("usek", "1.25"),
        ("unok", "1.25"),
        ("udkk", "0.9"),
        ("uinr", "10.88"),
        ("uhkd", "1.17"),
    ]
    .into_iter()
    .map(|(d, p)| (d.to_string(), p.to_string()))
    .collect()
}

/// Partial network settings as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkOverrides {
    pub chain_id: Option<String>,
    pub cosmos_api_url: Option<String>,
    pub explorer_url: Option<String>,
    pub gas_prices_url: Option<String>,
    /// Disables the FCD lookup when true.
    #[serde(default)]
    pub static_gas_prices: bool,
    #[serde(default)]
    pub gas_prices: BTreeMap<String, String>,
    pub gas_adjustment: Option<Decimal>,
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "ClientConfig::default_network")]
    pub network: Network,
    /// HTTP timeout (seconds)
    #[serde(default = "ClientConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub networks: BTreeMap<Network, NetworkOverrides>,
}

impl ClientConfig {
    fn default_network() -> Network { Network::Testnet }
    fn default_timeout_secs() -> u64 { 30 }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Loads a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), network = %config.network, "Loaded client config");
        Ok(config)
    }

    /// Applies `TERRA_NETWORK`, `TERRA_LCD_URL`, `TERRA_CHAIN_ID` and `TERRA_TIMEOUT_SECS`.
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(network) = std::env::var("TERRA_NETWORK") {
            self.network = network.parse()?;
        }
        if let Ok(secs) = std::env::var("TERRA_TIMEOUT_SECS") {
            self.timeout_secs = secs
                .parse()
                .map_err(|_| ClientError::Config(format!("invalid TERRA_TIMEOUT_SECS '{}'", secs)))?;
        }
        let network = self.network;
        if let Ok(url) = std::env::var("TERRA_LCD_URL") {
            self.networks.entry(network).or_default().cosmos_api_url = Some(url);
        }
        if let Ok(chain_id) = std::env::var("TERRA_CHAIN_ID") {
            self.networks.entry(network).or_default().chain_id = Some(chain_id);
        }
        Ok(self)
    }

    /// Overrides merged onto the built-in defaults of `network`.
    pub fn network_config(&self, network: Network) -> NetworkConfig {
        let mut config = NetworkConfig::default_for(network);
        let Some(o) = self.networks.get(&network) else {
            return config;
        };
        if let Some(v) = &o.chain_id {
            config.chain_id = v.clone();
        }
        if let Some(v) = &o.cosmos_api_url {
            config.cosmos_api_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = &o.explorer_url {
            config.explorer_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = &o.gas_prices_url {
            config.gas_prices_url = Some(v.clone());
        }
        if o.static_gas_prices {
            config.gas_prices_url = None;
        }
        for (denom, price) in &o.gas_prices {
            config.gas_prices.insert(denom.clone(), price.clone());
        }
        if let Some(v) = o.gas_adjustment {
            config.gas_adjustment = v;
        }
        config
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    /// Points `network` at a single endpoint with static gas prices.
    pub fn with_endpoint(mut self, network: Network, cosmos_api_url: &str) -> Self {
        let o = self.networks.entry(network).or_default();
        o.cosmos_api_url = Some(cosmos_api_url.to_string());
        o.static_gas_prices = true;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            network: Self::default_network(),
            timeout_secs: Self::default_timeout_secs(),
            networks: BTreeMap::new(),
        }
    }
}
