//! Account & Bot Configuration
//!
//! Loaded once at startup from a single static file (JSON, or TOML when the
//! path ends in `.toml`) and never mutated afterwards.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::arbitrage::engine::{IneligibleOrderPolicy, MonitorConfig};
use crate::arbitrage::pricing::GasDenomination;
use crate::error::ConfigError;

/// Mainnet token and contract addresses
pub mod mainnet {
    pub const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
    pub const DAI: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";
    pub const UNISWAP_V2_FACTORY: &str = "0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f";
    pub const ZERO_X_ORDERBOOK_URL: &str = "https://api.0x.org/sra/v4";
}

/// Top-level config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Network gateway
    #[serde(rename = "INFURA")]
    pub node: NodeConfig,

    /// Signing wallet
    #[serde(rename = "WALLET")]
    pub wallet: WalletConfig,

    /// Bot tunables (all optional except the contract address)
    #[serde(rename = "BOT", default)]
    pub bot: BotConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(rename = "WSS_ENDPOINT")]
    pub endpoint: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    #[serde(rename = "PRIVATE_KEY")]
    pub private_key: String,
    #[serde(rename = "PUBLIC_ADDRESS")]
    pub public_address: String,
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConfig")
            .field("private_key", &"<redacted>")
            .field("public_address", &self.public_address)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct BotConfig {
    /// Deployed settlement contract
    pub contract_address: String,
    pub chain_id: u64,
    /// Tick cadence
    #[serde(rename = "INTERVAL_MS", with = "duration_serde")]
    pub interval: Duration,
    /// Upper bound on the receipt wait
    #[serde(rename = "CONFIRMATION_TIMEOUT_MS", with = "duration_serde")]
    pub confirmation_timeout: Duration,
    #[serde(rename = "HTTP_TIMEOUT_MS", with = "duration_serde")]
    pub http_timeout: Duration,
    pub orderbook_url: String,
    pub orderbook_page_size: u32,
    pub api_key: Option<String>,
    /// Token the taker pays (order-book base token)
    pub base_token: String,
    /// Token the maker pays (order-book quote token)
    pub quote_token: String,
    pub token_decimals: u32,
    pub pair_factory: String,
    pub ineligible_orders: IneligibleOrderPolicy,
    pub gas_denomination: GasDenomination,
    /// Evaluate and price gas but never submit
    pub dry_run: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            contract_address: String::new(),
            chain_id: 1,
            interval: Duration::from_secs(5),
            confirmation_timeout: Duration::from_secs(120),
            http_timeout: Duration::from_secs(10),
            orderbook_url: mainnet::ZERO_X_ORDERBOOK_URL.into(),
            orderbook_page_size: 1000,
            api_key: None,
            base_token: mainnet::DAI.into(),
            quote_token: mainnet::WETH.into(),
            token_decimals: 18,
            pair_factory: mainnet::UNISWAP_V2_FACTORY.into(),
            ineligible_orders: IneligibleOrderPolicy::default(),
            gas_denomination: GasDenomination::default(),
            dry_run: false,
        }
    }
}

/// Parsed contract and token addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddresses {
    pub bot: Address,
    pub pair_factory: Address,
    pub base_token: Address,
    pub quote_token: Address,
    pub wallet: Address,
}

impl AccountConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&raw)?,
            _ => Self::from_json_str(&raw)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("WSS_ENDPOINT is empty".into()));
        }
        if self.wallet.private_key.trim().is_empty() {
            return Err(ConfigError::Invalid("PRIVATE_KEY is empty".into()));
        }
        if self.bot.contract_address.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "BOT.CONTRACT_ADDRESS is not configured".into(),
            ));
        }
        if self.bot.interval.is_zero() {
            return Err(ConfigError::Invalid("BOT.INTERVAL_MS must be > 0".into()));
        }
        if self.bot.confirmation_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "BOT.CONFIRMATION_TIMEOUT_MS must be > 0".into(),
            ));
        }
        self.addresses()?;
        Ok(())
    }

    pub fn addresses(&self) -> Result<ContractAddresses, ConfigError> {
        Ok(ContractAddresses {
            bot: parse_address("BOT.CONTRACT_ADDRESS", &self.bot.contract_address)?,
            pair_factory: parse_address("BOT.PAIR_FACTORY", &self.bot.pair_factory)?,
            base_token: parse_address("BOT.BASE_TOKEN", &self.bot.base_token)?,
            quote_token: parse_address("BOT.QUOTE_TOKEN", &self.bot.quote_token)?,
            wallet: parse_address("WALLET.PUBLIC_ADDRESS", &self.wallet.public_address)?,
        })
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            token_decimals: self.bot.token_decimals,
            ineligible_orders: self.bot.ineligible_orders,
            gas_denomination: self.bot.gas_denomination,
            confirmation_timeout: self.bot.confirmation_timeout,
            dry_run: self.bot.dry_run,
        }
    }
}

fn parse_address(field: &str, raw: &str) -> Result<Address, ConfigError> {
    Address::from_str(raw.trim())
        .map_err(|e| ConfigError::Invalid(format!("{} is not an address ({}): {}", field, raw, e)))
}

// Serde helper for Duration (using milliseconds for simplicity)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BOT_ADDRESS: &str = "0x1111111111111111111111111111111111111111";

    fn json_config(bot: &str) -> String {
        format!(
            r#"{{
                "INFURA": {{ "WSS_ENDPOINT": "wss://mainnet.infura.io/ws/v3/key" }},
                "WALLET": {{
                    "PRIVATE_KEY": "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
                    "PUBLIC_ADDRESS": "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23"
                }}{}
            }}"#,
            bot
        )
    }

    #[test]
    fn test_defaults_fill_bot_section() {
        let raw = json_config(&format!(r#", "BOT": {{ "CONTRACT_ADDRESS": "{}" }}"#, BOT_ADDRESS));
        let config = AccountConfig::from_json_str(&raw).expect("parse");
        config.validate().expect("valid");

        assert_eq!(config.bot.interval, Duration::from_secs(5));
        assert_eq!(config.bot.confirmation_timeout, Duration::from_secs(120));
        assert_eq!(config.bot.chain_id, 1);
        assert_eq!(config.bot.ineligible_orders, IneligibleOrderPolicy::StopBatch);
        assert_eq!(config.bot.gas_denomination, GasDenomination::Raw);

        let addresses = config.addresses().expect("addresses");
        assert_eq!(addresses.quote_token, Address::from_str(mainnet::WETH).unwrap());
    }

    #[test]
    fn test_missing_bot_contract_is_rejected() {
        let config = AccountConfig::from_json_str(&json_config("")).expect("parse");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_overrides_and_enums() {
        let raw = json_config(&format!(
            r#", "BOT": {{
                "CONTRACT_ADDRESS": "{}",
                "INTERVAL_MS": 10000,
                "INELIGIBLE_ORDERS": "skip",
                "GAS_DENOMINATION": "quote_units",
                "DRY_RUN": true
            }}"#,
            BOT_ADDRESS
        ));
        let config = AccountConfig::from_json_str(&raw).expect("parse");
        let monitor = config.monitor_config();

        assert_eq!(config.bot.interval, Duration::from_secs(10));
        assert_eq!(monitor.ineligible_orders, IneligibleOrderPolicy::Skip);
        assert_eq!(monitor.gas_denomination, GasDenomination::QuoteUnits);
        assert!(monitor.dry_run);
    }

    #[test]
    fn test_loads_toml_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("tempfile");
        write!(
            file,
            r#"
[INFURA]
WSS_ENDPOINT = "wss://node.example"

[WALLET]
PRIVATE_KEY = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318"
PUBLIC_ADDRESS = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23"

[BOT]
CONTRACT_ADDRESS = "{}"
CHAIN_ID = 5
"#,
            BOT_ADDRESS
        )
        .expect("write");

        let config = AccountConfig::load(file.path()).expect("load");
        assert_eq!(config.bot.chain_id, 5);
        assert_eq!(config.node.endpoint, "wss://node.example");
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let config = AccountConfig::from_json_str(&json_config("")).expect("parse");
        let rendered = format!("{:?}", config.wallet);
        assert!(!rendered.contains("4c0883a6"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_bad_address_is_rejected() {
        let raw = json_config(r#", "BOT": { "CONTRACT_ADDRESS": "0x1234" }"#);
        let config = AccountConfig::from_json_str(&raw).expect("parse");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bot_section_keys() {
        let value = serde_json::to_value(BotConfig::default()).expect("serialize");
        let keys: Vec<&str> = value
            .as_object()
            .expect("object")
            .keys()
            .map(|k| k.as_str())
            .collect();

        assert!(keys.contains(&"PAIR_FACTORY"));
        assert!(keys.contains(&"CONFIRMATION_TIMEOUT_MS"));
        assert!(!keys.contains(&"EXCHANGE_PROXY"));
    }
}
