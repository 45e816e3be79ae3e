//! Typed errors surfaced by a tick or a trade attempt

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// A provider record could not be coerced into typed values
    #[error("malformed order: {0}")]
    MalformedOrder(String),

    #[error("pricing error: {0}")]
    Pricing(String),

    /// Node/network failure (reserves, gas, nonce, submission)
    #[error("chain error: {0:#}")]
    Chain(#[from] anyhow::Error),

    #[error("no confirmation for {tx_hash} within {timeout:?}")]
    ConfirmationTimeout { tx_hash: String, timeout: Duration },

    #[error("settlement {tx_hash} reverted in block {block:?}")]
    Reverted { tx_hash: String, block: Option<u64> },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
