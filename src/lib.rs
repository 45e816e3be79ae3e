//! Spreadbot Library
//!
//! Order-book versus pool arbitrage monitor. Exposes core modules for the
//! binary and the integration tests.

pub mod arbitrage;
pub mod chain;
pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod scrapers;

pub use arbitrage::{ArbitrageMonitor, MonitorConfig};
pub use config::AccountConfig;
pub use error::MonitorError;
pub use scheduler::IntervalScheduler;
