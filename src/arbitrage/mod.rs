//! Arbitrage Detection Module
//! Prices resting order-book bids against the pool rate and settles the
//! profitable ones, one trade at a time.

pub mod engine;
pub mod guard;
pub mod pricing;

pub use engine::{ArbitrageMonitor, IneligibleOrderPolicy, MonitorConfig, TickReport, TradeOutcome};
pub use guard::{MonitorState, TradeGuard, TradePermit};
