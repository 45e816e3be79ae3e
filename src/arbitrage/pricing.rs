//! Pool-rate and gas-margin arithmetic
//!
//! The projected outcome is a no-slippage estimate: the full maker amount is
//! valued at the pool's current marginal rate, ignoring that the rate degrades
//! as the trade eats into the reserves. Treat positive outcomes as an upper
//! bound.

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;
use crate::models::{ArbitrageResult, Candidate};

/// Implied spot rate of a two-sided pool, `reserve_a / reserve_b`
pub fn pool_rate(reserve_a: u128, reserve_b: u128) -> Result<f64, MonitorError> {
    if reserve_b == 0 {
        return Err(MonitorError::Pricing("pool reserve_b is zero".into()));
    }
    Ok(reserve_a as f64 / reserve_b as f64)
}

/// `pool_rate * maker_amount - taker_amount`
pub fn evaluate(pool_rate: f64, candidate: &Candidate) -> ArbitrageResult {
    let projected_outcome = pool_rate * candidate.maker_amount - candidate.taker_amount;
    ArbitrageResult {
        profitable: projected_outcome > 0.0,
        projected_outcome,
    }
}

/// How the gas cost is expressed before it is netted against the outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GasDenomination {
    /// `gas_price * gas_estimate` compared as is
    #[default]
    Raw,
    /// Product converted from wei to native units, then into the outcome's
    /// token via the pool rate
    QuoteUnits,
}

/// Gas price and estimated units for one settlement call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasQuote {
    pub gas_price: u128,
    pub gas_estimate: u64,
}

const WEI_PER_NATIVE: f64 = 1e18;

impl GasQuote {
    pub fn total_wei(&self) -> u128 {
        self.gas_price.saturating_mul(self.gas_estimate as u128)
    }

    pub fn total_cost(&self, denomination: GasDenomination, pool_rate: f64) -> f64 {
        let total = self.total_wei() as f64;
        match denomination {
            GasDenomination::Raw => total,
            GasDenomination::QuoteUnits => total / WEI_PER_NATIVE * pool_rate,
        }
    }
}

/// Outcome left after paying for gas; the trade proceeds only if positive
pub fn net_margin(projected_outcome: f64, total_gas_cost: f64) -> f64 {
    projected_outcome - total_gas_cost
}
