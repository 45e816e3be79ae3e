//! Arbitrage Monitor
//!
//! Driven once per scheduler tick: fetch resting bids, price each eligible one
//! against the pool, and settle the profitable ones. Only one trade attempt is
//! ever in flight; a tick that arrives during a trade does nothing and its
//! opportunity is lost.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::guard::{MonitorState, TradeGuard};
use super::pricing::{self, GasDenomination, GasQuote};
use crate::chain::{ChainGateway, SettlementCall};
use crate::error::MonitorError;
use crate::models::{Candidate, Eligibility, SignedOrder};
use crate::scrapers::OrderbookProvider;

/// What to do with an order that fails the eligibility filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibleOrderPolicy {
    /// Stop evaluating the rest of the batch for this tick
    #[default]
    StopBatch,
    /// Skip the order and continue with the next one
    Skip,
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Decimal scale of both order tokens
    pub token_decimals: u32,
    pub ineligible_orders: IneligibleOrderPolicy,
    pub gas_denomination: GasDenomination,
    pub confirmation_timeout: Duration,
    pub dry_run: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            token_decimals: 18,
            ineligible_orders: IneligibleOrderPolicy::StopBatch,
            gas_denomination: GasDenomination::Raw,
            confirmation_timeout: Duration::from_secs(120),
            dry_run: false,
        }
    }
}

/// How a single trade attempt ended
#[derive(Debug, Clone, PartialEq)]
pub enum TradeOutcome {
    /// Another attempt held the guard
    Busy,
    /// Gas would consume the projected outcome; nothing submitted
    GasAborted {
        projected_outcome: f64,
        total_gas_cost: f64,
    },
    /// Passed the gas check; submission suppressed
    DryRun { net_margin: f64 },
    Confirmed {
        tx_hash: String,
        block_number: Option<u64>,
        net_margin: f64,
    },
}

/// Summary of one tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u64,
    pub started_at: DateTime<Utc>,
    /// Tick body skipped because a trade was in flight
    pub skipped_busy: bool,
    pub fetch_failed: bool,
    pub orders_seen: usize,
    pub evaluated: usize,
    pub stopped_at: Option<Eligibility>,
    pub trades: Vec<TradeOutcome>,
}

impl TickReport {
    fn new(tick: u64) -> Self {
        Self {
            tick,
            started_at: Utc::now(),
            skipped_busy: false,
            fetch_failed: false,
            orders_seen: 0,
            evaluated: 0,
            stopped_at: None,
            trades: Vec::new(),
        }
    }
}

/// Application context for the tick callback. Built once at startup.
pub struct ArbitrageMonitor {
    orderbook: Arc<dyn OrderbookProvider>,
    chain: Arc<dyn ChainGateway>,
    guard: TradeGuard,
    config: MonitorConfig,
    run_count: AtomicU64,
}

impl ArbitrageMonitor {
    pub fn new(
        orderbook: Arc<dyn OrderbookProvider>,
        chain: Arc<dyn ChainGateway>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            orderbook,
            chain,
            guard: TradeGuard::new(),
            config,
            run_count: AtomicU64::new(0),
        }
    }

    pub fn guard(&self) -> &TradeGuard {
        &self.guard
    }

    pub fn state(&self) -> MonitorState {
        self.guard.state()
    }

    pub fn run_count(&self) -> u64 {
        self.run_count.load(Ordering::Relaxed)
    }

    /// Tick handler.
    ///
    /// Transport failures of the order fetch are logged and reported in the
    /// `TickReport`; malformed orders and chain failures are returned as
    /// errors.
    pub async fn run(&self) -> Result<TickReport, MonitorError> {
        if self.guard.is_in_flight() {
            debug!("Trade in flight, skipping tick");
            let mut report = TickReport::new(self.run_count());
            report.skipped_busy = true;
            return Ok(report);
        }

        let tick = self.run_count.fetch_add(1, Ordering::Relaxed);
        let mut report = TickReport::new(tick);
        info!(tick, "🔎 Starting tick");

        let records = match self.orderbook.fetch_bids().await {
            Ok(records) => records,
            Err(e) => {
                warn!(tick, "Orderbook fetch failed, skipping tick: {:#}", e);
                report.fetch_failed = true;
                return Ok(report);
            }
        };
        report.orders_seen = records.len();

        for raw in &records {
            let record = match raw.decode() {
                Ok(record) => record,
                Err(e) => {
                    error!(tick, evaluated = report.evaluated, "Stopping tick on bad record: {}", e);
                    return Err(e);
                }
            };
            let eligibility = record.eligibility();
            if eligibility != Eligibility::Eligible {
                match self.config.ineligible_orders {
                    IneligibleOrderPolicy::StopBatch => {
                        debug!(tick, reason = ?eligibility, "Ineligible order, stopping batch");
                        report.stopped_at = Some(eligibility);
                        break;
                    }
                    IneligibleOrderPolicy::Skip => {
                        debug!(tick, reason = ?eligibility, "Ineligible order, skipping");
                        continue;
                    }
                }
            }

            let candidate = Candidate::from_order(&record.order, self.config.token_decimals)?;
            report.evaluated += 1;

            let reserves = self.chain.pool_reserves().await?;
            let pool_rate = pricing::pool_rate(reserves.reserve_a, reserves.reserve_b)?;
            let result = pricing::evaluate(pool_rate, &candidate);

            debug!(
                tick,
                pool_rate,
                taker_amount = candidate.taker_amount,
                maker_amount = candidate.maker_amount,
                projected_outcome = result.projected_outcome,
                "Evaluated candidate"
            );

            if result.profitable {
                let outcome = self
                    .trade(&candidate, &record.order, result.projected_outcome, pool_rate)
                    .await?;
                report.trades.push(outcome);
            }
        }

        info!(
            tick,
            orders = report.orders_seen,
            evaluated = report.evaluated,
            trades = report.trades.len(),
            "Tick finished"
        );
        Ok(report)
    }

    /// Trade routine. Holds the single-flight guard from entry until return,
    /// including every network round trip; the guard is released on every
    /// exit path.
    pub async fn trade(
        &self,
        candidate: &Candidate,
        raw_order: &SignedOrder,
        projected_outcome: f64,
        pool_rate: f64,
    ) -> Result<TradeOutcome, MonitorError> {
        let Some(_permit) = self.guard.try_acquire() else {
            warn!("Trade already in flight, dropping opportunity");
            return Ok(TradeOutcome::Busy);
        };

        info!(
            projected_outcome,
            taker_amount = candidate.taker_amount,
            maker_amount = candidate.maker_amount,
            "💰 Found an arbitrage opportunity - preparing to execute"
        );

        let call = SettlementCall::from_order(raw_order)?;

        let gas = GasQuote {
            gas_price: self.chain.gas_price().await?,
            gas_estimate: self.chain.estimate_settlement_gas(&call).await?,
        };
        let total_gas_cost = gas.total_cost(self.config.gas_denomination, pool_rate);
        let net_margin = pricing::net_margin(projected_outcome, total_gas_cost);

        if net_margin <= 0.0 {
            warn!(
                projected_outcome,
                total_gas_cost,
                gas_price = gas.gas_price as f64,
                gas_estimate = gas.gas_estimate,
                "⛽ Gas would eat the profit - aborting trade"
            );
            return Ok(TradeOutcome::GasAborted {
                projected_outcome,
                total_gas_cost,
            });
        }

        if self.config.dry_run {
            info!(net_margin, "DRY RUN: would submit settlement");
            return Ok(TradeOutcome::DryRun { net_margin });
        }

        let nonce = self.chain.nonce().await?;
        let tx_hash = self.chain.submit_settlement(&call, &gas, nonce).await?;
        let tx_hash_str = format!("0x{}", hex::encode(tx_hash));
        info!(tx_hash = %tx_hash_str, nonce, "📤 Settlement submitted, waiting for confirmation");

        let timeout = self.config.confirmation_timeout;
        let receipt = match tokio::time::timeout(timeout, self.chain.wait_for_confirmation(tx_hash)).await {
            Ok(receipt) => receipt?,
            Err(_) => {
                error!(tx_hash = %tx_hash_str, ?timeout, "Settlement confirmation timed out");
                return Err(MonitorError::ConfirmationTimeout {
                    tx_hash: tx_hash_str,
                    timeout,
                });
            }
        };

        if !receipt.success {
            error!(tx_hash = %tx_hash_str, block = ?receipt.block_number, "Settlement reverted");
            return Err(MonitorError::Reverted {
                tx_hash: tx_hash_str,
                block: receipt.block_number,
            });
        }

        info!(
            tx_hash = %tx_hash_str,
            block = ?receipt.block_number,
            gas_used = receipt.gas_used,
            net_margin,
            "✅ Arbitrage trade was successful"
        );
        Ok(TradeOutcome::Confirmed {
            tx_hash: tx_hash_str,
            block_number: receipt.block_number,
            net_margin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_names() {
        let skip: IneligibleOrderPolicy = serde_json::from_str("\"skip\"").unwrap();
        assert_eq!(skip, IneligibleOrderPolicy::Skip);
        let stop: IneligibleOrderPolicy = serde_json::from_str("\"stop_batch\"").unwrap();
        assert_eq!(stop, IneligibleOrderPolicy::StopBatch);
    }

    #[test]
    fn test_default_monitor_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.token_decimals, 18);
        assert_eq!(config.ineligible_orders, IneligibleOrderPolicy::StopBatch);
        assert_eq!(config.gas_denomination, GasDenomination::Raw);
        assert_eq!(config.confirmation_timeout, Duration::from_secs(120));
        assert!(!config.dry_run);
    }

    #[test]
    fn test_empty_report() {
        let report = TickReport::new(7);
        assert_eq!(report.tick, 7);
        assert!(!report.skipped_busy);
        assert!(report.trades.is_empty());
        assert!(report.stopped_at.is_none());
    }
}
