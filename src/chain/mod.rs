//! On-chain collaborators
//!
//! Everything the monitor needs from the network sits behind `ChainGateway`:
//! pool reserves, gas price and estimate, nonce, broadcast and the receipt
//! wait. `AlloyGateway` is the live implementation.

pub mod contracts;
pub mod gateway;
pub mod settlement;

use alloy::primitives::TxHash;
use anyhow::Result;
use async_trait::async_trait;

use crate::arbitrage::pricing::GasQuote;

pub use gateway::AlloyGateway;
pub use settlement::SettlementCall;

/// Two-sided pool reserves, ordered (taker-token side, maker-token side)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolReserves {
    pub reserve_a: u128,
    pub reserve_b: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementReceipt {
    pub tx_hash: TxHash,
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

#[async_trait]
pub trait ChainGateway: Send + Sync {
    async fn pool_reserves(&self) -> Result<PoolReserves>;

    async fn gas_price(&self) -> Result<u128>;

    /// Simulate the settlement call against the bot contract
    async fn estimate_settlement_gas(&self, call: &SettlementCall) -> Result<u64>;

    /// Current transaction count of the sending account
    async fn nonce(&self) -> Result<u64>;

    /// Sign locally and broadcast
    async fn submit_settlement(
        &self,
        call: &SettlementCall,
        gas: &GasQuote,
        nonce: u64,
    ) -> Result<TxHash>;

    /// Block until the transaction is included. Unbounded; callers apply
    /// their own timeout.
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<SettlementReceipt>;
}
