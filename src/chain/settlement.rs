//! Settlement payload built from a provider order.
//!
//! Fields pass through verbatim; the only checks are the type coercions
//! (addresses, integers, 32-byte words).

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolCall;
use std::str::FromStr;

use super::contracts::{IArbBot, IZeroExProxy, LimitOrder, LimitOrderSignature};
use crate::error::MonitorError;
use crate::models::SignedOrder;

/// Everything needed to estimate and submit `startTrade`
#[derive(Debug, Clone)]
pub struct SettlementCall {
    pub order: LimitOrder,
    pub signature: LimitOrderSignature,
    pub taker_amount: U256,
    pub maker_amount: U256,
    /// ABI-encoded `fillLimitOrder(order, signature, takerAmount)`
    pub fill_data: Bytes,
}

impl SettlementCall {
    pub fn from_order(order: &SignedOrder) -> Result<Self, MonitorError> {
        let taker_amount = parse_u128("takerAmount", &order.taker_amount)?;
        let maker_amount = parse_u128("makerAmount", &order.maker_amount)?;

        let limit_order = LimitOrder {
            makerToken: parse_address("makerToken", &order.maker_token)?,
            takerToken: parse_address("takerToken", &order.taker_token)?,
            makerAmount: maker_amount,
            takerAmount: taker_amount,
            takerTokenFeeAmount: parse_u128("takerTokenFeeAmount", &order.taker_token_fee_amount)?,
            maker: parse_address("maker", &order.maker)?,
            taker: parse_address("taker", &order.taker)?,
            sender: parse_address("sender", &order.sender)?,
            feeRecipient: parse_address("feeRecipient", &order.fee_recipient)?,
            pool: parse_word("pool", &order.pool)?,
            expiry: order
                .expiry
                .trim()
                .parse::<u64>()
                .map_err(|e| malformed("expiry", &order.expiry, e))?,
            salt: U256::from_str_radix(order.salt.trim(), 10)
                .map_err(|e| malformed("salt", &order.salt, e))?,
        };

        let signature = LimitOrderSignature {
            signatureType: order.signature.signature_type,
            v: order.signature.v,
            r: parse_word("signature.r", &order.signature.r)?,
            s: parse_word("signature.s", &order.signature.s)?,
        };

        let fill_data = IZeroExProxy::fillLimitOrderCall {
            order: limit_order.clone(),
            signature: signature.clone(),
            takerTokenFillAmount: taker_amount,
        }
        .abi_encode();

        Ok(Self {
            order: limit_order,
            signature,
            taker_amount: U256::from(taker_amount),
            maker_amount: U256::from(maker_amount),
            fill_data: Bytes::from(fill_data),
        })
    }

    /// Calldata for the bot contract's entry point
    pub fn start_trade_calldata(&self) -> Bytes {
        Bytes::from(
            IArbBot::startTradeCall {
                takerAmount: self.taker_amount,
                makerAmount: self.maker_amount,
                zeroXData: self.fill_data.clone(),
            }
            .abi_encode(),
        )
    }
}

fn malformed(field: &str, raw: &str, err: impl std::fmt::Display) -> MonitorError {
    MonitorError::MalformedOrder(format!("{} = {:?}: {}", field, raw, err))
}

fn parse_address(field: &str, raw: &str) -> Result<Address, MonitorError> {
    Address::from_str(raw.trim()).map_err(|e| malformed(field, raw, e))
}

fn parse_word(field: &str, raw: &str) -> Result<B256, MonitorError> {
    B256::from_str(raw.trim()).map_err(|e| malformed(field, raw, e))
}

fn parse_u128(field: &str, raw: &str) -> Result<u128, MonitorError> {
    raw.trim().parse::<u128>().map_err(|e| malformed(field, raw, e))
}
