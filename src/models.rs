//! Order-book wire types and the per-tick evaluation records derived from them

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::MonitorError;

/// Taker address marking an order as fillable by anyone
pub const OPEN_TAKER: &str = "0x0000000000000000000000000000000000000000";

/// Order-book snapshot (`/sra/v4/orderbook`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderbookResponse {
    pub bids: OrderbookPage,
    #[serde(default)]
    pub asks: Option<OrderbookPage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderbookPage {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub per_page: Option<u64>,
    #[serde(default)]
    pub records: Vec<RawOrderRecord>,
}

/// One entry of `bids.records`, left undecoded so a bad record only fails
/// when the monitor reaches it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawOrderRecord(pub serde_json::Value);

impl RawOrderRecord {
    pub fn decode(&self) -> Result<OrderRecord, MonitorError> {
        let hash = self
            .0
            .pointer("/metaData/orderHash")
            .and_then(|v| v.as_str())
            .unwrap_or("<unknown>");
        serde_json::from_value(self.0.clone()).map_err(|e| {
            MonitorError::MalformedOrder(format!("record {} does not decode: {}", hash, e))
        })
    }
}

impl TryFrom<&OrderRecord> for RawOrderRecord {
    type Error = serde_json::Error;

    fn try_from(record: &OrderRecord) -> Result<Self, Self::Error> {
        serde_json::to_value(record).map(Self)
    }
}

/// One resting order with its fill state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order: SignedOrder,
    pub meta_data: OrderMetaData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMetaData {
    #[serde(default)]
    pub order_hash: Option<String>,
    pub remaining_fillable_taker_amount: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Signed limit order exactly as the provider returns it.
/// Amounts, expiry and salt are base-unit integer strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOrder {
    pub maker_token: String,
    pub taker_token: String,
    pub maker_amount: String,
    pub taker_amount: String,
    pub taker_token_fee_amount: String,
    pub maker: String,
    pub taker: String,
    pub sender: String,
    pub fee_recipient: String,
    pub pool: String,
    pub expiry: String,
    pub salt: String,
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub verifying_contract: Option<String>,
    pub signature: OrderSignature,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSignature {
    #[serde(deserialize_with = "int_or_string")]
    pub signature_type: u8,
    #[serde(deserialize_with = "int_or_string")]
    pub v: u8,
    pub r: String,
    pub s: String,
}

// Some gateways send small ints as strings
fn int_or_string<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u8),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(v) => Ok(v),
        Raw::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Why a record is not worth evaluating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    /// Remaining fillable amount differs from the total taker amount
    PartiallyFilled { remaining: String, total: String },
    /// Order names a specific counterparty
    RestrictedTaker(String),
}

impl OrderRecord {
    /// Only untouched orders open to any taker qualify
    pub fn eligibility(&self) -> Eligibility {
        if self.order.taker_amount != self.meta_data.remaining_fillable_taker_amount {
            return Eligibility::PartiallyFilled {
                remaining: self.meta_data.remaining_fillable_taker_amount.clone(),
                total: self.order.taker_amount.clone(),
            };
        }
        if !self.order.taker.eq_ignore_ascii_case(OPEN_TAKER) {
            return Eligibility::RestrictedTaker(self.order.taker.clone());
        }
        Eligibility::Eligible
    }
}

/// Amounts of one eligible order in whole-token units
#[derive(Debug, Clone)]
pub struct Candidate {
    pub taker_amount: f64,
    pub maker_amount: f64,
    pub raw_order: SignedOrder,
}

impl Candidate {
    pub fn from_order(order: &SignedOrder, decimals: u32) -> Result<Self, MonitorError> {
        Ok(Self {
            taker_amount: to_units(&order.taker_amount, decimals)?,
            maker_amount: to_units(&order.maker_amount, decimals)?,
            raw_order: order.clone(),
        })
    }
}

/// Result of comparing one candidate against the pool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArbitrageResult {
    pub profitable: bool,
    pub projected_outcome: f64,
}

/// Parse a base-unit integer string
pub fn parse_base_units(raw: &str) -> Result<BigUint, MonitorError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MonitorError::MalformedOrder(format!(
            "not a base-unit integer: {:?}",
            raw
        )));
    }
    BigUint::parse_bytes(trimmed.as_bytes(), 10)
        .ok_or_else(|| MonitorError::MalformedOrder(format!("not a base-unit integer: {:?}", raw)))
}

/// Scale a base-unit integer string down by `decimals`
pub fn to_units(raw: &str, decimals: u32) -> Result<f64, MonitorError> {
    let value = parse_base_units(raw)?;
    let scale = BigUint::from(10u32).pow(decimals);
    let whole = (&value / &scale).to_string();
    let frac = (&value % &scale).to_string();

    let whole: f64 = whole
        .parse()
        .map_err(|_| MonitorError::MalformedOrder(format!("amount out of range: {}", raw)))?;
    let frac: f64 = frac
        .parse()
        .map_err(|_| MonitorError::MalformedOrder(format!("amount out of range: {}", raw)))?;

    Ok(whole + frac / 10f64.powi(decimals as i32))
}
