//! 0x Standard Relayer API order-book client
//! One GET per tick; no retry inside a tick, the next tick is the retry.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Request};
use std::time::Duration;
use tracing::debug;

use crate::config::AccountConfig;
use crate::models::{OrderbookResponse, RawOrderRecord};

/// Source of resting orders for one fixed pair
#[async_trait]
pub trait OrderbookProvider: Send + Sync {
    /// Bids in the provider's order. Only the page envelope is checked here;
    /// each record is decoded by the caller when it is reached.
    async fn fetch_bids(&self) -> Result<Vec<RawOrderRecord>>;
}

pub struct ZeroExOrderbook {
    client: Client,
    base_url: String,
    base_token: String,
    quote_token: String,
    per_page: u32,
    api_key: Option<String>,
}

impl ZeroExOrderbook {
    pub fn new(
        base_url: impl Into<String>,
        base_token: impl Into<String>,
        quote_token: impl Into<String>,
        per_page: u32,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("spreadbot/0.1")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            base_token: base_token.into(),
            quote_token: quote_token.into(),
            per_page,
            api_key,
        })
    }

    pub fn from_config(config: &AccountConfig) -> Result<Self> {
        Self::new(
            config.bot.orderbook_url.clone(),
            config.bot.base_token.clone(),
            config.bot.quote_token.clone(),
            config.bot.orderbook_page_size,
            config.bot.api_key.clone(),
            config.bot.http_timeout,
        )
    }

    fn build_request(&self) -> Result<Request> {
        let url = format!("{}/orderbook", self.base_url);
        let per_page = self.per_page.to_string();
        let mut builder = self.client.get(&url).query(&[
            ("baseToken", self.base_token.as_str()),
            ("quoteToken", self.quote_token.as_str()),
            ("perPage", per_page.as_str()),
        ]);
        if let Some(key) = &self.api_key {
            builder = builder.header("0x-api-key", key);
        }
        builder.build().context("Failed to build orderbook request")
    }
}

#[async_trait]
impl OrderbookProvider for ZeroExOrderbook {
    async fn fetch_bids(&self) -> Result<Vec<RawOrderRecord>> {
        let request = self.build_request()?;
        let response = self
            .client
            .execute(request)
            .await
            .context("Orderbook request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Orderbook returned {}: {}", status, body);
        }

        let snapshot: OrderbookResponse = response
            .json()
            .await
            .context("Failed to parse orderbook")?;

        debug!(bids = snapshot.bids.records.len(), "Fetched orderbook");
        Ok(snapshot.bids.records)
    }
}
