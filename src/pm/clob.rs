use std::time::Duration;

use anyhow::{Context, Result};

use super::wire::{BookSummary, MarketItem, TickSizeResp};
use crate::book::OrderBook;
use crate::types::MarketInfo;

/// Read-only CLOB REST client: market metadata, books and tick sizes.
#[derive(Clone)]
pub struct ClobClient {
    host: String,
    http: reqwest::Client,
}

impl ClobClient {
    pub fn new(host: String, timeout: Duration, proxy: Option<&str>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(timeout);
        if let Some(p) = proxy.map(str::trim).filter(|p| !p.is_empty()) {
            builder = builder.proxy(reqwest::Proxy::all(p).context("invalid CLOB proxy url")?);
            tracing::debug!(proxy = %p, "CLOB requests routed through proxy");
        }
        let http = builder.build().context("build CLOB http client")?;
        Ok(Self { host, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.host.trim_end_matches('/'), path)
    }

    pub async fn fetch_market(&self, condition_id: &str) -> Result<MarketInfo> {
        let m: MarketItem = self
            .http
            .get(self.url(&format!("markets/{}", condition_id)))
            .send()
            .await
            .context("GET /markets/{id} failed")?
            .error_for_status()
            .context("GET /markets/{id} non-200")?
            .json()
            .await
            .context("decode /markets/{id} json failed")?;
        Ok(m.into())
    }

    pub async fn fetch_order_book(&self, token_id: &str) -> Result<OrderBook> {
        let b: BookSummary = self
            .http
            .get(self.url("book"))
            .query(&[("token_id", token_id)])
            .send()
            .await
            .context("GET /book failed")?
            .error_for_status()
            .context("GET /book non-200")?
            .json()
            .await
            .context("decode /book json failed")?;

        tracing::debug!(
            token_id = %token_id,
            bids = b.bids.len(),
            asks = b.asks.len(),
            "book fetched"
        );
        Ok(b.into())
    }

    pub async fn fetch_tick_size(&self, token_id: &str) -> Result<String> {
        let t: TickSizeResp = self
            .http
            .get(self.url("tick-size"))
            .query(&[("token_id", token_id)])
            .send()
            .await
            .context("GET /tick-size failed")?
            .error_for_status()
            .context("GET /tick-size non-200")?
            .json()
            .await
            .context("decode /tick-size json failed")?;
        t.as_tick_string()
            .ok_or_else(|| anyhow::anyhow!("unexpected tick size payload: {}", t.minimum_tick_size))
    }
}
