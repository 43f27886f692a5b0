use std::time::Duration;

use async_trait::async_trait;

use crate::book::OrderBook;
use crate::config::Settings;
use crate::pm::clob::ClobClient;
use crate::pm::positions::PositionsClient;
use crate::safety::Position;
use crate::source::MarketDataSource;
use crate::types::{MarketInfo, RedeemablePosition};

/// Polymarket CLOB + Data API behind `MarketDataSource`.
pub struct PolymarketSource {
    clob: ClobClient,
    positions: PositionsClient,
    address: Option<String>,
}

impl PolymarketSource {
    pub fn new(s: &Settings) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(s.http_timeout_sec.max(1));
        Ok(Self {
            clob: ClobClient::new(s.clob_host.clone(), timeout, s.clob_proxy.as_deref())?,
            positions: PositionsClient::new(s.data_api_host.clone(), timeout)?,
            address: s
                .polygon_address
                .as_ref()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
        })
    }

    fn address(&self) -> anyhow::Result<&str> {
        self.address
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("POLYGON_ADDRESS is required to load positions"))
    }
}

#[async_trait]
impl MarketDataSource for PolymarketSource {
    async fn fetch_market(&self, condition_id: &str) -> anyhow::Result<MarketInfo> {
        self.clob.fetch_market(condition_id).await
    }

    async fn fetch_order_book(&self, token_id: &str) -> anyhow::Result<OrderBook> {
        self.clob.fetch_order_book(token_id).await
    }

    async fn fetch_tick_size(&self, token_id: &str) -> anyhow::Result<String> {
        self.clob.fetch_tick_size(token_id).await
    }

    async fn fetch_positions(&self) -> anyhow::Result<Vec<Position>> {
        self.positions.fetch_positions(self.address()?).await
    }

    async fn fetch_redeemable_positions(&self) -> anyhow::Result<Vec<RedeemablePosition>> {
        self.positions.fetch_redeemable(self.address()?).await
    }
}
