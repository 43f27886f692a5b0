pub mod polymarket;

use async_trait::async_trait;

use crate::book::OrderBook;
use crate::safety::Position;
use crate::types::{MarketInfo, RedeemablePosition};

/// Everything the order workflow needs from the outside world.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Market metadata including its outcome tokens in venue order
    async fn fetch_market(&self, condition_id: &str) -> anyhow::Result<MarketInfo>;

    async fn fetch_order_book(&self, token_id: &str) -> anyhow::Result<OrderBook>;

    /// Minimum price increment, as the venue formats it (e.g. "0.01")
    async fn fetch_tick_size(&self, token_id: &str) -> anyhow::Result<String>;

    /// Current holdings of the trading wallet
    async fn fetch_positions(&self) -> anyhow::Result<Vec<Position>>;

    /// Resolved holdings that can be claimed
    async fn fetch_redeemable_positions(&self) -> anyhow::Result<Vec<RedeemablePosition>>;
}

pub use polymarket::PolymarketSource;
