//! Turns trading instructions into safety-checked order tickets.
//!
//! This is the only place that talks to both the outside world and the
//! safety engine. It logs every rejection; the engine itself stays silent.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{OrderError, SelectionError};
use crate::pricing::{self, MAX_PRICE, MIN_PRICE};
use crate::safety::{MarketData, OrderRequest, SafetyLimits};
use crate::source::MarketDataSource;
use crate::stats::Stats;
use crate::tokens;
use crate::types::{OrderType, OutcomeToken, RedeemablePosition, Side};

/// Used when the venue cannot tell us the tick size.
const FALLBACK_TICK_SIZE: &str = "0.01";

/// Rebalances smaller than this many dollars are skipped.
const MIN_REBALANCE_USD: Decimal = dec!(1);

fn default_order_type() -> String {
    "GTC".to_string()
}

fn default_max_slippage() -> Decimal {
    dec!(0.02)
}

/// A limit order as requested by the agent. `size` is in USD.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitOrderArgs {
    pub condition_id: String,
    pub side: String,
    pub price: Decimal,
    pub size: Decimal,
    #[serde(default = "default_order_type")]
    pub order_type: String,
    #[serde(default)]
    pub expiration: Option<i64>,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketOrderArgs {
    pub condition_id: String,
    pub side: String,
    pub size: Decimal,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceArgs {
    pub condition_id: String,
    /// Target exposure in USD; `None` closes the position.
    #[serde(default)]
    pub target_size: Option<Decimal>,
    #[serde(default = "default_max_slippage")]
    pub max_slippage: Decimal,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderInstruction {
    Limit(LimitOrderArgs),
    Market(MarketOrderArgs),
    Rebalance(RebalanceArgs),
    Batch { orders: Vec<LimitOrderArgs> },
    Redeemable,
}

/// A checked order ready for submission.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedOrder {
    pub ticket_id: Uuid,
    pub batch_id: Option<Uuid>,
    pub request: OrderRequest,
    pub order_type: OrderType,
    pub expiration: Option<i64>,
    pub size_usd: Decimal,
    pub reference_price: Decimal,
    pub tick_size: String,
    /// Advisory: the order is still prepared, callers decide what to do.
    pub requires_confirmation: bool,
    pub market: MarketData,
    pub created_ms: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub index: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<PreparedOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub batch_id: Uuid,
    pub total_orders: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<BatchEntry>,
}

impl BatchOutcome {
    pub fn prepared(&self) -> impl Iterator<Item = &PreparedOrder> {
        self.results.iter().filter_map(|r| r.order.as_ref())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RedemptionSummary {
    pub total_redeemable: usize,
    pub total_payout_usdc: Decimal,
    pub positions: Vec<RedeemablePosition>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RebalancePlan {
    AtTarget {
        current_size: Decimal,
        target_size: Decimal,
        adjustment: Decimal,
    },
    Order {
        current_size: Decimal,
        target_size: Decimal,
        adjustment: Decimal,
        side: Side,
        size_usd: Decimal,
        execution_price: Decimal,
        mid_price: Decimal,
        slippage: Decimal,
        order: Box<PreparedOrder>,
    },
}

pub struct OrderPlanner<S> {
    source: S,
    limits: Arc<SafetyLimits>,
    autonomous_trading: bool,
    book_depth: usize,
    stats: Arc<Stats>,
}

impl<S: MarketDataSource> OrderPlanner<S> {
    pub fn new(
        source: S,
        limits: Arc<SafetyLimits>,
        autonomous_trading: bool,
        book_depth: usize,
        stats: Arc<Stats>,
    ) -> Self {
        Self {
            source,
            limits,
            autonomous_trading,
            book_depth: book_depth.max(1),
            stats,
        }
    }

    pub fn limits(&self) -> &SafetyLimits {
        &self.limits
    }

    pub async fn prepare_limit_order(
        &self,
        args: &LimitOrderArgs,
    ) -> Result<PreparedOrder, OrderError> {
        self.prepare(args, None).await
    }

    /// Marketable limit at the edge of the price range, fill-and-kill.
    pub async fn prepare_market_order(
        &self,
        args: &MarketOrderArgs,
    ) -> Result<PreparedOrder, OrderError> {
        let side: Side = match args.side.parse() {
            Ok(s) => s,
            Err(e) => {
                self.stats.inc_received();
                self.stats.inc_failed();
                return Err(e);
            }
        };
        let price = match side {
            Side::Buy => MAX_PRICE,
            Side::Sell => MIN_PRICE,
        };
        tracing::info!(
            condition_id = %args.condition_id,
            side = %side,
            size_usd = %args.size,
            "market order: FAK at range edge"
        );

        let limit = LimitOrderArgs {
            condition_id: args.condition_id.clone(),
            side: side.to_string(),
            price,
            size: args.size,
            order_type: OrderType::Fak.to_string(),
            expiration: None,
            token_id: args.token_id.clone(),
            outcome: args.outcome.clone(),
        };
        self.prepare(&limit, None).await
    }

    /// Orders are prepared one after another so each sees the same positions
    /// snapshot semantics as a single order would.
    pub async fn prepare_batch(&self, orders: &[LimitOrderArgs]) -> BatchOutcome {
        let batch_id = Uuid::new_v4();
        tracing::info!(batch_id = %batch_id, orders = orders.len(), "processing batch");

        let mut results = Vec::with_capacity(orders.len());
        for (index, args) in orders.iter().enumerate() {
            let entry = match self.prepare(args, Some(batch_id)).await {
                Ok(order) => BatchEntry {
                    index,
                    success: true,
                    order: Some(order),
                    error: None,
                },
                Err(e) => BatchEntry {
                    index,
                    success: false,
                    order: None,
                    error: Some(e.to_string()),
                },
            };
            results.push(entry);
        }

        let successful = results.iter().filter(|r| r.success).count();
        BatchOutcome {
            batch_id,
            total_orders: orders.len(),
            successful,
            failed: orders.len() - successful,
            results,
        }
    }

    /// Resolved positions the wallet can claim, with expected payouts.
    pub async fn redeemable_positions(&self) -> Result<RedemptionSummary, OrderError> {
        let positions = self.source.fetch_redeemable_positions().await?;
        for p in positions.iter().filter(|p| p.outcome_index.is_none()) {
            tracing::debug!(
                condition_id = %p.condition_id,
                outcome = %p.outcome,
                index_set = p.index_set,
                "index set derived from outcome label"
            );
        }
        let total_payout_usdc = positions
            .iter()
            .map(|p| p.expected_payout_usdc)
            .fold(Decimal::ZERO, Decimal::saturating_add);
        tracing::info!(
            count = positions.len(),
            payout = %total_payout_usdc,
            "redeemable positions loaded"
        );
        Ok(RedemptionSummary {
            total_redeemable: positions.len(),
            total_payout_usdc,
            positions,
        })
    }

    /// Move the USD exposure held in a market towards `target_size`.
    pub async fn plan_rebalance(&self, args: &RebalanceArgs) -> Result<RebalancePlan, OrderError> {
        let target_size = args.target_size.unwrap_or(Decimal::ZERO);
        if target_size < Decimal::ZERO {
            return Err(OrderError::InvalidSize(target_size));
        }

        let positions = self.source.fetch_positions().await?;
        let current_size: Decimal = positions
            .iter()
            .filter(|p| p.market_id == args.condition_id)
            .map(|p| p.market_value_usd())
            .fold(Decimal::ZERO, Decimal::saturating_add);

        let adjustment = target_size.saturating_sub(current_size);
        tracing::info!(
            condition_id = %args.condition_id,
            current = %current_size,
            target = %target_size,
            adjustment = %adjustment,
            "rebalancing position"
        );
        if adjustment.abs() < MIN_REBALANCE_USD {
            return Ok(RebalancePlan::AtTarget {
                current_size,
                target_size,
                adjustment,
            });
        }

        let side = if adjustment > Decimal::ZERO {
            Side::Buy
        } else {
            Side::Sell
        };
        let size_usd = adjustment.abs();

        let market = self.source.fetch_market(&args.condition_id).await?;
        let token_id = self.resolve_token(
            &market.tokens,
            &args.condition_id,
            side,
            args.token_id.as_deref(),
            args.outcome.as_deref(),
        )?;

        let book = self.source.fetch_order_book(&token_id).await?;
        let mid_price = book.best_bid().saturating_add(book.best_ask()) / Decimal::TWO;
        if mid_price <= Decimal::ZERO {
            return Err(OrderError::NoMidPrice { token_id });
        }
        let execution_price = match side {
            Side::Buy => book.best_ask(),
            Side::Sell => book.best_bid(),
        };
        let slippage =
            pricing::check_slippage(side, execution_price, mid_price, args.max_slippage)?;

        tracing::info!(
            side = %side,
            size_usd = %size_usd,
            expected_price = %execution_price,
            "rebalance order"
        );
        let limit = LimitOrderArgs {
            condition_id: args.condition_id.clone(),
            side: side.to_string(),
            price: execution_price,
            size: size_usd,
            order_type: OrderType::Gtc.to_string(),
            expiration: None,
            token_id: Some(token_id),
            outcome: None,
        };
        let order = self.prepare(&limit, None).await?;

        Ok(RebalancePlan::Order {
            current_size,
            target_size,
            adjustment,
            side,
            size_usd,
            execution_price,
            mid_price,
            slippage,
            order: Box::new(order),
        })
    }

    async fn prepare(
        &self,
        args: &LimitOrderArgs,
        batch_id: Option<Uuid>,
    ) -> Result<PreparedOrder, OrderError> {
        self.stats.inc_received();
        let res = self.build(args, batch_id).await;
        match &res {
            Ok(order) => {
                self.stats.inc_prepared();
                if order.requires_confirmation {
                    self.stats.inc_confirmation();
                }
            }
            Err(e) if e.is_safety_rejection() => {
                self.stats.inc_rejected();
                tracing::warn!(condition_id = %args.condition_id, reason = %e, "order rejected");
            }
            Err(e) => {
                self.stats.inc_failed();
                tracing::error!(condition_id = %args.condition_id, error = %e, "failed to prepare order");
            }
        }
        res
    }

    async fn build(
        &self,
        args: &LimitOrderArgs,
        batch_id: Option<Uuid>,
    ) -> Result<PreparedOrder, OrderError> {
        if !(args.price > Decimal::ZERO && args.price <= Decimal::ONE) {
            return Err(OrderError::InvalidPrice(args.price));
        }
        if args.size <= Decimal::ZERO {
            return Err(OrderError::InvalidSize(args.size));
        }
        let side: Side = args.side.parse()?;
        let order_type: OrderType = args.order_type.parse()?;
        if order_type == OrderType::Gtd && args.expiration.is_none() {
            return Err(OrderError::MissingExpiration);
        }

        tracing::info!(condition_id = %args.condition_id, "fetching market data");
        let market = self.source.fetch_market(&args.condition_id).await?;
        let token_id = self.resolve_token(
            &market.tokens,
            &args.condition_id,
            side,
            args.token_id.as_deref(),
            args.outcome.as_deref(),
        )?;

        let tick_fut = async {
            Ok::<String, anyhow::Error>(match self.source.fetch_tick_size(&token_id).await {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!(token_id = %token_id, error = %e, "tick size unavailable, using default");
                    FALLBACK_TICK_SIZE.to_string()
                }
            })
        };
        let (book, positions, tick_size) = futures::try_join!(
            self.source.fetch_order_book(&token_id),
            self.source.fetch_positions(),
            tick_fut,
        )?;

        let market_data =
            book.to_market_data(&args.condition_id, &token_id, market.volume, self.book_depth);

        if pricing::parse_tick_size(&tick_size).is_none() {
            tracing::warn!(tick_size = %tick_size, "invalid tick size, keeping requested price");
        }
        let price = pricing::round_to_tick(args.price, &tick_size);

        let reference_price = pricing::reference_price(side, &market_data, price);
        let shares = pricing::shares_for_usd(args.size, reference_price)?;

        let request = OrderRequest {
            token_id: token_id.clone(),
            price,
            size: shares,
            side,
            market_id: args.condition_id.clone(),
        };

        self.limits
            .validate_order(&request, &positions, &market_data)?;

        let requires_confirmation = self
            .limits
            .should_require_confirmation(&request, self.autonomous_trading);
        if requires_confirmation {
            // advisory only, the ticket is still produced
            tracing::warn!(
                notional = %request.notional_usd(),
                threshold = %self.limits.require_confirmation_above_usd,
                autonomous = self.autonomous_trading,
                "order requires confirmation"
            );
        }

        tracing::info!(
            side = %side,
            token_id = %token_id,
            shares = %shares,
            price = %price,
            order_type = %order_type,
            reference_price = %reference_price,
            "order prepared"
        );

        Ok(PreparedOrder {
            ticket_id: Uuid::new_v4(),
            batch_id,
            request,
            order_type,
            expiration: args.expiration,
            size_usd: args.size,
            reference_price,
            tick_size,
            requires_confirmation,
            market: market_data,
            created_ms: chrono::Utc::now().timestamp_millis(),
        })
    }

    fn resolve_token(
        &self,
        market_tokens: &[OutcomeToken],
        condition_id: &str,
        side: Side,
        token_id: Option<&str>,
        outcome: Option<&str>,
    ) -> Result<String, SelectionError> {
        if market_tokens.is_empty() {
            return Err(SelectionError::NoTokens);
        }
        match token_id.map(str::trim).filter(|t| !t.is_empty()) {
            Some(explicit) => {
                tokens::ensure_token_in_market(market_tokens, explicit, condition_id)?;
                Ok(explicit.to_string())
            }
            None => Ok(tokens::select_token_id(market_tokens, side, outcome)?.to_string()),
        }
    }
}
