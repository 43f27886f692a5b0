use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SafetyViolation;
use crate::types::Side;

use super::types::{MarketData, OrderRequest, Position};

/// Pre-trade guardrails. Built once from configuration and shared read-only.
///
/// All caps are compared with a strict `>`, so an order landing exactly on a
/// cap is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyLimits {
    pub max_order_size_usd: Decimal,
    pub max_total_exposure_usd: Decimal,
    pub max_position_size_per_market: Decimal,
    pub min_liquidity_required: Decimal,
    /// Fraction of mid, e.g. `0.05` for 5%.
    pub max_spread_tolerance: Decimal,
    pub require_confirmation_above_usd: Decimal,
}

impl SafetyLimits {
    /// Decide whether `order` may proceed.
    ///
    /// Rules run in priority order and stop at the first failure: order size,
    /// per-market position, total exposure, liquidity on the consumed side,
    /// spread. The returned violation describes that first rule only.
    pub fn validate_order(
        &self,
        order: &OrderRequest,
        positions: &[Position],
        market_data: &MarketData,
    ) -> Result<(), SafetyViolation> {
        let notional = order.notional_usd();
        if notional > self.max_order_size_usd {
            return Err(SafetyViolation::OrderSizeExceeded {
                notional,
                limit: self.max_order_size_usd,
            });
        }

        let in_market = positions
            .iter()
            .filter(|p| p.market_id == order.market_id)
            .map(Position::market_value_usd)
            .fold(Decimal::ZERO, Decimal::saturating_add);
        let projected = projected_exposure(in_market, order);
        if projected > self.max_position_size_per_market {
            return Err(SafetyViolation::MarketPositionExceeded {
                market_id: order.market_id.clone(),
                projected,
                limit: self.max_position_size_per_market,
            });
        }

        let total = positions
            .iter()
            .map(Position::market_value_usd)
            .fold(Decimal::ZERO, Decimal::saturating_add);
        let projected = projected_exposure(total, order);
        if projected > self.max_total_exposure_usd {
            return Err(SafetyViolation::TotalExposureExceeded {
                projected,
                limit: self.max_total_exposure_usd,
            });
        }

        let available = market_data.liquidity_for(order.side);
        if available < self.min_liquidity_required {
            return Err(SafetyViolation::InsufficientLiquidity {
                book_side: match order.side {
                    Side::Buy => "ask",
                    Side::Sell => "bid",
                },
                available,
                required: self.min_liquidity_required,
            });
        }

        let spread = market_data.spread();
        if spread > self.max_spread_tolerance {
            return Err(SafetyViolation::SpreadTooWide {
                spread,
                tolerance: self.max_spread_tolerance,
            });
        }

        Ok(())
    }

    /// Whether a valid order still needs a human to sign off.
    ///
    /// Manual mode always asks. Autonomous mode asks only above the
    /// configured notional threshold.
    pub fn should_require_confirmation(
        &self,
        order: &OrderRequest,
        autonomous_trading_enabled: bool,
    ) -> bool {
        if !autonomous_trading_enabled {
            return true;
        }
        order.notional_usd() > self.require_confirmation_above_usd
    }
}

/// Existing exposure moved by the order, floored at zero so a closing sell
/// never frees room beyond what was held.
fn projected_exposure(current: Decimal, order: &OrderRequest) -> Decimal {
    current
        .saturating_add(order.signed_notional_usd())
        .max(Decimal::ZERO)
}
