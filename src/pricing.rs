use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::OrderError;
use crate::safety::MarketData;
use crate::types::Side;

pub const MIN_PRICE: Decimal = dec!(0.01);
pub const MAX_PRICE: Decimal = dec!(0.99);

/// Decimals used for share quantities sent to the CLOB.
const SHARE_DECIMALS: u32 = 2;

/// Parse a CLOB tick size such as `"0.01"`. `None` for garbage or a
/// non-positive tick.
pub fn parse_tick_size(tick_size: &str) -> Option<Decimal> {
    Decimal::from_str(tick_size.trim())
        .ok()
        .filter(|t| *t > Decimal::ZERO)
}

/// Snap `price` to the nearest tick, clamp it into `[0.01, 0.99]` and round to
/// the tick's own precision. An unusable tick leaves the price untouched.
pub fn round_to_tick(price: Decimal, tick_size: &str) -> Decimal {
    let Some(tick) = parse_tick_size(tick_size) else {
        return price;
    };

    let Some(rounded) = price
        .checked_div(tick)
        .and_then(|steps| steps.round().checked_mul(tick))
    else {
        return price;
    };
    let clamped = rounded.clamp(MIN_PRICE, MAX_PRICE);

    let tick_size = tick_size.trim();
    let decimals = match tick_size.rsplit_once('.') {
        Some((_, frac)) => frac.len() as u32,
        None => 2,
    };
    clamped.round_dp(decimals)
}

/// Price used to convert a USD amount into shares: the touch we would trade
/// against, or the limit price when that side of the book is empty.
pub fn reference_price(side: Side, market: &MarketData, limit_price: Decimal) -> Decimal {
    let touch = match side {
        Side::Buy => market.best_ask,
        Side::Sell => market.best_bid,
    };
    if touch > Decimal::ZERO {
        touch
    } else {
        limit_price
    }
}

/// Shares bought or sold by spending `size_usd` at `reference_price`.
pub fn shares_for_usd(size_usd: Decimal, reference_price: Decimal) -> Result<Decimal, OrderError> {
    if reference_price <= Decimal::ZERO {
        return Err(OrderError::ZeroShares {
            size_usd,
            reference_price,
        });
    }
    let shares = size_usd
        .checked_div(reference_price)
        .ok_or(OrderError::AmountOverflow { size_usd })?
        .round_dp(SHARE_DECIMALS);
    if shares <= Decimal::ZERO {
        return Err(OrderError::ZeroShares {
            size_usd,
            reference_price,
        });
    }
    Ok(shares)
}

/// Reject an execution price further than `max_slippage` (fraction of mid)
/// from mid. Returns the realised slippage fraction on success.
pub fn check_slippage(
    side: Side,
    expected: Decimal,
    mid: Decimal,
    max_slippage: Decimal,
) -> Result<Decimal, OrderError> {
    match side {
        Side::Buy => {
            let bound = mid.saturating_mul(Decimal::ONE.saturating_add(max_slippage));
            if expected > bound {
                return Err(OrderError::SlippageTooHigh { expected, bound });
            }
        }
        Side::Sell => {
            let bound = mid.saturating_mul(Decimal::ONE.saturating_sub(max_slippage));
            if expected < bound {
                return Err(OrderError::SlippageTooHigh { expected, bound });
            }
        }
    }
    Ok(expected
        .saturating_sub(mid)
        .abs()
        .checked_div(mid)
        .unwrap_or(Decimal::MAX))
}
