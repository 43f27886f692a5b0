use rust_decimal::Decimal;
use thiserror::Error;

/// A single violated safety rule. The `Display` output is the rejection
/// reason handed back to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SafetyViolation {
    #[error("order notional ${notional:.2} exceeds max order size ${limit:.2}")]
    OrderSizeExceeded { notional: Decimal, limit: Decimal },

    #[error(
        "position in market {market_id} would be ${projected:.2}, exceeding per-market limit ${limit:.2}"
    )]
    MarketPositionExceeded {
        market_id: String,
        projected: Decimal,
        limit: Decimal,
    },

    #[error("total exposure would be ${projected:.2}, exceeding limit ${limit:.2}")]
    TotalExposureExceeded { projected: Decimal, limit: Decimal },

    #[error("insufficient {book_side} liquidity: ${available:.2} available, ${required:.2} required")]
    InsufficientLiquidity {
        book_side: &'static str,
        available: Decimal,
        required: Decimal,
    },

    #[error("spread {spread:.4} exceeds tolerance {tolerance:.4}")]
    SpreadTooWide { spread: Decimal, tolerance: Decimal },
}

/// Outcome token selection failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("market has no outcome tokens")]
    NoTokens,

    #[error("outcome '{outcome}' not found in binary market tokens")]
    BinaryOutcomeNotFound { outcome: String },

    #[error("multi-outcome market with {count} outcomes requires an outcome. Available: {available}")]
    OutcomeRequired { count: usize, available: String },

    #[error("outcome '{outcome}' not found in multi-outcome market. Available: {available}")]
    OutcomeNotFound { outcome: String, available: String },

    #[error("token {token_id} not found in market {market_id}")]
    TokenNotInMarket { token_id: String, market_id: String },
}

/// Errors raised while turning a trading instruction into a checked order.
#[derive(Error, Debug)]
pub enum OrderError {
    #[error("price must be in (0, 1], got {0}")]
    InvalidPrice(Decimal),

    #[error("size must be positive, got {0}")]
    InvalidSize(Decimal),

    #[error("side must be BUY or SELL, got {0}")]
    InvalidSide(String),

    #[error("invalid order type: {0}")]
    InvalidOrderType(String),

    #[error("GTD orders require an expiration timestamp")]
    MissingExpiration,

    #[error("order of ${size_usd:.2} at reference price {reference_price} rounds to zero shares")]
    ZeroShares {
        size_usd: Decimal,
        reference_price: Decimal,
    },

    #[error("order of ${size_usd} is too large to convert into shares")]
    AmountOverflow { size_usd: Decimal },

    #[error("no usable mid price for token {token_id}")]
    NoMidPrice { token_id: String },

    #[error("slippage too high: expected {expected:.4}, bound {bound:.4}")]
    SlippageTooHigh { expected: Decimal, bound: Decimal },

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("safety check failed: {0}")]
    Rejected(#[from] SafetyViolation),

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

impl OrderError {
    /// True when the order was well formed but refused by a safety limit.
    pub fn is_safety_rejection(&self) -> bool {
        matches!(self, OrderError::Rejected(_))
    }
}
