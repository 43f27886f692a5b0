use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::safety::MarketData;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Decimal,
    pub size: Decimal,
}

impl BookLevel {
    pub fn new(price: Decimal, size: Decimal) -> Self {
        Self { price, size }
    }

    pub fn notional(&self) -> Decimal {
        self.price.saturating_mul(self.size)
    }
}

/// Canonical book for one token. Level order is whatever the venue sent;
/// nothing here assumes it is sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

impl OrderBook {
    /// Highest bid, zero when there are no bids.
    pub fn best_bid(&self) -> Decimal {
        self.bids
            .iter()
            .map(|l| l.price)
            .max()
            .unwrap_or(Decimal::ZERO)
    }

    /// Lowest ask, one when there are no asks.
    pub fn best_ask(&self) -> Decimal {
        self.asks
            .iter()
            .map(|l| l.price)
            .min()
            .unwrap_or(Decimal::ONE)
    }

    /// USD resting on the `depth` best bid levels.
    pub fn bid_liquidity(&self, depth: usize) -> Decimal {
        let mut levels: Vec<&BookLevel> = self.bids.iter().collect();
        levels.sort_by(|a, b| b.price.cmp(&a.price));
        levels.into_iter().take(depth)
            .map(BookLevel::notional)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// USD resting on the `depth` best ask levels.
    pub fn ask_liquidity(&self, depth: usize) -> Decimal {
        let mut levels: Vec<&BookLevel> = self.asks.iter().collect();
        levels.sort_by(|a, b| a.price.cmp(&b.price));
        levels.into_iter().take(depth)
            .map(BookLevel::notional)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    pub fn to_market_data(
        &self,
        market_id: &str,
        token_id: &str,
        total_volume: Decimal,
        depth: usize,
    ) -> MarketData {
        MarketData {
            market_id: market_id.to_string(),
            token_id: token_id.to_string(),
            best_bid: self.best_bid(),
            best_ask: self.best_ask(),
            bid_liquidity: self.bid_liquidity(depth),
            ask_liquidity: self.ask_liquidity(depth),
            total_volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lvl(price: Decimal, size: Decimal) -> BookLevel {
        BookLevel::new(price, size)
    }

    #[test]
    fn best_prices_ignore_level_order() {
        // CLOB sends bids ascending and asks descending
        let book = OrderBook {
            bids: vec![lvl(dec!(0.40), dec!(10)), lvl(dec!(0.45), dec!(5))],
            asks: vec![lvl(dec!(0.60), dec!(10)), lvl(dec!(0.55), dec!(5))],
        };
        assert_eq!(book.best_bid(), dec!(0.45));
        assert_eq!(book.best_ask(), dec!(0.55));
    }

    #[test]
    fn empty_sides_use_sentinels() {
        let book = OrderBook::default();
        assert_eq!(book.best_bid(), Decimal::ZERO);
        assert_eq!(book.best_ask(), Decimal::ONE);
        assert_eq!(book.bid_liquidity(10), Decimal::ZERO);
    }

    #[test]
    fn liquidity_sums_best_levels_only() {
        let book = OrderBook {
            bids: vec![
                lvl(dec!(0.10), dec!(1000)),
                lvl(dec!(0.40), dec!(100)),
                lvl(dec!(0.45), dec!(100)),
            ],
            asks: vec![
                lvl(dec!(0.90), dec!(1000)),
                lvl(dec!(0.55), dec!(100)),
                lvl(dec!(0.50), dec!(100)),
            ],
        };
        assert_eq!(book.bid_liquidity(2), dec!(85));
        assert_eq!(book.ask_liquidity(2), dec!(105));
        assert_eq!(book.ask_liquidity(10), dec!(1005));
    }

    #[test]
    fn builds_market_snapshot() {
        let book = OrderBook {
            bids: vec![lvl(dec!(0.48), dec!(100))],
            asks: vec![lvl(dec!(0.52), dec!(100))],
        };
        let md = book.to_market_data("m", "t", dec!(1234), 10);
        assert_eq!(md.best_bid, dec!(0.48));
        assert_eq!(md.best_ask, dec!(0.52));
        assert_eq!(md.bid_liquidity, dec!(48));
        assert_eq!(md.ask_liquidity, dec!(52));
        assert_eq!(md.total_volume, dec!(1234));
        assert_eq!(md.spread(), dec!(0.08));
    }

    #[test]
    fn liquidity_saturates_on_absurd_levels() {
        let book = OrderBook {
            bids: vec![lvl(dec!(0.9), Decimal::MAX), lvl(dec!(0.8), Decimal::MAX)],
            asks: vec![],
        };
        assert_eq!(book.bid_liquidity(10), Decimal::MAX);
        assert_eq!(book.ask_liquidity(10), Decimal::ZERO);
    }
}
