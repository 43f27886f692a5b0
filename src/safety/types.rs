use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Side;

/// An intended trade. `size` is in shares, `price` is a probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub token_id: String,
    pub price: Decimal,
    pub size: Decimal,
    pub side: Side,
    pub market_id: String,
}

impl OrderRequest {
    /// Saturates at `Decimal::MAX`, which every size cap rejects.
    pub fn notional_usd(&self) -> Decimal {
        self.price.saturating_mul(self.size)
    }

    /// Notional signed by direction: buys add exposure, sells remove it.
    pub fn signed_notional_usd(&self) -> Decimal {
        match self.side {
            Side::Buy => self.notional_usd(),
            Side::Sell => -self.notional_usd(),
        }
    }
}

/// A held balance in one outcome token. Long only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub token_id: String,
    pub market_id: String,
    pub size: Decimal,
    pub avg_price: Decimal,
    pub current_price: Decimal,
    pub unrealized_pnl: Decimal,
}

impl Position {
    pub fn market_value_usd(&self) -> Decimal {
        self.size.saturating_mul(self.current_price)
    }
}

/// Point-in-time book conditions for one token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub market_id: String,
    pub token_id: String,
    pub best_bid: Decimal,
    pub best_ask: Decimal,
    /// USD resting on the bid side over the top levels.
    pub bid_liquidity: Decimal,
    /// USD resting on the ask side over the top levels.
    pub ask_liquidity: Decimal,
    pub total_volume: Decimal,
}

impl MarketData {
    pub fn mid_price(&self) -> Decimal {
        self.best_bid.saturating_add(self.best_ask) / Decimal::TWO
    }

    /// Mid-based spread fraction. A non-positive mid yields `1`, which no
    /// sane tolerance accepts.
    pub fn spread(&self) -> Decimal {
        let mid = self.mid_price();
        if mid <= Decimal::ZERO {
            return Decimal::ONE;
        }
        self.best_ask
            .checked_sub(self.best_bid)
            .and_then(|d| d.checked_div(mid))
            .unwrap_or(Decimal::ONE)
    }

    /// Liquidity an order on `side` consumes: asks for a buy, bids for a sell.
    pub fn liquidity_for(&self, side: Side) -> Decimal {
        match side {
            Side::Buy => self.ask_liquidity,
            Side::Sell => self.bid_liquidity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn market(bid: Decimal, ask: Decimal) -> MarketData {
        MarketData {
            market_id: "test_market".into(),
            token_id: "test_token".into(),
            best_bid: bid,
            best_ask: ask,
            bid_liquidity: dec!(1000),
            ask_liquidity: dec!(1000),
            total_volume: dec!(5000),
        }
    }

    #[test]
    fn spread_is_mid_based() {
        let m = market(dec!(0.48), dec!(0.52));
        assert_eq!(m.mid_price(), dec!(0.50));
        assert_eq!(m.spread(), dec!(0.08));

        let m = market(dec!(0.60), dec!(0.65));
        assert_eq!(m.spread(), dec!(0.08));

        let m = market(dec!(0.495), dec!(0.505));
        assert_eq!(m.spread(), dec!(0.02));

        let m = market(dec!(0.30), dec!(0.70));
        assert_eq!(m.spread(), dec!(0.8));
    }

    #[test]
    fn zero_mid_spread_is_one() {
        let m = market(Decimal::ZERO, Decimal::ZERO);
        assert_eq!(m.spread(), Decimal::ONE);
    }

    #[test]
    fn mid_spread_is_tighter_than_bid_spread() {
        let m = market(dec!(0.40), dec!(0.60));
        let bid_based = (m.best_ask - m.best_bid) / m.best_bid;

        assert_eq!(m.spread(), dec!(0.4));
        assert_eq!(bid_based, dec!(0.5));
        assert!(m.spread() < bid_based);
    }

    #[test]
    fn liquidity_follows_consumed_side() {
        let mut m = market(dec!(0.4), dec!(0.6));
        m.bid_liquidity = dec!(10);
        m.ask_liquidity = dec!(20);
        assert_eq!(m.liquidity_for(Side::Buy), dec!(20));
        assert_eq!(m.liquidity_for(Side::Sell), dec!(10));
    }

    #[test]
    fn notional_and_market_value() {
        let order = OrderRequest {
            token_id: "t".into(),
            price: dec!(0.25),
            size: dec!(40),
            side: Side::Sell,
            market_id: "m".into(),
        };
        assert_eq!(order.notional_usd(), dec!(10));
        assert_eq!(order.signed_notional_usd(), dec!(-10));

        let pos = Position {
            token_id: "t".into(),
            market_id: "m".into(),
            size: dec!(100),
            avg_price: dec!(0.3),
            current_price: dec!(0.45),
            unrealized_pnl: dec!(15),
        };
        assert_eq!(pos.market_value_usd(), dec!(45));
    }
}
