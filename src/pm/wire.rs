//! Polymarket JSON payloads and their conversion into canonical types.
//!
//! Prices and sizes arrive as strings on the CLOB and as numbers on the Data
//! API; both are accepted everywhere.

use rust_decimal::Decimal;
use serde::de::{Deserializer, Error as _};
use serde::Deserialize;
use serde_json::Value;

use crate::book::{BookLevel, OrderBook};
use crate::safety::Position;
use crate::tokens;
use crate::types::{MarketInfo, OutcomeToken, RedeemablePosition};

fn value_to_decimal(v: &Value) -> Option<Decimal> {
    let raw = match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    raw.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(&raw).ok())
}

fn decimal_lenient<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    value_to_decimal(&v).ok_or_else(|| D::Error::custom(format!("not a decimal: {}", v)))
}

fn decimal_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().and_then(value_to_decimal).unwrap_or(Decimal::ZERO))
}

fn opt_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().and_then(value_to_decimal))
}

fn vec_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// `GET /markets/{condition_id}`
#[derive(Debug, Clone, Deserialize)]
pub struct MarketItem {
    pub condition_id: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub question: String,
    #[serde(default, deserialize_with = "vec_or_empty")]
    pub tokens: Vec<TokenItem>,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub volume: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenItem {
    pub token_id: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub outcome: String,
}

impl From<MarketItem> for MarketInfo {
    fn from(m: MarketItem) -> Self {
        MarketInfo {
            market_id: m.condition_id,
            question: m.question,
            tokens: m
                .tokens
                .into_iter()
                .map(|t| OutcomeToken::new(t.token_id, t.outcome))
                .collect(),
            volume: m.volume,
        }
    }
}

/// `GET /book?token_id=...`
#[derive(Debug, Clone, Deserialize)]
pub struct BookSummary {
    #[serde(default, deserialize_with = "vec_or_empty")]
    pub bids: Vec<BookLvl>,
    #[serde(default, deserialize_with = "vec_or_empty")]
    pub asks: Vec<BookLvl>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookLvl {
    #[serde(deserialize_with = "decimal_lenient")]
    pub price: Decimal,
    #[serde(deserialize_with = "decimal_lenient")]
    pub size: Decimal,
}

impl From<BookSummary> for OrderBook {
    fn from(b: BookSummary) -> Self {
        let conv = |lvls: Vec<BookLvl>| -> Vec<BookLevel> {
            lvls.into_iter()
                .map(|l| BookLevel::new(l.price, l.size))
                .collect()
        };
        OrderBook {
            bids: conv(b.bids),
            asks: conv(b.asks),
        }
    }
}

/// `GET /tick-size?token_id=...`
#[derive(Debug, Clone, Deserialize)]
pub struct TickSizeResp {
    pub minimum_tick_size: Value,
}

impl TickSizeResp {
    /// Tick as the venue wrote it, so its precision survives.
    pub fn as_tick_string(&self) -> Option<String> {
        match &self.minimum_tick_size {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// One entry of the Data API `/positions` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PositionItem {
    pub asset: String,
    #[serde(rename = "conditionId")]
    pub condition_id: String,
    #[serde(deserialize_with = "decimal_lenient")]
    pub size: Decimal,
    #[serde(rename = "avgPrice", default, deserialize_with = "decimal_or_zero")]
    pub avg_price: Decimal,
    #[serde(rename = "curPrice", default, deserialize_with = "opt_decimal")]
    pub cur_price: Option<Decimal>,
    #[serde(rename = "cashPnl", default, deserialize_with = "decimal_or_zero")]
    pub cash_pnl: Decimal,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub outcome: String,
    #[serde(rename = "outcomeIndex", default)]
    pub outcome_index: Option<u32>,
    #[serde(default)]
    pub redeemable: Option<bool>,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub payout: Decimal,
}

impl PositionItem {
    /// Claim details for a resolved position, `None` unless it can be
    /// redeemed.
    pub fn into_redeemable(self) -> Option<RedeemablePosition> {
        if !self.redeemable.unwrap_or(false) {
            return None;
        }
        let outcome = Some(self.outcome.as_str()).filter(|o| !o.trim().is_empty());
        let index_set = tokens::index_set(self.outcome_index, outcome);
        Some(RedeemablePosition {
            condition_id: self.condition_id,
            token_id: self.asset,
            title: self.title,
            outcome: self.outcome,
            outcome_index: self.outcome_index,
            size: self.size,
            expected_payout_usdc: self.payout,
            index_set,
        })
    }
}

impl From<PositionItem> for Position {
    fn from(p: PositionItem) -> Self {
        Position {
            token_id: p.asset,
            market_id: p.condition_id,
            size: p.size,
            avg_price: p.avg_price,
            current_price: p.cur_price.unwrap_or(p.avg_price),
            unrealized_pnl: p.cash_pnl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn book_accepts_string_and_number_levels() {
        let raw = r#"{
            "market": "0xabc",
            "asset_id": "123",
            "bids": [{"price": "0.45", "size": "100"}, {"price": 0.44, "size": 50}],
            "asks": null
        }"#;
        let book: OrderBook = serde_json::from_str::<BookSummary>(raw).unwrap().into();
        assert_eq!(book.bids.len(), 2);
        assert_eq!(book.bids[1].price, dec!(0.44));
        assert_eq!(book.bids[1].size, dec!(50));
        assert!(book.asks.is_empty());
    }

    #[test]
    fn market_tokens_keep_order() {
        let raw = r#"{
            "condition_id": "0xabc",
            "question": "Will it rain?",
            "tokens": [
                {"token_id": "1", "outcome": "Yes", "price": 0.4},
                {"token_id": "2", "outcome": "No", "price": 0.6}
            ]
        }"#;
        let m: MarketInfo = serde_json::from_str::<MarketItem>(raw).unwrap().into();
        assert_eq!(m.market_id, "0xabc");
        assert_eq!(m.tokens[0], OutcomeToken::new("1", "Yes"));
        assert_eq!(m.tokens[1].outcome, "No");
        assert_eq!(m.volume, Decimal::ZERO);
    }

    #[test]
    fn tick_size_keeps_precision() {
        let t: TickSizeResp = serde_json::from_str(r#"{"minimum_tick_size": 0.001}"#).unwrap();
        assert_eq!(t.as_tick_string().as_deref(), Some("0.001"));
        let t: TickSizeResp = serde_json::from_str(r#"{"minimum_tick_size": "0.01"}"#).unwrap();
        assert_eq!(t.as_tick_string().as_deref(), Some("0.01"));
    }

    #[test]
    fn redeemable_position_carries_index_set() {
        let raw = r#"{"asset": "t2", "conditionId": "m1", "size": 40, "avgPrice": 0.2,
            "title": "Will it snow?", "outcome": "No", "outcomeIndex": 1,
            "redeemable": true, "payout": "40"}"#;
        let r = serde_json::from_str::<PositionItem>(raw)
            .unwrap()
            .into_redeemable()
            .unwrap();
        assert_eq!(r.index_set, 2);
        assert_eq!(r.expected_payout_usdc, dec!(40));
        assert_eq!(r.title, "Will it snow?");

        // label decides when the index is missing
        let raw = r#"{"asset": "t1", "conditionId": "m1", "size": 5, "outcome": "Up", "redeemable": true}"#;
        let r = serde_json::from_str::<PositionItem>(raw)
            .unwrap()
            .into_redeemable()
            .unwrap();
        assert_eq!(r.index_set, 1);
        assert_eq!(r.outcome_index, None);

        let raw = r#"{"asset": "t1", "conditionId": "m1", "size": 5, "outcomeIndex": 0, "redeemable": null}"#;
        assert!(serde_json::from_str::<PositionItem>(raw)
            .unwrap()
            .into_redeemable()
            .is_none());
    }

    #[test]
    fn position_current_price_falls_back_to_average() {
        let raw = r#"{"asset": "t1", "conditionId": "m1", "size": 120.5, "avgPrice": 0.31}"#;
        let p: Position = serde_json::from_str::<PositionItem>(raw).unwrap().into();
        assert_eq!(p.size, dec!(120.5));
        assert_eq!(p.current_price, dec!(0.31));
        assert_eq!(p.unrealized_pnl, Decimal::ZERO);

        let raw = r#"{"asset": "t1", "conditionId": "m1", "size": 10, "avgPrice": 0.31, "curPrice": 0.5, "cashPnl": 1.9}"#;
        let p: Position = serde_json::from_str::<PositionItem>(raw).unwrap().into();
        assert_eq!(p.current_price, dec!(0.5));
        assert_eq!(p.market_value_usd(), dec!(5));
        assert_eq!(p.unrealized_pnl, dec!(1.9));
    }
}
