use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::OrderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(OrderError::InvalidSide(s.to_string())),
        }
    }
}

/// CLOB time-in-force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Good till cancelled.
    Gtc,
    /// Good till date, needs an expiration.
    Gtd,
    /// Fill or kill.
    Fok,
    /// Fill and kill: fill what is possible, cancel the rest.
    Fak,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Gtc => "GTC",
            OrderType::Gtd => "GTD",
            OrderType::Fok => "FOK",
            OrderType::Fak => "FAK",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GTC" => Ok(OrderType::Gtc),
            "GTD" => Ok(OrderType::Gtd),
            "FOK" => Ok(OrderType::Fok),
            "FAK" => Ok(OrderType::Fak),
            _ => Err(OrderError::InvalidOrderType(s.to_string())),
        }
    }
}

/// One tradable outcome of a market, in the market's own token order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeToken {
    pub token_id: String,
    #[serde(default)]
    pub outcome: String,
}

impl OutcomeToken {
    pub fn new(token_id: impl Into<String>, outcome: impl Into<String>) -> Self {
        Self {
            token_id: token_id.into(),
            outcome: outcome.into(),
        }
    }

    /// Outcome label, or the token id when the market did not label it.
    pub fn label(&self) -> &str {
        if self.outcome.is_empty() {
            &self.token_id
        } else {
            &self.outcome
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketInfo {
    pub market_id: String,
    pub question: String,
    pub tokens: Vec<OutcomeToken>,
    pub volume: Decimal,
}

/// A resolved position that can be claimed for collateral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedeemablePosition {
    pub condition_id: String,
    pub token_id: String,
    pub title: String,
    pub outcome: String,
    pub outcome_index: Option<u32>,
    pub size: Decimal,
    pub expected_payout_usdc: Decimal,
    /// Bitmask over outcome slots passed to the redemption call.
    pub index_set: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_parses_case_insensitively() {
        assert_eq!("buy".parse::<Side>().unwrap(), Side::Buy);
        assert_eq!(" Sell ".parse::<Side>().unwrap(), Side::Sell);
        assert!(matches!("hold".parse::<Side>(), Err(OrderError::InvalidSide(s)) if s == "hold"));
    }

    #[test]
    fn order_type_parses_all_variants() {
        assert_eq!("gtc".parse::<OrderType>().unwrap(), OrderType::Gtc);
        assert_eq!("GTD".parse::<OrderType>().unwrap(), OrderType::Gtd);
        assert_eq!("fok".parse::<OrderType>().unwrap(), OrderType::Fok);
        assert_eq!("Fak".parse::<OrderType>().unwrap(), OrderType::Fak);
        assert!("IOC".parse::<OrderType>().is_err());
    }

    #[test]
    fn label_falls_back_to_token_id() {
        assert_eq!(OutcomeToken::new("A", "Yes").label(), "Yes");
        assert_eq!(OutcomeToken::new("A", "").label(), "A");
    }
}
