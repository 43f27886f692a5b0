use std::time::Duration;

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use super::wire::PositionItem;
use crate::safety::Position;
use crate::types::RedeemablePosition;

/// Data API client for the wallet's open positions.
#[derive(Clone)]
pub struct PositionsClient {
    host: String,
    http: reqwest::Client,
}

impl PositionsClient {
    pub fn new(host: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build data-api http client")?;
        Ok(Self { host, http })
    }

    pub async fn fetch_positions(&self, address: &str) -> Result<Vec<Position>> {
        Ok(convert_positions(self.fetch_raw(address).await?))
    }

    /// Resolved positions that can be claimed, with their index sets.
    pub async fn fetch_redeemable(&self, address: &str) -> Result<Vec<RedeemablePosition>> {
        Ok(convert_redeemable(self.fetch_raw(address).await?))
    }

    async fn fetch_raw(&self, address: &str) -> Result<Vec<serde_json::Value>> {
        let url = format!("{}/positions", self.host.trim_end_matches('/'));
        let raw: Vec<serde_json::Value> = self
            .http
            .get(url)
            // lowercase or the Data API returns nothing
            .query(&[("user", address.to_lowercase())])
            .send()
            .await
            .context("GET /positions failed")?
            .error_for_status()
            .context("GET /positions non-200")?
            .json()
            .await
            .context("decode /positions json failed")?;
        Ok(raw)
    }
}

/// Convert listing entries, skipping anything malformed or short.
pub fn convert_positions(raw: Vec<serde_json::Value>) -> Vec<Position> {
    let mut out = Vec::with_capacity(raw.len());
    for v in raw {
        match serde_json::from_value::<PositionItem>(v) {
            Ok(item) if item.size < Decimal::ZERO => {
                tracing::warn!(token_id = %item.asset, size = %item.size, "skipping negative position");
            }
            Ok(item) => out.push(Position::from(item)),
            Err(e) => {
                tracing::warn!(error = %e, "failed to convert position");
            }
        }
    }
    out
}

pub fn convert_redeemable(raw: Vec<serde_json::Value>) -> Vec<RedeemablePosition> {
    raw.into_iter()
        .filter_map(|v| match serde_json::from_value::<PositionItem>(v) {
            Ok(item) => item.into_redeemable(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to convert position");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn skips_malformed_and_negative_entries() {
        let raw = vec![
            json!({"asset": "a", "conditionId": "m1", "size": 10, "avgPrice": 0.5}),
            json!({"asset": "b", "conditionId": "m1", "size": "oops", "avgPrice": 0.5}),
            json!({"asset": "c", "conditionId": "m2", "size": -3, "avgPrice": 0.5}),
            json!({"conditionId": "m3", "size": 1}),
            json!({"asset": "d", "conditionId": "m2", "size": "4", "avgPrice": "0.25", "curPrice": 0.3}),
        ];
        let positions = convert_positions(raw);
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].token_id, "a");
        assert_eq!(positions[1].market_value_usd(), dec!(1.2));
    }

    #[test]
    fn keeps_only_redeemable_entries() {
        let raw = vec![
            json!({"asset": "a", "conditionId": "m1", "size": 10, "redeemable": false}),
            json!({"asset": "b", "conditionId": "m2", "size": 7, "outcome": "Yes", "redeemable": true, "payout": 7}),
            json!({"asset": "c", "conditionId": "m3", "size": 3, "outcome": "2", "redeemable": true}),
            json!({"asset": "d", "size": 3, "redeemable": true}),
        ];
        let redeemable = convert_redeemable(raw);
        assert_eq!(redeemable.len(), 2);
        assert_eq!(redeemable[0].index_set, 1);
        assert_eq!(redeemable[0].expected_payout_usdc, dec!(7));
        assert_eq!(redeemable[1].index_set, 4);
    }
}
