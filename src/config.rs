use rust_decimal::Decimal;
use serde::Deserialize;

use crate::safety::SafetyLimits;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_clob_host")]
    pub clob_host: String,
    #[serde(default = "default_data_api_host")]
    pub data_api_host: String,
    pub polygon_address: Option<String>,
    // Proxy used for CLOB requests only
    pub clob_proxy: Option<String>,
    #[serde(default = "default_http_timeout_sec")]
    pub http_timeout_sec: u64,

    // Safety limits (USD unless noted)
    #[serde(default = "default_max_order_size_usd")]
    pub max_order_size_usd: String,
    #[serde(default = "default_max_total_exposure_usd")]
    pub max_total_exposure_usd: String,
    #[serde(default = "default_max_position_size_per_market")]
    pub max_position_size_per_market: String,
    #[serde(default = "default_min_liquidity_required")]
    pub min_liquidity_required: String,
    // Fraction of mid
    #[serde(default = "default_max_spread_tolerance")]
    pub max_spread_tolerance: String,
    #[serde(default = "default_require_confirmation_above_usd")]
    pub require_confirmation_above_usd: String,
    #[serde(default = "default_true")]
    pub enable_autonomous_trading: bool,

    // Book levels summed into side liquidity
    #[serde(default = "default_book_depth")]
    pub book_depth: usize,

    // Output
    pub results_jsonl_path: Option<String>,
    #[serde(default = "default_true")]
    pub stats_log: bool,
}

fn default_clob_host() -> String {
    "https://clob.polymarket.com".to_string()
}

fn default_data_api_host() -> String {
    "https://data-api.polymarket.com".to_string()
}

fn default_http_timeout_sec() -> u64 {
    30
}

fn default_max_order_size_usd() -> String {
    "1000".to_string()
}

fn default_max_total_exposure_usd() -> String {
    "5000".to_string()
}

fn default_max_position_size_per_market() -> String {
    "2000".to_string()
}

fn default_min_liquidity_required() -> String {
    "10000".to_string()
}

fn default_max_spread_tolerance() -> String {
    "0.05".to_string()
}

fn default_require_confirmation_above_usd() -> String {
    "500".to_string()
}

fn default_book_depth() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn parse_limit(name: &str, raw: &str) -> anyhow::Result<Decimal> {
    let v = raw
        .trim()
        .parse::<Decimal>()
        .map_err(|e| anyhow::anyhow!("{} must be a decimal, got {:?}: {}", name, raw, e))?;
    if v <= Decimal::ZERO {
        anyhow::bail!("{} must be positive, got {}", name, v);
    }
    Ok(v)
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let c = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;
        Ok(c.try_deserialize()?)
    }

    pub fn safety_limits(&self) -> anyhow::Result<SafetyLimits> {
        Ok(SafetyLimits {
            max_order_size_usd: parse_limit("MAX_ORDER_SIZE_USD", &self.max_order_size_usd)?,
            max_total_exposure_usd: parse_limit(
                "MAX_TOTAL_EXPOSURE_USD",
                &self.max_total_exposure_usd,
            )?,
            max_position_size_per_market: parse_limit(
                "MAX_POSITION_SIZE_PER_MARKET",
                &self.max_position_size_per_market,
            )?,
            min_liquidity_required: parse_limit(
                "MIN_LIQUIDITY_REQUIRED",
                &self.min_liquidity_required,
            )?,
            max_spread_tolerance: parse_limit("MAX_SPREAD_TOLERANCE", &self.max_spread_tolerance)?,
            require_confirmation_above_usd: parse_limit(
                "REQUIRE_CONFIRMATION_ABOVE_USD",
                &self.require_confirmation_above_usd,
            )?,
        })
    }
}
