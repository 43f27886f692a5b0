use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

use trade_guard::config::Settings;
use trade_guard::planner::{OrderInstruction, OrderPlanner, RebalancePlan};
use trade_guard::pm::execution_observer::ExecutionObserver;
use trade_guard::source::{MarketDataSource, PolymarketSource};
use trade_guard::stats::Stats;

fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

async fn maybe_write_jsonl(path: &Option<String>, line: &str) {
    use tokio::io::AsyncWriteExt;

    let Some(p) = path.as_ref().map(|x| x.trim().to_string()).filter(|x| !x.is_empty()) else {
        return;
    };
    let mut f = match tokio::fs::OpenOptions::new().create(true).append(true).open(&p).await {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(path = %p, error = %e, "failed to open results file");
            return;
        }
    };
    if let Err(e) = f.write_all(format!("{}\n", line).as_bytes()).await {
        tracing::warn!(path = %p, error = %e, "failed to append result line");
    }
}

async fn run_instruction<S: MarketDataSource>(
    planner: &OrderPlanner<S>,
    observer: &ExecutionObserver,
    index: usize,
    instruction: &OrderInstruction,
) -> serde_json::Value {
    match instruction {
        OrderInstruction::Limit(args) => match planner.prepare_limit_order(args).await {
            Ok(order) => {
                observer.observe(std::slice::from_ref(&order));
                serde_json::json!({"index": index, "success": true, "order": order})
            }
            Err(e) => serde_json::json!({"index": index, "success": false, "error": e.to_string()}),
        },
        OrderInstruction::Market(args) => match planner.prepare_market_order(args).await {
            Ok(order) => {
                observer.observe(std::slice::from_ref(&order));
                serde_json::json!({"index": index, "success": true, "order": order})
            }
            Err(e) => serde_json::json!({"index": index, "success": false, "error": e.to_string()}),
        },
        OrderInstruction::Rebalance(args) => match planner.plan_rebalance(args).await {
            Ok(plan) => {
                if let RebalancePlan::Order { order, .. } = &plan {
                    observer.observe(std::slice::from_ref(order.as_ref()));
                }
                serde_json::json!({"index": index, "success": true, "rebalance": plan})
            }
            Err(e) => serde_json::json!({"index": index, "success": false, "error": e.to_string()}),
        },
        OrderInstruction::Batch { orders } => {
            let outcome = planner.prepare_batch(orders).await;
            let prepared: Vec<_> = outcome.prepared().cloned().collect();
            observer.observe(&prepared);
            serde_json::json!({"index": index, "success": outcome.failed == 0, "batch": outcome})
        }
        OrderInstruction::Redeemable => match planner.redeemable_positions().await {
            Ok(summary) => serde_json::json!({"index": index, "success": true, "redeemable": summary}),
            Err(e) => serde_json::json!({"index": index, "success": false, "error": e.to_string()}),
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let s = Settings::from_env()?;
    let stats = Stats::new(now_ms());
    let source = PolymarketSource::new(&s)?;
    let planner = OrderPlanner::new(
        source,
        Arc::new(s.safety_limits()?),
        s.enable_autonomous_trading,
        s.book_depth,
        stats.clone(),
    );
    let observer = ExecutionObserver::new();

    let limits = planner.limits();

    tracing::info!(
        max_order_size_usd = %limits.max_order_size_usd,
        max_total_exposure_usd = %limits.max_total_exposure_usd,
        max_position_size_per_market = %limits.max_position_size_per_market,
        min_liquidity_required = %limits.min_liquidity_required,
        max_spread_tolerance = %limits.max_spread_tolerance,
        require_confirmation_above_usd = %limits.require_confirmation_above_usd,
        autonomous = s.enable_autonomous_trading,
        "safety limits loaded"
    );

    let mut raw = String::new();
    tokio::io::stdin()
        .read_to_string(&mut raw)
        .await
        .context("read instructions from stdin")?;
    let instructions: Vec<OrderInstruction> =
        serde_json::from_str(&raw).context("decode instructions json")?;
    tracing::info!(count = instructions.len(), "instructions loaded");

    for (i, instruction) in instructions.iter().enumerate() {
        let result = run_instruction(&planner, &observer, i, instruction).await;
        let line = serde_json::to_string(&result)?;
        println!("{}", line);
        maybe_write_jsonl(&s.results_jsonl_path, &line).await;
    }

    if s.stats_log {
        let ss = stats.snapshot(now_ms());
        let line = serde_json::to_string(&serde_json::json!({ "stats": ss })).unwrap_or_default();
        tracing::info!(
            up_sec = ss.up_sec,
            received = ss.orders_received,
            prepared = ss.orders_prepared,
            rejected = ss.orders_rejected,
            failed = ss.orders_failed,
            confirmations = ss.confirmations_flagged,
            "stats"
        );
        maybe_write_jsonl(&s.results_jsonl_path, &line).await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn results_are_appended_one_per_line() {
        let path = std::env::temp_dir().join(format!("trade-guard-{}.jsonl", uuid::Uuid::new_v4()));
        let target = Some(path.to_string_lossy().into_owned());

        maybe_write_jsonl(&target, r#"{"index":0}"#).await;
        maybe_write_jsonl(&target, r#"{"index":1}"#).await;

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, "{\"index\":0}\n{\"index\":1}\n");
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn unwritable_results_path_is_not_fatal() {
        // a directory cannot be opened for appending
        let dir = Some(std::env::temp_dir().to_string_lossy().into_owned());
        maybe_write_jsonl(&dir, "{}").await;
        maybe_write_jsonl(&None, "{}").await;
    }
}
