use std::collections::BTreeMap;

use uuid::Uuid;

use crate::planner::PreparedOrder;

/// Dry-run sink for prepared tickets. Nothing is signed or posted; each
/// ticket is logged, grouped by batch.
#[derive(Clone, Default)]
pub struct ExecutionObserver;

impl ExecutionObserver {
    pub fn new() -> Self {
        Self
    }

    /// Log `orders` and return how many were observed.
    pub fn observe(&self, orders: &[PreparedOrder]) -> usize {
        if orders.is_empty() {
            return 0;
        }

        // standalone orders are keyed by their own ticket
        let mut by_batch: BTreeMap<Uuid, Vec<&PreparedOrder>> = BTreeMap::new();
        for o in orders {
            by_batch
                .entry(o.batch_id.unwrap_or(o.ticket_id))
                .or_default()
                .push(o);
        }

        for (group, tickets) in by_batch {
            if tickets.len() > 1 {
                tracing::info!(batch_id = %group, orders = tickets.len(), "batch tickets");
            }
            for o in tickets {
                tracing::info!(
                    ticket_id = %o.ticket_id,
                    market_id = %o.request.market_id,
                    token_id = %o.request.token_id,
                    side = %o.request.side,
                    price = %o.request.price,
                    shares = %o.request.size,
                    notional = %o.request.notional_usd(),
                    order_type = %o.order_type,
                    requires_confirmation = o.requires_confirmation,
                    "ticket"
                );
            }
        }

        orders.len()
    }
}
