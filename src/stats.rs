use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Default)]
pub struct Stats {
    start_ms: AtomicU64,

    orders_received: AtomicU64,
    orders_prepared: AtomicU64,
    orders_rejected: AtomicU64,
    orders_failed: AtomicU64,
    confirmations_flagged: AtomicU64,
}

impl Stats {
    pub fn new(now_ms: u64) -> Arc<Self> {
        let s = Arc::new(Self::default());
        s.start_ms.store(now_ms, Ordering::Relaxed);
        s
    }

    pub fn inc_received(&self) {
        self.orders_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_prepared(&self) {
        self.orders_prepared.fetch_add(1, Ordering::Relaxed);
    }

    /// Refused by a safety limit.
    pub fn inc_rejected(&self) {
        self.orders_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Bad parameters, unknown outcome or upstream error.
    pub fn inc_failed(&self) {
        self.orders_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_confirmation(&self) {
        self.confirmations_flagged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, now_ms: u64) -> StatsSnapshot {
        let start = self.start_ms.load(Ordering::Relaxed);
        StatsSnapshot {
            now_ms,
            up_sec: now_ms.saturating_sub(start) / 1000,
            orders_received: self.orders_received.load(Ordering::Relaxed),
            orders_prepared: self.orders_prepared.load(Ordering::Relaxed),
            orders_rejected: self.orders_rejected.load(Ordering::Relaxed),
            orders_failed: self.orders_failed.load(Ordering::Relaxed),
            confirmations_flagged: self.confirmations_flagged.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub now_ms: u64,
    pub up_sec: u64,
    pub orders_received: u64,
    pub orders_prepared: u64,
    pub orders_rejected: u64,
    pub orders_failed: u64,
    pub confirmations_flagged: u64,
}
