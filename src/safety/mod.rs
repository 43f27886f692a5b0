//! Pre-trade safety engine: order, position and book snapshots plus the
//! limits they are checked against. Everything here is pure.

mod limits;
mod types;

pub use limits::SafetyLimits;
pub use types::{MarketData, OrderRequest, Position};
