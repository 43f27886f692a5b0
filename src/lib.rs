//! Pre-trade safety checks and order preparation for Polymarket.

pub mod book;
pub mod config;
pub mod error;
pub mod planner;
pub mod pm;
pub mod pricing;
pub mod safety;
pub mod source;
pub mod stats;
pub mod tokens;
pub mod types;
