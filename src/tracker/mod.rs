//! Usage/density tracking and the rebalancing feedback loop.
//!
//! `history` keeps the bounded selection log, `stats` derives the aggregate
//! distribution metrics and `rebalance` adjusts zone weights from them.

mod history;
mod rebalance;
mod stats;

pub use history::{DistributionHistory, DistributionHistoryEntry};
pub use rebalance::{RebalanceReport, rebalance};
pub use stats::{
    DistributionStats, ZoneTypeCounts, balance_score, center_utilization, is_over_dense,
};
