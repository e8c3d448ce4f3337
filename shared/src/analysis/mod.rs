//! Derived values computed from stored trend series.
//!
//! Nothing in this module writes back into the metric store.

pub mod core_temp;
pub mod insight;
pub mod summary;

pub use core_temp::CoreTempEstimator;
pub use insight::{collect_insights, Insight, Timeframe};
pub use summary::TrendSummary;
