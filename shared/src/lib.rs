//! PulseTemp Shared Library
//!
//! This crate contains the health metric types, the session metric store,
//! unit conversion and trend analysis used by the PulseTemp acquisition
//! layer and its presentation collaborators.
//!
//! # Modules
//!
//! - [`models`] - Metric kinds and samples
//! - [`config`] - Trend retention policies
//! - [`storage`] - The per-kind latest value and trend cache
//! - [`units`] - Display unit conversion
//! - [`analysis`] - Trend summaries, insights and core temperature estimation
//!
//! # Example
//!
//! ```
//! use shared::models::MetricKind;
//! use shared::storage::{InMemoryMetricStore, MetricStore};
//!
//! let store = InMemoryMetricStore::new();
//! store
//!     .record_latest(MetricKind::HeartRate, 72.0, chrono::Utc::now())
//!     .unwrap();
//!
//! let snapshot = store.read(MetricKind::HeartRate).unwrap();
//! assert_eq!(snapshot.latest_value(), Some(72.0));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod analysis;
pub mod config;
pub mod models;
pub mod storage;
pub mod units;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
