//! Storage traits and implementations.
//!
//! This module provides the session cache of health metrics. The `MetricStore`
//! trait defines the interface, allowing the polling layer and the
//! presentation layer to share one store through an `Arc`.

pub mod metric_store;

pub use metric_store::{
    apply_retention, ChangedField, InMemoryMetricStore, LatestValue, MetricSnapshot, MetricStore,
    MetricStoreError, StoreChange, WriteOutcome,
};
