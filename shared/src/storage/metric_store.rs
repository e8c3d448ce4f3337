//! Metric storage trait and implementations.
//!
//! Provides the `MetricStore` trait holding the latest value and a bounded
//! trend series per [`MetricKind`], and an `InMemoryMetricStore`
//! implementation used for the lifetime of a session.
//!
//! Every write is a full replace. Concurrent writers for the same kind are
//! resolved by completion order: whichever write takes the lock last wins.

use crate::config::{RetentionConfig, RetentionPolicy};
use crate::models::{MetricKind, Sample};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;

/// Capacity of the change notification channel.
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Errors that can occur during metric store operations.
#[derive(Debug, Error)]
pub enum MetricStoreError {
    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on metric store")]
    LockError,

    /// The retention configuration has an unusable policy.
    #[error("Invalid retention configuration: {0}")]
    InvalidRetention(String),
}

/// Result of a write into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write replaced the stored state and subscribers were notified.
    Committed,
    /// The input carried no usable data; state and subscribers are untouched.
    Rejected,
}

impl WriteOutcome {
    /// Returns true if the write was committed.
    #[must_use]
    pub const fn is_committed(self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// Which part of a kind's entry changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangedField {
    /// The latest value was overwritten.
    Latest,
    /// The trend series was replaced.
    Trend,
}

/// Notification published after every committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreChange {
    /// The kind whose data changed.
    pub kind: MetricKind,
    /// The part that changed.
    pub field: ChangedField,
}

/// The most recently ingested value for a kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatestValue {
    /// The value in the kind's canonical unit.
    pub value: f64,
    /// When the value was observed at the source.
    pub observed_at: DateTime<Utc>,
}

/// Point-in-time view of one kind's stored data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// The kind this snapshot describes.
    pub kind: MetricKind,
    /// Latest value, absent if never fetched.
    pub latest: Option<LatestValue>,
    /// Trend series, ascending by timestamp.
    pub trend: Vec<Sample>,
}

impl MetricSnapshot {
    /// Creates an empty snapshot for a kind.
    #[must_use]
    pub const fn empty(kind: MetricKind) -> Self {
        Self {
            kind,
            latest: None,
            trend: Vec::new(),
        }
    }

    /// Returns the latest value, if any.
    #[must_use]
    pub fn latest_value(&self) -> Option<f64> {
        self.latest.map(|l| l.value)
    }

    /// Returns true if neither a latest value nor trend points are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.latest.is_none() && self.trend.is_empty()
    }
}

/// Trait for metric storage implementations.
///
/// Implementations must be thread-safe (Send + Sync). Reads never wait for
/// in-flight fetches; they return the most recently committed state.
pub trait MetricStore: Send + Sync {
    /// Overwrites the latest value for `kind`.
    ///
    /// Non-finite values are rejected without error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    fn record_latest(
        &self,
        kind: MetricKind,
        value: f64,
        observed_at: DateTime<Utc>,
    ) -> Result<WriteOutcome, MetricStoreError>;

    /// Replaces the trend series for `kind`.
    ///
    /// The input is sorted ascending, deduplicated by timestamp and truncated
    /// to the kind's retention policy. An empty input clears the series.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    fn replace_trend(
        &self,
        kind: MetricKind,
        samples: Vec<Sample>,
    ) -> Result<WriteOutcome, MetricStoreError>;

    /// Returns a snapshot of the committed state for `kind`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    fn read(&self, kind: MetricKind) -> Result<MetricSnapshot, MetricStoreError>;

    /// Subscribes to change notifications.
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}

#[derive(Debug, Default)]
struct Entry {
    latest: Option<LatestValue>,
    trend: Vec<Sample>,
}

/// In-memory metric store implementation.
#[derive(Debug)]
pub struct InMemoryMetricStore {
    entries: RwLock<HashMap<MetricKind, Entry>>,
    retention: RetentionConfig,
    changes: broadcast::Sender<StoreChange>,
}

impl InMemoryMetricStore {
    /// Creates a new empty store with default retention.
    #[must_use]
    pub fn new() -> Self {
        Self::build(RetentionConfig::default())
    }

    /// Creates a new empty store with the given retention configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MetricStoreError::InvalidRetention`] if any policy keeps
    /// zero points or has a zero lookback.
    pub fn with_retention(retention: RetentionConfig) -> Result<Self, MetricStoreError> {
        retention
            .validate()
            .map_err(MetricStoreError::InvalidRetention)?;
        Ok(Self::build(retention))
    }

    /// Creates a new in-memory metric store wrapped in an Arc.
    ///
    /// # Errors
    ///
    /// Returns an error if the retention configuration is invalid.
    pub fn new_shared(retention: RetentionConfig) -> Result<Arc<Self>, MetricStoreError> {
        Self::with_retention(retention).map(Arc::new)
    }

    fn build(retention: RetentionConfig) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            entries: RwLock::new(HashMap::new()),
            retention,
            changes,
        }
    }

    /// Returns the retention configuration.
    #[must_use]
    pub fn retention(&self) -> &RetentionConfig {
        &self.retention
    }

    fn notify(&self, kind: MetricKind, field: ChangedField) {
        // No receivers is fine: nobody is rendering.
        let _ = self.changes.send(StoreChange { kind, field });
    }
}

impl Default for InMemoryMetricStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies a retention policy to a raw trend window.
///
/// Drops malformed samples and samples of another kind, sorts ascending by
/// timestamp, keeps the first of any duplicate timestamps, trims points
/// older than the policy's lookback (measured from the newest sample), and
/// keeps the newest `max_points`.
#[must_use]
pub fn apply_retention(policy: &RetentionPolicy, samples: Vec<Sample>) -> Vec<Sample> {
    let mut trend: Vec<Sample> = samples
        .into_iter()
        .filter(|s| s.kind == policy.kind && s.is_finite())
        .collect();

    // Stable sort keeps input order among equal timestamps.
    trend.sort_by_key(|s| s.timestamp);
    trend.dedup_by_key(|s| s.timestamp);

    if let (Some(max_age), Some(newest)) = (policy.max_age_chrono(), trend.last()) {
        let cutoff = newest.timestamp - max_age;
        trend.retain(|s| s.timestamp >= cutoff);
    }

    if trend.len() > policy.max_points {
        let excess = trend.len() - policy.max_points;
        trend.drain(..excess);
    }

    trend
}

impl MetricStore for InMemoryMetricStore {
    fn record_latest(
        &self,
        kind: MetricKind,
        value: f64,
        observed_at: DateTime<Utc>,
    ) -> Result<WriteOutcome, MetricStoreError> {
        if !value.is_finite() {
            tracing::debug!(%kind, "Dropping non-finite latest value");
            return Ok(WriteOutcome::Rejected);
        }

        {
            let mut entries = self
                .entries
                .write()
                .map_err(|_| MetricStoreError::LockError)?;
            entries.entry(kind).or_default().latest = Some(LatestValue { value, observed_at });
        }

        self.notify(kind, ChangedField::Latest);
        Ok(WriteOutcome::Committed)
    }

    fn replace_trend(
        &self,
        kind: MetricKind,
        samples: Vec<Sample>,
    ) -> Result<WriteOutcome, MetricStoreError> {
        let trend = apply_retention(self.retention.get_policy(kind), samples);

        {
            let mut entries = self
                .entries
                .write()
                .map_err(|_| MetricStoreError::LockError)?;
            entries.entry(kind).or_default().trend = trend;
        }

        self.notify(kind, ChangedField::Trend);
        Ok(WriteOutcome::Committed)
    }

    fn read(&self, kind: MetricKind) -> Result<MetricSnapshot, MetricStoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| MetricStoreError::LockError)?;

        Ok(entries
            .get(&kind)
            .map_or_else(
                || MetricSnapshot::empty(kind),
                |entry| MetricSnapshot {
                    kind,
                    latest: entry.latest,
                    trend: entry.trend.clone(),
                },
            ))
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
