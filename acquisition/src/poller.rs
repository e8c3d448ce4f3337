//! Interval polling of the health source.
//!
//! A [`PollingController`] belongs to one visible screen. `start` issues a
//! fetch batch immediately and arms a repeating timer; every tick issues the
//! same batch. Each query in a batch is its own task, so slow queries never
//! delay the timer and batches from consecutive ticks may overlap. `stop`
//! disarms the timer only; queries already in flight still complete and
//! write their results.

use crate::source::{HealthSource, QueryRange};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::config::RetentionConfig;
use shared::models::MetricKind;
use shared::storage::{MetricStore, WriteOutcome};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// Shortest accepted polling interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Lifecycle state of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollingState {
    /// No timer armed.
    Idle,
    /// Timer armed; batches are issued every interval.
    Polling,
}

/// The set of queries issued on every tick.
struct FetchBatch<S: HealthSource> {
    source: Arc<S>,
    store: Arc<dyn MetricStore>,
    retention: RetentionConfig,
    kinds: Vec<MetricKind>,
}

impl<S: HealthSource> FetchBatch<S> {
    /// Spawns one latest-value task per kind and one trend task per kind
    /// whose retention policy has a lookback window.
    fn dispatch(self: &Arc<Self>) {
        let now = Utc::now();

        for &kind in &self.kinds {
            let range = QueryRange::for_kind(kind, now);
            let batch = Arc::clone(self);
            tokio::spawn(async move { batch.fetch_latest(kind, range).await });

            let policy = *self.retention.get_policy(kind);
            if let Some(lookback) = policy.max_age {
                let batch = Arc::clone(self);
                tokio::spawn(
                    async move { batch.fetch_trend(kind, lookback, policy.max_points).await },
                );
            }
        }
    }

    async fn fetch_latest(&self, kind: MetricKind, range: QueryRange) {
        let sample = match self.source.query_latest(kind, range).await {
            Ok(Some(sample)) if sample.kind == kind => sample,
            Ok(Some(sample)) => {
                tracing::debug!(%kind, returned = %sample.kind, "Ignoring sample of another kind");
                return;
            }
            Ok(None) => {
                tracing::debug!(%kind, "No latest value in range");
                return;
            }
            Err(e) => {
                tracing::debug!(%kind, error = %e, "Latest value query failed");
                return;
            }
        };

        match self.store.record_latest(kind, sample.value, sample.timestamp) {
            Ok(WriteOutcome::Committed) => {
                tracing::debug!(%kind, value = sample.value, "Latest value updated");
            }
            Ok(WriteOutcome::Rejected) => {
                tracing::debug!(%kind, "Latest value rejected as malformed");
            }
            Err(e) => tracing::warn!(%kind, error = %e, "Failed to store latest value"),
        }
    }

    async fn fetch_trend(&self, kind: MetricKind, lookback: Duration, max_points: usize) {
        let samples = match self.source.query_trend(kind, lookback, max_points).await {
            Ok(samples) => samples,
            Err(e) => {
                tracing::debug!(%kind, error = %e, "Trend query failed");
                return;
            }
        };

        let received = samples.len();
        match self.store.replace_trend(kind, samples) {
            Ok(_) => tracing::debug!(%kind, received, "Trend replaced"),
            Err(e) => tracing::warn!(%kind, error = %e, "Failed to store trend"),
        }
    }
}

/// Repeating fetch loop for one screen.
///
/// Must be started from within a Tokio runtime. Dropping the controller
/// disarms its timer.
pub struct PollingController<S: HealthSource> {
    source: Arc<S>,
    store: Arc<dyn MetricStore>,
    retention: RetentionConfig,
    timer: Mutex<Option<JoinHandle<()>>>,
    ticks: Arc<AtomicU64>,
}

impl<S: HealthSource> PollingController<S> {
    /// Creates an idle controller.
    #[must_use]
    pub fn new(source: Arc<S>, store: Arc<dyn MetricStore>, retention: RetentionConfig) -> Self {
        Self {
            source,
            store,
            retention,
            timer: Mutex::new(None),
            ticks: Arc::new(AtomicU64::new(0)),
        }
    }

    fn timer(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts polling `kinds` every `interval`.
    ///
    /// Issues the first batch immediately. Returns `false` without doing
    /// anything if the controller is already polling.
    pub fn start(&self, kinds: &[MetricKind], interval: Duration) -> bool {
        let mut timer = self.timer();
        if timer.as_ref().is_some_and(|handle| !handle.is_finished()) {
            tracing::debug!("Polling already active, ignoring start");
            return false;
        }

        let period = interval.max(MIN_POLL_INTERVAL);
        let batch = Arc::new(FetchBatch {
            source: Arc::clone(&self.source),
            store: Arc::clone(&self.store),
            retention: self.retention.clone(),
            kinds: kinds.to_vec(),
        });

        self.ticks.fetch_add(1, Ordering::SeqCst);
        batch.dispatch();

        let ticks = Arc::clone(&self.ticks);
        let handle = tokio::spawn(async move {
            let mut tick = interval_at(Instant::now() + period, period);
            loop {
                tick.tick().await;
                ticks.fetch_add(1, Ordering::SeqCst);
                batch.dispatch();
            }
        });
        *timer = Some(handle);

        tracing::info!(
            kinds = ?kinds,
            interval_secs = period.as_secs_f64(),
            "Polling started"
        );
        true
    }

    /// Stops polling. Returns `false` if the controller was idle.
    ///
    /// Queries already in flight are not cancelled.
    pub fn stop(&self) -> bool {
        match self.timer().take() {
            Some(handle) => {
                handle.abort();
                tracing::info!(ticks = self.ticks(), "Polling stopped");
                true
            }
            None => false,
        }
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PollingState {
        match self.timer().as_ref() {
            Some(handle) if !handle.is_finished() => PollingState::Polling,
            _ => PollingState::Idle,
        }
    }

    /// Returns true if the timer is armed.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.state() == PollingState::Polling
    }

    /// Number of batches issued since the controller was created.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}

impl<S: HealthSource> Drop for PollingController<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.timer().take() {
            handle.abort();
        }
    }
}
