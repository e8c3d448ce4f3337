//! Scriptable in-memory health source.
//!
//! Responses are captured when a query starts and delivered after the
//! configured latency, so a slow query returns the data that was current
//! when it was issued.

use super::{FetchError, HealthSource, QueryRange};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use shared::models::{MetricKind, Sample};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct Script {
    authorization: Option<FetchError>,
    latest: HashMap<MetricKind, Result<Option<Sample>, FetchError>>,
    trend: HashMap<MetricKind, Result<Vec<Sample>, FetchError>>,
    latency: Duration,
    authorization_requests: usize,
    latest_queries: HashMap<MetricKind, usize>,
    trend_queries: HashMap<MetricKind, usize>,
}

/// In-memory [`HealthSource`] whose answers are set by the caller.
///
/// Cloning shares the script, so a test can keep a handle while the poller
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct SimulatedHealthSource {
    script: Arc<Mutex<Script>>,
}

impl SimulatedHealthSource {
    /// Creates a source that grants authorization and has no data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source pre-filled with a plausible day of data ending at
    /// `now`: a heart-rate trend every ten minutes and hourly cumulative
    /// totals for the other kinds.
    #[must_use]
    pub fn with_demo_data(now: DateTime<Utc>) -> Self {
        let source = Self::new();

        let heart_rate: Vec<Sample> = (0..36_i32)
            .map(|i| {
                let bpm = 68.0 + f64::from((i * 7) % 15);
                Sample::new(
                    MetricKind::HeartRate,
                    bpm,
                    now - ChronoDuration::minutes(i64::from(35 - i) * 10),
                )
            })
            .collect();
        if let Some(last) = heart_rate.last().copied() {
            source.set_latest(last);
        }
        source.set_trend(MetricKind::HeartRate, heart_rate);

        for (kind, per_hour) in [
            (MetricKind::Steps, 640.0),
            (MetricKind::Calories, 42.0),
            (MetricKind::Distance, 0.45),
        ] {
            let hourly: Vec<Sample> = (1..=12_i32)
                .map(|h| {
                    Sample::new(
                        kind,
                        per_hour * f64::from(h),
                        now - ChronoDuration::hours(i64::from(12 - h)),
                    )
                })
                .collect();
            if let Some(last) = hourly.last().copied() {
                source.set_latest(last);
            }
            source.set_trend(kind, hourly);
        }

        source
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes every future authorization request fail with `error`.
    pub fn deny_authorization(&self, error: FetchError) {
        self.lock().authorization = Some(error);
    }

    /// Makes future authorization requests succeed.
    pub fn grant_authorization(&self) {
        self.lock().authorization = None;
    }

    /// Sets the answer to latest-value queries for the sample's kind.
    pub fn set_latest(&self, sample: Sample) {
        self.lock().latest.insert(sample.kind, Ok(Some(sample)));
    }

    /// Makes latest-value queries for `kind` succeed with no data.
    pub fn clear_latest(&self, kind: MetricKind) {
        self.lock().latest.insert(kind, Ok(None));
    }

    /// Makes latest-value queries for `kind` fail.
    pub fn fail_latest(&self, kind: MetricKind, error: FetchError) {
        self.lock().latest.insert(kind, Err(error));
    }

    /// Sets the answer to trend queries for `kind`.
    pub fn set_trend(&self, kind: MetricKind, samples: Vec<Sample>) {
        self.lock().trend.insert(kind, Ok(samples));
    }

    /// Makes trend queries for `kind` fail.
    pub fn fail_trend(&self, kind: MetricKind, error: FetchError) {
        self.lock().trend.insert(kind, Err(error));
    }

    /// Delays every answer issued from now on by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Number of authorization requests received.
    #[must_use]
    pub fn authorization_requests(&self) -> usize {
        self.lock().authorization_requests
    }

    /// Number of latest-value queries received for `kind`.
    #[must_use]
    pub fn latest_queries(&self, kind: MetricKind) -> usize {
        self.lock().latest_queries.get(&kind).copied().unwrap_or(0)
    }

    /// Number of trend queries received for `kind`.
    #[must_use]
    pub fn trend_queries(&self, kind: MetricKind) -> usize {
        self.lock().trend_queries.get(&kind).copied().unwrap_or(0)
    }

    async fn deliver<T>(latency: Duration, response: T) -> T {
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        response
    }
}

impl HealthSource for SimulatedHealthSource {
    async fn request_authorization(&self, kinds: &[MetricKind]) -> Result<(), FetchError> {
        let (response, latency) = {
            let mut script = self.lock();
            script.authorization_requests += 1;
            let response = match &script.authorization {
                Some(error) => Err(error.clone()),
                None => Ok(()),
            };
            (response, script.latency)
        };

        tracing::debug!(kinds = kinds.len(), ok = response.is_ok(), "Simulated authorization");
        Self::deliver(latency, response).await
    }

    async fn query_latest(
        &self,
        kind: MetricKind,
        range: QueryRange,
    ) -> Result<Option<Sample>, FetchError> {
        let (response, latency) = {
            let mut script = self.lock();
            *script.latest_queries.entry(kind).or_insert(0) += 1;
            let response = script.latest.get(&kind).cloned().unwrap_or(Ok(None));
            (response, script.latency)
        };

        let response = response.map(|sample| sample.filter(|s| range.contains(s.timestamp)));
        Self::deliver(latency, response).await
    }

    async fn query_trend(
        &self,
        kind: MetricKind,
        lookback: Duration,
        max_points: usize,
    ) -> Result<Vec<Sample>, FetchError> {
        let (response, latency) = {
            let mut script = self.lock();
            *script.trend_queries.entry(kind).or_insert(0) += 1;
            let response = script.trend.get(&kind).cloned().unwrap_or(Ok(Vec::new()));
            (response, script.latency)
        };

        let response = response.map(|mut samples| {
            // Scripted trends are returned relative to their own newest point
            // so fixed test timestamps are not aged out by the wall clock.
            samples.sort_by_key(|s| s.timestamp);
            if let (Some(newest), Ok(window)) =
                (samples.last().map(|s| s.timestamp), ChronoDuration::from_std(lookback))
            {
                samples.retain(|s| s.timestamp >= newest - window);
            }
            let excess = samples.len().saturating_sub(max_points);
            samples.drain(..excess);
            samples
        });
        Self::deliver(latency, response).await
    }
}
