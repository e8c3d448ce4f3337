//! External health-data source interface.
//!
//! The acquisition layer talks to the platform health store only through the
//! [`HealthSource`] trait. Every operation is asynchronous and reports the
//! absence of data as a value, never as a panic.

pub mod simulated;

pub use simulated::SimulatedHealthSource;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{MetricKind, Sample};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single source operation.
///
/// The poller treats every variant the same way: the write is dropped and
/// the previously stored state is kept.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The user has not granted read access.
    #[error("Authorization denied")]
    AuthorizationDenied,

    /// The source cannot be reached or is not present on this device.
    #[error("Health source unavailable: {0}")]
    SourceUnavailable(String),

    /// The query ran but found no samples.
    #[error("No data in requested range")]
    NoDataInRange,

    /// The source returned a sample that cannot be stored.
    #[error("Malformed sample")]
    MalformedSample,
}

/// Time range of a latest-value query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryRange {
    /// The single most recent sample, for point kinds.
    MostRecent,
    /// Sum of samples in `[start, end)`, for cumulative kinds.
    Between {
        /// Inclusive start.
        start: DateTime<Utc>,
        /// Exclusive end.
        end: DateTime<Utc>,
    },
}

impl QueryRange {
    /// Returns the range used for `kind`'s latest value at `now`: the most
    /// recent sample for point kinds, start of the local day to `now` for
    /// cumulative kinds.
    #[must_use]
    pub fn for_kind(kind: MetricKind, now: DateTime<Utc>) -> Self {
        if kind.is_cumulative() {
            Self::Between {
                start: start_of_local_day(now),
                end: now,
            }
        } else {
            Self::MostRecent
        }
    }

    /// Returns true if `timestamp` falls inside the range.
    #[must_use]
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        match self {
            Self::MostRecent => true,
            Self::Between { start, end } => *start <= timestamp && timestamp < *end,
        }
    }
}

/// Midnight of `now`'s local calendar day, in UTC.
///
/// Falls back to `now` if local midnight does not exist (DST gap).
#[must_use]
pub fn start_of_local_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.with_timezone(&Local)
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
        .map_or(now, |midnight| midnight.with_timezone(&Utc))
}

/// Asynchronous access to a platform health-data store.
///
/// Implementations must be shareable across tasks; the returned futures are
/// spawned onto the Tokio runtime by the poller.
pub trait HealthSource: Send + Sync + 'static {
    /// Requests read access to `kinds`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::AuthorizationDenied`] if access was refused or
    /// [`FetchError::SourceUnavailable`] if the store does not exist.
    fn request_authorization(
        &self,
        kinds: &[MetricKind],
    ) -> impl Future<Output = Result<(), FetchError>> + Send;

    /// Queries the latest value of `kind` over `range`.
    ///
    /// `Ok(None)` means the query succeeded but nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the query cannot be answered.
    fn query_latest(
        &self,
        kind: MetricKind,
        range: QueryRange,
    ) -> impl Future<Output = Result<Option<Sample>, FetchError>> + Send;

    /// Queries up to `max_points` samples of `kind` within `lookback` of now,
    /// ascending by timestamp.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the query cannot be answered.
    fn query_trend(
        &self,
        kind: MetricKind,
        lookback: Duration,
        max_points: usize,
    ) -> impl Future<Output = Result<Vec<Sample>, FetchError>> + Send;
}
