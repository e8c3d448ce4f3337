//! Summary statistics over a trend series.

use crate::models::Sample;
use serde::{Deserialize, Serialize};

/// Min, max, mean and endpoints of a non-empty trend series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    /// Number of points.
    pub count: usize,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Value of the oldest point.
    pub first: f64,
    /// Value of the newest point.
    pub last: f64,
}

impl TrendSummary {
    /// Summarises an ascending trend series. Returns `None` when empty.
    ///
    /// # Example
    ///
    /// ```
    /// use shared::analysis::TrendSummary;
    /// use shared::models::{MetricKind, Sample};
    ///
    /// let trend = vec![
    ///     Sample::now(MetricKind::HeartRate, 70.0),
    ///     Sample::now(MetricKind::HeartRate, 80.0),
    /// ];
    /// let summary = TrendSummary::from_samples(&trend).unwrap();
    /// assert_eq!(summary.range(), (70.0, 80.0));
    /// ```
    #[must_use]
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        let first = samples.first()?.value;
        let last = samples.last()?.value;

        let (min, max, sum) = samples.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), s| (min.min(s.value), max.max(s.value), sum + s.value),
        );

        #[allow(clippy::cast_precision_loss)]
        let mean = sum / samples.len() as f64;

        Some(Self {
            count: samples.len(),
            min,
            max,
            mean,
            first,
            last,
        })
    }

    /// Returns `(min, max)`.
    #[must_use]
    pub const fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Returns `last - first`.
    #[must_use]
    pub fn delta(&self) -> f64 {
        self.last - self.first
    }

}
