//! Health metric data model.
//!
//! Defines the tracked [`MetricKind`]s and the immutable [`Sample`] observation
//! that flows from a health-data source into the metric store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a health measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Heart rate in beats per minute.
    HeartRate,
    /// Step count.
    Steps,
    /// Active energy burned in kilocalories.
    Calories,
    /// Walking and running distance in kilometers.
    Distance,
}

impl MetricKind {
    /// Every tracked kind, in display order.
    pub const ALL: [MetricKind; 4] = [
        MetricKind::HeartRate,
        MetricKind::Steps,
        MetricKind::Calories,
        MetricKind::Distance,
    ];

    /// Returns the canonical storage unit of this kind.
    #[must_use]
    pub const fn unit(self) -> MetricUnit {
        match self {
            Self::HeartRate => MetricUnit::BeatsPerMinute,
            Self::Steps => MetricUnit::Count,
            Self::Calories => MetricUnit::Kilocalories,
            Self::Distance => MetricUnit::Kilometers,
        }
    }

    /// Returns true if the latest value is a sum over a time range rather
    /// than a single most-recent sample.
    #[must_use]
    pub const fn is_cumulative(self) -> bool {
        !matches!(self, Self::HeartRate)
    }

    /// Returns the snake_case identifier used in configuration and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HeartRate => "heart_rate",
            Self::Steps => "steps",
            Self::Calories => "calories",
            Self::Distance => "distance",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MetricKind {
    type Err = SampleValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "heart_rate" | "heartrate" => Ok(Self::HeartRate),
            "steps" => Ok(Self::Steps),
            "calories" => Ok(Self::Calories),
            "distance" => Ok(Self::Distance),
            _ => Err(SampleValidationError::UnknownKind(s.to_string())),
        }
    }
}

/// Canonical unit a metric is stored in, independent of the display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricUnit {
    /// Beats per minute.
    BeatsPerMinute,
    /// Dimensionless count.
    Count,
    /// Kilocalories.
    Kilocalories,
    /// Kilometers.
    Kilometers,
}

impl MetricUnit {
    /// Returns the short unit symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::BeatsPerMinute => "BPM",
            Self::Count => "steps",
            Self::Kilocalories => "kcal",
            Self::Kilometers => "km",
        }
    }
}

impl std::fmt::Display for MetricUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Errors that can occur while validating a sample.
#[derive(Debug, Error, PartialEq)]
pub enum SampleValidationError {
    /// The sample value is NaN or infinite.
    #[error("Sample value for {kind} is not a finite number")]
    NonFinite {
        /// Kind of the rejected sample.
        kind: MetricKind,
    },

    /// The metric kind identifier is not recognised.
    #[error("Unknown metric kind: '{0}'")]
    UnknownKind(String),
}

/// A single timestamped observation of a [`MetricKind`].
///
/// # Example
///
/// ```
/// use shared::models::{MetricKind, Sample};
///
/// let sample = Sample::now(MetricKind::HeartRate, 72.0);
/// assert!(sample.validate().is_ok());
/// assert_eq!(sample.kind, MetricKind::HeartRate);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// The kind of measurement.
    pub kind: MetricKind,
    /// The value in the kind's canonical unit.
    pub value: f64,
    /// When the observation was made.
    pub timestamp: DateTime<Utc>,
}

impl Sample {
    /// Creates a new sample.
    #[must_use]
    pub const fn new(kind: MetricKind, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            value,
            timestamp,
        }
    }

    /// Creates a new sample stamped with the current time.
    #[must_use]
    pub fn now(kind: MetricKind, value: f64) -> Self {
        Self::new(kind, value, Utc::now())
    }

    /// Returns true if the value can be stored.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.value.is_finite()
    }

    /// Validates the sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is NaN or infinite.
    pub fn validate(&self) -> Result<(), SampleValidationError> {
        if self.is_finite() {
            Ok(())
        } else {
            Err(SampleValidationError::NonFinite { kind: self.kind })
        }
    }
}
