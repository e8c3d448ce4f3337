//! Retention configuration for trend series.
//!
//! Each metric kind keeps a bounded trend window in memory. The bound is a
//! maximum number of points and an optional maximum lookback measured back
//! from the newest sample of the window.

use crate::models::MetricKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default maximum number of points kept per trend series.
pub const DEFAULT_MAX_POINTS: usize = 50;

/// Default heart-rate lookback window (6 hours).
pub const DEFAULT_HEART_RATE_LOOKBACK: Duration = Duration::from_secs(6 * 60 * 60);

/// Default lookback window for cumulative kinds (24 hours).
pub const DEFAULT_DAILY_LOOKBACK: Duration = Duration::from_secs(24 * 60 * 60);

/// Retention policy for a single metric kind's trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// The kind this policy applies to.
    pub kind: MetricKind,
    /// Maximum number of points kept.
    pub max_points: usize,
    /// Maximum lookback. `None` keeps points of any age and disables trend
    /// queries for the kind.
    pub max_age: Option<Duration>,
}

impl RetentionPolicy {
    /// Creates a new retention policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use shared::config::RetentionPolicy;
    /// use shared::models::MetricKind;
    /// use std::time::Duration;
    ///
    /// let policy = RetentionPolicy::new(MetricKind::HeartRate, 50, Some(Duration::from_secs(3600)));
    /// assert_eq!(policy.max_points, 50);
    /// assert!(policy.tracks_trend());
    /// ```
    #[must_use]
    pub const fn new(kind: MetricKind, max_points: usize, max_age: Option<Duration>) -> Self {
        Self {
            kind,
            max_points,
            max_age,
        }
    }

    /// Returns true if trend queries should be issued for this kind.
    #[must_use]
    pub const fn tracks_trend(&self) -> bool {
        self.max_age.is_some()
    }

    /// Returns the lookback as a `chrono` duration, if any.
    #[must_use]
    pub fn max_age_chrono(&self) -> Option<chrono::Duration> {
        self.max_age
            .and_then(|age| chrono::Duration::from_std(age).ok())
    }

    /// Validates the retention policy.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `max_points` is zero
    /// - `max_age` is zero
    pub fn validate(&self) -> Result<(), String> {
        if self.max_points == 0 {
            return Err(format!("{}: max_points must be greater than zero", self.kind));
        }
        if self.max_age.is_some_and(|age| age.is_zero()) {
            return Err(format!("{}: max_age must be greater than zero", self.kind));
        }
        Ok(())
    }
}

/// Retention configuration for every tracked kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Policy for heart rate.
    pub heart_rate: RetentionPolicy,
    /// Policy for steps.
    pub steps: RetentionPolicy,
    /// Policy for calories.
    pub calories: RetentionPolicy,
    /// Policy for distance.
    pub distance: RetentionPolicy,
}

impl RetentionConfig {
    /// Creates a configuration with the same point cap for every kind, the
    /// given heart-rate lookback, and a daily lookback for cumulative kinds.
    ///
    /// # Examples
    ///
    /// ```
    /// use shared::config::RetentionConfig;
    /// use shared::models::MetricKind;
    /// use std::time::Duration;
    ///
    /// let config = RetentionConfig::new(20, Duration::from_secs(3600));
    /// assert_eq!(config.get_policy(MetricKind::Steps).max_points, 20);
    /// ```
    #[must_use]
    pub const fn new(max_points: usize, heart_rate_lookback: Duration) -> Self {
        Self {
            heart_rate: RetentionPolicy::new(
                MetricKind::HeartRate,
                max_points,
                Some(heart_rate_lookback),
            ),
            steps: RetentionPolicy::new(MetricKind::Steps, max_points, Some(DEFAULT_DAILY_LOOKBACK)),
            calories: RetentionPolicy::new(
                MetricKind::Calories,
                max_points,
                Some(DEFAULT_DAILY_LOOKBACK),
            ),
            distance: RetentionPolicy::new(
                MetricKind::Distance,
                max_points,
                Some(DEFAULT_DAILY_LOOKBACK),
            ),
        }
    }

    /// Validates all retention policies.
    ///
    /// # Errors
    ///
    /// Returns an error if any policy is invalid.
    pub fn validate(&self) -> Result<(), String> {
        for kind in MetricKind::ALL {
            self.get_policy(kind).validate()?;
        }
        Ok(())
    }

    /// Gets the retention policy for a kind.
    #[must_use]
    pub const fn get_policy(&self, kind: MetricKind) -> &RetentionPolicy {
        match kind {
            MetricKind::HeartRate => &self.heart_rate,
            MetricKind::Steps => &self.steps,
            MetricKind::Calories => &self.calories,
            MetricKind::Distance => &self.distance,
        }
    }

    /// Replaces the retention policy for a kind.
    pub fn update_policy(&mut self, kind: MetricKind, max_points: usize, max_age: Option<Duration>) {
        let policy = RetentionPolicy::new(kind, max_points, max_age);
        match kind {
            MetricKind::HeartRate => self.heart_rate = policy,
            MetricKind::Steps => self.steps = policy,
            MetricKind::Calories => self.calories = policy,
            MetricKind::Distance => self.distance = policy,
        }
    }
}

impl Default for RetentionConfig {
    /// 50 points per kind, 6 hours of heart rate, 24 hours of everything else.
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POINTS, DEFAULT_HEART_RATE_LOOKBACK)
    }
}
