//! First-to-last trend insights shown on the trends screen.
//!
//! Each rule compares the oldest and newest point of a trend series. Core
//! temperature and distance deltas are computed in the preferred display unit
//! so thresholds and wording apply to what the user sees.

use super::summary::TrendSummary;
use crate::models::{MetricKind, Sample};
use crate::units::{DistanceUnit, TemperatureUnit, UnitPreferences};
use serde::{Deserialize, Serialize};

/// Step increase above which the insight is encouraging.
pub const STEPS_IMPROVEMENT_THRESHOLD: f64 = 500.0;

/// Calorie increase above which the insight is encouraging.
pub const CALORIES_IMPROVEMENT_THRESHOLD: f64 = 50.0;

/// Distance increase (display unit) above which the insight is encouraging.
pub const DISTANCE_IMPROVEMENT_THRESHOLD: f64 = 0.5;

/// Period an insight refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// The current day.
    #[default]
    Day,
    /// The current week.
    Week,
    /// The current month.
    Month,
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Week => write!(f, "week"),
            Self::Month => write!(f, "month"),
        }
    }
}

/// A user-facing observation about a trend series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Insight {
    /// Estimated core temperature changed between the first and last point.
    CoreTempChange {
        /// Signed change in `unit`.
        delta: f64,
        /// Display unit of `delta`.
        unit: TemperatureUnit,
        /// Period covered.
        timeframe: Timeframe,
    },
    /// Heart rate changed between the first and last point.
    HeartRateChange {
        /// Signed change in BPM.
        delta: f64,
        /// Period covered.
        timeframe: Timeframe,
    },
    /// Steps rose above the improvement threshold.
    MoreSteps {
        /// Step increase.
        delta: f64,
        /// Period covered.
        timeframe: Timeframe,
    },
    /// Steps did not rise enough.
    IncreaseSteps,
    /// Calories rose above the improvement threshold.
    MoreCalories {
        /// Calorie increase.
        delta: f64,
        /// Period covered.
        timeframe: Timeframe,
    },
    /// Calories did not rise enough.
    IncreaseActivity,
    /// Distance rose above the improvement threshold.
    MoreDistance {
        /// Increase in `unit`.
        delta: f64,
        /// Display unit of `delta`.
        unit: DistanceUnit,
        /// Period covered.
        timeframe: Timeframe,
    },
    /// Distance did not rise enough.
    IncreaseDistance,
}

impl Insight {
    /// Derives the insight for a kind's trend series. Returns `None` for an
    /// empty series.
    #[must_use]
    pub fn for_trend(
        kind: MetricKind,
        trend: &[Sample],
        preferences: &UnitPreferences,
        timeframe: Timeframe,
    ) -> Option<Self> {
        let summary = TrendSummary::from_samples(trend)?;

        let insight = match kind {
            MetricKind::HeartRate => Self::HeartRateChange {
                delta: summary.delta(),
                timeframe,
            },
            MetricKind::Steps => {
                let delta = summary.delta();
                if delta > STEPS_IMPROVEMENT_THRESHOLD {
                    Self::MoreSteps { delta, timeframe }
                } else {
                    Self::IncreaseSteps
                }
            }
            MetricKind::Calories => {
                let delta = summary.delta();
                if delta > CALORIES_IMPROVEMENT_THRESHOLD {
                    Self::MoreCalories { delta, timeframe }
                } else {
                    Self::IncreaseActivity
                }
            }
            MetricKind::Distance => {
                let delta = preferences.display_distance(summary.last)
                    - preferences.display_distance(summary.first);
                if delta > DISTANCE_IMPROVEMENT_THRESHOLD {
                    Self::MoreDistance {
                        delta,
                        unit: preferences.distance,
                        timeframe,
                    }
                } else {
                    Self::IncreaseDistance
                }
            }
        };

        Some(insight)
    }

    /// Derives the core temperature insight from a series of estimates in
    /// °C, oldest first. Returns `None` for an empty series.
    ///
    /// # Example
    ///
    /// ```
    /// use shared::analysis::{Insight, Timeframe};
    /// use shared::units::UnitPreferences;
    ///
    /// let insight =
    ///     Insight::for_core_temp([37.0, 37.5], &UnitPreferences::default(), Timeframe::Day)
    ///         .unwrap();
    /// assert_eq!(insight.to_string(), "Your core temperature increased by 0.5°C this day.");
    /// ```
    #[must_use]
    pub fn for_core_temp<I>(
        celsius: I,
        preferences: &UnitPreferences,
        timeframe: Timeframe,
    ) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut series = celsius.into_iter();
        let first = series.next()?;
        let last = series.last().unwrap_or(first);

        Some(Self::CoreTempChange {
            delta: preferences.display_temperature(last)
                - preferences.display_temperature(first),
            unit: preferences.temperature,
            timeframe,
        })
    }

    /// Returns true if the insight praises progress rather than suggesting
    /// more activity.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        matches!(
            self,
            Self::MoreSteps { .. } | Self::MoreCalories { .. } | Self::MoreDistance { .. }
        )
    }
}

impl std::fmt::Display for Insight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CoreTempChange {
                delta,
                unit,
                timeframe,
            } if *delta < 0.0 => write!(
                f,
                "Your core temperature dropped by {:.1}{unit} this {timeframe}.",
                delta.abs()
            ),
            Self::CoreTempChange {
                delta,
                unit,
                timeframe,
            } => write!(
                f,
                "Your core temperature increased by {delta:.1}{unit} this {timeframe}."
            ),
            Self::HeartRateChange { delta, timeframe } if *delta < 0.0 => write!(
                f,
                "Your heart rate dropped by {:.0} BPM this {timeframe}.",
                delta.abs()
            ),
            Self::HeartRateChange { delta, timeframe } => {
                write!(f, "Your heart rate increased by {delta:.0} BPM this {timeframe}.")
            }
            Self::MoreSteps { delta, timeframe } => write!(
                f,
                "Great job! You walked {delta:.0} more steps this {timeframe}."
            ),
            Self::IncreaseSteps => write!(f, "Try increasing your daily steps for better health."),
            Self::MoreCalories { delta, timeframe } => write!(
                f,
                "You burned {delta:.0} more calories this {timeframe}. Keep it up!"
            ),
            Self::IncreaseActivity => write!(
                f,
                "Consider increasing your activity to burn more calories."
            ),
            Self::MoreDistance {
                delta,
                unit,
                timeframe,
            } => write!(f, "You covered {delta:.2} {unit} more this {timeframe}."),
            Self::IncreaseDistance => {
                write!(f, "Try to increase your distance for better endurance.")
            }
        }
    }
}

/// Computes insights for every non-empty series, in kind order.
#[must_use]
pub fn collect_insights<'a, I>(
    series: I,
    preferences: &UnitPreferences,
    timeframe: Timeframe,
) -> Vec<Insight>
where
    I: IntoIterator<Item = (MetricKind, &'a [Sample])>,
{
    series
        .into_iter()
        .filter_map(|(kind, trend)| Insight::for_trend(kind, trend, preferences, timeframe))
        .collect()
}
