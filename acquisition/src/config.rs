//! Acquisition configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use shared::config::RetentionConfig;
use shared::units::{DistanceUnit, TemperatureUnit, UnitPreferences};
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

/// Acquisition configuration.
///
/// Configuration values can be set via environment variables:
/// - `PULSETEMP_POLL_INTERVAL_SECS`: Seconds between polling ticks (default: 10)
/// - `PULSETEMP_TREND_MAX_POINTS`: Points kept per trend series (default: 50)
/// - `PULSETEMP_HEART_RATE_LOOKBACK_HOURS`: Heart-rate trend window (default: 6)
/// - `PULSETEMP_TEMPERATURE_UNIT`: `celsius` or `fahrenheit` (default: celsius)
/// - `PULSETEMP_DISTANCE_UNIT`: `km` or `miles` (default: km)
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct Config {
    /// Seconds between polling ticks.
    #[validate(range(min = 1, max = 3600))]
    pub poll_interval_secs: u64,
    /// Maximum points kept per trend series.
    #[validate(range(min = 1, max = 10000))]
    pub trend_max_points: usize,
    /// Heart-rate trend lookback in hours.
    #[validate(range(min = 1, max = 168))]
    pub heart_rate_lookback_hours: u64,
    /// Preferred temperature display unit.
    pub temperature_unit: TemperatureUnit,
    /// Preferred distance display unit.
    pub distance_unit: DistanceUnit,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed, or if a
    /// parsed value is out of range.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a new configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be parsed or is out of range.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            poll_interval_secs: parse_or(
                &lookup,
                "PULSETEMP_POLL_INTERVAL_SECS",
                defaults.poll_interval_secs,
            )?,
            trend_max_points: parse_or(
                &lookup,
                "PULSETEMP_TREND_MAX_POINTS",
                defaults.trend_max_points,
            )?,
            heart_rate_lookback_hours: parse_or(
                &lookup,
                "PULSETEMP_HEART_RATE_LOOKBACK_HOURS",
                defaults.heart_rate_lookback_hours,
            )?,
            temperature_unit: parse_or(
                &lookup,
                "PULSETEMP_TEMPERATURE_UNIT",
                defaults.temperature_unit,
            )?,
            distance_unit: parse_or(&lookup, "PULSETEMP_DISTANCE_UNIT", defaults.distance_unit)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Returns the polling interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Builds the trend retention configuration.
    #[must_use]
    pub const fn retention(&self) -> RetentionConfig {
        RetentionConfig::new(
            self.trend_max_points,
            Duration::from_secs(self.heart_rate_lookback_hours * 60 * 60),
        )
    }

    /// Returns the display unit preferences.
    #[must_use]
    pub const fn preferences(&self) -> UnitPreferences {
        UnitPreferences::new(self.temperature_unit, self.distance_unit)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_secs: 10,
            trend_max_points: 50,
            heart_rate_lookback_hours: 6,
            temperature_unit: TemperatureUnit::Celsius,
            distance_unit: DistanceUnit::Kilometers,
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value for {key}: '{raw}'")),
        None => Ok(default),
    }
}
