//! Display unit conversion.
//!
//! Values are stored in canonical units (Celsius, kilometers) and converted
//! only when presented. Nothing here writes back into the metric store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kilometers to miles factor.
pub const MILES_PER_KILOMETER: f64 = 0.621_371;

/// Converts Celsius to Fahrenheit.
///
/// ```
/// assert!((shared::units::celsius_to_fahrenheit(100.0) - 212.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Converts Fahrenheit to Celsius.
#[must_use]
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Converts kilometers to miles.
#[must_use]
pub fn km_to_miles(km: f64) -> f64 {
    km * MILES_PER_KILOMETER
}

/// Converts miles to kilometers.
#[must_use]
pub fn miles_to_km(miles: f64) -> f64 {
    miles / MILES_PER_KILOMETER
}

/// Error returned when a unit name cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown unit: '{0}'")]
pub struct UnknownUnitError(pub String);

/// Temperature display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    /// Degrees Celsius (canonical).
    #[default]
    Celsius,
    /// Degrees Fahrenheit.
    Fahrenheit,
}

impl TemperatureUnit {
    /// Returns the unit symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }

    /// Converts a Celsius value into this unit.
    #[must_use]
    pub fn from_celsius(self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius_to_fahrenheit(celsius),
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl std::str::FromStr for TemperatureUnit {
    type Err = UnknownUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" | "celsius" | "°c" => Ok(Self::Celsius),
            "f" | "fahrenheit" | "°f" => Ok(Self::Fahrenheit),
            _ => Err(UnknownUnitError(s.to_string())),
        }
    }
}

/// Distance display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    /// Kilometers (canonical).
    #[default]
    #[serde(rename = "km")]
    Kilometers,
    /// Statute miles.
    Miles,
}

impl DistanceUnit {
    /// Returns the unit label.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Kilometers => "km",
            Self::Miles => "miles",
        }
    }

    /// Converts a kilometer value into this unit.
    #[must_use]
    pub fn from_km(self, km: f64) -> f64 {
        match self {
            Self::Kilometers => km,
            Self::Miles => km_to_miles(km),
        }
    }
}

impl std::fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl std::str::FromStr for DistanceUnit {
    type Err = UnknownUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "km" | "kilometers" | "kilometres" => Ok(Self::Kilometers),
            "mi" | "mile" | "miles" => Ok(Self::Miles),
            _ => Err(UnknownUnitError(s.to_string())),
        }
    }
}

/// Display unit preferences for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitPreferences {
    /// Preferred temperature unit.
    pub temperature: TemperatureUnit,
    /// Preferred distance unit.
    pub distance: DistanceUnit,
}

impl UnitPreferences {
    /// Creates a new set of preferences.
    #[must_use]
    pub const fn new(temperature: TemperatureUnit, distance: DistanceUnit) -> Self {
        Self {
            temperature,
            distance,
        }
    }

    /// Converts a canonical Celsius value for display.
    #[must_use]
    pub fn display_temperature(&self, celsius: f64) -> f64 {
        self.temperature.from_celsius(celsius)
    }

    /// Converts a canonical kilometer value for display.
    #[must_use]
    pub fn display_distance(&self, km: f64) -> f64 {
        self.distance.from_km(km)
    }

    /// Formats a temperature with one decimal and the unit symbol.
    #[must_use]
    pub fn format_temperature(&self, celsius: f64) -> String {
        format!("{:.1}{}", self.display_temperature(celsius), self.temperature)
    }

    /// Formats a distance with two decimals and the unit label.
    #[must_use]
    pub fn format_distance(&self, km: f64) -> String {
        format!("{:.2} {}", self.display_distance(km), self.distance)
    }
}
