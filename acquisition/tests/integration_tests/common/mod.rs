//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality used across all integration tests,
//! including session setup and fixed-time sample builders.

use acquisition::{HealthContext, SimulatedHealthSource};
use chrono::{DateTime, TimeZone, Utc};
use shared::config::RetentionConfig;
use shared::models::{MetricKind, Sample};
use shared::units::UnitPreferences;
use std::time::Duration;

/// Creates a session context around a fresh simulated source.
///
/// # Returns
///
/// A tuple containing the context and a handle to the source's script.
pub fn test_context() -> (HealthContext<SimulatedHealthSource>, SimulatedHealthSource) {
    let source = SimulatedHealthSource::new();
    let ctx = HealthContext::new(
        source.clone(),
        RetentionConfig::default(),
        UnitPreferences::default(),
    )
    .unwrap();
    (ctx, source)
}

/// Returns 2024-01-15 at `hour:minute` UTC.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, hour, minute, 0).unwrap()
}

/// Builds a heart-rate sample at `hour:minute`.
pub fn hr(hour: u32, minute: u32, bpm: f64) -> Sample {
    Sample::new(MetricKind::HeartRate, bpm, at(hour, minute))
}

/// Lets spawned fetch tasks run to completion without reaching the next tick.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
