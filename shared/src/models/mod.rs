//! Data models for the PulseTemp health metrics core.
//!
//! This module contains the metric kinds and the sample observation type.

pub mod metric;

pub use metric::{MetricKind, MetricUnit, Sample, SampleValidationError};
