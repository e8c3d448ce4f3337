//! Configuration module for PulseTemp.
//!
//! This module contains trend retention policies.

pub mod retention;

pub use retention::{
    RetentionConfig, RetentionPolicy, DEFAULT_DAILY_LOOKBACK, DEFAULT_HEART_RATE_LOOKBACK,
    DEFAULT_MAX_POINTS,
};
