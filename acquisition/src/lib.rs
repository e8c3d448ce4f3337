//! PulseTemp Acquisition Layer
//!
//! This crate keeps the session metric store filled from a platform
//! health-data source while a screen is visible. It handles the one-time
//! authorization request, latest-value and trend queries, and the interval
//! polling loop.
//!
//! # Architecture
//!
//! - [`source`] - The `HealthSource` interface and a scriptable simulation
//! - [`context`] - The per-session `HealthContext` shared by all screens
//! - [`poller`] - The per-screen `PollingController`
//! - [`config`] - Environment configuration
//!
//! # Example
//!
//! ```
//! use acquisition::{HealthContext, SimulatedHealthSource};
//! use shared::config::RetentionConfig;
//! use shared::models::MetricKind;
//! use shared::units::UnitPreferences;
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let source = SimulatedHealthSource::with_demo_data(chrono::Utc::now());
//!     let ctx = HealthContext::new(source, RetentionConfig::default(), UnitPreferences::default())
//!         .unwrap();
//!
//!     ctx.authorize().await;
//!     let poller = ctx.poller();
//!     poller.start(&[MetricKind::HeartRate], Duration::from_secs(10));
//!     tokio::time::sleep(Duration::from_millis(10)).await;
//!     poller.stop();
//!
//!     assert!(ctx.snapshot(MetricKind::HeartRate).unwrap().latest.is_some());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod context;
pub mod poller;
pub mod source;

pub use config::Config;
pub use context::{AuthorizationState, HealthContext};
pub use poller::{PollingController, PollingState};
pub use source::{FetchError, HealthSource, QueryRange, SimulatedHealthSource};
