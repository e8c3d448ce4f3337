//! PulseTemp CLI
//!
//! Command-line front end for the PulseTemp acquisition core. It runs a
//! simulated polling session against the in-memory health source and
//! exposes the unit conversion and core temperature helpers.
//!
//! # Usage
//!
//! ```bash
//! pulsetemp --help
//! pulsetemp watch --kinds heart-rate,steps --interval 10 --duration 30
//! pulsetemp convert temperature 37.2 --to fahrenheit
//! pulsetemp core-temp 72 78 85
//! ```

#![deny(unsafe_code)]

use acquisition::{Config, HealthContext, SimulatedHealthSource};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use shared::analysis::{CoreTempEstimator, Insight, Timeframe};
use shared::models::{MetricKind, Sample};
use shared::storage::{ChangedField, StoreChange};
use shared::units::{self, DistanceUnit, TemperatureUnit, UnitPreferences};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

/// PulseTemp CLI - health metric acquisition playground
#[derive(Parser)]
#[command(name = "pulsetemp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, env = "PULSETEMP_JSON_LOGS")]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulated polling session and print every store change
    Watch {
        /// Metric kinds to poll
        #[arg(
            short,
            long,
            value_delimiter = ',',
            default_value = "heart-rate,steps,calories,distance"
        )]
        kinds: Vec<MetricKind>,

        /// Seconds between polls (defaults to PULSETEMP_POLL_INTERVAL_SECS)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=3600))]
        interval: Option<u64>,

        /// Seconds to run before stopping
        #[arg(short, long, default_value_t = 30)]
        duration: u64,

        /// Print snapshots as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Convert a value between display units
    Convert {
        #[command(subcommand)]
        quantity: Quantity,
    },

    /// Estimate core body temperature from a heart-rate sequence
    CoreTemp {
        /// Heart rates in BPM, oldest first
        #[arg(required = true)]
        heart_rates: Vec<f64>,
    },
}

#[derive(Subcommand)]
enum Quantity {
    /// Convert a temperature; the input is in the other unit
    Temperature {
        /// Value to convert
        value: f64,

        /// Target unit
        #[arg(long, default_value = "fahrenheit")]
        to: TemperatureUnit,
    },

    /// Convert a distance; the input is in the other unit
    Distance {
        /// Value to convert
        value: f64,

        /// Target unit
        #[arg(long, default_value = "miles")]
        to: DistanceUnit,
    },
}

/// One printed line of a watch session in `--json` mode.
#[derive(Serialize)]
struct WatchEvent<'a> {
    change: StoreChange,
    snapshot: &'a shared::storage::MetricSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    core_temp_celsius: Option<f64>,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Some(Commands::Watch {
            kinds,
            interval,
            duration,
            json,
        }) => {
            let interval = interval.map_or_else(|| config.poll_interval(), Duration::from_secs);
            watch(&config, &kinds, interval, Duration::from_secs(duration), json).await?;
        }
        Some(Commands::Convert { quantity }) => println!("{}", convert(&quantity)),
        Some(Commands::CoreTemp { heart_rates }) => {
            for line in core_temp(&heart_rates, &config.preferences()) {
                println!("{line}");
            }
        }
        None => {
            println!("PulseTemp CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

/// Runs a simulated screen session until `duration` elapses or Ctrl-C.
async fn watch(
    config: &Config,
    kinds: &[MetricKind],
    interval: Duration,
    duration: Duration,
    json: bool,
) -> Result<()> {
    let source = SimulatedHealthSource::with_demo_data(Utc::now());
    let ctx = HealthContext::from_config(source.clone(), config)?;
    let preferences = *ctx.preferences();
    let mut changes = ctx.store().subscribe();

    if !ctx.authorize().await {
        tracing::warn!("Continuing without health data access");
    }

    let drift = tokio::spawn(drift_readings(source, interval));
    let poller = ctx.poller();
    poller.start(kinds, interval);

    let mut estimator = CoreTempEstimator::new();
    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
            received = changes.recv() => match received {
                Ok(change) => {
                    let snapshot = ctx.snapshot(change.kind)?;
                    let core_temp = match (change.kind, change.field, snapshot.latest_value()) {
                        (MetricKind::HeartRate, ChangedField::Latest, Some(bpm)) => {
                            Some(estimator.update(bpm))
                        }
                        _ => None,
                    };

                    if json {
                        let event = WatchEvent {
                            change,
                            snapshot: &snapshot,
                            core_temp_celsius: core_temp,
                        };
                        println!("{}", serde_json::to_string(&event)?);
                    } else {
                        println!("{}", describe_change(change, &snapshot, &preferences));
                        if let Some(celsius) = core_temp {
                            println!("  core temperature {}", preferences.format_temperature(celsius));
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Store change notifications dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    poller.stop();
    drift.abort();

    if !json {
        let core_temp =
            Insight::for_core_temp(estimator.recent_estimates(), &preferences, Timeframe::Day);
        for insight in core_temp.into_iter().chain(ctx.insights(Timeframe::Day)?) {
            println!("{insight}");
        }
    }
    Ok(())
}

/// Moves the simulated readings forward once per interval so each poll has
/// something new to report.
async fn drift_readings(source: SimulatedHealthSource, interval: Duration) {
    let interval = interval.max(acquisition::poller::MIN_POLL_INTERVAL);
    let mut tick = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    let mut step = 0_u32;
    let mut totals = [
        (MetricKind::Steps, 7680.0, 55.0),
        (MetricKind::Calories, 504.0, 3.5),
        (MetricKind::Distance, 5.4, 0.04),
    ];

    loop {
        tick.tick().await;
        step += 1;
        let now = Utc::now();

        let bpm = 70.0 + f64::from((step * 7) % 15);
        source.set_latest(Sample::new(MetricKind::HeartRate, bpm, now));

        for (kind, total, per_step) in &mut totals {
            *total += *per_step;
            source.set_latest(Sample::new(*kind, *total, now));
        }
    }
}

fn describe_change(
    change: StoreChange,
    snapshot: &shared::storage::MetricSnapshot,
    preferences: &UnitPreferences,
) -> String {
    match change.field {
        ChangedField::Latest => {
            let value = snapshot
                .latest_value()
                .map_or_else(|| "-".to_string(), |v| format_value(change.kind, v, preferences));
            format!("{:<10} latest {value}", change.kind.as_str())
        }
        ChangedField::Trend => {
            let range = match (snapshot.trend.first(), snapshot.trend.last()) {
                (Some(first), Some(last)) => format!(
                    " ({} .. {})",
                    first.timestamp.format("%H:%M"),
                    last.timestamp.format("%H:%M")
                ),
                _ => String::new(),
            };
            format!(
                "{:<10} trend  {} points{range}",
                change.kind.as_str(),
                snapshot.trend.len()
            )
        }
    }
}

fn format_value(kind: MetricKind, value: f64, preferences: &UnitPreferences) -> String {
    match kind {
        MetricKind::Distance => preferences.format_distance(value),
        MetricKind::HeartRate | MetricKind::Steps | MetricKind::Calories => {
            format!("{value:.0} {}", kind.unit().symbol())
        }
    }
}

fn convert(quantity: &Quantity) -> String {
    match *quantity {
        Quantity::Temperature { value, to } => {
            let (from, result) = match to {
                TemperatureUnit::Fahrenheit => {
                    (TemperatureUnit::Celsius, units::celsius_to_fahrenheit(value))
                }
                TemperatureUnit::Celsius => {
                    (TemperatureUnit::Fahrenheit, units::fahrenheit_to_celsius(value))
                }
            };
            format!("{value}{from} = {result:.1}{to}")
        }
        Quantity::Distance { value, to } => {
            let (from, result) = match to {
                DistanceUnit::Miles => (DistanceUnit::Kilometers, units::km_to_miles(value)),
                DistanceUnit::Kilometers => (DistanceUnit::Miles, units::miles_to_km(value)),
            };
            format!("{value} {from} = {result:.2} {to}")
        }
    }
}

fn core_temp(heart_rates: &[f64], preferences: &UnitPreferences) -> Vec<String> {
    let mut estimator = CoreTempEstimator::new();
    let mut lines: Vec<String> = heart_rates
        .iter()
        .map(|&bpm| {
            let estimate = estimator.update(bpm);
            format!(
                "{bpm:>5.0} BPM -> {} (variance {:.4})",
                preferences.format_temperature(estimate),
                estimator.variance()
            )
        })
        .collect();

    if let Some(insight) =
        Insight::for_core_temp(estimator.recent_estimates(), preferences, Timeframe::Day)
    {
        lines.push(insight.to_string());
    }
    lines
}
