//! End-to-end polling scenarios.
//!
//! Tests cover:
//! - Authorize, poll, read, tick, read again
//! - Full trend replacement across ticks
//! - Reading through store change notifications

use shared::models::MetricKind;
use shared::storage::ChangedField;
use std::time::Duration;

use super::common::{hr, settle, test_context};

#[tokio::test(start_paused = true)]
#[allow(clippy::float_cmp)]
async fn test_heart_rate_screen_session() {
    let (ctx, source) = test_context();
    source.set_latest(hr(10, 10, 72.0));
    source.set_trend(MetricKind::HeartRate, vec![hr(10, 0, 70.0), hr(10, 10, 72.0)]);

    assert!(ctx.authorize().await);

    let poller = ctx.poller();
    poller.start(&[MetricKind::HeartRate], Duration::from_secs(10));
    settle().await;

    let snapshot = ctx.snapshot(MetricKind::HeartRate).unwrap();
    assert_eq!(snapshot.latest_value(), Some(72.0));
    assert_eq!(snapshot.trend, vec![hr(10, 0, 70.0), hr(10, 10, 72.0)]);

    source.set_latest(hr(10, 20, 75.0));
    source.set_trend(MetricKind::HeartRate, vec![hr(10, 10, 72.0), hr(10, 20, 75.0)]);
    tokio::time::advance(Duration::from_secs(10)).await;
    settle().await;

    let snapshot = ctx.snapshot(MetricKind::HeartRate).unwrap();
    assert_eq!(snapshot.latest_value(), Some(75.0));
    assert_eq!(snapshot.trend, vec![hr(10, 10, 72.0), hr(10, 20, 75.0)]);
    assert_eq!(poller.ticks(), 2);

    poller.stop();
}

#[tokio::test(start_paused = true)]
async fn test_empty_trend_clears_previous_window() {
    let (ctx, source) = test_context();
    source.set_trend(MetricKind::HeartRate, vec![hr(9, 0, 66.0), hr(9, 30, 68.0)]);

    let poller = ctx.poller();
    poller.start(&[MetricKind::HeartRate], Duration::from_secs(10));
    settle().await;
    assert_eq!(ctx.snapshot(MetricKind::HeartRate).unwrap().trend.len(), 2);

    source.set_trend(MetricKind::HeartRate, Vec::new());
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(ctx.snapshot(MetricKind::HeartRate).unwrap().trend.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_presentation_receives_change_notifications() {
    let (ctx, source) = test_context();
    source.set_latest(hr(10, 0, 70.0));
    source.set_trend(MetricKind::HeartRate, vec![hr(10, 0, 70.0)]);
    let mut changes = ctx.store().subscribe();

    let poller = ctx.poller();
    poller.start(&[MetricKind::HeartRate], Duration::from_secs(10));
    settle().await;

    let mut fields = Vec::new();
    while let Ok(change) = changes.try_recv() {
        assert_eq!(change.kind, MetricKind::HeartRate);
        fields.push(change.field);
    }
    fields.sort_by_key(|f| *f == ChangedField::Trend);
    assert_eq!(fields, vec![ChangedField::Latest, ChangedField::Trend]);
}

#[tokio::test(start_paused = true)]
async fn test_all_kinds_are_fetched_each_tick() {
    let (ctx, source) = test_context();

    let poller = ctx.poller();
    poller.start(&MetricKind::ALL, Duration::from_secs(10));
    settle().await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    for kind in MetricKind::ALL {
        assert_eq!(source.latest_queries(kind), 2, "{kind} latest queries");
        assert_eq!(source.trend_queries(kind), 2, "{kind} trend queries");
    }
}

#[tokio::test(start_paused = true)]
async fn test_demo_session_fills_every_kind() {
    let source = acquisition::SimulatedHealthSource::with_demo_data(chrono::Utc::now());
    let ctx = acquisition::HealthContext::new(
        source,
        shared::config::RetentionConfig::default(),
        shared::units::UnitPreferences::default(),
    )
    .unwrap();
    ctx.authorize().await;

    let poller = ctx.poller();
    poller.start(&MetricKind::ALL, Duration::from_secs(10));
    settle().await;

    for kind in MetricKind::ALL {
        let snapshot = ctx.snapshot(kind).unwrap();
        assert!(snapshot.latest.is_some(), "{kind} latest");
        assert!(!snapshot.trend.is_empty(), "{kind} trend");
    }
    assert!(!ctx.insights(shared::analysis::Timeframe::Day).unwrap().is_empty());
}
