//! Polling lifecycle tests.
//!
//! Tests cover:
//! - Idempotent start and stop
//! - In-flight fetches landing after stop
//! - Overlapping batches when fetches outlast the interval
//! - Last-completion-wins ordering of latest values

use shared::models::MetricKind;
use std::time::Duration;

use super::common::{hr, settle, test_context};

#[tokio::test(start_paused = true)]
async fn test_start_twice_issues_one_batch() {
    let (ctx, source) = test_context();
    let poller = ctx.poller();

    assert!(poller.start(&[MetricKind::HeartRate], Duration::from_secs(10)));
    assert!(!poller.start(&[MetricKind::HeartRate], Duration::from_secs(10)));
    settle().await;

    assert_eq!(source.latest_queries(MetricKind::HeartRate), 1);
    assert_eq!(source.trend_queries(MetricKind::HeartRate), 1);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(source.latest_queries(MetricKind::HeartRate), 2);
}

#[tokio::test(start_paused = true)]
async fn test_stop_prevents_further_batches() {
    let (ctx, source) = test_context();
    let poller = ctx.poller();

    poller.start(&[MetricKind::Steps], Duration::from_secs(10));
    settle().await;
    assert!(poller.stop());

    tokio::time::sleep(Duration::from_secs(60)).await;

    assert!(!poller.is_polling());
    assert_eq!(poller.ticks(), 1);
    assert_eq!(source.latest_queries(MetricKind::Steps), 1);
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_stop_issues_new_batch() {
    let (ctx, source) = test_context();
    let poller = ctx.poller();

    poller.start(&[MetricKind::Calories], Duration::from_secs(10));
    poller.stop();
    assert!(poller.start(&[MetricKind::Calories], Duration::from_secs(10)));
    settle().await;

    assert_eq!(poller.ticks(), 2);
    assert_eq!(source.latest_queries(MetricKind::Calories), 2);
}

#[tokio::test(start_paused = true)]
#[allow(clippy::float_cmp)]
async fn test_in_flight_fetch_lands_after_stop() {
    let (ctx, source) = test_context();
    source.set_latest(hr(10, 0, 71.0));
    source.set_latency(Duration::from_secs(5));

    let poller = ctx.poller();
    poller.start(&[MetricKind::HeartRate], Duration::from_secs(10));
    settle().await;
    poller.stop();
    assert!(ctx.snapshot(MetricKind::HeartRate).unwrap().latest.is_none());

    tokio::time::sleep(Duration::from_secs(6)).await;

    let snapshot = ctx.snapshot(MetricKind::HeartRate).unwrap();
    assert_eq!(snapshot.latest_value(), Some(71.0));
}

#[tokio::test(start_paused = true)]
async fn test_slow_fetches_do_not_delay_ticks() {
    let (ctx, source) = test_context();
    source.set_latest(hr(10, 0, 68.0));
    source.set_latency(Duration::from_secs(25));

    let poller = ctx.poller();
    poller.start(&[MetricKind::HeartRate], Duration::from_secs(10));
    settle().await;
    tokio::time::sleep(Duration::from_secs(20)).await;

    // Three batches issued, none answered yet.
    assert_eq!(source.latest_queries(MetricKind::HeartRate), 3);
    assert!(ctx.snapshot(MetricKind::HeartRate).unwrap().latest.is_none());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(source.latest_queries(MetricKind::HeartRate), 4);
    assert!(ctx.snapshot(MetricKind::HeartRate).unwrap().latest.is_some());
}

#[tokio::test(start_paused = true)]
#[allow(clippy::float_cmp)]
async fn test_last_completed_fetch_wins() {
    let (ctx, source) = test_context();
    source.set_latest(hr(10, 0, 70.0));
    source.set_latency(Duration::from_secs(15));

    let poller = ctx.poller();
    poller.start(&[MetricKind::HeartRate], Duration::from_secs(10));
    settle().await;

    source.set_latency(Duration::ZERO);
    source.set_latest(hr(10, 10, 80.0));

    // The second tick answers at 10s with the newer reading.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(
        ctx.snapshot(MetricKind::HeartRate).unwrap().latest_value(),
        Some(80.0)
    );

    // The first fetch completes at 15s and overwrites it.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(
        ctx.snapshot(MetricKind::HeartRate).unwrap().latest_value(),
        Some(70.0)
    );

    poller.stop();
}

#[tokio::test(start_paused = true)]
async fn test_screens_poll_independently() {
    let (ctx, source) = test_context();
    let heart_screen = ctx.poller();
    let activity_screen = ctx.poller();

    heart_screen.start(&[MetricKind::HeartRate], Duration::from_secs(10));
    activity_screen.start(&[MetricKind::Steps, MetricKind::Distance], Duration::from_secs(30));
    settle().await;
    heart_screen.stop();

    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(source.latest_queries(MetricKind::HeartRate), 1);
    assert_eq!(source.latest_queries(MetricKind::Steps), 2);
    assert_eq!(source.latest_queries(MetricKind::Distance), 2);
    assert!(activity_screen.is_polling());
}
