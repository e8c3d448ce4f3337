//! Authorization tests.
//!
//! Tests cover:
//! - One request per session, shared across clones
//! - Denial leaving polling running with an empty store
//! - Concurrent callers waiting on the same request

use acquisition::{AuthorizationState, FetchError};
use shared::models::MetricKind;
use std::time::Duration;

use super::common::{settle, test_context};

#[tokio::test]
async fn test_authorization_requested_once_per_session() {
    let (ctx, source) = test_context();
    let screen = ctx.clone();

    assert!(ctx.authorize().await);
    assert!(screen.authorize().await);

    assert_eq!(source.authorization_requests(), 1);
    assert_eq!(screen.authorization_state(), AuthorizationState::Granted);
}

#[tokio::test(start_paused = true)]
async fn test_denied_session_polls_without_data() {
    let (ctx, source) = test_context();
    source.deny_authorization(FetchError::AuthorizationDenied);
    for kind in MetricKind::ALL {
        source.fail_latest(kind, FetchError::AuthorizationDenied);
        source.fail_trend(kind, FetchError::AuthorizationDenied);
    }

    assert!(!ctx.authorize().await);

    let poller = ctx.poller();
    assert!(poller.start(&MetricKind::ALL, Duration::from_secs(10)));
    settle().await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(poller.is_polling());
    for kind in MetricKind::ALL {
        assert!(ctx.snapshot(kind).unwrap().is_empty(), "{kind} stays empty");
    }
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_authorize_shares_one_request() {
    let (ctx, source) = test_context();
    source.set_latency(Duration::from_secs(2));
    let other = ctx.clone();

    let (first, second) = tokio::join!(ctx.authorize(), other.authorize());

    assert!(first);
    assert!(second);
    assert_eq!(source.authorization_requests(), 1);
}

#[tokio::test]
async fn test_unavailable_source_counts_as_denied() {
    let (ctx, source) = test_context();
    source.deny_authorization(FetchError::SourceUnavailable("no health store".into()));

    assert!(!ctx.authorize().await);
    assert!(!ctx.is_authorized());
    assert_eq!(ctx.authorization_state(), AuthorizationState::Denied);
}
