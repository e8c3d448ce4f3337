//! Session context.
//!
//! One [`HealthContext`] is built at application start and handed to every
//! screen. It owns the health source, the session metric store, the trend
//! retention policy and the user's display unit preferences, and it
//! remembers the outcome of the one-time authorization request.

use crate::config::Config;
use crate::poller::PollingController;
use crate::source::HealthSource;
use serde::{Deserialize, Serialize};
use shared::analysis::{collect_insights, Insight, Timeframe};
use shared::config::RetentionConfig;
use shared::models::MetricKind;
use shared::storage::{InMemoryMetricStore, MetricSnapshot, MetricStore, MetricStoreError};
use shared::units::UnitPreferences;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Outcome of the session's authorization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationState {
    /// `authorize` has not completed yet.
    NotRequested,
    /// Read access was granted.
    Granted,
    /// Read access was refused or the source is unavailable.
    Denied,
}

/// Shared state for one application session.
///
/// Cloning is cheap and every clone refers to the same store and the same
/// authorization outcome.
pub struct HealthContext<S: HealthSource> {
    source: Arc<S>,
    store: Arc<dyn MetricStore>,
    retention: RetentionConfig,
    preferences: UnitPreferences,
    authorization: Arc<OnceCell<bool>>,
}

impl<S: HealthSource> Clone for HealthContext<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            store: Arc::clone(&self.store),
            retention: self.retention.clone(),
            preferences: self.preferences,
            authorization: Arc::clone(&self.authorization),
        }
    }
}

impl<S: HealthSource> HealthContext<S> {
    /// Creates a context with an in-memory store using `retention`.
    ///
    /// # Errors
    ///
    /// Returns [`MetricStoreError::InvalidRetention`] if a policy keeps zero
    /// points or has a zero lookback.
    pub fn new(
        source: S,
        retention: RetentionConfig,
        preferences: UnitPreferences,
    ) -> Result<Self, MetricStoreError> {
        let store = InMemoryMetricStore::new_shared(retention.clone())?;
        Ok(Self::with_store(Arc::new(source), store, retention, preferences))
    }

    /// Creates a context from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured retention is invalid.
    pub fn from_config(source: S, config: &Config) -> Result<Self, MetricStoreError> {
        Self::new(source, config.retention(), config.preferences())
    }

    /// Creates a context around an existing store.
    pub fn with_store(
        source: Arc<S>,
        store: Arc<dyn MetricStore>,
        retention: RetentionConfig,
        preferences: UnitPreferences,
    ) -> Self {
        Self {
            source,
            store,
            retention,
            preferences,
            authorization: Arc::new(OnceCell::new()),
        }
    }

    /// Requests read access for every tracked kind.
    ///
    /// Only the first call contacts the source; later calls return the
    /// remembered outcome. Denial is not an error: polling still runs and
    /// simply finds no data.
    pub async fn authorize(&self) -> bool {
        *self
            .authorization
            .get_or_init(|| async {
                match self.source.request_authorization(&MetricKind::ALL).await {
                    Ok(()) => {
                        tracing::info!("Health data authorization granted");
                        true
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Health data authorization failed");
                        false
                    }
                }
            })
            .await
    }

    /// Returns true if authorization was granted.
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.authorization.get().copied().unwrap_or(false)
    }

    /// Returns the authorization outcome.
    #[must_use]
    pub fn authorization_state(&self) -> AuthorizationState {
        match self.authorization.get() {
            None => AuthorizationState::NotRequested,
            Some(true) => AuthorizationState::Granted,
            Some(false) => AuthorizationState::Denied,
        }
    }

    /// Creates an idle polling controller for a screen.
    #[must_use]
    pub fn poller(&self) -> PollingController<S> {
        PollingController::new(
            Arc::clone(&self.source),
            Arc::clone(&self.store),
            self.retention.clone(),
        )
    }

    /// Returns a reference to the metric store.
    #[must_use]
    pub fn store(&self) -> &dyn MetricStore {
        self.store.as_ref()
    }

    /// Returns a shared handle to the metric store.
    #[must_use]
    pub fn shared_store(&self) -> Arc<dyn MetricStore> {
        Arc::clone(&self.store)
    }

    /// Returns the health source.
    #[must_use]
    pub fn source(&self) -> &S {
        self.source.as_ref()
    }

    /// Returns the trend retention configuration.
    #[must_use]
    pub fn retention(&self) -> &RetentionConfig {
        &self.retention
    }

    /// Returns the display unit preferences.
    #[must_use]
    pub fn preferences(&self) -> &UnitPreferences {
        &self.preferences
    }

    /// Reads the committed state of `kind`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn snapshot(&self, kind: MetricKind) -> Result<MetricSnapshot, MetricStoreError> {
        self.store.read(kind)
    }

    /// Derives trend insights for every kind with stored trend data.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn insights(&self, timeframe: Timeframe) -> Result<Vec<Insight>, MetricStoreError> {
        let snapshots = MetricKind::ALL
            .iter()
            .map(|&kind| self.store.read(kind))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(collect_insights(
            snapshots.iter().map(|s| (s.kind, s.trend.as_slice())),
            &self.preferences,
            timeframe,
        ))
    }
}
