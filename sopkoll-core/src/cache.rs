//! Time-based cache gate that wraps a schedule source.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::model::{AddressQuery, ScheduleSnapshot};
use crate::ports::{FetchError, ScheduleSource};

#[derive(Debug, Clone)]
/// The most recently fetched snapshot plus its fetch timestamp.
///
/// Exactly one entry exists per gate at a time. A new successful fetch
/// replaces it atomically; a failed fetch never touches it.
struct CacheEntry {
    snapshot: Arc<ScheduleSnapshot>,
    fetched_at: DateTime<Utc>,
}

/// Freshness gate in front of a [`ScheduleSource`].
///
/// Repeated reads within the freshness interval reuse the last successful
/// snapshot instead of issuing a new upstream request. The check-and-refresh
/// sequence runs under an async mutex, so concurrent callers observing a
/// stale entry coalesce into a single outbound fetch and all receive the
/// same snapshot.
pub struct CacheGate {
    source: Arc<dyn ScheduleSource>,
    address: AddressQuery,
    freshness: Duration,
    entry: Mutex<Option<CacheEntry>>,
}

impl CacheGate {
    /// Create a gate for one address with the given freshness interval.
    #[must_use]
    pub fn new(source: Arc<dyn ScheduleSource>, address: AddressQuery, freshness: Duration) -> Self {
        Self {
            source,
            address,
            freshness,
            entry: Mutex::new(None),
        }
    }

    /// The address this gate is bound to.
    #[must_use]
    pub fn address(&self) -> &AddressQuery {
        &self.address
    }

    /// Return the current schedule, fetching only when the cached entry is
    /// missing or older than the freshness interval.
    ///
    /// # Errors
    ///
    /// Propagates the source's [`FetchError`] when a refresh is needed and
    /// fails. Any existing stale entry is left intact so callers can still
    /// fall back to [`last_known`](Self::last_known).
    pub async fn get_schedule(&self, now: DateTime<Utc>) -> Result<Arc<ScheduleSnapshot>, FetchError> {
        let mut guard = self.entry.lock().await;

        if let Some(entry) = guard.as_ref()
            && now - entry.fetched_at < self.freshness
        {
            debug!(address = %self.address, age_secs = (now - entry.fetched_at).num_seconds(), "serving cached schedule");
            return Ok(Arc::clone(&entry.snapshot));
        }

        Self::refresh_locked(&self.source, &self.address, &mut guard, now).await
    }

    /// Fetch unconditionally, bypassing the freshness check.
    ///
    /// Runs under the same lock as [`get_schedule`](Self::get_schedule) and
    /// shares its failure semantics: a failed fetch leaves the previous
    /// entry in place.
    ///
    /// # Errors
    ///
    /// Propagates the source's [`FetchError`].
    pub async fn refresh(&self, now: DateTime<Utc>) -> Result<Arc<ScheduleSnapshot>, FetchError> {
        let mut guard = self.entry.lock().await;
        Self::refresh_locked(&self.source, &self.address, &mut guard, now).await
    }

    /// The latest snapshot regardless of staleness, if any fetch ever
    /// succeeded.
    pub async fn last_known(&self) -> Option<Arc<ScheduleSnapshot>> {
        self.entry
            .lock()
            .await
            .as_ref()
            .map(|entry| Arc::clone(&entry.snapshot))
    }

    /// Timestamp of the last successful fetch, if any.
    pub async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.entry.lock().await.as_ref().map(|entry| entry.fetched_at)
    }

    // Caller holds the entry lock; that lock is what guarantees at most one
    // in-flight upstream fetch per gate.
    async fn refresh_locked(
        source: &Arc<dyn ScheduleSource>,
        address: &AddressQuery,
        guard: &mut Option<CacheEntry>,
        now: DateTime<Utc>,
    ) -> Result<Arc<ScheduleSnapshot>, FetchError> {
        debug!(address = %address, "refreshing schedule from source");
        let snapshot = Arc::new(source.fetch(address).await?);
        *guard = Some(CacheEntry {
            snapshot: Arc::clone(&snapshot),
            fetched_at: now,
        });
        Ok(snapshot)
    }
}
