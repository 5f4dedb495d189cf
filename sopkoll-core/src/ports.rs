//! Trait describing schedule source backends and their error taxonomy.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::{AddressQuery, ScheduleSnapshot, SourceMeta};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while fetching a schedule from an upstream API.
///
/// All variants are scoped to a single fetch attempt and safe to retry on the
/// next tick; none of them invalidates an already cached snapshot.
pub enum FetchError {
    /// Network layer failed or the upstream returned a non-success status.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// The configured address query carries no usable text.
    #[error("Address query is empty")]
    EmptyAddress,
    /// The upstream address search returned no matching building.
    #[error("Address not found: {0}")]
    AddressNotFound(String),
    /// The response held zero recoverable pickup entries.
    #[error("Schedule response contained no parseable pickups")]
    EmptySchedule,
    /// Internal source error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[async_trait]
/// Backend that resolves an address to a full schedule snapshot.
///
/// Implementations are stateless across invocations: one logical outbound
/// fetch per call, no internal caching. Request-frequency limiting lives in
/// the [`CacheGate`](crate::cache::CacheGate) that wraps the source.
pub trait ScheduleSource: Send + Sync {
    /// Metadata describing this source.
    fn meta(&self) -> &SourceMeta;

    /// Fetch the current schedule for the given address.
    ///
    /// Individual entries with unparsable dates are dropped rather than
    /// failing the call; a response with zero recoverable entries is an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the request fails, the address is empty
    /// or unknown, or the body yields no usable pickups.
    async fn fetch(&self, address: &AddressQuery) -> Result<ScheduleSnapshot, FetchError>;
}
