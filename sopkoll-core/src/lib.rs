//! Core types and wiring for the sopkoll waste pickup schedule provider.

/// Freshness-gated cache in front of a schedule source.
pub mod cache;
/// Read-time calculation of day-relative sensor attributes.
pub mod derive;
/// Domain models shared by all schedule sources.
pub mod model;
/// Traits describing the schedule source interface.
pub mod ports;
/// Per-address provider facade used by consumers.
pub mod provider;

pub use cache::*;
pub use derive::*;
pub use model::*;
pub use ports::*;
pub use provider::*;
