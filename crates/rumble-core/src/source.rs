//! The `StatSource` trait — the outbound boundary to the external
//! stat API.
//!
//! One network round trip per call; no retry, no caching. Batching is
//! the engine's job (it calls `fetch` once per combatant,
//! concurrently).

use std::future::Future;

use thiserror::Error;

use crate::combatant::StatSheet;

/// Failure at the stat-source boundary.
///
/// The engine swallows these per-combatant (logging them) and only
/// surfaces the aggregate shortfall; direct lookups propagate them so
/// the caller can distinguish an unknown name from an outage.
#[derive(Debug, Error)]
pub enum SourceError {
  /// The external source does not know this name.
  #[error("unknown combatant: {0:?}")]
  NotFound(String),

  /// Timeout, connection failure, unexpected status, or a response
  /// body that failed to decode.
  #[error("transport failure: {0}")]
  Transport(String),
}

/// One page of the external source's combatant index.
#[derive(Debug, Clone)]
pub struct RosterPage {
  /// Total number of combatants known to the source.
  pub count: u64,
  pub names: Vec<String>,
}

/// Abstraction over the external stat API.
pub trait StatSource: Send + Sync {
  /// Fetch the raw stat sheet for one combatant name.
  fn fetch<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<StatSheet, SourceError>> + Send + 'a;

  /// List one page of known combatant names.
  fn roster_page(
    &self,
    limit: u32,
    offset: u32,
  ) -> impl Future<Output = Result<RosterPage, SourceError>> + Send + '_;
}
