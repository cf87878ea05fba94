//! Error types for `rumble-core`.

use thiserror::Error;

use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum Error {
  /// A match was requested with no combatant names.
  #[error("no combatants supplied")]
  EmptyRoster,

  /// The same name appeared more than once in a single match request.
  #[error("duplicate combatant name: {0:?}")]
  DuplicateName(String),

  /// A stat sheet carried no stats; the mean would divide by zero.
  #[error("combatant {name:?} has no stats to derive strength from")]
  MalformedStats { name: String },

  /// Fewer combatants resolved than were requested. The match is
  /// all-or-nothing, so nothing was persisted.
  #[error("resolved only {fetched} of {requested} combatants")]
  IncompleteFetch { requested: usize, fetched: usize },

  /// No detail row with a non-zero score for this (match, combatant)
  /// pair — the combatant never fought in the match, or was already
  /// retracted.
  #[error("no active score for combatant {combatant:?} in match {match_id}")]
  DetailNotFound { match_id: i64, combatant: String },

  #[error("source error: {0}")]
  Source(#[from] SourceError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a store backend error into [`Error::Store`].
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
