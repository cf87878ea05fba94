//! Error type for `rumble-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The detail batch wrote fewer rows than were submitted. The
  /// enclosing transaction is rolled back, so no match is left
  /// behind.
  #[error("batch insert wrote {inserted} of {expected} detail rows")]
  ShortDetailInsert { expected: usize, inserted: usize },

  /// An UPDATE targeted a detail row that no longer exists.
  #[error("detail row not found: {0}")]
  DetailMissing(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
