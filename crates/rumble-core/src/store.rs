//! The `MatchStore` trait — the persistence boundary for matches and
//! their detail rows.
//!
//! The trait is implemented by storage backends (e.g.
//! `rumble-store-sqlite`). The engine never issues queries beyond
//! these operations.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use crate::matches::{
  LeaderboardEntry, MatchDetail, MatchView, NewMatchDetail, TimeWindow,
};

/// Abstraction over a match store backend.
pub trait MatchStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist one match and all of its detail rows atomically.
  ///
  /// Either the match row and every detail land together, or nothing
  /// is persisted. A short batch insert is an error, not a partial
  /// write.
  fn create_match(
    &self,
    details: Vec<NewMatchDetail>,
  ) -> impl Future<Output = Result<MatchView, Self::Error>> + Send + '_;

  /// Find the detail row for `(match_id, combatant)` whose score is
  /// still non-zero. Returns `None` if the combatant never fought in
  /// the match or has already been retracted.
  fn find_active_detail<'a>(
    &'a self,
    match_id: i64,
    combatant: &'a str,
  ) -> impl Future<Output = Result<Option<MatchDetail>, Self::Error>> + Send + 'a;

  /// Increment by one the score of every detail row in `match_id`
  /// with `0 < score < ceiling`, in a single bulk update. Returns the
  /// number of rows affected.
  fn shift_scores_below(
    &self,
    match_id: i64,
    ceiling: i64,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Persist an updated score for an existing detail row. Errors if
  /// the row no longer exists.
  fn save_detail<'a>(
    &'a self,
    detail: &'a MatchDetail,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// All matches with their details, newest first. When a window is
  /// supplied the filter on `created_at` is inclusive on both bounds.
  fn list_matches(
    &self,
    window: Option<TimeWindow>,
  ) -> impl Future<Output = Result<Vec<MatchView>, Self::Error>> + Send + '_;

  /// Total score per combatant name across all matches, ordered
  /// descending by total. Retracted rows contribute zero.
  fn sum_scores(
    &self,
  ) -> impl Future<Output = Result<Vec<LeaderboardEntry>, Self::Error>> + Send + '_;
}
