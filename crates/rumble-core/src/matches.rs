//! Persisted match types and read models.
//!
//! A match is immutable once created. Its detail rows carry the only
//! mutable field in the system — the score — and that field changes in
//! exactly one controlled way: retraction zeroes one row and shifts
//! every lower-ranked non-zero row up by one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::combatant::Combatant;

/// One ranking event. Ids are store-assigned and monotonically
/// increasing; the row is never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
  pub id:         i64,
  pub created_at: DateTime<Utc>,
}

/// One combatant's result row within a match.
///
/// A score of 0 is the retraction sentinel: the row is kept but no
/// longer contributes to the leaderboard, and cannot be retracted
/// again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDetail {
  pub id:             i64,
  pub match_id:       i64,
  pub combatant_name: String,
  pub score:          i64,
}

/// A detail row about to be inserted; ids are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMatchDetail {
  pub combatant_name: String,
  pub score:          i64,
}

/// A match together with all of its detail rows, as read back from
/// the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchView {
  pub record:  Match,
  pub details: Vec<MatchDetail>,
}

/// One combatant in final ranking order, with its assigned score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCombatant {
  pub combatant: Combatant,
  pub score:     i64,
}

/// The result of a successful match orchestration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchOutcome {
  pub record:  Match,
  /// Strongest first. Scores run `N-1` down to `0`.
  pub ranking: Vec<RankedCombatant>,
}

/// One leaderboard row: total score across all matches for one name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
  pub combatant_name: String,
  pub total_score:    i64,
}

/// Creation-time filter for match history, inclusive on both bounds.
/// History queries take `Option<TimeWindow>`: either both bounds are
/// supplied or no filter applies at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
  pub start: DateTime<Utc>,
  pub end:   DateTime<Utc>,
}
