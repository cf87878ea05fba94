//! Encoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; everything else maps
//! directly onto SQLite integers and text.

use chrono::{DateTime, Utc};
use rumble_core::matches::{Match, MatchDetail};

use crate::{Error, Result};

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// A `matches` row as read straight out of SQLite.
pub struct RawMatch {
  pub match_id:   i64,
  pub created_at: String,
}

impl RawMatch {
  pub fn into_match(self) -> Result<Match> {
    Ok(Match {
      id:         self.match_id,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// A `match_details` row as read straight out of SQLite.
pub struct RawDetail {
  pub detail_id:      i64,
  pub match_id:       i64,
  pub combatant_name: String,
  pub score:          i64,
}

impl RawDetail {
  pub fn into_detail(self) -> MatchDetail {
    MatchDetail {
      id:             self.detail_id,
      match_id:       self.match_id,
      combatant_name: self.combatant_name,
      score:          self.score,
    }
  }
}
