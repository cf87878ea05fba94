//! [`SqliteStore`] — the SQLite implementation of [`MatchStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use rumble_core::{
  matches::{
    LeaderboardEntry, Match, MatchDetail, MatchView, NewMatchDetail,
    TimeWindow,
  },
  store::MatchStore,
};

use crate::{
  Error, Result,
  encode::{RawDetail, RawMatch, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rumble match store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── MatchStore impl ─────────────────────────────────────────────────────────

impl MatchStore for SqliteStore {
  type Error = Error;

  async fn create_match(
    &self,
    details: Vec<NewMatchDetail>,
  ) -> Result<MatchView> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let expected = details.len();

    // Match row and detail batch share one transaction: a short batch
    // returns without committing, which rolls everything back.
    let outcome: (Option<(i64, Vec<RawDetail>)>, usize) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          "INSERT INTO matches (created_at) VALUES (?1)",
          rusqlite::params![at_str],
        )?;
        let match_id = tx.last_insert_rowid();

        let mut inserted = 0usize;
        let mut rows = Vec::with_capacity(details.len());
        for d in &details {
          inserted += tx.execute(
            "INSERT INTO match_details (match_id, combatant_name, score)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![match_id, d.combatant_name, d.score],
          )?;
          rows.push(RawDetail {
            detail_id:      tx.last_insert_rowid(),
            match_id,
            combatant_name: d.combatant_name.clone(),
            score:          d.score,
          });
        }

        if inserted != details.len() {
          return Ok((None, inserted));
        }

        tx.commit()?;
        Ok((Some((match_id, rows)), inserted))
      })
      .await?;

    match outcome {
      (Some((match_id, rows)), _) => Ok(MatchView {
        record:  Match { id: match_id, created_at },
        details: rows.into_iter().map(RawDetail::into_detail).collect(),
      }),
      (None, inserted) => Err(Error::ShortDetailInsert { expected, inserted }),
    }
  }

  async fn find_active_detail(
    &self,
    match_id: i64,
    combatant: &str,
  ) -> Result<Option<MatchDetail>> {
    let combatant = combatant.to_string();

    let raw: Option<RawDetail> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT detail_id, match_id, combatant_name, score
               FROM match_details
               WHERE match_id = ?1 AND combatant_name = ?2 AND score != 0",
              rusqlite::params![match_id, combatant],
              |row| {
                Ok(RawDetail {
                  detail_id:      row.get(0)?,
                  match_id:       row.get(1)?,
                  combatant_name: row.get(2)?,
                  score:          row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawDetail::into_detail))
  }

  async fn shift_scores_below(
    &self,
    match_id: i64,
    ceiling: i64,
  ) -> Result<usize> {
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE match_details SET score = score + 1
           WHERE match_id = ?1 AND score > 0 AND score < ?2",
          rusqlite::params![match_id, ceiling],
        )?)
      })
      .await?;

    Ok(affected)
  }

  async fn save_detail(&self, detail: &MatchDetail) -> Result<()> {
    let detail_id = detail.id;
    let score = detail.score;

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE match_details SET score = ?1 WHERE detail_id = ?2",
          rusqlite::params![score, detail_id],
        )?)
      })
      .await?;

    if affected != 1 {
      return Err(Error::DetailMissing(detail_id));
    }
    Ok(())
  }

  async fn list_matches(
    &self,
    window: Option<TimeWindow>,
  ) -> Result<Vec<MatchView>> {
    let bounds = window.map(|w| (encode_dt(w.start), encode_dt(w.end)));

    let (raw_matches, raw_details): (Vec<RawMatch>, Vec<RawDetail>) = self
      .conn
      .call(move |conn| {
        let map_match = |row: &rusqlite::Row<'_>| {
          Ok(RawMatch { match_id: row.get(0)?, created_at: row.get(1)? })
        };

        let map_detail = |row: &rusqlite::Row<'_>| {
          Ok(RawDetail {
            detail_id:      row.get(0)?,
            match_id:       row.get(1)?,
            combatant_name: row.get(2)?,
            score:          row.get(3)?,
          })
        };

        // Both queries share the window so windowed history does not
        // scale with total history size.
        let (raw_matches, raw_details) = if let Some((start, end)) = bounds {
          let mut stmt = conn.prepare(
            "SELECT match_id, created_at FROM matches
             WHERE created_at BETWEEN ?1 AND ?2
             ORDER BY match_id DESC",
          )?;
          let raw_matches = stmt
            .query_map(rusqlite::params![start, end], map_match)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

          let mut stmt = conn.prepare(
            "SELECT d.detail_id, d.match_id, d.combatant_name, d.score
             FROM match_details d
             JOIN matches m ON m.match_id = d.match_id
             WHERE m.created_at BETWEEN ?1 AND ?2
             ORDER BY d.detail_id ASC",
          )?;
          let raw_details = stmt
            .query_map(rusqlite::params![start, end], map_detail)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

          (raw_matches, raw_details)
        } else {
          let mut stmt = conn.prepare(
            "SELECT match_id, created_at FROM matches ORDER BY match_id DESC",
          )?;
          let raw_matches = stmt
            .query_map([], map_match)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

          let mut stmt = conn.prepare(
            "SELECT detail_id, match_id, combatant_name, score
             FROM match_details ORDER BY detail_id ASC",
          )?;
          let raw_details = stmt
            .query_map([], map_detail)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

          (raw_matches, raw_details)
        };

        Ok((raw_matches, raw_details))
      })
      .await?;

    let mut views = raw_matches
      .into_iter()
      .map(|m| {
        Ok(MatchView { record: m.into_match()?, details: Vec::new() })
      })
      .collect::<Result<Vec<_>>>()?;

    let index: std::collections::HashMap<i64, usize> = views
      .iter()
      .enumerate()
      .map(|(i, v)| (v.record.id, i))
      .collect();

    for raw in raw_details {
      if let Some(&i) = index.get(&raw.match_id) {
        views[i].details.push(raw.into_detail());
      }
    }

    Ok(views)
  }

  async fn sum_scores(&self) -> Result<Vec<LeaderboardEntry>> {
    let entries = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT combatant_name, SUM(score) AS total_score
           FROM match_details
           GROUP BY combatant_name
           ORDER BY total_score DESC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(LeaderboardEntry {
              combatant_name: row.get(0)?,
              total_score:    row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(entries)
  }
}
