//! Handlers for `/matches` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/matches` | Body: [`CreateBody`]; returns 201 + outcome |
//! | `GET`  | `/matches` | Optional `start_date`/`end_date` (YYYY-MM-DD) |
//! | `POST` | `/matches/{id}/retract` | Body: [`RetractBody`] |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use rumble_core::{
  matches::{MatchDetail, MatchView, TimeWindow},
  source::StatSource,
  store::MatchStore,
};
use serde::Deserialize;

use crate::{AppState, auth::Authenticated, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /matches`.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub combatants: Vec<String>,
}

/// `POST /matches` — runs a match over the named combatants.
///
/// Returns 201 + the ranked outcome, 400 on an empty or duplicate
/// roster, and 422 when any combatant could not be resolved.
pub async fn create<F, S>(
  _auth: Authenticated,
  State(state): State<AppState<F, S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  F: StatSource + 'static,
  S: MatchStore + 'static,
{
  let outcome = state.engine.run_match(body.combatants).await?;
  Ok((StatusCode::CREATED, Json(outcome)))
}

// ─── History ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
}

/// Expand day-granular bounds to an inclusive window covering both
/// whole days. The end bound is the last representable instant of the
/// day, so sub-second timestamps in the final second stay inside the
/// window.
fn day_window(start: NaiveDate, end: NaiveDate) -> Option<TimeWindow> {
  Some(TimeWindow {
    start: start.and_hms_opt(0, 0, 0)?.and_utc(),
    end:   end.and_hms_nano_opt(23, 59, 59, 999_999_999)?.and_utc(),
  })
}

/// `GET /matches[?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD]`
///
/// Both dates or neither: a lone bound is ignored and the full
/// history is returned, newest first.
pub async fn history<F, S>(
  _auth: Authenticated,
  State(state): State<AppState<F, S>>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<MatchView>>, ApiError>
where
  F: StatSource + 'static,
  S: MatchStore + 'static,
{
  let window = match (params.start_date, params.end_date) {
    (Some(start), Some(end)) => day_window(start, end),
    _ => None,
  };

  let views = state.engine.history(window).await?;
  Ok(Json(views))
}

// ─── Retract ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RetractBody {
  pub combatant: String,
}

/// `POST /matches/{id}/retract` — body: `{"combatant":"..."}`.
///
/// Returns the zeroed detail row; 404 if the combatant has no active
/// score in the match.
pub async fn retract_one<F, S>(
  _auth: Authenticated,
  State(state): State<AppState<F, S>>,
  Path(match_id): Path<i64>,
  Json(body): Json<RetractBody>,
) -> Result<Json<MatchDetail>, ApiError>
where
  F: StatSource + 'static,
  S: MatchStore + 'static,
{
  if body.combatant.is_empty() {
    return Err(ApiError::BadRequest("combatant is required".to_string()));
  }

  let detail = state.engine.retract(match_id, &body.combatant).await?;
  Ok(Json(detail))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn day_window_spans_whole_days_inclusive() {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
    let window = day_window(start, end).unwrap();

    assert_eq!(window.start.to_rfc3339(), "2024-03-01T00:00:00+00:00");
    assert_eq!(
      window.end.to_rfc3339(),
      "2024-03-02T23:59:59.999999999+00:00"
    );
  }

  #[test]
  fn day_window_covers_the_final_second_of_the_end_day() {
    let start = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
    let window = day_window(start, start).unwrap();

    // A match created half-way through the last second of the day
    // must fall inside the window.
    let created = start.and_hms_nano_opt(23, 59, 59, 500_000_000).unwrap().and_utc();
    assert!(window.start <= created && created <= window.end);
    // The RFC 3339 encodings compare the same way as the instants.
    assert!(created.to_rfc3339() <= window.end.to_rfc3339());
  }
}
