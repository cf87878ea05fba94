//! Handler for `GET /leaderboard`.

use axum::{Json, extract::State};
use rumble_core::{
  matches::LeaderboardEntry, source::StatSource, store::MatchStore,
};

use crate::{AppState, auth::Authenticated, error::ApiError};

/// `GET /leaderboard` — total score per combatant across all matches,
/// descending. Retracted rows contribute zero; no pagination.
pub async fn totals<F, S>(
  _auth: Authenticated,
  State(state): State<AppState<F, S>>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError>
where
  F: StatSource + 'static,
  S: MatchStore + 'static,
{
  let entries = state.engine.leaderboard().await?;
  Ok(Json(entries))
}
