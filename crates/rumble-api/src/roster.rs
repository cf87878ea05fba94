//! Handlers for `/combatants` — passthrough reads against the
//! external stat source.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/combatants` | `?page=N` (1-based, default 1), 10 per page |
//! | `GET`  | `/combatants/{name}` | Derived combatant; 404 if unknown |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use rumble_core::{combatant::Combatant, source::StatSource, store::MatchStore};
use serde::{Deserialize, Serialize};

use crate::{AppState, auth::Authenticated, error::ApiError};

const PAGE_SIZE: u32 = 10;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// 1-based page number; anything missing or below 1 means page 1.
  pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct RosterResponse {
  pub page:       u32,
  pub page_total: u64,
  pub total:      u64,
  pub data:       Vec<String>,
}

/// Offset of a 1-based page. Saturates so an absurd page number asks
/// for an empty tail page instead of wrapping.
fn page_offset(page: u32) -> u32 {
  page.saturating_sub(1).saturating_mul(PAGE_SIZE)
}

/// `GET /combatants[?page=N]`
pub async fn list<F, S>(
  _auth: Authenticated,
  State(state): State<AppState<F, S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<RosterResponse>, ApiError>
where
  F: StatSource + 'static,
  S: MatchStore + 'static,
{
  let page = params.page.filter(|p| *p >= 1).unwrap_or(1);
  let offset = page_offset(page);

  let roster = state.engine.roster(PAGE_SIZE, offset).await?;

  Ok(Json(RosterResponse {
    page,
    page_total: roster.count.div_ceil(u64::from(PAGE_SIZE)),
    total: roster.count,
    data: roster.names,
  }))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /combatants/{name}`
pub async fn get_one<F, S>(
  _auth: Authenticated,
  State(state): State<AppState<F, S>>,
  Path(name): Path<String>,
) -> Result<Json<Combatant>, ApiError>
where
  F: StatSource + 'static,
  S: MatchStore + 'static,
{
  let combatant = state.engine.lookup(&name).await?;
  Ok(Json(combatant))
}
