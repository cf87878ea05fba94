//! HTTP implementation of [`StatSource`] against the external stat
//! API.
//!
//! The upstream exposes a paged index (`GET {base}?limit=&offset=`)
//! and per-combatant detail (`GET {base}/{name}`) returning stats as
//! `{"base_stat": <n>, "stat": {"name": "..."}}` entries. One round
//! trip per call; no retry, no caching.

use std::time::Duration;

use rumble_core::{
  combatant::{Stat, StatSheet},
  source::{RosterPage, SourceError, StatSource},
};
use serde::Deserialize;

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WireDetail {
  name:  String,
  stats: Vec<WireStat>,
}

#[derive(Debug, Deserialize)]
struct WireStat {
  base_stat: i64,
  stat:      WireStatName,
}

#[derive(Debug, Deserialize)]
struct WireStatName {
  name: String,
}

#[derive(Debug, Deserialize)]
struct WirePage {
  count:   u64,
  results: Vec<WirePageEntry>,
}

#[derive(Debug, Deserialize)]
struct WirePageEntry {
  name: String,
}

impl From<WireDetail> for StatSheet {
  fn from(detail: WireDetail) -> Self {
    StatSheet {
      name:  detail.name,
      stats: detail
        .stats
        .into_iter()
        .map(|s| Stat { name: s.stat.name, value: s.base_stat })
        .collect(),
    }
  }
}

// ─── Source ──────────────────────────────────────────────────────────────────

/// A [`StatSource`] backed by the upstream HTTP API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpStatSource {
  client:   reqwest::Client,
  base_url: String,
}

impl HttpStatSource {
  /// Build a source for `base_url` with an explicit per-request
  /// timeout. A timed-out fetch surfaces as
  /// [`SourceError::Transport`].
  pub fn new(
    base_url: impl Into<String>,
    timeout: Duration,
  ) -> Result<Self, SourceError> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| SourceError::Transport(e.to_string()))?;

    Ok(Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_string(),
    })
  }
}

impl StatSource for HttpStatSource {
  async fn fetch(&self, name: &str) -> Result<StatSheet, SourceError> {
    let url = format!("{}/{name}", self.base_url);

    let response = self
      .client
      .get(&url)
      .send()
      .await
      .map_err(|e| SourceError::Transport(e.to_string()))?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
      return Err(SourceError::NotFound(name.to_string()));
    }
    if !response.status().is_success() {
      return Err(SourceError::Transport(format!(
        "GET {url} -> {}",
        response.status()
      )));
    }

    let detail: WireDetail = response
      .json()
      .await
      .map_err(|e| SourceError::Transport(e.to_string()))?;

    Ok(detail.into())
  }

  async fn roster_page(
    &self,
    limit: u32,
    offset: u32,
  ) -> Result<RosterPage, SourceError> {
    let response = self
      .client
      .get(&self.base_url)
      .query(&[("limit", limit), ("offset", offset)])
      .send()
      .await
      .map_err(|e| SourceError::Transport(e.to_string()))?;

    if !response.status().is_success() {
      return Err(SourceError::Transport(format!(
        "GET {} -> {}",
        self.base_url,
        response.status()
      )));
    }

    let page: WirePage = response
      .json()
      .await
      .map_err(|e| SourceError::Transport(e.to_string()))?;

    Ok(RosterPage {
      count: page.count,
      names: page.results.into_iter().map(|e| e.name).collect(),
    })
  }
}
