//! [`MatchEngine`] — match orchestration, retraction, and the
//! leaderboard / history / roster read paths.
//!
//! The engine owns nothing but handles to its two collaborators: a
//! [`StatSource`] for the external stat API and a [`MatchStore`] for
//! persistence. Both are constructed once at process start and passed
//! in; the engine is cheap to share behind an `Arc`.

use std::sync::Arc;

use tokio::{sync::Mutex, task::JoinSet};

use crate::{
  Error, Result,
  combatant::{Combatant, validate_roster},
  matches::{
    LeaderboardEntry, MatchDetail, MatchOutcome, MatchView, NewMatchDetail,
    RankedCombatant, TimeWindow,
  },
  source::{RosterPage, StatSource},
  store::MatchStore,
};

pub struct MatchEngine<F, S> {
  source: Arc<F>,
  store:  Arc<S>,
}

impl<F, S> MatchEngine<F, S>
where
  F: StatSource + 'static,
  S: MatchStore,
{
  pub fn new(source: Arc<F>, store: Arc<S>) -> Self {
    Self { source, store }
  }

  /// Run one match over `names` and persist the outcome.
  ///
  /// Every name is fetched and derived in its own task; the engine
  /// waits for all of them before looking at the results. A match is
  /// all-or-nothing: any failed fetch or derivation aborts it with
  /// [`Error::IncompleteFetch`] and nothing is persisted.
  ///
  /// Ranking is by strength descending; equal strengths keep their
  /// caller input order, so the outcome is deterministic regardless
  /// of task completion order.
  pub async fn run_match(&self, names: Vec<String>) -> Result<MatchOutcome> {
    validate_roster(&names)?;

    // Tasks push (input index, combatant) under the lock; per-fetch
    // failures are logged here and only surface as the aggregate
    // count check below.
    let results: Arc<Mutex<Vec<(usize, Combatant)>>> =
      Arc::new(Mutex::new(Vec::with_capacity(names.len())));

    let mut tasks = JoinSet::new();
    for (index, name) in names.iter().cloned().enumerate() {
      let source = Arc::clone(&self.source);
      let results = Arc::clone(&results);
      tasks.spawn(async move {
        let sheet = match source.fetch(&name).await {
          Ok(sheet) => sheet,
          Err(err) => {
            tracing::warn!(%name, %err, "combatant fetch failed");
            return;
          }
        };
        match Combatant::from_sheet(sheet) {
          Ok(combatant) => results.lock().await.push((index, combatant)),
          Err(err) => tracing::warn!(%name, %err, "strength derivation failed"),
        }
      });
    }

    // Barrier: every task finishes, successfully or not, before the
    // results are inspected.
    while let Some(joined) = tasks.join_next().await {
      if let Err(err) = joined {
        tracing::warn!(%err, "combatant fetch task panicked");
      }
    }

    let mut collected = std::mem::take(&mut *results.lock().await);
    if collected.len() < names.len() {
      return Err(Error::IncompleteFetch {
        requested: names.len(),
        fetched:   collected.len(),
      });
    }

    collected
      .sort_by(|a, b| b.1.strength.total_cmp(&a.1.strength).then(a.0.cmp(&b.0)));

    let n = collected.len();
    let ranking: Vec<RankedCombatant> = collected
      .into_iter()
      .enumerate()
      .map(|(rank, (_, combatant))| RankedCombatant {
        combatant,
        score: (n - 1 - rank) as i64,
      })
      .collect();

    let rows = ranking
      .iter()
      .map(|r| NewMatchDetail {
        combatant_name: r.combatant.name.clone(),
        score:          r.score,
      })
      .collect();

    let view = self.store.create_match(rows).await.map_err(Error::store)?;
    tracing::info!(match_id = view.record.id, combatants = n, "match recorded");

    Ok(MatchOutcome { record: view.record, ranking })
  }

  /// Retract one combatant's score from a recorded match.
  ///
  /// Every still-active row ranked below the retracted one moves up
  /// exactly one point, keeping the surviving scores a contiguous
  /// run; the retracted row itself is zeroed and kept. Retracting an
  /// already-retracted combatant fails with
  /// [`Error::DetailNotFound`].
  pub async fn retract(
    &self,
    match_id: i64,
    combatant: &str,
  ) -> Result<MatchDetail> {
    let mut detail = self
      .store
      .find_active_detail(match_id, combatant)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::DetailNotFound {
        match_id,
        combatant: combatant.to_string(),
      })?;

    // The shift must use the original score as its ceiling; zeroing
    // first would make the range vacuous.
    let shifted = self
      .store
      .shift_scores_below(match_id, detail.score)
      .await
      .map_err(Error::store)?;

    detail.score = 0;
    self.store.save_detail(&detail).await.map_err(Error::store)?;

    tracing::info!(match_id, combatant, shifted, "score retracted");
    Ok(detail)
  }

  /// All recorded matches, newest first, optionally filtered by an
  /// inclusive creation-time window.
  pub async fn history(
    &self,
    window: Option<TimeWindow>,
  ) -> Result<Vec<MatchView>> {
    self.store.list_matches(window).await.map_err(Error::store)
  }

  /// Total score per combatant across all matches, descending.
  pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
    self.store.sum_scores().await.map_err(Error::store)
  }

  /// Fetch and derive a single combatant.
  pub async fn lookup(&self, name: &str) -> Result<Combatant> {
    let sheet = self.source.fetch(name).await?;
    Combatant::from_sheet(sheet)
  }

  /// One page of the external source's combatant index.
  pub async fn roster(&self, limit: u32, offset: u32) -> Result<RosterPage> {
    Ok(self.source.roster_page(limit, offset).await?)
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;
  use crate::{
    combatant::{Stat, StatSheet},
    matches::Match,
    source::SourceError,
  };
  use chrono::Utc;

  // ── Mock source ───────────────────────────────────────────────────────────

  struct MockSource {
    sheets: HashMap<String, StatSheet>,
  }

  impl MockSource {
    fn new(entries: &[(&str, &[i64])]) -> Self {
      let sheets = entries
        .iter()
        .map(|(name, values)| {
          let stats = values
            .iter()
            .enumerate()
            .map(|(i, v)| Stat { name: format!("stat-{i}"), value: *v })
            .collect();
          (
            name.to_string(),
            StatSheet { name: name.to_string(), stats },
          )
        })
        .collect();
      Self { sheets }
    }
  }

  impl StatSource for MockSource {
    async fn fetch(&self, name: &str) -> Result<StatSheet, SourceError> {
      self
        .sheets
        .get(name)
        .cloned()
        .ok_or_else(|| SourceError::NotFound(name.to_string()))
    }

    async fn roster_page(
      &self,
      limit: u32,
      offset: u32,
    ) -> Result<RosterPage, SourceError> {
      let mut names: Vec<String> = self.sheets.keys().cloned().collect();
      names.sort();
      let page = names
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();
      Ok(RosterPage { count: self.sheets.len() as u64, names: page })
    }
  }

  // ── Mock store ────────────────────────────────────────────────────────────

  #[derive(Debug, thiserror::Error)]
  #[error("mock store: row missing")]
  struct MemStoreError;

  #[derive(Default)]
  struct MemInner {
    next_match:  i64,
    next_detail: i64,
    matches:     Vec<Match>,
    details:     Vec<MatchDetail>,
  }

  #[derive(Default)]
  struct MemStore {
    inner: std::sync::Mutex<MemInner>,
  }

  impl MemStore {
    fn details_of(&self, match_id: i64) -> Vec<MatchDetail> {
      let inner = self.inner.lock().unwrap();
      inner
        .details
        .iter()
        .filter(|d| d.match_id == match_id)
        .cloned()
        .collect()
    }

    fn match_count(&self) -> usize {
      self.inner.lock().unwrap().matches.len()
    }
  }

  impl MatchStore for MemStore {
    type Error = MemStoreError;

    async fn create_match(
      &self,
      details: Vec<NewMatchDetail>,
    ) -> Result<MatchView, Self::Error> {
      let mut inner = self.inner.lock().unwrap();
      inner.next_match += 1;
      let record = Match { id: inner.next_match, created_at: Utc::now() };

      let mut rows = Vec::with_capacity(details.len());
      for d in details {
        inner.next_detail += 1;
        let row = MatchDetail {
          id:             inner.next_detail,
          match_id:       record.id,
          combatant_name: d.combatant_name,
          score:          d.score,
        };
        inner.details.push(row.clone());
        rows.push(row);
      }
      inner.matches.push(record.clone());

      Ok(MatchView { record, details: rows })
    }

    async fn find_active_detail(
      &self,
      match_id: i64,
      combatant: &str,
    ) -> Result<Option<MatchDetail>, Self::Error> {
      let inner = self.inner.lock().unwrap();
      Ok(
        inner
          .details
          .iter()
          .find(|d| {
            d.match_id == match_id
              && d.combatant_name == combatant
              && d.score != 0
          })
          .cloned(),
      )
    }

    async fn shift_scores_below(
      &self,
      match_id: i64,
      ceiling: i64,
    ) -> Result<usize, Self::Error> {
      let mut inner = self.inner.lock().unwrap();
      let mut affected = 0;
      for d in inner.details.iter_mut() {
        if d.match_id == match_id && d.score > 0 && d.score < ceiling {
          d.score += 1;
          affected += 1;
        }
      }
      Ok(affected)
    }

    async fn save_detail(
      &self,
      detail: &MatchDetail,
    ) -> Result<(), Self::Error> {
      let mut inner = self.inner.lock().unwrap();
      let row = inner
        .details
        .iter_mut()
        .find(|d| d.id == detail.id)
        .ok_or(MemStoreError)?;
      *row = detail.clone();
      Ok(())
    }

    async fn list_matches(
      &self,
      _window: Option<TimeWindow>,
    ) -> Result<Vec<MatchView>, Self::Error> {
      let inner = self.inner.lock().unwrap();
      let mut views: Vec<MatchView> = inner
        .matches
        .iter()
        .map(|m| MatchView {
          record:  m.clone(),
          details: inner
            .details
            .iter()
            .filter(|d| d.match_id == m.id)
            .cloned()
            .collect(),
        })
        .collect();
      views.sort_by(|a, b| b.record.id.cmp(&a.record.id));
      Ok(views)
    }

    async fn sum_scores(&self) -> Result<Vec<LeaderboardEntry>, Self::Error> {
      let inner = self.inner.lock().unwrap();
      let mut totals: HashMap<String, i64> = HashMap::new();
      for d in &inner.details {
        *totals.entry(d.combatant_name.clone()).or_default() += d.score;
      }
      let mut entries: Vec<LeaderboardEntry> = totals
        .into_iter()
        .map(|(combatant_name, total_score)| LeaderboardEntry {
          combatant_name,
          total_score,
        })
        .collect();
      entries.sort_by(|a, b| b.total_score.cmp(&a.total_score));
      Ok(entries)
    }
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  fn engine(
    entries: &[(&str, &[i64])],
  ) -> (MatchEngine<MockSource, MemStore>, Arc<MemStore>) {
    let store = Arc::new(MemStore::default());
    let engine =
      MatchEngine::new(Arc::new(MockSource::new(entries)), Arc::clone(&store));
    (engine, store)
  }

  fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
  }

  // ── Orchestration ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn scores_are_contiguous_and_strength_ordered() {
    let (engine, _store) = engine(&[
      ("weak", &[10]),
      ("strong", &[90]),
      ("middling", &[50]),
    ]);

    let outcome =
      engine.run_match(names(&["weak", "strong", "middling"])).await.unwrap();

    let order: Vec<&str> =
      outcome.ranking.iter().map(|r| r.combatant.name.as_str()).collect();
    assert_eq!(order, vec!["strong", "middling", "weak"]);

    let scores: Vec<i64> = outcome.ranking.iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![2, 1, 0]);

    // Sum of scores at creation is N*(N-1)/2.
    assert_eq!(scores.iter().sum::<i64>(), 3);
  }

  #[tokio::test]
  async fn equal_strengths_rank_in_input_order() {
    let (engine, _store) =
      engine(&[("alpha", &[50]), ("beta", &[50]), ("gamma", &[50])]);

    let outcome =
      engine.run_match(names(&["beta", "gamma", "alpha"])).await.unwrap();

    let order: Vec<&str> =
      outcome.ranking.iter().map(|r| r.combatant.name.as_str()).collect();
    assert_eq!(order, vec!["beta", "gamma", "alpha"]);
  }

  #[tokio::test]
  async fn unresolvable_name_aborts_and_persists_nothing() {
    let (engine, store) = engine(&[("known", &[42])]);

    let err = engine
      .run_match(names(&["known", "unknown"]))
      .await
      .unwrap_err();
    assert!(matches!(
      err,
      Error::IncompleteFetch { requested: 2, fetched: 1 }
    ));
    assert_eq!(store.match_count(), 0);
  }

  #[tokio::test]
  async fn duplicate_names_never_reach_the_source() {
    let (engine, store) = engine(&[("pikachu", &[55])]);

    let err = engine
      .run_match(names(&["pikachu", "pikachu"]))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::DuplicateName(n) if n == "pikachu"));
    assert_eq!(store.match_count(), 0);
  }

  // ── Retraction ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn retraction_shifts_lower_scores_up() {
    // Five combatants, strengths strictly descending: scores 4..0.
    let (engine, store) = engine(&[
      ("a", &[90]),
      ("b", &[80]),
      ("c", &[70]),
      ("d", &[60]),
      ("e", &[50]),
    ]);
    let outcome =
      engine.run_match(names(&["a", "b", "c", "d", "e"])).await.unwrap();
    let match_id = outcome.record.id;

    // Retract "b" (score 3): rows scored 2 and 1 move up by one.
    let zeroed = engine.retract(match_id, "b").await.unwrap();
    assert_eq!(zeroed.score, 0);

    let mut scores: Vec<(String, i64)> = store
      .details_of(match_id)
      .into_iter()
      .map(|d| (d.combatant_name, d.score))
      .collect();
    scores.sort();
    assert_eq!(
      scores,
      vec![
        ("a".to_string(), 4),
        ("b".to_string(), 0),
        ("c".to_string(), 3),
        ("d".to_string(), 2),
        ("e".to_string(), 0),
      ]
    );

    // Surviving non-zero scores are a contiguous run from the top.
    let mut nonzero: Vec<i64> =
      scores.iter().map(|(_, s)| *s).filter(|s| *s != 0).collect();
    nonzero.sort();
    assert_eq!(nonzero, vec![2, 3, 4]);
  }

  #[tokio::test]
  async fn double_retraction_fails_without_changes() {
    let (engine, store) =
      engine(&[("a", &[90]), ("b", &[80]), ("c", &[70])]);
    let outcome = engine.run_match(names(&["a", "b", "c"])).await.unwrap();
    let match_id = outcome.record.id;

    engine.retract(match_id, "b").await.unwrap();
    let before = store.details_of(match_id);

    let err = engine.retract(match_id, "b").await.unwrap_err();
    assert!(matches!(
      err,
      Error::DetailNotFound { combatant, .. } if combatant == "b"
    ));
    assert_eq!(store.details_of(match_id), before);
  }

  #[tokio::test]
  async fn retracting_an_absent_combatant_fails() {
    let (engine, _store) = engine(&[("a", &[90]), ("b", &[80])]);
    let outcome = engine.run_match(names(&["a", "b"])).await.unwrap();

    let err = engine.retract(outcome.record.id, "nobody").await.unwrap_err();
    assert!(matches!(err, Error::DetailNotFound { .. }));
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn leaderboard_ignores_retracted_rows() {
    let (engine, _store) = engine(&[("a", &[90]), ("b", &[80])]);
    let first = engine.run_match(names(&["a", "b"])).await.unwrap();
    engine.run_match(names(&["a", "b"])).await.unwrap();

    // a: 1 + 1, b: 0 + 0. Retract a from the first match: nothing
    // below it shifts (b already holds 0), and a's total drops to 1.
    engine.retract(first.record.id, "a").await.unwrap();

    let board = engine.leaderboard().await.unwrap();
    assert_eq!(board[0].combatant_name, "a");
    assert_eq!(board[0].total_score, 1);
  }

  #[tokio::test]
  async fn lookup_derives_strength() {
    let (engine, _store) = engine(&[("bulbasaur", &[45, 49, 49])]);
    let combatant = engine.lookup("bulbasaur").await.unwrap();
    assert_eq!(combatant.strength, 47.67);

    let err = engine.lookup("missingno").await.unwrap_err();
    assert!(matches!(err, Error::Source(SourceError::NotFound(_))));
  }
}
