//! Combatants and strength derivation.
//!
//! A combatant is transient: it is built from one fetched stat sheet,
//! ranked within one match, and discarded once the match is scored.
//! Only its name and score survive as a [`MatchDetail`](crate::matches::MatchDetail).

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One named integer measurement from the external source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
  pub name:  String,
  pub value: i64,
}

/// The raw attribute set for one combatant, as returned by a
/// [`StatSource`](crate::source::StatSource). No derived data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSheet {
  pub name:  String,
  pub stats: Vec<Stat>,
}

/// A combatant with its derived strength, ready to be ranked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
  pub name:     String,
  pub stats:    Vec<Stat>,
  /// Arithmetic mean of all stat values, rounded to two decimals.
  pub strength: f64,
}

impl Combatant {
  /// Derive a combatant from a raw stat sheet.
  ///
  /// Strength is the mean of all stat values, rounded
  /// half-away-from-zero to two decimal places. A sheet with no stats
  /// is rejected rather than dividing by zero.
  pub fn from_sheet(sheet: StatSheet) -> Result<Self> {
    if sheet.stats.is_empty() {
      return Err(Error::MalformedStats { name: sheet.name });
    }

    let sum: i64 = sheet.stats.iter().map(|s| s.value).sum();
    let mean = sum as f64 / sheet.stats.len() as f64;
    let strength = (mean * 100.0).round() / 100.0;

    Ok(Self {
      name: sheet.name,
      stats: sheet.stats,
      strength,
    })
  }
}

/// Reject an empty roster or one containing duplicate names.
///
/// Runs before any fetch work begins; a duplicate means the match
/// request is malformed and the orchestrator is never entered.
pub fn validate_roster(names: &[String]) -> Result<()> {
  if names.is_empty() {
    return Err(Error::EmptyRoster);
  }

  let mut seen = std::collections::HashSet::new();
  for name in names {
    if !seen.insert(name.as_str()) {
      return Err(Error::DuplicateName(name.clone()));
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sheet(name: &str, values: &[(&str, i64)]) -> StatSheet {
    StatSheet {
      name:  name.to_string(),
      stats: values
        .iter()
        .map(|(n, v)| Stat { name: n.to_string(), value: *v })
        .collect(),
    }
  }

  #[test]
  fn strength_is_rounded_mean() {
    let c = Combatant::from_sheet(sheet(
      "bulbasaur",
      &[("hp", 45), ("attack", 49), ("defense", 49)],
    ))
    .unwrap();
    assert_eq!(c.strength, 47.67);
  }

  #[test]
  fn strength_is_deterministic() {
    let s = sheet("eevee", &[("hp", 55), ("attack", 55), ("speed", 55)]);
    let a = Combatant::from_sheet(s.clone()).unwrap();
    let b = Combatant::from_sheet(s).unwrap();
    assert_eq!(a.strength, b.strength);
    assert_eq!(a.strength, 55.0);
  }

  #[test]
  fn empty_sheet_is_rejected() {
    let err = Combatant::from_sheet(sheet("missingno", &[])).unwrap_err();
    assert!(matches!(err, Error::MalformedStats { name } if name == "missingno"));
  }

  #[test]
  fn roster_rejects_duplicates() {
    let names: Vec<String> =
      ["pikachu", "eevee", "pikachu"].iter().map(|s| s.to_string()).collect();
    let err = validate_roster(&names).unwrap_err();
    assert!(matches!(err, Error::DuplicateName(n) if n == "pikachu"));
  }

  #[test]
  fn roster_rejects_empty() {
    assert!(matches!(validate_roster(&[]), Err(Error::EmptyRoster)));
  }
}
