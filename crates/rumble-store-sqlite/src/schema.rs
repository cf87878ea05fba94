//! SQL schema for the Rumble SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`.
//! Future migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Matches are immutable: inserted once, never updated or deleted.
CREATE TABLE IF NOT EXISTS matches (
    match_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at  TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- The only permitted mutation of a detail row is the retraction
-- shift: one row zeroed, lower-ranked non-zero rows incremented.
CREATE TABLE IF NOT EXISTS match_details (
    detail_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    match_id        INTEGER NOT NULL REFERENCES matches(match_id),
    combatant_name  TEXT NOT NULL,
    score           INTEGER NOT NULL CHECK (score >= 0)
);

CREATE INDEX IF NOT EXISTS details_match_idx ON match_details(match_id);
CREATE INDEX IF NOT EXISTS details_name_idx  ON match_details(combatant_name);
CREATE INDEX IF NOT EXISTS matches_created_idx ON matches(created_at);

PRAGMA user_version = 1;
";
