//! Core types, trait definitions, and the match engine for Rumble.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The stat source and the match store are traits; concrete backends
//! (`rumble-source-http`, `rumble-store-sqlite`) live in sibling crates.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod combatant;
pub mod engine;
pub mod error;
pub mod matches;
pub mod source;
pub mod store;

pub use engine::MatchEngine;
pub use error::{Error, Result};
