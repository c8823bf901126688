//! Result persistence and ranking.
//!
//! This module provides:
//! - The incremental per-screenshot result store
//! - Per-account ranking aggregation (top-3 point sum)
//! - Leaderboard export as JSON, CSV, and plain text

pub mod export;
pub mod ranking;
pub mod store;

pub use export::{
    sorted_rankings, write_leaderboard_csv, write_leaderboard_json, write_leaderboard_text,
};
pub use ranking::{AccountRanking, MemoriaEntry, aggregate};
pub use store::ResultStore;
