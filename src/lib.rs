//! Expected-points projection and transfer ranking for fantasy football players.
//!
//! The engine is a deterministic heuristic over per-round history read through
//! [`provider::SeasonData`]. It never mutates that data and keeps no state between
//! calls.

pub mod backfill;
pub mod cli;
pub mod config;
pub mod engine;
pub mod expected_points;
pub mod fixtures;
pub mod horizon;
pub mod logging;
pub mod model;
pub mod provider;
pub mod rounds;
pub mod signals;
pub mod store;
pub mod transfer;
pub mod window;

pub use config::EngineConfig;
pub use engine::Engine;
pub use expected_points::{explain_expected_points, project_expected_points, project_this_round};
pub use horizon::aggregate_horizon;
pub use model::*;
pub use provider::{MemorySeason, SeasonData, SeasonSnapshot};
pub use store::SqliteSeason;
pub use transfer::{rank_candidates, score_transfer};
