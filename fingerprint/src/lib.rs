//! Ashlock fingerprints of iterated Prisoner's Dilemma strategies
//!
//! A fingerprint plays a target strategy against a family of probes. Every probe is
//! the same base strategy transformed by a point of the unit square: Joss-Ann below
//! the anti-diagonal and Dual Joss-Ann on or above it. The pipeline in this crate
//!
//! 1. lays out the probe grid ([`grid`]) and the probe strategies ([`probe`]),
//! 2. wires targets against probes ([`assemble`]) and hands the tournament to an
//!    engine behind the [`TournamentEngine`] seam ([`engine`]),
//! 3. reduces the engine's summary to one metric row per target ([`reduce`]),
//! 4. compares tables pairwise with min/max ratios ([`combine`]),
//! 5. sweeps memory-one strategies and their epsilon neighbourhoods ([`deviation`]).
//!
//! The same grid also gives the classic fingerprint map of one strategy
//! ([`map::Fingerprint`]).

pub mod ashlock;
pub mod assemble;
pub mod combine;
pub mod config;
pub mod deviation;
pub mod engine;
pub mod grid;
pub mod map;
pub mod output;
pub mod probe;
pub mod reduce;
pub mod table;

pub use ashlock::{AshlockConfig, AshlockTournament};
pub use assemble::{Edge, TournamentPlan, create_edges};
pub use combine::{ComparisonRow, ComparisonTable, combine, training_table};
pub use config::ExperimentConfig;
pub use deviation::{
    DeviationSweep, FailedUnit, SweepReport, create_main_comparison, memory_one_vectors,
};
pub use engine::{IpdEngine, PlayerSpec, TournamentEngine, TournamentOutcome};
pub use grid::{Point, create_points};
pub use map::Fingerprint;
pub use probe::{ProbeSpec, create_jossann, create_probes};
pub use reduce::{ReducedRow, ReducedTable, ResultReducer};
pub use table::{Metric, Metrics, SummaryRow};

use ipd::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("grid step must be a positive finite number, got {0}")]
    InvalidStep(f64),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("engine returned {got} edge scores for {expected} edges")]
    MissingEdgeScores { expected: usize, got: usize },
    #[error("cannot concatenate comparison tables with different columns")]
    SchemaMismatch,
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
