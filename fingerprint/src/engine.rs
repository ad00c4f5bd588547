//! The seam between the fingerprint pipeline and a tournament engine
//!
//! The pipeline only decides who plays whom. Move choice, scoring and summary
//! statistics belong to a [`TournamentEngine`]. [`IpdEngine`] plays the tournament
//! with the in-workspace `ipd` crate; tests substitute scripted engines.

use crate::assemble::Edge;
use crate::probe::ProbeSpec;
use crate::table::SummaryRow;
use ipd::{EngineError, SpatialTournament, Strategy, StrategySpec};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerSpec {
    Target(StrategySpec),
    Probe(ProbeSpec),
}

impl PlayerSpec {
    pub fn name(&self) -> String {
        match self {
            PlayerSpec::Target(spec) => spec.name(),
            PlayerSpec::Probe(probe) => probe.name(),
        }
    }

    pub fn build(&self) -> Result<Box<dyn Strategy>, EngineError> {
        match self {
            PlayerSpec::Target(spec) => spec.build(),
            PlayerSpec::Probe(probe) => probe.build(),
        }
    }
}

/// What an engine reports after playing a tournament
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TournamentOutcome {
    /// One row per player, ranked
    pub summary: Vec<SummaryRow>,
    /// Mean per-turn score of the first player of each edge, in edge order
    pub edge_scores: Vec<f64>,
}

pub trait TournamentEngine {
    fn play(
        &self,
        players: &[PlayerSpec],
        edges: &[Edge],
    ) -> Result<TournamentOutcome, EngineError>;
}

/// Engine backed by [`ipd::SpatialTournament`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IpdEngine {
    pub turns: usize,
    pub repetitions: usize,
    pub seed: u64,
}

impl Default for IpdEngine {
    fn default() -> Self {
        IpdEngine {
            turns: 200,
            repetitions: 10,
            seed: 0,
        }
    }
}

impl TournamentEngine for IpdEngine {
    fn play(
        &self,
        players: &[PlayerSpec],
        edges: &[Edge],
    ) -> Result<TournamentOutcome, EngineError> {
        let strategies = players
            .iter()
            .map(PlayerSpec::build)
            .collect::<Result<Vec<_>, _>>()?;
        let edges: Vec<(usize, usize)> = edges.iter().map(|&e| e.into()).collect();
        log::debug!(
            "playing {} players over {} edges ({} turns x {} repetitions)",
            strategies.len(),
            edges.len(),
            self.turns,
            self.repetitions
        );
        let tournament =
            SpatialTournament::new(strategies, edges, self.turns, self.repetitions, self.seed)?;
        let results = tournament.play();
        Ok(TournamentOutcome {
            summary: results.summarise().into_iter().map(SummaryRow::from).collect(),
            edge_scores: results.edge_scores(),
        })
    }
}
