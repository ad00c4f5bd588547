//! Ashlock tournament: targets against a grid of probes, reduced to target rows

use crate::PipelineError;
use crate::assemble::TournamentPlan;
use crate::engine::{TournamentEngine, TournamentOutcome};
use crate::grid::{Point, create_points};
use crate::probe::create_probes;
use crate::reduce::{ReducedTable, ResultReducer};
use ipd::StrategySpec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AshlockConfig {
    pub step: f64,
    pub probe: StrategySpec,
}

impl Default for AshlockConfig {
    fn default() -> Self {
        AshlockConfig {
            step: 0.25,
            probe: StrategySpec::TitForTat,
        }
    }
}

/// A fingerprint tournament ready to hand to an engine
#[derive(Debug, Clone)]
pub struct AshlockTournament {
    points: Vec<Point>,
    plan: TournamentPlan,
    reducer: ResultReducer,
}

impl AshlockTournament {
    /// # Errors
    /// `InvalidStep` for a step that is not a positive finite number.
    pub fn build(
        targets: Vec<StrategySpec>,
        config: &AshlockConfig,
    ) -> Result<Self, PipelineError> {
        let points = create_points(config.step)?;
        let probes = create_probes(&config.probe, &points);
        Ok(AshlockTournament {
            points,
            plan: TournamentPlan::new(targets, probes),
            reducer: ResultReducer::for_probe(&config.probe),
        })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn plan(&self) -> &TournamentPlan {
        &self.plan
    }

    /// Play without reducing
    pub fn play<E: TournamentEngine + ?Sized>(
        &self,
        engine: &E,
    ) -> Result<TournamentOutcome, PipelineError> {
        Ok(engine.play(&self.plan.players, &self.plan.edges)?)
    }

    /// Drop probe rows from a played outcome
    pub fn reduce(&self, outcome: &TournamentOutcome) -> ReducedTable {
        self.reducer.reduce(&outcome.summary)
    }

    /// Play and keep one row per target
    pub fn run<E: TournamentEngine + ?Sized>(
        &self,
        engine: &E,
    ) -> Result<ReducedTable, PipelineError> {
        let outcome = self.play(engine)?;
        let table = self.reduce(&outcome);
        if table.len() != self.plan.num_targets {
            log::warn!(
                "reduced table has {} rows for {} targets",
                table.len(),
                self.plan.num_targets
            );
        }
        Ok(table)
    }
}
