//! Fingerprint map of a single strategy
//!
//! The fingerprint of a target is the target's mean per-turn score against each
//! probe of the grid, read as a function on the unit square.

use crate::PipelineError;
use crate::ashlock::{AshlockConfig, AshlockTournament};
use crate::engine::TournamentEngine;
use crate::grid::Point;
use crate::reduce::ReducedTable;
use ipd::StrategySpec;
use serde::Serialize;
use std::path::Path;

/// Coordinates closer than this name the same grid point
const POINT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct Fingerprint {
    points: Vec<Point>,
    values: Vec<f64>,
    summary: ReducedTable,
}

#[derive(Serialize)]
struct FingerprintRecord {
    x: f64,
    y: f64,
    score: f64,
}

impl Fingerprint {
    pub fn compute<E: TournamentEngine + ?Sized>(
        target: &StrategySpec,
        probe: &StrategySpec,
        step: f64,
        engine: &E,
    ) -> Result<Self, PipelineError> {
        let config = AshlockConfig {
            step,
            probe: probe.clone(),
        };
        let tournament = AshlockTournament::build(vec![target.clone()], &config)?;
        let outcome = tournament.play(engine)?;

        let expected = tournament.plan().edges.len();
        if outcome.edge_scores.len() != expected {
            return Err(PipelineError::MissingEdgeScores {
                expected,
                got: outcome.edge_scores.len(),
            });
        }
        log::info!(
            "fingerprinted {} against {} probes",
            target.name(),
            expected
        );

        let summary = tournament.reduce(&outcome);
        Ok(Fingerprint {
            points: tournament.points().to_vec(),
            values: outcome.edge_scores,
            summary,
        })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Scores in point order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Reduced summary row of the target
    pub fn summary(&self) -> &ReducedTable {
        &self.summary
    }

    pub fn value_at(&self, point: Point) -> Option<f64> {
        self.points
            .iter()
            .position(|p| {
                (p.x - point.x).abs() < POINT_TOLERANCE && (p.y - point.y).abs() < POINT_TOLERANCE
            })
            .map(|i| self.values[i])
    }

    /// Values as rows of constant y, with y increasing from the first row
    pub fn as_grid(&self) -> Vec<Vec<f64>> {
        let side = (self.points.len() as f64).sqrt().round() as usize;
        (0..side)
            .map(|row| (0..side).map(|col| self.values[col * side + row]).collect())
            .collect()
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        let mut wtr = csv::Writer::from_path(path)?;
        for (p, &score) in self.points.iter().zip(&self.values) {
            wtr.serialize(FingerprintRecord {
                x: p.x,
                y: p.y,
                score,
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::Edge;
    use crate::engine::{IpdEngine, PlayerSpec, TournamentOutcome};
    use approx::assert_relative_eq;
    use ipd::EngineError;

    /// Scores each edge by its index
    struct IndexEngine;

    impl TournamentEngine for IndexEngine {
        fn play(
            &self,
            _players: &[PlayerSpec],
            edges: &[Edge],
        ) -> Result<TournamentOutcome, EngineError> {
            Ok(TournamentOutcome {
                summary: Vec::new(),
                edge_scores: (0..edges.len()).map(|i| i as f64).collect(),
            })
        }
    }

    struct ShortEngine;

    impl TournamentEngine for ShortEngine {
        fn play(
            &self,
            _players: &[PlayerSpec],
            _edges: &[Edge],
        ) -> Result<TournamentOutcome, EngineError> {
            Ok(TournamentOutcome::default())
        }
    }

    #[test]
    fn test_values_follow_point_order() {
        let fp = Fingerprint::compute(
            &StrategySpec::Grudger,
            &StrategySpec::TitForTat,
            0.5,
            &IndexEngine,
        )
        .unwrap();
        assert_eq!(fp.points().len(), 9);
        assert_eq!(fp.value_at(Point::new(0.0, 0.0)), Some(0.0));
        assert_eq!(fp.value_at(Point::new(0.5, 1.0)), Some(5.0));
        assert_eq!(fp.value_at(Point::new(0.3, 0.3)), None);
        assert_eq!(
            fp.as_grid(),
            vec![
                vec![0.0, 3.0, 6.0],
                vec![1.0, 4.0, 7.0],
                vec![2.0, 5.0, 8.0]
            ]
        );
    }

    #[test]
    fn test_missing_scores_are_an_error() {
        let result = Fingerprint::compute(
            &StrategySpec::Grudger,
            &StrategySpec::TitForTat,
            0.5,
            &ShortEngine,
        );
        assert!(matches!(
            result,
            Err(PipelineError::MissingEdgeScores { expected: 9, got: 0 })
        ));
    }

    #[test]
    fn test_cooperator_against_tit_for_tat_probes() {
        let engine = IpdEngine {
            turns: 50,
            repetitions: 3,
            seed: 11,
        };
        let fp = Fingerprint::compute(
            &StrategySpec::Cooperator,
            &StrategySpec::TitForTat,
            0.5,
            &engine,
        )
        .unwrap();
        // plain Tit For Tat at the origin
        assert_relative_eq!(fp.value_at(Point::new(0.0, 0.0)).unwrap(), 3.0);
        // Dual(JossAnn(0, 0)) on Tit For Tat always defects against a cooperator
        assert_relative_eq!(fp.value_at(Point::new(1.0, 1.0)).unwrap(), 0.0);
        // the probe at (0, 1) is Dual(JossAnn(1, 0)) and always defects
        assert_relative_eq!(fp.value_at(Point::new(0.0, 1.0)).unwrap(), 0.0);
        // the probe at (1, 0) is Dual(JossAnn(0, 1)) and always cooperates
        assert_relative_eq!(fp.value_at(Point::new(1.0, 0.0)).unwrap(), 3.0);
        assert_eq!(fp.summary().names(), vec!["Cooperator"]);
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fp.csv");
        let fp = Fingerprint::compute(
            &StrategySpec::Grudger,
            &StrategySpec::TitForTat,
            1.0,
            &IndexEngine,
        )
        .unwrap();
        fp.write_csv(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "x,y,score");
        assert_eq!(lines[1], "0.0,0.0,0.0");
        assert_eq!(lines.len(), 5);
    }
}
