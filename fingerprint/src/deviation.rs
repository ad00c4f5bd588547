//! Memory-one deviation study
//!
//! For a memory-one vector `v` and a magnitude `e`, the sixteen sign patterns of
//! `(±e, ±e, ±e, ±e)` give sixteen neighbours `clip(v + d, 0, 1)`. Each neighbour is
//! fingerprinted alongside the others and compared with the fingerprint of `v`
//! itself. Sweeping `v` over a grid of the memory-one cube produces the main
//! comparison table.

use crate::PipelineError;
use crate::ashlock::{AshlockConfig, AshlockTournament};
use crate::combine::{ComparisonTable, combine};
use crate::engine::TournamentEngine;
use crate::grid::linspace;
use crate::reduce::ReducedTable;
use batch::{ParallelRunner, simple_progress_reporter};
use ipd::StrategySpec;
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use std::path::Path;

/// Sign patterns of `(±e, ±e, ±e, ±e)`, from all positive to all negative
///
/// Component `i` of pattern `k` is negative when bit `3 - i` of `k` is set.
pub fn epsilon_vectors(epsilon: f64) -> Vec<[f64; 4]> {
    (0..16usize)
        .map(|k| {
            std::array::from_fn(|i| {
                let negative = (k >> (3 - i)) & 1 == 1;
                if negative { -epsilon } else { epsilon }
            })
        })
        .collect()
}

/// `clip(original + offset, 0, 1)` component-wise
pub fn deviate_vector(original: [f64; 4], offset: [f64; 4]) -> [f64; 4] {
    std::array::from_fn(|i| (original[i] + offset[i]).clamp(0.0, 1.0))
}

/// The sixteen clipped neighbours of `original`, kept even when one equals `original`
pub fn deviated_vectors(original: [f64; 4], epsilon: f64) -> Vec<[f64; 4]> {
    epsilon_vectors(epsilon)
        .into_iter()
        .map(|offset| deviate_vector(original, offset))
        .collect()
}

/// Every memory-one vector with components on `linspace(q_num)`, first component slowest
pub fn memory_one_vectors(q_num: usize) -> Vec<[f64; 4]> {
    let values = linspace(q_num);
    let n = values.len();
    (0..n.pow(4))
        .map(|k| {
            let digit = |place: u32| values[k / n.pow(place) % n];
            [digit(3), digit(2), digit(1), digit(0)]
        })
        .collect()
}

/// Reduced Ashlock table of the sixteen neighbours of `vector`
pub fn results_for_epsilon<E: TournamentEngine + ?Sized>(
    vector: [f64; 4],
    epsilon: f64,
    config: &AshlockConfig,
    engine: &E,
) -> Result<ReducedTable, PipelineError> {
    let targets = deviated_vectors(vector, epsilon)
        .into_iter()
        .map(StrategySpec::MemoryOne)
        .collect();
    AshlockTournament::build(targets, config)?.run(engine)
}

/// One comparison block per epsilon, each succeeding or failing on its own
///
/// # Errors
/// Only when the base vector's own tournament fails, which leaves no epsilon to
/// compare against.
pub fn comparison_blocks<E: TournamentEngine + ?Sized>(
    vector: [f64; 4],
    epsilons: &[f64],
    config: &AshlockConfig,
    engine: &E,
) -> Result<Vec<(f64, Result<ComparisonTable, PipelineError>)>, PipelineError> {
    let base = AshlockTournament::build(vec![StrategySpec::MemoryOne(vector)], config)?
        .run(engine)?;
    Ok(epsilons
        .iter()
        .map(|&epsilon| {
            let block = results_for_epsilon(vector, epsilon, config, engine)
                .map(|neighbours| combine(&base, &neighbours, Some(epsilon)));
            (epsilon, block)
        })
        .collect())
}

/// Compare `vector` with its neighbours at every epsilon
///
/// One block of rows per epsilon, in the given order, each with its Epsilon value.
/// Any failing epsilon fails the whole call.
pub fn comparison_for_vector<E: TournamentEngine + ?Sized>(
    vector: [f64; 4],
    epsilons: &[f64],
    config: &AshlockConfig,
    engine: &E,
) -> Result<ComparisonTable, PipelineError> {
    let tables = comparison_blocks(vector, epsilons, config, engine)?
        .into_iter()
        .map(|(_, block)| block)
        .collect::<Result<Vec<_>, _>>()?;
    ComparisonTable::concat(tables)
}

/// Like [`comparison_for_vector`], appending the result to a CSV file
pub fn append_comparison_for_vector<E: TournamentEngine + ?Sized, P: AsRef<Path>>(
    vector: [f64; 4],
    epsilons: &[f64],
    config: &AshlockConfig,
    engine: &E,
    path: P,
) -> Result<ComparisonTable, PipelineError> {
    let table = comparison_for_vector(vector, epsilons, config, engine)?;
    table.append_csv(path)?;
    Ok(table)
}

/// Comparison tables of all vectors stacked in vector order
pub fn create_main_comparison<E: TournamentEngine + ?Sized>(
    vectors: &[[f64; 4]],
    epsilons: &[f64],
    config: &AshlockConfig,
    engine: &E,
) -> Result<ComparisonTable, PipelineError> {
    let tables = vectors
        .iter()
        .map(|&v| comparison_for_vector(v, epsilons, config, engine))
        .collect::<Result<Vec<_>, _>>()?;
    ComparisonTable::concat(tables)
}

/// A vector/epsilon comparison that produced no rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedUnit {
    pub vector_index: usize,
    /// `None` when the base vector's own tournament failed, losing every epsilon
    pub epsilon: Option<f64>,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    /// Vector/epsilon blocks appended to the output
    pub completed: usize,
    pub rows_written: usize,
    pub failed: Vec<FailedUnit>,
}

/// Parallel deviation study over many vectors, streamed to one CSV file
///
/// Vectors are compared on a worker pool. Finished blocks are appended by the
/// calling thread only, in vector then epsilon order. A failing vector/epsilon
/// block is logged and skipped and the rest of the sweep carries on. A failed
/// write stops the sweep after the current batch and is returned as the error.
pub struct DeviationSweep<'a, E: ?Sized> {
    vectors: Vec<[f64; 4]>,
    epsilons: Vec<f64>,
    config: AshlockConfig,
    engine: &'a E,
    num_threads: Option<usize>,
    batch_size: usize,
}

impl<'a, E: TournamentEngine + Sync + ?Sized> DeviationSweep<'a, E> {
    pub fn new(
        vectors: Vec<[f64; 4]>,
        epsilons: Vec<f64>,
        config: AshlockConfig,
        engine: &'a E,
    ) -> Self {
        DeviationSweep {
            vectors,
            epsilons,
            config,
            engine,
            num_threads: None,
            batch_size: 64,
        }
    }

    pub fn num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    /// Number of vectors held in memory between writes
    pub fn batch_size(mut self, n: usize) -> Self {
        self.batch_size = n.max(1);
        self
    }

    pub fn run_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<SweepReport, PipelineError> {
        let path = path.as_ref();
        let total = self.vectors.len();
        log::info!(
            "deviation sweep: {} vectors x {} epsilons -> {}",
            total,
            self.epsilons.len(),
            path.display()
        );

        let job = |i: usize| {
            comparison_blocks(self.vectors[i], &self.epsilons, &self.config, self.engine)
        };
        let mut runner = ParallelRunner::new(total, job)
            .progress(simple_progress_reporter((total / 20).max(1)));
        if let Some(n) = self.num_threads {
            runner = runner.num_threads(n);
        }

        let mut report = SweepReport::default();
        let mut write_error: Option<PipelineError> = None;
        runner.run_batched(self.batch_size, |i, result| {
            let blocks = match result {
                Ok(blocks) => blocks,
                Err(e) => {
                    log::warn!("skipping vector {:?}: {}", self.vectors[i], e);
                    report.failed.push(FailedUnit {
                        vector_index: i,
                        epsilon: None,
                        error: e.to_string(),
                    });
                    return ControlFlow::Continue(());
                }
            };
            for (epsilon, block) in blocks {
                match block {
                    Ok(table) => {
                        if let Err(e) = table.append_csv(path) {
                            log::error!("cannot append to {}: {}", path.display(), e);
                            write_error = Some(e);
                            return ControlFlow::Break(());
                        }
                        report.completed += 1;
                        report.rows_written += table.len();
                    }
                    Err(e) => {
                        log::warn!(
                            "skipping vector {:?} at epsilon {}: {}",
                            self.vectors[i],
                            epsilon,
                            e
                        );
                        report.failed.push(FailedUnit {
                            vector_index: i,
                            epsilon: Some(epsilon),
                            error: e.to_string(),
                        });
                    }
                }
            }
            ControlFlow::Continue(())
        });

        match write_error {
            Some(e) => Err(e),
            None => {
                log::info!(
                    "deviation sweep done: {} blocks written, {} failed",
                    report.completed,
                    report.failed.len()
                );
                Ok(report)
            }
        }
    }
}
