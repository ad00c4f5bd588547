// Given-When-Then tests for the fingerprint pipeline
// A scripted engine stands in for move play so expected tables can be worked out by hand

use approx::assert_relative_eq;
use fingerprint::deviation::{
    append_comparison_for_vector, comparison_for_vector, deviated_vectors,
};
use fingerprint::{
    AshlockConfig, AshlockTournament, DeviationSweep, Edge, FailedUnit, IpdEngine, Metric,
    Metrics, PlayerSpec, SummaryRow, TournamentEngine, TournamentOutcome, create_main_comparison,
    training_table,
};
use ipd::{EngineError, StrategySpec};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Reports metrics read straight off memory-one vectors; probes score 5 on everything
struct ScriptedEngine;

fn scripted_metrics(player: &PlayerSpec) -> Metrics {
    match player {
        PlayerSpec::Target(StrategySpec::MemoryOne(v)) => Metrics::from_fn(|m| match m {
            Metric::MedianScore => 5.0 * v[0],
            Metric::CooperationRating => v.iter().sum::<f64>() / 4.0,
            Metric::CcRate => v[0],
            Metric::CdRate => v[1],
            Metric::DcRate => v[2],
            Metric::DdRate => v[3],
            Metric::Wins => 0.0,
            _ => 0.5,
        }),
        PlayerSpec::Target(_) => Metrics::from_fn(|_| 0.5),
        PlayerSpec::Probe(_) => Metrics::from_fn(|_| 5.0),
    }
}

impl TournamentEngine for ScriptedEngine {
    fn play(
        &self,
        players: &[PlayerSpec],
        edges: &[Edge],
    ) -> Result<TournamentOutcome, EngineError> {
        let summary = players
            .iter()
            .enumerate()
            .map(|(rank, p)| SummaryRow {
                rank,
                name: p.name(),
                metrics: scripted_metrics(p),
            })
            .collect();
        Ok(TournamentOutcome {
            summary,
            edge_scores: vec![0.0; edges.len()],
        })
    }
}

/// Fails any tournament that includes the memory-one vector (0.5, 0.5, 0.5, 0.5)
struct FailingEngine;

impl TournamentEngine for FailingEngine {
    fn play(
        &self,
        players: &[PlayerSpec],
        edges: &[Edge],
    ) -> Result<TournamentOutcome, EngineError> {
        let poisoned = players
            .iter()
            .any(|p| *p == PlayerSpec::Target(StrategySpec::MemoryOne([0.5; 4])));
        if poisoned {
            return Err(EngineError::Tournament("scripted failure".to_string()));
        }
        ScriptedEngine.play(players, edges)
    }
}

/// Fails the tournament of the epsilon 0.25 neighbours of (0.5, 0.5, 0.5, 0.5)
///
/// The all-positive neighbour at that magnitude is (0.75, 0.75, 0.75, 0.75).
struct OneEpsilonFailingEngine;

impl TournamentEngine for OneEpsilonFailingEngine {
    fn play(
        &self,
        players: &[PlayerSpec],
        edges: &[Edge],
    ) -> Result<TournamentOutcome, EngineError> {
        let poisoned = players
            .iter()
            .any(|p| *p == PlayerSpec::Target(StrategySpec::MemoryOne([0.75; 4])));
        if poisoned {
            return Err(EngineError::Tournament("neighbour failure".to_string()));
        }
        ScriptedEngine.play(players, edges)
    }
}

/// Scripted engine that counts the tournaments it is asked to play
#[derive(Default)]
struct CountingEngine {
    played: AtomicUsize,
}

impl TournamentEngine for CountingEngine {
    fn play(
        &self,
        players: &[PlayerSpec],
        edges: &[Edge],
    ) -> Result<TournamentOutcome, EngineError> {
        self.played.fetch_add(1, Ordering::SeqCst);
        ScriptedEngine.play(players, edges)
    }
}

fn half_step() -> AshlockConfig {
    AshlockConfig {
        step: 0.5,
        probe: StrategySpec::TitForTat,
    }
}

fn quick_engine() -> IpdEngine {
    IpdEngine {
        turns: 20,
        repetitions: 1,
        seed: 9,
    }
}

#[test]
fn given_half_step_when_assembling_single_target_then_it_meets_all_nine_probes() {
    // GIVEN: one target and a 3 x 3 probe grid
    let tournament = AshlockTournament::build(vec![StrategySpec::Grudger], &half_step()).unwrap();

    // THEN: player 0 is connected to players 1..=9 and nothing else
    let expected: Vec<Edge> = (1..=9).map(|j| Edge(0, j)).collect();
    assert_eq!(tournament.plan().edges, expected);
    assert_eq!(tournament.points().len(), 9);
}

#[test]
fn given_vector_when_deviating_by_half_then_first_neighbour_is_clipped() {
    let neighbours = deviated_vectors([1.0, 1.0, 0.0, 0.0], 0.5);

    assert_eq!(neighbours.len(), 16);
    assert_eq!(neighbours[0], [1.0, 1.0, 0.5, 0.5]);
}

#[test]
fn given_scripted_summary_when_running_ashlock_then_probe_rows_dropped_and_median_scaled() {
    // GIVEN: three memory-one targets
    let targets = vec![
        StrategySpec::MemoryOne([0.5, 0.0, 0.0, 0.0]),
        StrategySpec::MemoryOne([1.0, 0.0, 0.0, 0.0]),
        StrategySpec::MemoryOne([0.2, 0.0, 0.0, 0.0]),
    ];
    let tournament = AshlockTournament::build(targets, &half_step()).unwrap();

    // WHEN: the tournament is reduced
    let table = tournament.run(&ScriptedEngine).unwrap();

    // THEN: only targets remain, with median score divided by 5
    assert_eq!(table.len(), 3);
    let medians: Vec<f64> = table
        .rows()
        .iter()
        .map(|r| r.metrics[Metric::MedianScore])
        .collect();
    assert_relative_eq!(medians[0], 0.5);
    assert_relative_eq!(medians[1], 1.0);
    assert_relative_eq!(medians[2], 0.2);
}

#[test]
fn given_vector_when_comparing_across_epsilons_then_one_block_of_sixteen_per_epsilon() {
    // WHEN: (1, 1, 0, 0) is compared with its neighbours at two magnitudes
    let table =
        comparison_for_vector([1.0, 1.0, 0.0, 0.0], &[0.5, 0.1], &half_step(), &ScriptedEngine)
            .unwrap();

    // THEN: 1 base row x 16 neighbours per epsilon, in epsilon order
    assert_eq!(table.len(), 32);
    assert!(table.rows()[..16].iter().all(|r| r.epsilon == Some(0.5)));
    assert!(table.rows()[16..].iter().all(|r| r.epsilon == Some(0.1)));

    // THEN: first neighbour (1, 1, 0.5, 0.5) against the base
    let first = &table.rows()[0].ratios;
    assert_relative_eq!(first[Metric::CcRate], 1.0);
    assert_relative_eq!(first[Metric::DcRate], 0.0);
    // both zero, so filled as identical
    assert_relative_eq!(first[Metric::Wins], 1.0);

    // THEN: last neighbour (0.5, 0.5, 0, 0) against the base
    let last = &table.rows()[15].ratios;
    assert_relative_eq!(last[Metric::CcRate], 0.5);
    assert_relative_eq!(last[Metric::DcRate], 1.0);

    for row in table.rows() {
        for (metric, v) in row.ratios.iter() {
            assert!((0.0..=1.0).contains(&v), "{:?} = {}", metric, v);
        }
    }
}

#[test]
fn given_several_vectors_when_creating_main_comparison_then_blocks_stack_in_vector_order() {
    let vectors = [[1.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 1.0], [0.5, 0.5, 0.5, 0.5]];
    let epsilons = [0.05, 0.25];

    let table = create_main_comparison(&vectors, &epsilons, &half_step(), &ScriptedEngine).unwrap();

    assert_eq!(table.len(), vectors.len() * epsilons.len() * 16);
    assert_eq!(table.header().last().map(String::as_str), Some("Epsilon"));
}

#[test]
fn given_existing_file_when_appending_comparisons_then_header_written_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("compare.csv");

    append_comparison_for_vector([1.0, 0.0, 1.0, 0.0], &[0.1], &half_step(), &ScriptedEngine, &path)
        .unwrap();
    append_comparison_for_vector([0.0, 1.0, 0.0, 1.0], &[0.1], &half_step(), &ScriptedEngine, &path)
        .unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let header_lines = contents.lines().filter(|l| l.starts_with("Name_A")).count();
    assert_eq!(header_lines, 1);
    assert_eq!(contents.lines().count(), 1 + 2 * 16);
}

#[test]
fn given_failing_vector_when_sweeping_then_it_is_skipped_and_the_rest_written() {
    // GIVEN: the middle vector makes the engine fail
    let vectors = vec![[0.0; 4], [0.5; 4], [1.0; 4]];
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.csv");

    // WHEN: the sweep runs on two threads, one vector per batch
    let report = DeviationSweep::new(vectors, vec![0.25], half_step(), &FailingEngine)
        .num_threads(2)
        .batch_size(1)
        .run_to_csv(&path)
        .unwrap();

    // THEN: the failure is reported and the other vectors are written
    assert_eq!(report.completed, 2);
    assert_eq!(report.rows_written, 32);
    assert_eq!(report.failed.len(), 1);
    // base tournament failed, so no epsilon survives
    assert_eq!(report.failed[0].vector_index, 1);
    assert_eq!(report.failed[0].epsilon, None);
    assert!(report.failed[0].error.contains("scripted failure"));

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    assert_eq!(rdr.records().count(), 32);
}

#[test]
fn given_one_failing_epsilon_when_sweeping_then_other_epsilons_are_still_written() {
    // GIVEN: the epsilon 0.25 neighbours of the only vector cannot be played
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.csv");

    // WHEN: the sweep compares it at 0.1 and 0.25
    let report = DeviationSweep::new(
        vec![[0.5; 4]],
        vec![0.1, 0.25],
        half_step(),
        &OneEpsilonFailingEngine,
    )
    .batch_size(1)
    .run_to_csv(&path)
    .unwrap();

    // THEN: the 0.1 block is written and only the 0.25 block is reported
    assert_eq!(report.completed, 1);
    assert_eq!(report.rows_written, 16);
    assert_eq!(report.failed.len(), 1);
    let FailedUnit {
        vector_index,
        epsilon,
        error,
    } = &report.failed[0];
    assert_eq!((*vector_index, *epsilon), (0, Some(0.25)));
    assert!(error.contains("neighbour failure"));

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let epsilon_column = rdr.headers().unwrap().iter().position(|h| h == "Epsilon").unwrap();
    let epsilons: Vec<f64> = rdr
        .records()
        .map(|r| r.unwrap()[epsilon_column].parse().unwrap())
        .collect();
    assert_eq!(epsilons, vec![0.1; 16]);

    // THEN: the all-or-nothing comparison still refuses the vector
    assert!(
        comparison_for_vector([0.5; 4], &[0.1, 0.25], &half_step(), &OneEpsilonFailingEngine)
            .is_err()
    );
}

#[test]
fn given_unwritable_output_when_sweeping_then_it_stops_after_the_first_batch() {
    // GIVEN: the output path is a directory, so the first append fails
    let dir = tempfile::tempdir().unwrap();
    let vectors = vec![[0.5; 4]; 20];
    let engine = CountingEngine::default();

    // WHEN: the sweep runs one vector per batch on one thread
    let result = DeviationSweep::new(vectors, vec![0.25], half_step(), &engine)
        .num_threads(1)
        .batch_size(1)
        .run_to_csv(dir.path());

    // THEN: the write error comes back and only the first vector was played
    assert!(result.is_err());
    // one base tournament plus one neighbour tournament
    assert_eq!(engine.played.load(Ordering::SeqCst), 2);
}

#[test]
fn given_ipd_engine_when_comparing_memory_one_vector_then_ratios_are_bounded() {
    let table =
        comparison_for_vector([1.0, 0.0, 1.0, 0.0], &[0.25], &half_step(), &quick_engine())
            .unwrap();

    assert_eq!(table.len(), 16);
    for row in table.rows() {
        assert_eq!(row.name_a, "Generic Memory One Player");
        for (_, v) in row.ratios.iter() {
            assert!((0.0..=1.0).contains(&v));
        }
    }
}

#[test]
fn given_repeated_strategies_when_building_training_table_then_copies_are_equivalent() {
    // GIVEN: two strategies entered twice each
    let targets = vec![
        StrategySpec::Cooperator,
        StrategySpec::Cooperator,
        StrategySpec::Defector,
        StrategySpec::Defector,
    ];
    let reduced = AshlockTournament::build(targets, &half_step())
        .unwrap()
        .run(&quick_engine())
        .unwrap();
    assert_eq!(reduced.len(), 4);

    // WHEN: the reduced table is compared with itself
    let training = training_table(&reduced);

    // THEN: 4 x 4 rows, half of them between copies of one strategy
    assert_eq!(training.len(), 16);
    let equivalent = training
        .rows()
        .iter()
        .filter(|r| r.equivalent == Some(true))
        .count();
    assert_eq!(equivalent, 8);
}
