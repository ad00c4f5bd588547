//! Match play and the spatial tournament
//!
//! A spatial tournament only plays the pairings listed in its edge list. Every edge
//! is played once per repetition; each match draws from its own RNG seeded from the
//! tournament seed, the repetition and the edge index, so results do not depend on
//! thread scheduling.

use crate::{Choice, EngineError, RoundOutcome, Strategy, calculate_payoff};
use crate::strategies::state_index;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;

/// Play one match, returning each round as (move of `a`, move of `b`)
pub fn play_match(
    a: &dyn Strategy,
    b: &dyn Strategy,
    turns: usize,
    rng: &mut StdRng,
) -> Vec<(Choice, Choice)> {
    let mut history_a: Vec<RoundOutcome> = Vec::with_capacity(turns);
    let mut history_b: Vec<RoundOutcome> = Vec::with_capacity(turns);
    let mut moves = Vec::with_capacity(turns);

    for _ in 0..turns {
        let choice_a = a.decide(&history_a, rng);
        let choice_b = b.decide(&history_b, rng);
        history_a.push(RoundOutcome::new(choice_a, choice_b));
        history_b.push(RoundOutcome::new(choice_b, choice_a));
        moves.push((choice_a, choice_b));
    }

    moves
}

fn match_seed(seed: u64, repetition: usize, edge: usize) -> u64 {
    seed ^ ((repetition as u64) << 32) ^ (edge as u64)
}

pub struct SpatialTournament {
    players: Vec<Box<dyn Strategy>>,
    edges: Vec<(usize, usize)>,
    turns: usize,
    repetitions: usize,
    seed: u64,
}

impl SpatialTournament {
    pub fn new(
        players: Vec<Box<dyn Strategy>>,
        edges: Vec<(usize, usize)>,
        turns: usize,
        repetitions: usize,
        seed: u64,
    ) -> Result<Self, EngineError> {
        if turns == 0 || repetitions == 0 {
            return Err(EngineError::EmptyTournament);
        }
        if let Some(&(a, b)) = edges
            .iter()
            .find(|&&(a, b)| a >= players.len() || b >= players.len())
        {
            return Err(EngineError::EdgeOutOfRange(a, b, players.len()));
        }
        Ok(SpatialTournament {
            players,
            edges,
            turns,
            repetitions,
            seed,
        })
    }

    pub fn play(&self) -> ResultSet {
        log::debug!(
            "playing {} edges x {} repetitions ({} turns)",
            self.edges.len(),
            self.repetitions,
            self.turns
        );

        let matches: Vec<Vec<Vec<(Choice, Choice)>>> = (0..self.repetitions)
            .map(|repetition| {
                self.edges
                    .par_iter()
                    .enumerate()
                    .map(|(edge, &(a, b))| {
                        let mut rng =
                            StdRng::seed_from_u64(match_seed(self.seed, repetition, edge));
                        play_match(
                            self.players[a].as_ref(),
                            self.players[b].as_ref(),
                            self.turns,
                            &mut rng,
                        )
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        ResultSet {
            names: self.players.iter().map(|p| p.name()).collect(),
            edges: self.edges.clone(),
            turns: self.turns,
            matches,
        }
    }
}

/// One row of the tournament summary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    #[serde(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Median_score")]
    pub median_score: f64,
    #[serde(rename = "Cooperation_rating")]
    pub cooperation_rating: f64,
    #[serde(rename = "Wins")]
    pub wins: f64,
    #[serde(rename = "Initial_C_rate")]
    pub initial_c_rate: f64,
    #[serde(rename = "CC_rate")]
    pub cc_rate: f64,
    #[serde(rename = "CD_rate")]
    pub cd_rate: f64,
    #[serde(rename = "DC_rate")]
    pub dc_rate: f64,
    #[serde(rename = "DD_rate")]
    pub dd_rate: f64,
    #[serde(rename = "CC_to_C_rate")]
    pub cc_to_c_rate: f64,
    #[serde(rename = "CD_to_C_rate")]
    pub cd_to_c_rate: f64,
    #[serde(rename = "DC_to_C_rate")]
    pub dc_to_c_rate: f64,
    #[serde(rename = "DD_to_C_rate")]
    pub dd_to_c_rate: f64,
}

/// Per-player tallies accumulated over every match and repetition
#[derive(Default, Clone)]
struct Tally {
    score_per_turn: Vec<f64>,
    matches_per_rep: Vec<usize>,
    wins_per_rep: Vec<usize>,
    turns: usize,
    cooperations: usize,
    matches: usize,
    initial_cooperations: usize,
    states: [usize; 4],
    followed_states: [usize; 4],
    states_to_c: [usize; 4],
}

impl Tally {
    fn new(repetitions: usize) -> Self {
        Tally {
            score_per_turn: vec![0.0; repetitions],
            matches_per_rep: vec![0; repetitions],
            wins_per_rep: vec![0; repetitions],
            ..Default::default()
        }
    }

    fn record(&mut self, repetition: usize, rounds: &[RoundOutcome]) {
        if rounds.is_empty() {
            return;
        }
        let own: i32 = rounds.iter().map(|r| r.my_payoff()).sum();
        let theirs: i32 = rounds
            .iter()
            .map(|r| calculate_payoff(r.opponent_choice, r.my_choice))
            .sum();

        self.score_per_turn[repetition] += own as f64 / rounds.len() as f64;
        self.matches_per_rep[repetition] += 1;
        if own > theirs {
            self.wins_per_rep[repetition] += 1;
        }

        self.matches += 1;
        self.turns += rounds.len();
        if rounds[0].my_choice == Choice::Cooperate {
            self.initial_cooperations += 1;
        }
        for r in rounds {
            self.states[state_index(r)] += 1;
            if r.my_choice == Choice::Cooperate {
                self.cooperations += 1;
            }
        }
        for pair in rounds.windows(2) {
            let state = state_index(&pair[0]);
            self.followed_states[state] += 1;
            if pair[1].my_choice == Choice::Cooperate {
                self.states_to_c[state] += 1;
            }
        }
    }

    fn median_score(&self) -> f64 {
        let means: Vec<f64> = self
            .score_per_turn
            .iter()
            .zip(&self.matches_per_rep)
            .map(|(&score, &n)| if n > 0 { score / n as f64 } else { 0.0 })
            .collect();
        median(means)
    }

    fn median_wins(&self) -> f64 {
        median(self.wins_per_rep.iter().map(|&w| w as f64).collect())
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Every move of every match of a played tournament
pub struct ResultSet {
    names: Vec<String>,
    edges: Vec<(usize, usize)>,
    turns: usize,
    /// Indexed by repetition, then edge
    matches: Vec<Vec<Vec<(Choice, Choice)>>>,
}

impl ResultSet {
    pub fn repetitions(&self) -> usize {
        self.matches.len()
    }

    /// One row per player, ordered by median score (highest first)
    pub fn summarise(&self) -> Vec<PlayerSummary> {
        let mut tallies = vec![Tally::new(self.repetitions()); self.names.len()];

        for (repetition, rep_matches) in self.matches.iter().enumerate() {
            for (&(a, b), moves) in self.edges.iter().zip(rep_matches) {
                let seen_by_a: Vec<RoundOutcome> =
                    moves.iter().map(|&(x, y)| RoundOutcome::new(x, y)).collect();
                let seen_by_b: Vec<RoundOutcome> =
                    moves.iter().map(|&(x, y)| RoundOutcome::new(y, x)).collect();
                tallies[a].record(repetition, &seen_by_a);
                tallies[b].record(repetition, &seen_by_b);
            }
        }

        let mut rows: Vec<PlayerSummary> = self
            .names
            .iter()
            .zip(&tallies)
            .map(|(name, t)| PlayerSummary {
                rank: 0,
                name: name.clone(),
                median_score: t.median_score(),
                cooperation_rating: ratio(t.cooperations, t.turns),
                wins: t.median_wins(),
                initial_c_rate: ratio(t.initial_cooperations, t.matches),
                cc_rate: ratio(t.states[0], t.turns),
                cd_rate: ratio(t.states[1], t.turns),
                dc_rate: ratio(t.states[2], t.turns),
                dd_rate: ratio(t.states[3], t.turns),
                cc_to_c_rate: ratio(t.states_to_c[0], t.followed_states[0]),
                cd_to_c_rate: ratio(t.states_to_c[1], t.followed_states[1]),
                dc_to_c_rate: ratio(t.states_to_c[2], t.followed_states[2]),
                dd_to_c_rate: ratio(t.states_to_c[3], t.followed_states[3]),
            })
            .collect();

        // stable: ties keep player order
        rows.sort_by(|a, b| {
            b.median_score
                .partial_cmp(&a.median_score)
                .unwrap_or(Ordering::Equal)
        });
        for (rank, row) in rows.iter_mut().enumerate() {
            row.rank = rank;
        }
        rows
    }

    /// Mean score per turn of each edge's first player, averaged over repetitions
    pub fn edge_scores(&self) -> Vec<f64> {
        let reps = self.repetitions().max(1) as f64;
        (0..self.edges.len())
            .map(|edge| {
                let total: f64 = self
                    .matches
                    .iter()
                    .map(|rep| {
                        let moves = &rep[edge];
                        let score: i32 = moves.iter().map(|&(x, y)| calculate_payoff(x, y)).sum();
                        score as f64 / self.turns.max(1) as f64
                    })
                    .sum();
                total / reps
            })
            .collect()
    }

    /// Write the summary table as CSV
    pub fn write_summary<P: AsRef<Path>>(&self, path: P) -> Result<(), EngineError> {
        let mut wtr = csv::Writer::from_path(path)?;
        for row in self.summarise() {
            wtr.serialize(row)?;
        }
        wtr.flush().map_err(|e| EngineError::Summary(e.to_string()))?;
        Ok(())
    }
}

/// Read a summary table written by `ResultSet::write_summary`
pub fn read_summary<P: AsRef<Path>>(path: P) -> Result<Vec<PlayerSummary>, EngineError> {
    let mut rdr = csv::Reader::from_path(path)?;
    let rows = rdr.deserialize().collect::<Result<Vec<PlayerSummary>, _>>()?;
    Ok(rows)
}
