//! Iterated Prisoner's Dilemma engine
//!
//! Strategies, the Joss-Ann and Dual strategy transformers, match play and the
//! spatial tournament that produces one summary row per player. Naming and summary
//! columns follow the conventions of the Axelrod library so results can be compared
//! with published fingerprints.

use rand::rngs::StdRng;

pub mod catalog;
pub mod strategies;
pub mod tournament;
pub mod transform;

pub use catalog::StrategySpec;
pub use tournament::{PlayerSummary, ResultSet, SpatialTournament, play_match, read_summary};
pub use transform::{Dual, JossAnn};

// ============================================================================
// Core Domain Types
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Choice {
    Cooperate,
    Defect,
}

impl Choice {
    pub fn flip(self) -> Choice {
        match self {
            Choice::Cooperate => Choice::Defect,
            Choice::Defect => Choice::Cooperate,
        }
    }

    pub fn from_char(c: char) -> Option<Choice> {
        match c {
            'C' | 'c' => Some(Choice::Cooperate),
            'D' | 'd' => Some(Choice::Defect),
            _ => None,
        }
    }
}

// ============================================================================
// Payoff Calculation
// ============================================================================

pub fn calculate_payoff(my_choice: Choice, opponent_choice: Choice) -> i32 {
    match (my_choice, opponent_choice) {
        (Choice::Cooperate, Choice::Cooperate) => 3, // Reward
        (Choice::Defect, Choice::Cooperate) => 5,    // Temptation
        (Choice::Cooperate, Choice::Defect) => 0,    // Sucker
        (Choice::Defect, Choice::Defect) => 1,       // Punishment
    }
}

/// Largest payoff a player can collect in one round
pub const MAX_PAYOFF: i32 = 5;

// ============================================================================
// Round Outcome (per-opponent history seen by a strategy)
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundOutcome {
    pub my_choice: Choice,
    pub opponent_choice: Choice,
}

impl RoundOutcome {
    pub fn new(my_choice: Choice, opponent_choice: Choice) -> Self {
        RoundOutcome {
            my_choice,
            opponent_choice,
        }
    }

    pub fn my_payoff(&self) -> i32 {
        calculate_payoff(self.my_choice, self.opponent_choice)
    }
}

// ============================================================================
// Strategy Trait
// ============================================================================

/// A rule for choosing the next move from the history of the current match
///
/// Strategies hold no per-match state, so one instance can play any number of
/// matches concurrently.
pub trait Strategy: Send + Sync {
    fn decide(&self, history: &[RoundOutcome], rng: &mut StdRng) -> Choice;
    fn name(&self) -> String;
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseStrategyError {
    #[error("unknown strategy key `{0}`")]
    UnknownKey(String),
    #[error("strategy `{0}` expects an argument")]
    MissingArgument(String),
    #[error("invalid argument `{arg}` for strategy `{key}`")]
    InvalidArgument { key: String, arg: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("probability {0} is outside [0, 1]")]
    InvalidProbability(f64),
    #[error("Joss-Ann probabilities ({0}, {1}) sum above 1")]
    InvalidJossAnn(f64, f64),
    #[error("edge ({0}, {1}) refers to a player outside 0..{2}")]
    EdgeOutOfRange(usize, usize, usize),
    #[error("a tournament needs at least one turn and one repetition")]
    EmptyTournament,
    #[error("summary table: {0}")]
    Summary(String),
    #[error("cannot build strategy: {0}")]
    InvalidStrategy(String),
    #[error("tournament failed: {0}")]
    Tournament(String),
}

impl From<csv::Error> for EngineError {
    fn from(e: csv::Error) -> Self {
        EngineError::Summary(e.to_string())
    }
}

pub(crate) fn check_probability(p: f64) -> Result<f64, EngineError> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(EngineError::InvalidProbability(p))
    }
}
