use crate::{Choice, EngineError, RoundOutcome, Strategy, check_probability};
use rand::Rng;
use rand::rngs::StdRng;

// ============================================================================
// Strategy Implementations
// ============================================================================

/// COOPERATOR: Always cooperate
pub struct Cooperator;

impl Strategy for Cooperator {
    fn decide(&self, _history: &[RoundOutcome], _rng: &mut StdRng) -> Choice {
        Choice::Cooperate
    }

    fn name(&self) -> String {
        "Cooperator".to_string()
    }
}

/// DEFECTOR: Always defect
pub struct Defector;

impl Strategy for Defector {
    fn decide(&self, _history: &[RoundOutcome], _rng: &mut StdRng) -> Choice {
        Choice::Defect
    }

    fn name(&self) -> String {
        "Defector".to_string()
    }
}

/// TIT FOR TAT: Cooperate on first move, then copy opponent's last move
pub struct TitForTat;

impl Strategy for TitForTat {
    fn decide(&self, history: &[RoundOutcome], _rng: &mut StdRng) -> Choice {
        match history.last() {
            Some(last) => last.opponent_choice,
            None => Choice::Cooperate,
        }
    }

    fn name(&self) -> String {
        "Tit For Tat".to_string()
    }
}

/// TIT FOR 2 TATS: Defect only after two consecutive opponent defections
pub struct TitFor2Tats;

impl Strategy for TitFor2Tats {
    fn decide(&self, history: &[RoundOutcome], _rng: &mut StdRng) -> Choice {
        let recent = &history[history.len().saturating_sub(2)..];
        if recent.len() == 2 && recent.iter().all(|r| r.opponent_choice == Choice::Defect) {
            Choice::Defect
        } else {
            Choice::Cooperate
        }
    }

    fn name(&self) -> String {
        "Tit For 2 Tats".to_string()
    }
}

/// TWO TITS FOR TAT: Defect twice after each opponent defection
pub struct TwoTitsForTat;

impl Strategy for TwoTitsForTat {
    fn decide(&self, history: &[RoundOutcome], _rng: &mut StdRng) -> Choice {
        let recent = &history[history.len().saturating_sub(2)..];
        if recent.iter().any(|r| r.opponent_choice == Choice::Defect) {
            Choice::Defect
        } else {
            Choice::Cooperate
        }
    }

    fn name(&self) -> String {
        "Two Tits For Tat".to_string()
    }
}

/// ANTI TIT FOR TAT: Cooperate first, then play the opposite of the opponent's last move
pub struct AntiTitForTat;

impl Strategy for AntiTitForTat {
    fn decide(&self, history: &[RoundOutcome], _rng: &mut StdRng) -> Choice {
        match history.last() {
            Some(last) => last.opponent_choice.flip(),
            None => Choice::Cooperate,
        }
    }

    fn name(&self) -> String {
        "Anti Tit For Tat".to_string()
    }
}

/// BULLY: Defect first, then play the opposite of the opponent's last move
pub struct Bully;

impl Strategy for Bully {
    fn decide(&self, history: &[RoundOutcome], _rng: &mut StdRng) -> Choice {
        match history.last() {
            Some(last) => last.opponent_choice.flip(),
            None => Choice::Defect,
        }
    }

    fn name(&self) -> String {
        "Bully".to_string()
    }
}

/// WIN-STAY LOSE-SHIFT: Repeat the last move after a good payoff, switch otherwise
pub struct WinStayLoseShift;

impl Strategy for WinStayLoseShift {
    fn decide(&self, history: &[RoundOutcome], _rng: &mut StdRng) -> Choice {
        match history.last() {
            // R and T payoffs only happen when the opponent cooperated
            Some(last) if last.opponent_choice == Choice::Cooperate => last.my_choice,
            Some(last) => last.my_choice.flip(),
            None => Choice::Cooperate,
        }
    }

    fn name(&self) -> String {
        "Win-Stay Lose-Shift".to_string()
    }
}

/// GRUDGER: Cooperate until opponent defects once, then always defect
pub struct Grudger;

impl Strategy for Grudger {
    fn decide(&self, history: &[RoundOutcome], _rng: &mut StdRng) -> Choice {
        if history.iter().any(|r| r.opponent_choice == Choice::Defect) {
            Choice::Defect
        } else {
            Choice::Cooperate
        }
    }

    fn name(&self) -> String {
        "Grudger".to_string()
    }
}

/// RANDOM: Cooperate with a fixed probability
pub struct Random {
    p: f64,
}

impl Random {
    pub fn new(p: f64) -> Result<Self, EngineError> {
        Ok(Random {
            p: check_probability(p)?,
        })
    }
}

impl Strategy for Random {
    fn decide(&self, _history: &[RoundOutcome], rng: &mut StdRng) -> Choice {
        if rng.random::<f64>() < self.p {
            Choice::Cooperate
        } else {
            Choice::Defect
        }
    }

    fn name(&self) -> String {
        format!("Random: {}", self.p)
    }
}

/// CYCLER: Repeat a fixed sequence of moves
pub struct Cycler {
    pattern: Vec<Choice>,
}

impl Cycler {
    /// Returns `None` for an empty pattern or one containing anything but C and D
    pub fn new(pattern: &str) -> Option<Self> {
        let pattern: Option<Vec<Choice>> = pattern.chars().map(Choice::from_char).collect();
        match pattern {
            Some(moves) if !moves.is_empty() => Some(Cycler { pattern: moves }),
            _ => None,
        }
    }
}

impl Strategy for Cycler {
    fn decide(&self, history: &[RoundOutcome], _rng: &mut StdRng) -> Choice {
        self.pattern[history.len() % self.pattern.len()]
    }

    fn name(&self) -> String {
        let label: String = self
            .pattern
            .iter()
            .map(|c| match c {
                Choice::Cooperate => 'C',
                Choice::Defect => 'D',
            })
            .collect();
        format!("Cycler {}", label)
    }
}

/// GO BY MAJORITY: Cooperate while the opponent has not defected more than cooperated
///
/// Only the last `memory` rounds are counted; a memory of 0 counts the whole match.
pub struct GoByMajority {
    memory: usize,
}

impl GoByMajority {
    pub fn new(memory: usize) -> Self {
        GoByMajority { memory }
    }
}

impl Strategy for GoByMajority {
    fn decide(&self, history: &[RoundOutcome], _rng: &mut StdRng) -> Choice {
        let window = if self.memory == 0 {
            history
        } else {
            &history[history.len().saturating_sub(self.memory)..]
        };
        let defections = window
            .iter()
            .filter(|r| r.opponent_choice == Choice::Defect)
            .count();
        if defections * 2 > window.len() {
            Choice::Defect
        } else {
            Choice::Cooperate
        }
    }

    fn name(&self) -> String {
        if self.memory == 0 {
            "Go By Majority".to_string()
        } else {
            format!("Go By Majority: {}", self.memory)
        }
    }
}

/// MEMORY ONE: Cooperate with a probability chosen by the previous round's outcome
///
/// The four probabilities apply after CC, CD, DC and DD (own move first).
pub struct MemoryOne {
    four_vector: [f64; 4],
}

impl MemoryOne {
    pub fn new(four_vector: [f64; 4]) -> Result<Self, EngineError> {
        for p in four_vector {
            check_probability(p)?;
        }
        Ok(MemoryOne { four_vector })
    }
}

/// Index of a round's state in CC, CD, DC, DD order
pub fn state_index(round: &RoundOutcome) -> usize {
    match (round.my_choice, round.opponent_choice) {
        (Choice::Cooperate, Choice::Cooperate) => 0,
        (Choice::Cooperate, Choice::Defect) => 1,
        (Choice::Defect, Choice::Cooperate) => 2,
        (Choice::Defect, Choice::Defect) => 3,
    }
}

impl Strategy for MemoryOne {
    fn decide(&self, history: &[RoundOutcome], rng: &mut StdRng) -> Choice {
        let Some(last) = history.last() else {
            return Choice::Cooperate;
        };
        if rng.random::<f64>() < self.four_vector[state_index(last)] {
            Choice::Cooperate
        } else {
            Choice::Defect
        }
    }

    fn name(&self) -> String {
        "Generic Memory One Player".to_string()
    }
}
