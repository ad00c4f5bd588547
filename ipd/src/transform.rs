//! Strategy transformers used to build fingerprint probes

use crate::{Choice, EngineError, RoundOutcome, Strategy, check_probability};
use rand::Rng;
use rand::rngs::StdRng;

/// Rounding slack allowed on `x + y <= 1` for grid-derived probabilities
const SIMPLEX_TOLERANCE: f64 = 1e-9;

/// JOSS-ANN: Cooperate with probability x, defect with probability y, otherwise
/// play whatever the wrapped strategy would play
pub struct JossAnn {
    cooperate: f64,
    defect: f64,
    inner: Box<dyn Strategy>,
}

impl JossAnn {
    pub fn new(probability: (f64, f64), inner: Box<dyn Strategy>) -> Result<Self, EngineError> {
        let (x, y) = probability;
        check_probability(x)?;
        check_probability(y)?;
        if x + y > 1.0 + SIMPLEX_TOLERANCE {
            return Err(EngineError::InvalidJossAnn(x, y));
        }
        Ok(JossAnn {
            cooperate: x,
            defect: y,
            inner,
        })
    }
}

impl Strategy for JossAnn {
    fn decide(&self, history: &[RoundOutcome], rng: &mut StdRng) -> Choice {
        let r = rng.random::<f64>();
        if r < self.cooperate {
            Choice::Cooperate
        } else if r < self.cooperate + self.defect {
            Choice::Defect
        } else {
            self.inner.decide(history, rng)
        }
    }

    fn name(&self) -> String {
        format!("Joss-Ann {}", self.inner.name())
    }
}

/// DUAL: Play the opposite of what the wrapped strategy would play had it made
/// the opposite of every one of our past moves
pub struct Dual {
    inner: Box<dyn Strategy>,
}

impl Dual {
    pub fn new(inner: Box<dyn Strategy>) -> Self {
        Dual { inner }
    }
}

impl Strategy for Dual {
    fn decide(&self, history: &[RoundOutcome], rng: &mut StdRng) -> Choice {
        let mirrored: Vec<RoundOutcome> = history
            .iter()
            .map(|r| RoundOutcome::new(r.my_choice.flip(), r.opponent_choice))
            .collect();
        self.inner.decide(&mirrored, rng).flip()
    }

    fn name(&self) -> String {
        format!("Dual {}", self.inner.name())
    }
}
