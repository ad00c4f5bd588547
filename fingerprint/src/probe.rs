//! Probe strategies: a base strategy transformed by one grid point

use crate::grid::Point;
use ipd::{Dual, EngineError, JossAnn, Strategy, StrategySpec};
use serde::Serialize;

/// Joss-Ann probe, optionally wrapped in Dual
///
/// Below the anti-diagonal the probe is `JossAnn(x, y)` on the base. On or above
/// it the probe is `Dual(JossAnn(1 - x, 1 - y))`, which keeps the Joss-Ann
/// parameters inside the simplex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeSpec {
    pub base: StrategySpec,
    pub point: Point,
    pub probability: (f64, f64),
    pub dual: bool,
}

impl ProbeSpec {
    pub fn build(&self) -> Result<Box<dyn Strategy>, EngineError> {
        let joss_ann = JossAnn::new(self.probability, self.base.build()?)?;
        if self.dual {
            Ok(Box::new(Dual::new(Box::new(joss_ann))))
        } else {
            Ok(Box::new(joss_ann))
        }
    }

    pub fn name(&self) -> String {
        let [lower, upper] = probe_labels(&self.base);
        if self.dual { upper } else { lower }
    }
}

/// Map a grid point to its probe on `base`
pub fn create_jossann(point: Point, base: &StrategySpec) -> ProbeSpec {
    if point.is_upper() {
        ProbeSpec {
            base: base.clone(),
            point,
            probability: (1.0 - point.x, 1.0 - point.y),
            dual: true,
        }
    } else {
        ProbeSpec {
            base: base.clone(),
            point,
            probability: (point.x, point.y),
            dual: false,
        }
    }
}

/// One probe per point, in point order
pub fn create_probes(base: &StrategySpec, points: &[Point]) -> Vec<ProbeSpec> {
    points.iter().map(|&p| create_jossann(p, base)).collect()
}

/// Names under which probes on `base` appear in a summary
pub fn probe_labels(base: &StrategySpec) -> [String; 2] {
    let name = base.name();
    [format!("Joss-Ann {}", name), format!("Dual Joss-Ann {}", name)]
}
