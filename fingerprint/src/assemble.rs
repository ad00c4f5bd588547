//! Player list and edge list of a fingerprint tournament

use crate::engine::PlayerSpec;
use crate::probe::ProbeSpec;
use ipd::StrategySpec;

/// Ordered pair of player indices that play each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge(pub usize, pub usize);

impl From<Edge> for (usize, usize) {
    fn from(edge: Edge) -> Self {
        (edge.0, edge.1)
    }
}

/// Connect every target to every probe and nothing else
///
/// Players are numbered targets first, so probe `j` sits at index
/// `num_targets + j`. Edges are target-major.
pub fn create_edges(num_targets: usize, num_probes: usize) -> Vec<Edge> {
    (0..num_targets)
        .flat_map(|i| (0..num_probes).map(move |j| Edge(i, num_targets + j)))
        .collect()
}

/// Everything an engine needs to play one fingerprint tournament
#[derive(Debug, Clone)]
pub struct TournamentPlan {
    pub players: Vec<PlayerSpec>,
    pub edges: Vec<Edge>,
    pub num_targets: usize,
}

impl TournamentPlan {
    pub fn new(targets: Vec<StrategySpec>, probes: Vec<ProbeSpec>) -> Self {
        let num_targets = targets.len();
        let edges = create_edges(num_targets, probes.len());
        let players = targets
            .into_iter()
            .map(PlayerSpec::Target)
            .chain(probes.into_iter().map(PlayerSpec::Probe))
            .collect();
        TournamentPlan {
            players,
            edges,
            num_targets,
        }
    }

    pub fn num_probes(&self) -> usize {
        self.players.len() - self.num_targets
    }
}
