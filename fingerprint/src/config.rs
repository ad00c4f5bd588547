//! Experiment configuration loaded from TOML
//!
//! ```toml
//! [experiment]
//! name = "memory_one_sweep"
//! base_seed = 42
//!
//! [tournament]
//! turns = 200
//! repetitions = 10
//! step = 0.25
//! probe = "tit_for_tat"
//!
//! [deviation]
//! q_num = 11
//! epsilons = [0.01, 0.025, 0.05, 0.1, 0.25]
//!
//! [output]
//! directory = "results"
//! ```
//!
//! Every section except `[experiment]` may be left out.

use crate::PipelineError;
use crate::ashlock::AshlockConfig;
use crate::engine::IpdEngine;
use ipd::StrategySpec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub experiment: ExperimentMetadata,
    #[serde(default)]
    pub tournament: TournamentSettings,
    #[serde(default)]
    pub deviation: DeviationSettings,
    #[serde(default)]
    pub training: TrainingSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub base_seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentSettings {
    pub turns: usize,
    pub repetitions: usize,
    pub step: f64,
    pub probe: StrategySpec,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        TournamentSettings {
            turns: 200,
            repetitions: 10,
            step: 0.25,
            probe: StrategySpec::TitForTat,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviationSettings {
    pub q_num: usize,
    pub epsilons: Vec<f64>,
    pub num_threads: Option<usize>,
    pub batch_size: usize,
}

impl Default for DeviationSettings {
    fn default() -> Self {
        DeviationSettings {
            q_num: 11,
            epsilons: vec![0.01, 0.025, 0.05, 0.1, 0.25],
            num_threads: None,
            batch_size: 64,
        }
    }
}

/// Strategies of the labelled self-comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSettings {
    pub strategies: Vec<StrategySpec>,
    /// Each strategy enters the tournament this many times
    pub copies: usize,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        TrainingSettings {
            strategies: StrategySpec::basic(),
            copies: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub directory: PathBuf,
    pub write_metadata: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            directory: PathBuf::from("results"),
            write_metadata: true,
        }
    }
}

impl ExperimentConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let contents = fs::read_to_string(path)?;
        contents.parse()
    }

    pub fn engine(&self) -> IpdEngine {
        IpdEngine {
            turns: self.tournament.turns,
            repetitions: self.tournament.repetitions,
            seed: self.experiment.base_seed,
        }
    }

    pub fn ashlock(&self) -> AshlockConfig {
        AshlockConfig {
            step: self.tournament.step,
            probe: self.tournament.probe.clone(),
        }
    }

    /// `<directory>/<experiment name>`
    pub fn output_dir(&self) -> PathBuf {
        self.output.directory.join(&self.experiment.name)
    }
}

impl std::str::FromStr for ExperimentConfig {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}
