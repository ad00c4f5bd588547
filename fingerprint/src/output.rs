//! Run metadata written next to result tables

use crate::PipelineError;
use crate::config::ExperimentConfig;
use crate::deviation::FailedUnit;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Metadata for reproducibility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub config: ExperimentConfig,
    pub seed: u64,
    pub timestamp: String,
    pub git_commit: Option<String>,
    pub rows_written: usize,
    pub failed_units: Vec<FailedUnit>,
    pub elapsed_secs: f64,
}

impl RunMetadata {
    pub fn new(config: &ExperimentConfig) -> Self {
        RunMetadata {
            config: config.clone(),
            seed: config.experiment.base_seed,
            timestamp: chrono::Utc::now().to_rfc3339(),
            git_commit: git_commit(),
            rows_written: 0,
            failed_units: Vec::new(),
            elapsed_secs: 0.0,
        }
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

fn git_commit() -> Option<String> {
    std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout)
                    .ok()
                    .map(|s| s.trim().to_string())
            } else {
                None
            }
        })
}
