//! Reduce an engine summary to one row per target

use crate::PipelineError;
use crate::probe::probe_labels;
use crate::table::{Metric, Metrics, SummaryRow};
use ipd::{MAX_PAYOFF, StrategySpec};
use std::path::Path;

/// Median scores are divided by this so they fall in [0, 1]
pub const MEDIAN_SCORE_SCALE: f64 = MAX_PAYOFF as f64;

#[derive(Debug, Clone, PartialEq)]
pub struct ReducedRow {
    pub name: String,
    pub metrics: Metrics,
}

/// Target rows with the rank column dropped and the median score normalised
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReducedTable {
    rows: Vec<ReducedRow>,
}

impl ReducedTable {
    pub fn from_rows(rows: Vec<ReducedRow>) -> Self {
        ReducedTable { rows }
    }

    pub fn rows(&self) -> &[ReducedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.name.as_str()).collect()
    }

    /// Partition rows into (in `subset`, not in `subset`), keeping row order
    ///
    /// Entries are read as strategy keys (`tit_for_tat`, `random:0.3`, ...) and
    /// resolved to display names. If any entry is not a valid key the entries are
    /// compared as display names instead.
    pub fn split(&self, subset: &[&str]) -> (ReducedTable, ReducedTable) {
        let names: Vec<String> = match subset
            .iter()
            .map(|entry| entry.parse::<StrategySpec>().map(|s| s.name()))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(resolved) => resolved,
            Err(_) => subset.iter().map(|s| s.to_string()).collect(),
        };
        let (inside, outside): (Vec<ReducedRow>, Vec<ReducedRow>) = self
            .rows
            .iter()
            .cloned()
            .partition(|row| names.contains(&row.name));
        (ReducedTable::from_rows(inside), ReducedTable::from_rows(outside))
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        let mut wtr = csv::Writer::from_path(path)?;
        let mut header = vec!["Name".to_string()];
        header.extend(Metric::ALL.iter().map(|m| m.column().to_string()));
        wtr.write_record(&header)?;
        for row in &self.rows {
            let mut record = vec![row.name.clone()];
            record.extend(row.metrics.values().iter().map(|v| v.to_string()));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Drops probe rows from an engine summary
#[derive(Debug, Clone)]
pub struct ResultReducer {
    probe_labels: Vec<String>,
}

impl ResultReducer {
    pub fn new<I, S>(probe_labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ResultReducer {
            probe_labels: probe_labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Reducer for tournaments probed with transforms of `base`
    pub fn for_probe(base: &StrategySpec) -> Self {
        ResultReducer::new(probe_labels(base))
    }

    pub fn probe_labels(&self) -> &[String] {
        &self.probe_labels
    }

    /// Keep non-probe rows in summary order, drop rank, divide median score by 5
    pub fn reduce(&self, summary: &[SummaryRow]) -> ReducedTable {
        let rows = summary
            .iter()
            .filter(|row| !self.probe_labels.contains(&row.name))
            .map(|row| {
                let mut metrics = row.metrics;
                metrics[Metric::MedianScore] /= MEDIAN_SCORE_SCALE;
                ReducedRow {
                    name: row.name.clone(),
                    metrics,
                }
            })
            .collect();
        ReducedTable { rows }
    }
}

impl Default for ResultReducer {
    fn default() -> Self {
        ResultReducer::for_probe(&StrategySpec::TitForTat)
    }
}
