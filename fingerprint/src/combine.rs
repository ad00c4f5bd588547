//! Pairwise comparison tables built from reduced tables
//!
//! Every row of one table is paired with every row of another and each metric is
//! replaced by `min / max` of the pair. A pair where both values are zero has an
//! undefined ratio; [`fill_undefined_ratios`] sets those to 1 (identical).

use crate::PipelineError;
use crate::reduce::ReducedTable;
use crate::table::{Metric, Metrics};
use std::fs::OpenOptions;
use std::path::Path;

/// Value written for ratios of two zeros
pub const UNDEFINED_RATIO_FILL: f64 = 1.0;

/// Similarity of two non-negative values in [0, 1]; NaN when both are zero
pub fn metric_ratio(a: f64, b: f64) -> f64 {
    a.min(b) / a.max(b)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub name_a: String,
    pub name_b: String,
    pub ratios: Metrics,
    pub epsilon: Option<f64>,
    /// Set on training tables: whether both rows came from the same strategy
    pub equivalent: Option<bool>,
}

/// Which optional columns a table carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    names: bool,
    epsilon: bool,
    equivalent: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonTable {
    rows: Vec<ComparisonRow>,
    columns: Columns,
}

impl ComparisonTable {
    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stack tables that share the same columns
    ///
    /// # Errors
    /// `SchemaMismatch` if the tables differ in their optional columns.
    pub fn concat<I: IntoIterator<Item = ComparisonTable>>(
        tables: I,
    ) -> Result<ComparisonTable, PipelineError> {
        let mut tables = tables.into_iter();
        let Some(mut combined) = tables.next() else {
            return Ok(ComparisonTable {
                rows: Vec::new(),
                columns: Columns {
                    names: true,
                    epsilon: false,
                    equivalent: false,
                },
            });
        };
        for table in tables {
            if table.columns != combined.columns {
                return Err(PipelineError::SchemaMismatch);
            }
            combined.rows.extend(table.rows);
        }
        Ok(combined)
    }

    pub fn header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(Metric::ALL.len() + 4);
        if self.columns.names {
            header.push("Name_A".to_string());
            header.push("Name_B".to_string());
        }
        header.extend(Metric::ALL.iter().map(|m| format!("{}_r", m.column())));
        if self.columns.epsilon {
            header.push("Epsilon".to_string());
        }
        if self.columns.equivalent {
            header.push("Equivalent".to_string());
        }
        header
    }

    fn record(&self, row: &ComparisonRow) -> Vec<String> {
        let mut record = Vec::with_capacity(Metric::ALL.len() + 4);
        if self.columns.names {
            record.push(row.name_a.clone());
            record.push(row.name_b.clone());
        }
        record.extend(row.ratios.values().iter().map(|v| v.to_string()));
        if self.columns.epsilon {
            record.push(row.epsilon.map(|e| e.to_string()).unwrap_or_default());
        }
        if self.columns.equivalent {
            let label = matches!(row.equivalent, Some(true));
            record.push(u8::from(label).to_string());
        }
        record
    }

    fn write_rows<W: std::io::Write>(
        &self,
        wtr: &mut csv::Writer<W>,
        with_header: bool,
    ) -> Result<(), PipelineError> {
        if with_header {
            wtr.write_record(self.header())?;
        }
        for row in &self.rows {
            wtr.write_record(self.record(row))?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write the table to a new file, replacing any existing one
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;
        self.write_rows(&mut wtr, true)
    }

    /// Append rows to `path`, writing the header only when the file is empty
    pub fn append_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let with_header = file.metadata()?.len() == 0;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        self.write_rows(&mut wtr, with_header)
    }
}

/// Replace undefined (NaN) ratios with [`UNDEFINED_RATIO_FILL`]
///
/// Only ratio columns are touched.
pub fn fill_undefined_ratios(rows: &mut [ComparisonRow]) {
    for row in rows {
        row.ratios = Metrics::from_fn(|m| {
            let v = row.ratios[m];
            if v.is_nan() { UNDEFINED_RATIO_FILL } else { v }
        });
    }
}

/// Cross product of `a` and `b` with per-metric ratios
///
/// Row `i * b.len() + j` compares `a[i]` with `b[j]`. The Epsilon column is
/// present exactly when `epsilon` is given.
pub fn combine(a: &ReducedTable, b: &ReducedTable, epsilon: Option<f64>) -> ComparisonTable {
    let n = b.len();
    let (left, right) = (a.rows(), b.rows());
    // exact-size iterator, so the row vector is allocated once
    let mut rows: Vec<ComparisonRow> = (0..a.len() * n)
        .map(|k| {
            let (ra, rb) = (&left[k / n], &right[k % n]);
            ComparisonRow {
                name_a: ra.name.clone(),
                name_b: rb.name.clone(),
                ratios: Metrics::from_fn(|m| metric_ratio(ra.metrics[m], rb.metrics[m])),
                epsilon,
                equivalent: None,
            }
        })
        .collect();
    fill_undefined_ratios(&mut rows);
    ComparisonTable {
        rows,
        columns: Columns {
            names: true,
            epsilon: epsilon.is_some(),
            equivalent: false,
        },
    }
}

/// Self cross product labelled with whether both sides share a name
///
/// Name columns are left out of the written table.
pub fn training_table(table: &ReducedTable) -> ComparisonTable {
    let mut combined = combine(table, table, None);
    for row in &mut combined.rows {
        row.equivalent = Some(row.name_a == row.name_b);
    }
    combined.columns = Columns {
        names: false,
        epsilon: false,
        equivalent: true,
    };
    combined
}
