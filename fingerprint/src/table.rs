//! Per-player metrics as they cross the engine seam

use ipd::PlayerSummary;
use std::ops::{Index, IndexMut};

/// Numeric summary columns, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    MedianScore,
    CooperationRating,
    Wins,
    InitialCRate,
    CcRate,
    CdRate,
    DcRate,
    DdRate,
    CcToCRate,
    CdToCRate,
    DcToCRate,
    DdToCRate,
}

impl Metric {
    pub const ALL: [Metric; 12] = [
        Metric::MedianScore,
        Metric::CooperationRating,
        Metric::Wins,
        Metric::InitialCRate,
        Metric::CcRate,
        Metric::CdRate,
        Metric::DcRate,
        Metric::DdRate,
        Metric::CcToCRate,
        Metric::CdToCRate,
        Metric::DcToCRate,
        Metric::DdToCRate,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Metric::MedianScore => "Median_score",
            Metric::CooperationRating => "Cooperation_rating",
            Metric::Wins => "Wins",
            Metric::InitialCRate => "Initial_C_rate",
            Metric::CcRate => "CC_rate",
            Metric::CdRate => "CD_rate",
            Metric::DcRate => "DC_rate",
            Metric::DdRate => "DD_rate",
            Metric::CcToCRate => "CC_to_C_rate",
            Metric::CdToCRate => "CD_to_C_rate",
            Metric::DcToCRate => "DC_to_C_rate",
            Metric::DdToCRate => "DD_to_C_rate",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One value per [`Metric`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Metrics([f64; 12]);

impl Metrics {
    pub fn from_fn(f: impl FnMut(Metric) -> f64) -> Self {
        Metrics(Metric::ALL.map(f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ALL.iter().map(move |&m| (m, self.0[m.index()]))
    }

    pub fn values(&self) -> &[f64; 12] {
        &self.0
    }
}

impl Index<Metric> for Metrics {
    type Output = f64;

    fn index(&self, metric: Metric) -> &f64 {
        &self.0[metric.index()]
    }
}

impl IndexMut<Metric> for Metrics {
    fn index_mut(&mut self, metric: Metric) -> &mut f64 {
        &mut self.0[metric.index()]
    }
}

/// A summary row from the engine, before reduction
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub rank: usize,
    pub name: String,
    pub metrics: Metrics,
}

impl From<PlayerSummary> for SummaryRow {
    fn from(s: PlayerSummary) -> Self {
        let metrics = Metrics::from_fn(|m| match m {
            Metric::MedianScore => s.median_score,
            Metric::CooperationRating => s.cooperation_rating,
            Metric::Wins => s.wins,
            Metric::InitialCRate => s.initial_c_rate,
            Metric::CcRate => s.cc_rate,
            Metric::CdRate => s.cd_rate,
            Metric::DcRate => s.dc_rate,
            Metric::DdRate => s.dd_rate,
            Metric::CcToCRate => s.cc_to_c_rate,
            Metric::CdToCRate => s.cd_to_c_rate,
            Metric::DcToCRate => s.dc_to_c_rate,
            Metric::DdToCRate => s.dd_to_c_rate,
        });
        SummaryRow {
            rank: s.rank,
            name: s.name,
            metrics,
        }
    }
}
