//! Per-week percentile thresholds and their extraction.

use serde::{Deserialize, Serialize};

/// The quantiles extracted for every week and metric.
pub const QUANTILES: [f64; 6] = [0.15, 0.25, 0.35, 0.65, 0.75, 0.85];

/// The six thresholds of one metric for one week, P15 through P85.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricBands {
    pub p15: u8,
    pub p25: u8,
    pub p35: u8,
    pub p65: u8,
    pub p75: u8,
    pub p85: u8,
}

impl MetricBands {
    /// Extract bands from an unsorted sample vector.
    ///
    /// Samples are sorted in place; the value at rank `⌊N·q⌋` is taken for
    /// each quantile. Must not be called with an empty sample set.
    pub fn from_samples(samples: &mut [u8]) -> Self {
        debug_assert!(!samples.is_empty(), "percentiles need at least one sample");
        samples.sort_unstable();

        let at = |q: f64| {
            let rank = ((samples.len() as f64) * q).floor() as usize;
            samples[rank.min(samples.len() - 1)]
        };

        Self {
            p15: at(QUANTILES[0]),
            p25: at(QUANTILES[1]),
            p35: at(QUANTILES[2]),
            p65: at(QUANTILES[3]),
            p75: at(QUANTILES[4]),
            p85: at(QUANTILES[5]),
        }
    }

    /// Whether the bands are in non-decreasing order.
    pub fn is_monotonic(&self) -> bool {
        self.p15 <= self.p25
            && self.p25 <= self.p35
            && self.p35 <= self.p65
            && self.p65 <= self.p75
            && self.p75 <= self.p85
    }
}

/// Expected fatigue/readiness thresholds for one week of a plan.
///
/// Created once per `(template, week count)` pair by the simulator and
/// immutable afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekPercentiles {
    pub fatigue_p15: u8,
    pub fatigue_p25: u8,
    pub fatigue_p35: u8,
    pub fatigue_p65: u8,
    pub fatigue_p75: u8,
    pub fatigue_p85: u8,
    pub readiness_p15: u8,
    pub readiness_p25: u8,
    pub readiness_p35: u8,
    pub readiness_p65: u8,
    pub readiness_p75: u8,
    pub readiness_p85: u8,
}

impl WeekPercentiles {
    /// Build from per-metric sample vectors.
    pub fn from_samples(fatigue: &mut [u8], readiness: &mut [u8]) -> Self {
        let f = MetricBands::from_samples(fatigue);
        let r = MetricBands::from_samples(readiness);
        Self::from_bands(f, r)
    }

    /// Assemble from already-extracted bands.
    pub fn from_bands(fatigue: MetricBands, readiness: MetricBands) -> Self {
        Self {
            fatigue_p15: fatigue.p15,
            fatigue_p25: fatigue.p25,
            fatigue_p35: fatigue.p35,
            fatigue_p65: fatigue.p65,
            fatigue_p75: fatigue.p75,
            fatigue_p85: fatigue.p85,
            readiness_p15: readiness.p15,
            readiness_p25: readiness.p25,
            readiness_p35: readiness.p35,
            readiness_p65: readiness.p65,
            readiness_p75: readiness.p75,
            readiness_p85: readiness.p85,
        }
    }

    /// The fatigue-side bands.
    pub fn fatigue_bands(&self) -> MetricBands {
        MetricBands {
            p15: self.fatigue_p15,
            p25: self.fatigue_p25,
            p35: self.fatigue_p35,
            p65: self.fatigue_p65,
            p75: self.fatigue_p75,
            p85: self.fatigue_p85,
        }
    }

    /// The readiness-side bands.
    pub fn readiness_bands(&self) -> MetricBands {
        MetricBands {
            p15: self.readiness_p15,
            p25: self.readiness_p25,
            p35: self.readiness_p35,
            p65: self.readiness_p65,
            p75: self.readiness_p75,
            p85: self.readiness_p85,
        }
    }
}
