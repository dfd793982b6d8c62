//! Per-file duration statistics
//!
//! Rolling duration history with derived average and median.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Default number of durations kept per file
pub const DEFAULT_MAX_DURATIONS: usize = 10;

/// Duration history and derived metrics for a single test file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationStats {
    /// Recent durations, oldest first
    pub durations: Vec<f64>,

    /// Mean of the absolute durations, rounded up
    pub average: f64,

    /// Lower-middle element of the sorted durations
    pub median: f64,
}

impl DurationStats {
    /// Create stats from a duration history, evicting down to `max_durations`
    pub fn from_durations(durations: Vec<f64>, max_durations: usize) -> Self {
        let mut stats = Self {
            durations,
            ..Default::default()
        };
        stats.refresh(max_durations);
        stats
    }

    /// Append a duration, evict the oldest entries and re-derive metrics
    pub fn push(&mut self, duration: f64, max_durations: usize) {
        self.durations.push(duration);
        self.refresh(max_durations);
    }

    /// Evict from the front until the history fits, then recompute metrics
    pub fn refresh(&mut self, max_durations: usize) {
        if self.durations.len() > max_durations {
            let excess = self.durations.len() - max_durations;
            self.durations.drain(..excess);
        }
        self.average = average(&self.durations);
        self.median = median(&self.durations);
    }

    /// Whether the file has never been recorded
    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }
}

/// Persisted entry for a single test file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationRecord {
    pub stats: DurationStats,
}

impl DurationRecord {
    /// Zero-history record
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn median(&self) -> f64 {
        self.stats.median
    }
}

/// `ceil(sum(|d|) / max(1, len))`, zero for an empty history
pub fn average(durations: &[f64]) -> f64 {
    let sum: f64 = durations.iter().map(|d| d.abs()).sum();
    (sum / durations.len().max(1) as f64).ceil()
}

/// Element at index `ceil(len / 2) - 1` of the ascending sort, zero when empty
pub fn median(durations: &[f64]) -> f64 {
    if durations.is_empty() {
        return 0.0;
    }

    let mut sorted = durations.to_vec();
    sorted.sort_by(f64::total_cmp);

    let idx = sorted.len().div_ceil(2).saturating_sub(1);
    sorted.get(idx).copied().unwrap_or(0.0)
}

/// Ordering used when sorting files by expected run time
pub(crate) fn compare_medians(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}
