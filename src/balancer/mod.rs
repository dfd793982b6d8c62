//! Load balancing across runners
//!
//! Splits test files into a fixed number of runner groups using the median
//! durations held in a [`StatisticsStore`].

mod average_time;
mod file_name;
mod round_robin;
mod weighted;

pub use average_time::AverageTime;
pub use file_name::FileName;
pub use round_robin::RoundRobin;
pub use weighted::WeightedLargest;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::models::{compare_medians, Category, CategoryEntries, DurationRecord, StatisticsStore};

/// File groups, one per runner
pub type Runners = Vec<Vec<String>>;

/// Errors raised before any balancing work happens
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BalanceError {
    #[error("Runner count cannot be less than 1 (got {0})")]
    InvalidRunnerCount(usize),

    #[error("Algorithm not known for {0}. Expected one of: weighted-largest, round-robin, file-name, average-time")]
    UnknownAlgorithm(String),
}

/// Available balancing algorithms
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    #[default]
    WeightedLargest,
    RoundRobin,
    FileName,
    AverageTime,
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::WeightedLargest => "weighted-largest",
            Algorithm::RoundRobin => "round-robin",
            Algorithm::FileName => "file-name",
            Algorithm::AverageTime => "average-time",
        }
    }

    pub fn all() -> [Algorithm; 4] {
        [
            Algorithm::WeightedLargest,
            Algorithm::RoundRobin,
            Algorithm::FileName,
            Algorithm::AverageTime,
        ]
    }

    /// Strategy implementing this algorithm
    pub fn partitioner(&self) -> Box<dyn Partitioner> {
        match self {
            Algorithm::WeightedLargest => Box::new(WeightedLargest),
            Algorithm::RoundRobin => Box::new(RoundRobin),
            Algorithm::FileName => Box::new(FileName),
            Algorithm::AverageTime => Box::new(AverageTime),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = BalanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::all()
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| BalanceError::UnknownAlgorithm(s.to_string()))
    }
}

/// A strategy that assigns files to runners.
///
/// `ids` are unique and already present in `entries`. Implementations must
/// return exactly `runner_count` groups that together hold every id once;
/// zero runners yield no groups.
pub trait Partitioner {
    fn partition(&self, ids: &[String], entries: &CategoryEntries, runner_count: usize)
        -> Runners;
}

/// Balance `ids` across `runner_count` runners.
///
/// Ids missing from the store get a zero-history entry first, so the caller
/// should persist the store when it grew.
pub fn balance(
    store: &mut StatisticsStore,
    category: Category,
    ids: &[String],
    runner_count: usize,
    algorithm: Algorithm,
) -> Result<Runners, BalanceError> {
    if runner_count < 1 {
        return Err(BalanceError::InvalidRunnerCount(runner_count));
    }

    debug!("Using algorithm for load balancing: {algorithm}");
    debug!("Runner count: {runner_count}");

    let requested: IndexSet<&str> = ids.iter().map(String::as_str).collect();
    for id in &requested {
        store.ensure_entry(category, id, false);
    }

    // Store order, restricted to what was asked for
    let ordered: Vec<String> = store
        .ids(category)
        .filter(|id| requested.contains(id))
        .map(str::to_string)
        .collect();

    let runners = algorithm
        .partitioner()
        .partition(&ordered, store.entries(category), runner_count);

    debug!("Runners: {runners:?}");
    Ok(runners)
}

/// Like [`balance`], resolving the algorithm by name
pub fn balance_named(
    store: &mut StatisticsStore,
    category: Category,
    ids: &[String],
    runner_count: usize,
    algorithm: &str,
) -> Result<Runners, BalanceError> {
    if runner_count < 1 {
        return Err(BalanceError::InvalidRunnerCount(runner_count));
    }
    let algorithm: Algorithm = algorithm.parse()?;
    balance(store, category, ids, runner_count, algorithm)
}

/// Expected run time of a file; unknown files count as zero
pub(crate) fn median_of(entries: &CategoryEntries, id: &str) -> f64 {
    entries.get(id).map(DurationRecord::median).unwrap_or(0.0)
}

/// Sum of the medians of a group of files
pub fn total_time(entries: &CategoryEntries, ids: &[String]) -> f64 {
    ids.iter().map(|id| median_of(entries, id)).sum()
}

/// Longest expected run time first.
///
/// Stable ascending sort followed by a reversal: equal medians come out in
/// reverse encounter order.
pub(crate) fn sort_by_median_desc(ids: &[String], entries: &CategoryEntries) -> Vec<String> {
    let mut sorted = ids.to_vec();
    sorted.sort_by(|a, b| compare_medians(median_of(entries, a), median_of(entries, b)));
    sorted.reverse();
    sorted
}

/// A runner group with its running total
#[derive(Clone, Debug, Default)]
pub(crate) struct RunnerGroup {
    pub files: Vec<String>,
    pub total: f64,
}

impl RunnerGroup {
    pub fn push(&mut self, id: String, entries: &CategoryEntries) {
        self.total += median_of(entries, &id);
        self.files.push(id);
    }
}

pub(crate) fn empty_groups(runner_count: usize) -> Vec<RunnerGroup> {
    (0..runner_count).map(|_| RunnerGroup::default()).collect()
}
