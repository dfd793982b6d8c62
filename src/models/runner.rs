//! Runner identity
//!
//! Parses the `X/Y` form used to pick a single runner out of a balance.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing an `X/Y` runner string
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunnerSpecError {
    #[error("runner must be provided in X/Y format, where X is the runner index, and Y is the total runner count to use: {0}")]
    Format(String),

    #[error("runner index cannot be 0! Runner indices must begin at 1")]
    ZeroIndex,

    #[error("runner count cannot be 0! Runner count must begin at 1")]
    ZeroCount,

    #[error("runner is incorrect! The runner index cannot be greater than the total runner count: {0}")]
    IndexOutOfRange(String),
}

/// One runner out of a fixed-size pool, 1-based as users write it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunnerSpec {
    position: usize,
    count: usize,
}

impl RunnerSpec {
    pub fn new(position: usize, count: usize) -> Result<Self, RunnerSpecError> {
        if position == 0 {
            return Err(RunnerSpecError::ZeroIndex);
        }
        if count == 0 {
            return Err(RunnerSpecError::ZeroCount);
        }
        if position > count {
            return Err(RunnerSpecError::IndexOutOfRange(format!("{position}/{count}")));
        }
        Ok(Self { position, count })
    }

    /// Zero-based index into a runners list
    pub fn index(&self) -> usize {
        self.position - 1
    }

    /// 1-based position
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Name of the document this runner records its durations into.
    ///
    /// A single runner writes straight to the main document.
    pub fn file_name(&self) -> Option<String> {
        if self.count == 1 {
            None
        } else {
            Some(format!("spec-map-{}-{}.json", self.position, self.count))
        }
    }

    /// Every runner of a pool of `count`, as `X/Y` strings
    pub fn all(count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("{i}/{count}")).collect()
    }
}

impl fmt::Display for RunnerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.position, self.count)
    }
}

impl FromStr for RunnerSpec {
    type Err = RunnerSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format_err = || RunnerSpecError::Format(s.to_string());

        let (position, count) = s.trim().split_once('/').ok_or_else(format_err)?;
        let position: usize = position.trim().parse().map_err(|_| format_err())?;
        let count: usize = count.trim().parse().map_err(|_| format_err())?;

        Self::new(position, count)
    }
}
