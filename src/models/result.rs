//! Execution results fed back into the store

use serde::{Deserialize, Serialize};

/// Measured duration of one test file run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Relative file id
    pub file: String,

    /// Duration in milliseconds
    pub duration: f64,
}

impl ExecutionResult {
    pub fn new(file: impl Into<String>, duration: f64) -> Self {
        Self {
            file: file.into(),
            duration,
        }
    }
}
