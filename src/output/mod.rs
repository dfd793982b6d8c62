//! Output formatting module
//!
//! Renders balancing results for the terminal and for CI step outputs.

mod formatter;
pub mod github;

pub use formatter::{format_runner_specs, OutputFormat, RunnerFormatter};
