//! Output formatters for runner assignments
//!
//! Renders runners as JSON, `--spec` arguments, or joined strings.

use serde_json::Value;
use std::fmt;

use crate::balancer::Runners;

/// Output format options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Array of file arrays
    #[default]
    Json,
    /// `--spec a,b` per runner, empty string for an empty runner
    Spec,
    /// Comma-joined files per runner
    String,
    /// Newline-joined files per runner
    Newline,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "spec" => Some(OutputFormat::Spec),
            "string" => Some(OutputFormat::String),
            "newline" => Some(OutputFormat::Newline),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Json => "json",
            OutputFormat::Spec => "spec",
            OutputFormat::String => "string",
            OutputFormat::Newline => "newline",
        };
        f.write_str(name)
    }
}

/// Runner formatter
pub struct RunnerFormatter {
    format: OutputFormat,
}

impl RunnerFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// One runner's files as a JSON value
    pub fn runner_value(&self, files: &[String]) -> Value {
        match self.format {
            OutputFormat::Json => Value::from(files.to_vec()),
            OutputFormat::Spec if files.is_empty() => Value::from(""),
            OutputFormat::Spec => Value::from(format!("--spec {}", files.join(","))),
            OutputFormat::String => Value::from(files.join(",")),
            OutputFormat::Newline => Value::from(files.join("\n")),
        }
    }

    /// All runners as a single-line JSON array
    pub fn format_runners(&self, runners: &Runners) -> String {
        let values: Vec<Value> = runners.iter().map(|r| self.runner_value(r)).collect();
        Value::Array(values).to_string()
    }

    /// A single runner, ready to hand to a shell.
    ///
    /// JSON keeps the array form; the other formats print the bare string.
    pub fn format_runner(&self, files: &[String]) -> String {
        match self.runner_value(files) {
            Value::String(s) => s,
            other => other.to_string(),
        }
    }
}

/// `["1/N", ..., "N/N"]` as a JSON array
pub fn format_runner_specs(specs: &[String]) -> String {
    Value::from(specs.to_vec()).to_string()
}
