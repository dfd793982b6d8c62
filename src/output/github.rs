//! GitHub Actions step outputs

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// Step output holding the balanced runners
pub const RUNNER_SPECS: &str = "runner-specs";

/// Step output holding the generated `X/Y` runner list
pub const RUNNER_VARIABLES: &str = "runner-variables";

/// Append `name=value` to the file named by `GITHUB_OUTPUT`.
///
/// Returns false, with a warning, when not running inside GitHub Actions.
pub fn set_output(name: &str, value: &str) -> Result<bool> {
    match std::env::var_os("GITHUB_OUTPUT") {
        Some(path) => {
            append_output(Path::new(&path), name, value)?;
            Ok(true)
        }
        None => {
            warn!("GITHUB_OUTPUT is not set; skipping step output '{name}'");
            Ok(false)
        }
    }
}

/// Append an output to a GitHub Actions output file.
///
/// Multi-line values use the `name<<DELIMITER` form.
pub fn append_output(path: &Path, name: &str, value: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open GitHub output file: {}", path.display()))?;

    let entry = if value.contains('\n') {
        let delimiter = heredoc_delimiter(value);
        format!("{name}<<{delimiter}\n{value}\n{delimiter}")
    } else {
        format!("{name}={value}")
    };
    writeln!(file, "{entry}")
        .with_context(|| format!("Failed to write GitHub output file: {}", path.display()))?;

    debug!("Set GitHub Actions output {name}");
    Ok(())
}

/// A delimiter line that does not occur in `value`
fn heredoc_delimiter(value: &str) -> String {
    let mut delimiter = String::from("TEST_BALANCER_EOF");
    let mut n = 0;
    while value.lines().any(|line| line == delimiter) {
        n += 1;
        delimiter = format!("TEST_BALANCER_EOF_{n}");
    }
    delimiter
}
