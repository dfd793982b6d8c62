//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Duration-aware test file load balancer
#[derive(Parser, Debug)]
#[command(name = "test-balancer")]
#[command(version)]
#[command(about = "Split test files across parallel runners by their recorded durations")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file to use instead of the standard locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Balance test files across runners
    Balance(BalanceArgs),

    /// Create the statistics directory and main file
    Initialize(InitializeArgs),

    /// Merge runner statistics files back into the main file
    Merge(MergeArgs),

    /// Print the runner list for a CI matrix
    GenerateRunners(GenerateRunnersArgs),

    /// Record test file durations for a runner
    Record(RecordArgs),

    /// Show resolved configuration
    Config(ConfigArgs),
}

/// Arguments for balance command
#[derive(Parser, Debug)]
pub struct BalanceArgs {
    /// Number of runners to balance across
    #[arg(short, long)]
    pub runners: usize,

    /// Testing type (e2e, component)
    #[arg(short = 't', long)]
    pub testing_type: String,

    /// Test files to balance; discovered from the configured patterns when empty
    #[arg(short = 'F', long, num_args = 1..)]
    pub files: Vec<String>,

    /// Balancing algorithm (weighted-largest, round-robin, file-name, average-time)
    #[arg(short, long)]
    pub algorithm: Option<String>,

    /// Output format (json, spec, string, newline)
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Print only this runner, given as X/Y
    #[arg(long)]
    pub runner: Option<String>,

    /// Also write the result to the GitHub Actions step output
    #[arg(long)]
    pub gha: bool,
}

/// Arguments for initialize command
#[derive(Parser, Debug)]
pub struct InitializeArgs {
    /// Re-create the main file even if it exists
    #[arg(long)]
    pub force: bool,

    /// Re-create the directory even if it exists
    #[arg(long)]
    pub force_dir: bool,
}

/// What to do when merge finds nothing to merge
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum IfEmpty {
    #[default]
    Warn,
    Error,
}

/// Arguments for merge command
#[derive(Parser, Debug)]
#[command(group(
    clap::ArgGroup::new("inputs")
        .required(true)
        .multiple(true)
        .args(["files", "glob"])
))]
pub struct MergeArgs {
    /// File to merge into; defaults to the main file
    #[arg(long)]
    pub original: Option<PathBuf>,

    /// Statistics files to merge
    #[arg(short = 'F', long, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Glob pattern matching statistics files to merge
    #[arg(short = 'G', long)]
    pub glob: Option<String>,

    /// Where to save the result; defaults to the original
    #[arg(short, long)]
    pub output: Option<String>,

    /// Delete the merged files afterwards
    #[arg(long)]
    pub rm: bool,

    /// Behaviour when no input files are found
    #[arg(long, value_enum, default_value_t = IfEmpty::Warn)]
    pub if_empty: IfEmpty,
}

/// Arguments for generate-runners command
#[derive(Parser, Debug)]
pub struct GenerateRunnersArgs {
    /// Number of runners
    #[arg(allow_negative_numbers = true)]
    pub count: i64,

    /// Also write the result to the GitHub Actions step output
    #[arg(long)]
    pub gha: bool,
}

/// Arguments for record command
#[derive(Parser, Debug)]
#[command(group(
    clap::ArgGroup::new("source")
        .required(true)
        .args(["results", "file"])
))]
pub struct RecordArgs {
    /// Runner that produced the results, as X/Y
    #[arg(long)]
    pub runner: String,

    /// Testing type (e2e, component)
    #[arg(short = 't', long)]
    pub testing_type: String,

    /// JSON array of {"file": ..., "duration": ...} results
    #[arg(long)]
    pub results: Option<PathBuf>,

    /// Single test file to record
    #[arg(long, requires = "duration")]
    pub file: Option<String>,

    /// Duration of --file in milliseconds
    #[arg(long, allow_negative_numbers = true)]
    pub duration: Option<f64>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// List supported environment variables instead
    #[arg(long)]
    pub env: bool,

    /// Write the resolved configuration to this file
    #[arg(long, conflicts_with = "env")]
    pub write: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_args() {
        let args = Args::parse_from([
            "test-balancer",
            "balance",
            "-r",
            "3",
            "-t",
            "e2e",
            "-F",
            "a.cy.ts",
            "b.cy.ts",
            "--format",
            "spec",
        ]);
        match args.command {
            Command::Balance(balance) => {
                assert_eq!(balance.runners, 3);
                assert_eq!(balance.testing_type, "e2e");
                assert_eq!(balance.files, vec!["a.cy.ts", "b.cy.ts"]);
                assert_eq!(balance.format, "spec");
                assert!(balance.algorithm.is_none());
                assert!(!balance.gha);
            }
            _ => panic!("Expected Balance command"),
        }
    }

    #[test]
    fn test_initialize_args() {
        let args = Args::parse_from(["test-balancer", "initialize", "--force-dir", "-v"]);
        assert!(args.verbose);
        match args.command {
            Command::Initialize(init) => {
                assert!(init.force_dir);
                assert!(!init.force);
            }
            _ => panic!("Expected Initialize command"),
        }
    }

    #[test]
    fn test_merge_args() {
        let args = Args::parse_from([
            "test-balancer",
            "merge",
            "-G",
            ".test-balancer/spec-map-*.json",
            "--rm",
            "--if-empty",
            "error",
        ]);
        match args.command {
            Command::Merge(merge) => {
                assert_eq!(merge.glob.as_deref(), Some(".test-balancer/spec-map-*.json"));
                assert!(merge.files.is_empty());
                assert!(merge.rm);
                assert_eq!(merge.if_empty, IfEmpty::Error);
            }
            _ => panic!("Expected Merge command"),
        }
    }

    #[test]
    fn test_merge_requires_input() {
        assert!(Args::try_parse_from(["test-balancer", "merge"]).is_err());
    }

    #[test]
    fn test_generate_runners_args() {
        let args = Args::parse_from(["test-balancer", "generate-runners", "4", "--gha"]);
        match args.command {
            Command::GenerateRunners(runners) => {
                assert_eq!(runners.count, 4);
                assert!(runners.gha);
            }
            _ => panic!("Expected GenerateRunners command"),
        }

        let args = Args::parse_from(["test-balancer", "generate-runners", "-1"]);
        assert!(matches!(
            args.command,
            Command::GenerateRunners(GenerateRunnersArgs { count: -1, .. })
        ));
    }

    #[test]
    fn test_record_args() {
        let args = Args::parse_from([
            "test-balancer",
            "record",
            "--runner",
            "1/2",
            "-t",
            "component",
            "--file",
            "src/a.cy.ts",
            "--duration",
            "1500",
        ]);
        match args.command {
            Command::Record(record) => {
                assert_eq!(record.runner, "1/2");
                assert_eq!(record.file.as_deref(), Some("src/a.cy.ts"));
                assert_eq!(record.duration, Some(1500.0));
                assert!(record.results.is_none());
            }
            _ => panic!("Expected Record command"),
        }
    }

    #[test]
    fn test_record_requires_source() {
        assert!(Args::try_parse_from([
            "test-balancer",
            "record",
            "--runner",
            "1/2",
            "-t",
            "e2e"
        ])
        .is_err());
        assert!(Args::try_parse_from([
            "test-balancer",
            "record",
            "--runner",
            "1/2",
            "-t",
            "e2e",
            "--file",
            "a.cy.ts"
        ])
        .is_err());
    }
}
