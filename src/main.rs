//! test-balancer - duration-aware test file load balancer
//!
//! Splits test files across parallel CI runners so every runner finishes in
//! about the same time, based on the median of each file's recent durations.
//!
//! ## Usage
//!
//! ```bash
//! # Balance discovered e2e files across 4 runners
//! test-balancer balance -r 4 -t e2e
//!
//! # Matrix values for a CI job
//! test-balancer generate-runners 4
//!
//! # Record durations measured by runner 2 of 4
//! test-balancer record --runner 2/4 -t e2e --results results.json
//!
//! # Fold every runner's statistics back into the main file
//! test-balancer merge -G ".test-balancer/spec-map-*.json" --rm
//! ```

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

mod balancer;
mod cli;
mod config;
mod discovery;
mod merge;
mod models;
mod output;
mod storage;
mod utils;

use cli::{Args, IfEmpty};
use config::{AppConfig, ConfigFile, EnvConfig, ENV_PREFIX};
use merge::MergeError;
use models::{Category, ExecutionResult, RunnerSpec};
use output::{github, format_runner_specs, OutputFormat, RunnerFormatter};
use storage::MapStorage;
use utils::{init_logger, LogLevel};

fn main() -> Result<()> {
    let args = Args::parse();

    let env = EnvConfig::load();
    init_logger(LogLevel::resolve(args.verbose, env.log.as_deref()));
    if env.has_any() {
        debug!("{ENV_PREFIX}_* overrides: {env:?}");
    }

    let config = AppConfig::resolve(args.config.as_deref(), &env)?;
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let storage = MapStorage::new(config.directory(&cwd), config.max_durations());

    match args.command {
        cli::Command::Balance(balance_args) => {
            let output = run_balance(&balance_args, &config, &storage, &cwd)?;
            println!("{output}");
        }
        cli::Command::Initialize(init_args) => {
            run_initialize(&init_args, &storage)?;
        }
        cli::Command::Merge(merge_args) => {
            run_merge(&merge_args, &config, &storage)?;
        }
        cli::Command::GenerateRunners(runner_args) => {
            let output = run_generate_runners(&runner_args)?;
            println!("{output}");
        }
        cli::Command::Record(record_args) => {
            run_record(&record_args, &config, &storage, &cwd)?;
        }
        cli::Command::Config(config_args) => {
            show_config(&config_args, config)?;
        }
    }

    Ok(())
}

fn run_balance(
    args: &cli::BalanceArgs,
    config: &AppConfig,
    storage: &MapStorage,
    cwd: &Path,
) -> Result<String> {
    let category: Category = args.testing_type.parse()?;
    let format = OutputFormat::from_str(&args.format)
        .ok_or_else(|| anyhow!("Unknown output format: {}", args.format))?;
    let runner = args
        .runner
        .as_deref()
        .map(str::parse::<RunnerSpec>)
        .transpose()?;

    if config.should_warn_max_durations() {
        warn!(
            "It is advised to set {ENV_PREFIX}_MAX_DURATIONS (or max_durations in the config file), unless 10 durations are enough per test file."
        );
    }

    let files: Vec<String> = if args.files.is_empty() {
        discovery::discover(config.discovery.patterns(category), cwd)?
    } else {
        args.files
            .iter()
            .map(|f| discovery::relative_id(f, cwd))
            .collect()
    };
    if files.is_empty() {
        warn!("No {category} test files to balance");
    }

    let mut store = storage.load()?;
    let known = store.len(category);

    let algorithm = args
        .algorithm
        .clone()
        .unwrap_or_else(|| config.algorithm_name());
    debug!("Balancing {} {category} files, output format {format}", files.len());
    let runners =
        balancer::balance_named(&mut store, category, &files, args.runners, &algorithm)?;

    if store.len(category) != known {
        debug!("{} new {category} files", store.len(category) - known);
        storage.save(&store, None)?;
    }

    let formatter = RunnerFormatter::new(format);
    let output = match runner {
        Some(spec) => {
            if spec.count() != args.runners {
                bail!(
                    "Runner {spec} does not match the runner count of {}",
                    args.runners
                );
            }
            let files = runners
                .get(spec.index())
                .map(Vec::as_slice)
                .unwrap_or_default();
            if files.is_empty() && !config.disable_warnings {
                warn!("Runner {spec} is empty!");
            }
            formatter.format_runner(files)
        }
        None => formatter.format_runners(&runners),
    };

    if args.gha {
        github::set_output(github::RUNNER_SPECS, &output)?;
    }

    Ok(output)
}

fn run_initialize(args: &cli::InitializeArgs, storage: &MapStorage) -> Result<()> {
    let (dir_created, file_created) = storage.initialize(args.force_dir, args.force)?;

    if dir_created {
        println!("Created directory {}", storage.base_dir().display());
    }
    if file_created {
        println!("Created initial file {}", storage.main_path().display());
    }
    if !dir_created && !file_created {
        println!("Already initialized: {}", storage.main_path().display());
    }
    Ok(())
}

fn run_merge(args: &cli::MergeArgs, config: &AppConfig, storage: &MapStorage) -> Result<()> {
    let original = match &args.original {
        Some(path) => path.clone(),
        None => {
            storage.initialize(false, false)?;
            storage.main_path()
        }
    };

    let mut inputs: Vec<PathBuf> = Vec::new();
    if let Some(pattern) = &args.glob {
        let paths =
            glob::glob(pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))?;
        for entry in paths {
            let path = entry.context("Failed to read glob match")?;
            if !path.is_file() || same_path(&path, &original) {
                continue;
            }
            debug!("Glob matched {}", path.display());
            inputs.push(path);
        }
    }
    inputs.extend(args.files.iter().cloned());

    if inputs.is_empty() {
        match args.if_empty {
            IfEmpty::Warn => {
                warn!("{}", MergeError::NoInputs);
                return Ok(());
            }
            IfEmpty::Error => return Err(MergeError::NoInputs.into()),
        }
    }

    let authoritative = storage.load_from_path(&original)?;
    let peers = inputs
        .iter()
        .map(|path| storage.load_from_path(path))
        .collect::<Result<Vec<_>>>()?;

    let merged = merge::merge(&authoritative, &peers, config.max_durations());

    let destination = match &args.output {
        Some(name) => storage.path_for(name),
        None => original.clone(),
    };
    storage.save_to_path(&merged, &destination)?;
    println!(
        "Merged {} files into {}",
        inputs.len(),
        destination.display()
    );

    if args.rm {
        let removed = remove_merged(storage, &inputs, &destination)?;
        info!("Removed {removed} merged files");
    }

    Ok(())
}

/// Delete merged inputs, never the merge destination
fn remove_merged(storage: &MapStorage, inputs: &[PathBuf], destination: &Path) -> Result<usize> {
    let mut removed = 0;
    for path in inputs.iter().filter(|p| !same_path(p, destination)) {
        storage.remove(path)?;
        removed += 1;
    }
    Ok(removed)
}

fn run_generate_runners(args: &cli::GenerateRunnersArgs) -> Result<String> {
    if args.count <= 0 {
        bail!("The runner count must be greater than 0");
    }
    let count = usize::try_from(args.count).context("Runner count is too large")?;
    let output = format_runner_specs(&RunnerSpec::all(count));

    if args.gha {
        github::set_output(github::RUNNER_VARIABLES, &output)?;
    }
    Ok(output)
}

fn run_record(
    args: &cli::RecordArgs,
    config: &AppConfig,
    storage: &MapStorage,
    cwd: &Path,
) -> Result<PathBuf> {
    let runner: RunnerSpec = args.runner.parse()?;
    let category: Category = args.testing_type.parse()?;
    debug!(
        "Recording {category} results for runner {} of {}",
        runner.position(),
        runner.count()
    );

    let results = match (&args.results, &args.file, args.duration) {
        (Some(path), _, _) => read_results(path)?,
        (None, Some(file), Some(duration)) => vec![ExecutionResult::new(file.clone(), duration)],
        _ => bail!("Either --results or --file with --duration must be provided"),
    };

    // Earlier records of this runner live in its own file
    let path = match runner.file_name() {
        Some(name) => storage.path_for(&name),
        None => storage.main_path(),
    };
    let mut store = if path.exists() {
        storage.load_from_path(&path)?
    } else {
        storage.load()?
    };

    for result in &results {
        let id = discovery::relative_id(&result.file, cwd);
        store.ensure_entry(category, &id, false);
        store.record_duration(category, &id, result.duration, config.max_durations())?;
    }

    storage.save_to_path(&store, &path)?;
    println!(
        "Recorded {} durations for runner {runner} in {}",
        results.len(),
        path.display()
    );
    Ok(path)
}

fn read_results(path: &Path) -> Result<Vec<ExecutionResult>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open results file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse results file: {}", path.display()))
}

fn show_config(args: &cli::ConfigArgs, config: AppConfig) -> Result<()> {
    if args.env {
        config::print_env_help();
        return Ok(());
    }

    let file = ConfigFile {
        balancer: config,
        ..Default::default()
    };
    match &args.write {
        Some(path) => {
            file.save(path)?;
            println!("Wrote configuration to {}", path.display());
        }
        None => print!(
            "{}",
            serde_yaml::to_string(&file).context("Failed to serialize config")?
        ),
    }
    Ok(())
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
