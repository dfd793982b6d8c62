//! Configuration module
//!
//! Defaults, then a config file, then `TEST_BALANCER_*` environment
//! variables. Command-line flags are applied last by each command.

mod env;
mod file;

pub use env::{print_env_help, EnvConfig, ENV_PREFIX};
pub use file::ConfigFile;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::balancer::Algorithm;
use crate::models::{Category, DEFAULT_MAX_DURATIONS};

/// Application configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Durations kept per file; unset means the default of 10
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_durations: Option<usize>,

    /// Algorithm used when `balance` is not given one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,

    /// Directory holding the statistics documents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Silence advisory warnings
    pub disable_warnings: bool,

    /// Glob patterns used to find test files
    pub discovery: DiscoveryConfig,
}

impl AppConfig {
    /// Resolve configuration from the standard file locations and the
    /// environment. `config_path` overrides the file lookup.
    pub fn resolve(config_path: Option<&Path>, env: &EnvConfig) -> Result<Self> {
        let path = config_path
            .map(Path::to_path_buf)
            .or_else(|| env.config_file.as_deref().map(PathBuf::from));
        let file = match path {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::load_default()?,
        };
        Self::layered(file, env)
    }

    /// Apply environment overrides on top of a config file
    pub fn layered(file: ConfigFile, env: &EnvConfig) -> Result<Self> {
        let mut config = file.balancer;

        if let Some(max) = env.max_durations {
            config.max_durations = Some(max);
        }
        if let Some(algorithm) = &env.algorithm {
            config.algorithm = Some(algorithm.clone());
        }
        if let Some(dir) = &env.directory {
            config.directory = Some(PathBuf::from(dir));
        }
        if let Some(disable) = env.disable_warnings {
            config.disable_warnings = disable;
        }

        config.validate()?;
        debug!("Resolved configuration: {config:?}");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_durations == Some(0) {
            bail!("max_durations must be at least 1");
        }
        Ok(())
    }

    /// History limit H
    pub fn max_durations(&self) -> usize {
        self.max_durations.unwrap_or(DEFAULT_MAX_DURATIONS)
    }

    /// Configured algorithm name, or the default
    pub fn algorithm_name(&self) -> String {
        self.algorithm
            .clone()
            .unwrap_or_else(|| Algorithm::default().to_string())
    }

    /// Statistics directory, relative paths resolved against `cwd`
    pub fn directory(&self, cwd: &Path) -> PathBuf {
        match &self.directory {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => cwd.join(dir),
            None => cwd.join(crate::storage::DEFAULT_DIR),
        }
    }

    /// Whether to advise setting an explicit history limit
    pub fn should_warn_max_durations(&self) -> bool {
        self.max_durations.is_none() && !self.disable_warnings
    }
}

/// Test file patterns per category
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub e2e: Vec<String>,
    pub component: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            e2e: crate::discovery::default_patterns(Category::E2e),
            component: crate::discovery::default_patterns(Category::Component),
        }
    }
}

impl DiscoveryConfig {
    pub fn patterns(&self, category: Category) -> &[String] {
        match category {
            Category::E2e => &self.e2e,
            Category::Component => &self.component,
        }
    }
}
