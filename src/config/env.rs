//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "TEST_BALANCER";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// History limit from TEST_BALANCER_MAX_DURATIONS
    pub max_durations: Option<usize>,
    /// Algorithm from TEST_BALANCER_ALGORITHM
    pub algorithm: Option<String>,
    /// Statistics directory from TEST_BALANCER_DIR
    pub directory: Option<String>,
    /// From TEST_BALANCER_DISABLE_WARNINGS
    pub disable_warnings: Option<bool>,
    /// Config file from TEST_BALANCER_CONFIG
    pub config_file: Option<String>,
    /// Log level from TEST_BALANCER_LOG
    pub log: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            max_durations: get_env_parse("MAX_DURATIONS"),
            algorithm: get_env("ALGORITHM"),
            directory: get_env("DIR"),
            disable_warnings: get_env_bool("DISABLE_WARNINGS"),
            config_file: get_env("CONFIG"),
            log: get_env("LOG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.max_durations.is_some()
            || self.algorithm.is_some()
            || self.directory.is_some()
            || self.disable_warnings.is_some()
            || self.config_file.is_some()
            || self.log.is_some()
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}"))
        .ok()
        .filter(|v| !v.is_empty())
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.trim().parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Builder for setting environment variables in tests
#[cfg(test)]
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

#[cfg(test)]
impl EnvBuilder {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    pub fn max_durations(mut self, max: usize) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_MAX_DURATIONS"), max.to_string()));
        self
    }

    pub fn algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_ALGORITHM"), algorithm.into()));
        self
    }

    pub fn disable_warnings(mut self, disable: bool) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_DISABLE_WARNINGS"), disable.to_string()));
        self
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        for (key, value) in self.vars {
            env::set_var(key, value);
        }

        EnvGuard { previous }
    }
}

/// Guard that restores environment variables on drop
#[cfg(test)]
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

#[cfg(test)]
impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print all TEST_BALANCER environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_MAX_DURATIONS     Durations kept per test file (default 10)");
    println!("  {ENV_PREFIX}_ALGORITHM         Default balancing algorithm");
    println!("  {ENV_PREFIX}_DIR               Directory holding the statistics files");
    println!("  {ENV_PREFIX}_DISABLE_WARNINGS  Silence advisory warnings (true/false)");
    println!("  {ENV_PREFIX}_CONFIG            Path to configuration file");
    println!("  {ENV_PREFIX}_LOG               Log level (trace, debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_MAX_DURATIONS=25");
    println!("  test-balancer balance -r 4 -t e2e");
}
