//! Configuration file management
//!
//! Handles finding, loading, and validating configuration files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::AppConfig;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./test-balancer.yaml",
    "./test-balancer.yml",
    "./test-balancer.json",
    "./.test-balancer/config.yaml",
    "~/.config/test-balancer/config.yaml",
];

/// Full configuration file structure
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Version of config file format
    #[serde(default = "default_version")]
    pub version: String,

    /// Balancer settings
    #[serde(default)]
    pub balancer: AppConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: default_version(),
            balancer: AppConfig::default(),
        }
    }
}

impl ConfigFile {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load configuration from default location
    pub fn load_default() -> Result<Self> {
        match Self::find() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !["1.0"].contains(&self.version.as_str()) {
            bail!("Unsupported config version: {}", self.version);
        }
        self.balancer.validate()
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_file_default() {
        let config = ConfigFile::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.balancer, AppConfig::default());
    }

    #[test]
    fn test_config_file_save_load() {
        let dir = tempdir().unwrap();

        let mut config = ConfigFile::default();
        config.balancer.max_durations = Some(15);
        config.balancer.algorithm = Some("round-robin".to_string());

        for name in ["config.yaml", "config.json"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            assert_eq!(ConfigFile::load(&path).unwrap(), config);
        }
    }

    #[test]
    fn test_load_partial_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test-balancer.yml");
        std::fs::write(
            &path,
            "balancer:\n  max_durations: 3\n  discovery:\n    e2e:\n      - \"tests/**/*.spec.ts\"\n",
        )
        .unwrap();

        let config = ConfigFile::load(&path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.balancer.max_durations, Some(3));
        assert_eq!(config.balancer.discovery.e2e, vec!["tests/**/*.spec.ts"]);
        assert!(!config.balancer.discovery.component.is_empty());
    }

    #[test]
    fn test_validate_config() {
        let mut config = ConfigFile::default();
        config.version = "9.9".to_string();
        assert!(config.validate().is_err());

        let mut config = ConfigFile::default();
        config.balancer.max_durations = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_expand_path() {
        let path = expand_path("./test.yaml");
        assert_eq!(path, PathBuf::from("./test.yaml"));
    }
}
