use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::advisor::validate_target;

fn default_target_percentage() -> f64 {
    75.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_target_percentage")]
    pub target_percentage: f64,
    #[serde(default)]
    pub data_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_percentage: default_target_percentage(),
            data_path: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "bunk-advisor", "bunk-advisor")
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Config {
    /// Reads `path`, or the platform config file when `None`. A missing file
    /// yields defaults; a present one must carry a usable target.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => path,
            None => return Ok(Self::default()),
        };

        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .with_context(|| format!("invalid config in {}", path.display()))?;
        validate_target(config.target_percentage)
            .with_context(|| format!("invalid target_percentage in {}", path.display()))?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Snapshot location: explicit flag or env first, then `data_path`, then the
    /// platform data directory.
    pub fn resolve_data_path(&self, explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = &self.data_path {
            return Ok(path.clone());
        }
        let dirs = project_dirs().context("could not determine a data directory")?;
        Ok(dirs.data_dir().join("snapshot.json"))
    }
}
