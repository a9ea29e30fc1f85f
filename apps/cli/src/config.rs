use anyhow::{Context, Result};
use dirs::{config_dir, data_dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "scansim";
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_TICK_MS: u64 = 500;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub tick_interval_ms: u64,
    pub seed: Option<u64>,
    pub state_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_MS,
            seed: None,
            state_dir: None,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub tick_ms: Option<u64>,
    pub seed: Option<u64>,
    pub state_dir: Option<PathBuf>,
}

fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

fn parse_config(path: &Path) -> Result<AppConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("Invalid config {}", path.display()))
}

impl AppConfig {
    /// Defaults, then the config file, then flag/env overrides.
    ///
    /// An explicit `path` must exist; the per-user default file is optional.
    pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let mut config = match path {
            Some(path) => parse_config(path)?,
            None => match default_config_path().filter(|path| path.is_file()) {
                Some(path) => parse_config(&path)?,
                None => AppConfig::default(),
            },
        };

        if let Some(tick_ms) = overrides.tick_ms {
            config.tick_interval_ms = tick_ms;
        }
        if overrides.seed.is_some() {
            config.seed = overrides.seed;
        }
        if overrides.state_dir.is_some() {
            config.state_dir = overrides.state_dir;
        }

        Ok(config)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn resolve_state_dir(&self) -> Result<PathBuf> {
        match &self.state_dir {
            Some(dir) => Ok(dir.clone()),
            None => data_dir()
                .map(|dir| dir.join(APP_DIR))
                .context("Unable to resolve app data directory"),
        }
    }
}
