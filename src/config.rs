use crate::error::MatchError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "nfamatch";
const CONFIG_FILE: &str = "config.json";

/// Run configuration for the batch executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Exclusive upper bound of the batch-size sweep (1, 2, 4, ...)
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: u32,

    /// Timed runs per batch size
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Worker threads in the pool
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Seed for query sampling; sampling is nondeterministic when unset
    #[serde(default)]
    pub seed: Option<u64>,

    /// Reject tables whose stored hash differs
    #[serde(default)]
    pub expected_hash: Option<u64>,
}

fn default_max_batch_size() -> u32 {
    1 << 10
}

fn default_iterations() -> u32 {
    100
}

fn default_threads() -> usize {
    1
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            iterations: default_iterations(),
            threads: default_threads(),
            seed: None,
            expected_hash: None,
        }
    }
}

impl RunConfig {
    /// Load from an explicit file, else the user config file, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match get_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: RunConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Batch sizes of the sweep, doubling from 1 while below `max_batch_size`
    pub fn batch_sizes(&self) -> impl Iterator<Item = usize> {
        let max = self.max_batch_size as u64;
        std::iter::successors(Some(1u64), |&b| b.checked_mul(2))
            .take_while(move |&b| b < max)
            .map(|b| b as usize)
    }

    pub fn validate(&self) -> std::result::Result<(), MatchError> {
        if self.threads == 0 {
            return Err(MatchError::InvalidConfig("threads must be at least 1".into()));
        }
        if self.iterations == 0 {
            return Err(MatchError::InvalidConfig(
                "iterations must be at least 1".into(),
            ));
        }
        if self.max_batch_size < 2 {
            return Err(MatchError::InvalidConfig(
                "max_batch_size must be at least 2".into(),
            ));
        }
        Ok(())
    }
}

/// Path of the user config file (`<config dir>/nfamatch/config.json`)
pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
}
