//! Configuration file loading for the arena.
//!
//! This module provides types and functions for loading engine definitions and
//! match settings from TOML files.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Requested engine was not found in the configuration.
    #[error("Engine not found: {0}")]
    EngineNotFound(String),
}

/// How to launch one GTP engine.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EngineConfig {
    /// Path to the engine executable.
    pub command: PathBuf,
    /// Command-line arguments.
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory; inherited when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    /// Extra environment variables.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Command that asks the engine for the final result.
    /// Defaults to "final_score".
    #[serde(default = "default_result_command")]
    pub result_command: String,
}

fn default_result_command() -> String {
    "final_score".to_string()
}

impl EngineConfig {
    /// An engine given only by its executable path.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            command: path.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
            result_command: default_result_command(),
        }
    }

    /// Builds the process command; stdio is left for the channel to set up.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.command);
        command.args(&self.args).envs(&self.env);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }
        command
    }
}

/// Settings for a match; every field can be overridden on the command line.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    /// Number of games to play. Defaults to 1000.
    pub games: u32,
    /// Write a report every this many games. Defaults to 10.
    pub report_every: u32,
    /// Opening book file, one opening per line.
    pub openings: PathBuf,
    /// Report log file.
    pub log: PathBuf,
    /// Seed for opening selection; random when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            games: 1000,
            report_every: 10,
            openings: PathBuf::from("XOT opening.txt"),
            log: PathBuf::from("benchmark_results.log"),
            seed: None,
        }
    }
}

/// Main arena configuration structure.
///
/// Uses `arena.toml` in the current directory by default.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ArenaConfig {
    /// Map of engine names to their launch configuration.
    #[serde(default)]
    pub engines: HashMap<String, EngineConfig>,
    /// Default match settings.
    #[serde(default, rename = "match")]
    pub match_config: MatchConfig,
}

impl ArenaConfig {
    /// Loads the arena configuration from [`Self::config_path()`].
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads the configuration from an explicit path, which must exist.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Returns the path to the default configuration file.
    pub fn config_path() -> PathBuf {
        PathBuf::from("arena.toml")
    }

    /// Retrieves an engine configuration by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EngineNotFound`] if no engine with the given name exists.
    pub fn get_engine(&self, name: &str) -> Result<&EngineConfig, ConfigError> {
        self.engines
            .get(name)
            .ok_or_else(|| ConfigError::EngineNotFound(name.to_string()))
    }

    /// The named engine, or `name` itself taken as an executable path.
    pub fn resolve_engine(&self, name: &str) -> EngineConfig {
        self.get_engine(name)
            .cloned()
            .unwrap_or_else(|_| EngineConfig::from_path(name))
    }
}
