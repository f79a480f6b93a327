use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::caption::policy::ConversionOptions;
use crate::errors::AppError;

/// Application configuration module
/// This module handles loading, creating and validating `conf.json`.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Conversion engine options
    #[serde(default)]
    pub conversion: ConversionOptions,

    /// Folder conversion settings
    #[serde(default)]
    pub batch: BatchConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Folder conversion settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BatchConfig {
    // @field: Documents converted at the same time
    #[serde(default = "default_concurrent_workers")]
    pub concurrent_workers: usize,

    // @field: Leave existing outputs alone unless forced
    #[serde(default = "default_true")]
    pub skip_existing: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrent_workers: default_concurrent_workers(),
            skip_existing: default_true(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching filter for the log facade
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_concurrent_workers() -> usize {
    4
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load the configuration at `path`, or write the defaults there when
    /// the file does not exist yet.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .map_err(|e| AppError::Config(format!("Failed to open config file {}: {}", path.display(), e)))?;
            let config: Config = serde_json::from_reader(BufReader::new(file))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)?;
        std::fs::write(path, config_json)?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), AppError> {
        if self.conversion.excerpt_head_chars == 0 || self.conversion.excerpt_tail_chars == 0 {
            return Err(AppError::Config(
                "Divergence excerpts need at least one character at each end".to_string(),
            ));
        }

        if self.batch.concurrent_workers == 0 {
            return Err(AppError::Config("Batch conversion needs at least one worker".to_string()));
        }

        Ok(())
    }
}
