//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the glider-config.toml file.
//! It provides a centralized way to configure the segmentation policy, the input channel
//! and output settings of a processing run.
//!
//! ```toml
//! [segmentation]
//! range = 10.0
//! join = true
//!
//! [input]
//! depth_variable = "pressure"
//!
//! [output]
//! directory = "products"
//! ascii_rows = 20
//! ```
//!
//! The `[segmentation]` table goes through [`SegmentOptions::from_toml`], so an unknown
//! key there is reported as an invalid option rather than silently ignored.

use crate::options::{OptionError, SegmentOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "glider-config.toml";

/// Errors that can occur while reading or writing the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config IO: {0}")]
    Io(#[from] io::Error),

    #[error("config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialization: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("segmentation options: {0}")]
    Options(#[from] OptionError),
}

/// Application configuration loaded from glider-config.toml
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Config {
    /// Cast segmentation policy
    pub segmentation: SegmentOptions,
    /// Input channel configuration
    pub input: InputConfig,
    /// Product and terminal output configuration
    pub output: OutputConfig,
}

/// Input channel configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    /// Name of the vertical channel, `depth` or `pressure`; only used in logs
    pub depth_variable: String,
    /// Warn when a series has fewer valid samples than this
    pub min_valid_samples: usize,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the segmented products
    pub directory: PathBuf,
    /// Height of the ASCII chart in rows
    pub ascii_rows: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            depth_variable: "depth".to_string(),
            min_valid_samples: 2,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            directory: PathBuf::from("."),
            ascii_rows: 16,
        }
    }
}

impl Config {
    /// Load configuration from glider-config.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    log::info!(
                        "Loaded configuration from {}",
                        path.as_ref().display()
                    );
                    config
                }
                Err(e) => {
                    log::warn!("Invalid config file format: {}", e);
                    log::warn!("Using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No config file found, using default configuration");
                Self::default()
            }
        }
    }

    /// Load configuration from specified path, failing on any problem
    pub fn try_load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse a configuration document; missing sections take their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let mut table: toml::Table = toml::from_str(contents)?;

        let segmentation = match table.remove("segmentation") {
            Some(value) => SegmentOptions::from_toml(&value)?,
            None => SegmentOptions::default(),
        };
        let input = match table.remove("input") {
            Some(value) => value.try_into()?,
            None => InputConfig::default(),
        };
        let output = match table.remove("output") {
            Some(value) => value.try_into()?,
            None => OutputConfig::default(),
        };

        for key in table.keys() {
            log::warn!("Ignoring unknown configuration section [{}]", key);
        }

        Ok(Config {
            segmentation,
            input,
            output,
        })
    }

    /// Save current configuration to the given path
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        log::info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }
}
