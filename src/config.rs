//! Settings file handling.
//!
//! Settings live in `<config dir>/sessprobe/config.toml` unless `--config` names
//! another file. A missing default file is not an error; built-in defaults
//! reproduce a local run with a two second cold start.
//!
//! ```toml
//! [session]
//! default_name = "TestGetOrCreate"
//! second_name = "NewTestGetOrCreate"
//!
//! [provider]
//! kind = "local"
//! startup_ms = 2000
//! stop_ms = 300
//!
//! [provider.conf]
//! "master" = "local[*]"
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use crate::errors::ProbeError;
use crate::types::{OutputFormat, SessionConfig};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub session: SessionSettings,
    pub provider: ProviderSettings,
    pub output: OutputSettings,
    pub log: LogSettings,
}

/// Names used when acquiring sessions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub default_name: String,
    pub second_name: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_name: "TestGetOrCreate".to_string(),
            second_name: "NewTestGetOrCreate".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderSettings {
    Local(LocalSettings),
    Command(CommandSettings),
}

impl Default for ProviderSettings {
    fn default() -> Self {
        ProviderSettings::Local(LocalSettings::default())
    }
}

/// Latencies of the in-process runtime, in milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocalSettings {
    pub startup_ms: u64,
    /// Start after a release. Falls back to `startup_ms`.
    pub restart_ms: Option<u64>,
    pub stop_ms: u64,
    /// Base configuration of sessions acquired without one.
    pub conf: SessionConfig,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            startup_ms: 2_000,
            restart_ms: None,
            stop_ms: 300,
            conf: SessionConfig::new(),
        }
    }
}

/// Argv lists for driving an external session manager.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandSettings {
    pub acquire: Vec<String>,
    pub release: Vec<String>,
    #[serde(default)]
    pub describe: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive, e.g. `info` or `sessprobe=debug`.
    pub level: Option<String>,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sessprobe").join("config.toml"))
}

/// Loads settings from `explicit`, or from the default location if present.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(ProbeError::ConfigNotFound {
                    path: path.to_path_buf(),
                }
                .into());
            }
            read_settings(path)
        }
        None => match default_config_path() {
            Some(path) if path.is_file() => read_settings(&path),
            _ => Ok(Settings::default()),
        },
    }
}

pub fn read_settings(path: &Path) -> Result<Settings> {
    let text = std::fs::read_to_string(path).map_err(|source| ProbeError::ConfigReadError {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(&text, path)
}

pub fn parse_settings(text: &str, path: &Path) -> Result<Settings> {
    let settings: Settings = toml::from_str(text).map_err(|e| ProbeError::ConfigParseError {
        path: path.to_path_buf(),
        detail: e.message().to_string(),
    })?;
    Ok(settings)
}
