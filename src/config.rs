//! TOML configuration for the mediauat CLI.
//!
//! Lookup order: an explicit path (the `--config` flag), the path in the
//! `MEDIAUAT_CONFIG` environment variable, `./mediauat.toml`, then the
//! compiled-in defaults.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::probe::FfprobeProbe;

pub const CONFIG_ENV: &str = "MEDIAUAT_CONFIG";
pub const LOCAL_CONFIG: &str = "mediauat.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UatConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// File this config was loaded from; `None` for compiled-in defaults.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl UatConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        debug!(path = %path.display(), "parsed configuration");
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Resolve the configuration. An explicit path must load; the
    /// environment and local fallbacks only warn when broken.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        Ok(Self::load_or_default())
    }

    pub fn load_or_default() -> Self {
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "{CONFIG_ENV} set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        let local = Path::new(LOCAL_CONFIG);
        if local.exists() {
            match Self::load(local) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %local.display(),
                        error = %e,
                        "local config file exists but could not be loaded, using defaults"
                    );
                }
            }
        }

        debug!("no config file found, using compiled-in defaults");
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding `*.json` suite files.
    pub suites_dir: PathBuf,
    /// Directory reports are written to when no output path is given.
    pub reports_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            suites_dir: PathBuf::from(".uat/suites"),
            reports_dir: PathBuf::from(".uat/reports"),
        }
    }
}

// ---------------------------------------------------------------------------
// Probe
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// ffprobe binary name or path.
    pub ffprobe_path: PathBuf,
    /// Hard limit for a single probe call.
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ffprobe_path: PathBuf::from("ffprobe"),
            timeout_secs: 30,
        }
    }
}

impl ProbeConfig {
    pub fn build(&self) -> FfprobeProbe {
        FfprobeProbe::new(&self.ffprobe_path).with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
    /// When set, each invocation also writes `uat_<YYYYmmdd_HHMMSS>.log` here.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            log_dir: None,
        }
    }
}

/// `uat_<YYYYmmdd_HHMMSS>.log`
pub fn log_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("uat_{}.log", at.format("%Y%m%d_%H%M%S"))
}

impl LoggingConfig {
    /// Create the per-run log file under `log_dir`, creating the directory
    /// if needed. Returns `None` when no log directory is configured.
    pub fn open_log_file<Tz: TimeZone>(
        &self,
        at: &DateTime<Tz>,
    ) -> Result<Option<(PathBuf, File)>>
    where
        Tz::Offset: std::fmt::Display,
    {
        let Some(dir) = &self.log_dir else {
            return Ok(None);
        };
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory: {}", dir.display()))?;
        let path = dir.join(log_file_name(at));
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open log file: {}", path.display()))?;
        Ok(Some((path, file)))
    }
}
