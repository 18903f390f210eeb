//! Runtime configuration.
//!
//! Each setting is resolved in order of precedence:
//! 1. Command-line flags
//! 2. Config file (~/.config/nfl-feed/config.toml)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::Args;

const DEFAULT_LIST_REFRESH_SECS: u64 = 60;
const DEFAULT_FEED_REFRESH_SECS: u64 = 600;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum League {
    #[default]
    Nfl,
    CollegeFootball,
}

impl League {
    /// Path segment used by the ESPN endpoints.
    pub fn slug(self) -> &'static str {
        match self {
            League::Nfl => "nfl",
            League::CollegeFootball => "college-football",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            League::Nfl => "NFL",
            League::CollegeFootball => "NCAAF",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Filter directive for this crate: trace, debug, info, warn, error
    pub level: String,
    /// Where log files go. `None` when no cache directory could be found.
    pub dir: Option<PathBuf>,
    pub rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: dirs::cache_dir().map(|p| p.join("nfl-feed")),
            rotation: LogRotation::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub league: League,
    /// Day the game list shows. Fixed for the lifetime of the process.
    pub date: NaiveDate,
    pub list_refresh: Duration,
    pub feed_refresh: Duration,
    pub request_timeout: Duration,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            league: League::default(),
            date: Local::now().date_naive(),
            list_refresh: Duration::from_secs(DEFAULT_LIST_REFRESH_SECS),
            feed_refresh: Duration::from_secs(DEFAULT_FEED_REFRESH_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            logging: LoggingConfig::default(),
        }
    }
}

/// On-disk shape. Every field is optional; missing ones fall back to defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub league: Option<League>,
    pub list_refresh_secs: Option<u64>,
    pub feed_refresh_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub logging: FileLogging,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileLogging {
    pub level: Option<String>,
    pub dir: Option<PathBuf>,
    pub rotation: Option<LogRotation>,
}

impl Config {
    /// ~/.config/nfl-feed/config.toml
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("nfl-feed").join("config.toml"))
    }

    /// Loads the config file (if any) and applies command-line overrides.
    pub fn load(args: &Args) -> Result<Self> {
        let path = args.config.clone().or_else(Self::config_path);
        let file = match path {
            Some(path) => Self::read_file(&path, args.config.is_some())?,
            None => FileConfig::default(),
        };
        Self::resolve(file, args)
    }

    /// A missing file is only an error when it was named explicitly.
    fn read_file(path: &Path, required: bool) -> Result<FileConfig> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("failed to parse config file {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                Ok(FileConfig::default())
            }
            Err(e) => Err(e)
                .with_context(|| format!("failed to read config file {}", path.display())),
        }
    }

    pub fn resolve(file: FileConfig, args: &Args) -> Result<Self> {
        let defaults = Self::default();

        let league = if args.ncaa {
            League::CollegeFootball
        } else {
            file.league.unwrap_or(defaults.league)
        };

        let list_refresh = secs(
            "list refresh interval",
            args.interval.or(file.list_refresh_secs),
            defaults.list_refresh,
        )?;
        let feed_refresh = secs(
            "feed refresh interval",
            args.feed_interval.or(file.feed_refresh_secs),
            defaults.feed_refresh,
        )?;
        let request_timeout = secs(
            "request timeout",
            file.request_timeout_secs,
            defaults.request_timeout,
        )?;

        let logging = LoggingConfig {
            level: args
                .log_level
                .clone()
                .or(file.logging.level)
                .unwrap_or(defaults.logging.level),
            dir: file.logging.dir.or(defaults.logging.dir),
            rotation: file.logging.rotation.unwrap_or(defaults.logging.rotation),
        };

        Ok(Self {
            league,
            date: args.date.unwrap_or(defaults.date),
            list_refresh,
            feed_refresh,
            request_timeout,
            logging,
        })
    }
}

fn secs(name: &str, value: Option<u64>, default: Duration) -> Result<Duration> {
    match value {
        Some(0) => bail!("{name} must be at least one second"),
        Some(secs) => Ok(Duration::from_secs(secs)),
        None => Ok(default),
    }
}

/// Parses `--date` values such as `20240908`.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y%m%d").map_err(|e| format!("expected YYYYMMDD: {e}"))
}
