//! Startup configuration
//!
//! Values come from command-line flags layered over an optional TOML file,
//! falling back to built-in defaults.

use crate::error::{Error, Result};
use crate::merge::MergeLoopConfig;
use crate::types::MergeMethod;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default wait before each merge attempt
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Default remote used for branch updates
pub const DEFAULT_REMOTE: &str = "origin";

/// Contents of a TOML configuration file
///
/// ```toml
/// interval = "30s"
/// method = "squash"
/// repo_root = "/home/me/src/github.com"
/// remote = "origin"
/// host = "github.example.com"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Backoff interval, e.g. `"10s"`
    pub interval: Option<String>,
    /// Merge strategy
    pub method: Option<MergeMethod>,
    /// Root of local mirrors
    pub repo_root: Option<PathBuf>,
    /// Remote name used for pull/push
    pub remote: Option<String>,
    /// GitHub Enterprise host
    pub host: Option<String>,
}

/// Values given explicitly on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--interval`
    pub interval: Option<Duration>,
    /// `--merge` / `--squash` / `--rebase`
    pub method: Option<MergeMethod>,
    /// `--repo-root`
    pub repo_root: Option<PathBuf>,
    /// `--remote`
    pub remote: Option<String>,
    /// `--host`
    pub host: Option<String>,
}

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Wait before each merge attempt
    pub interval: Duration,
    /// Merge strategy
    pub method: MergeMethod,
    /// Root holding local mirrors at `<root>/<owner>/<repo>`
    pub repo_root: PathBuf,
    /// Remote used for branch updates
    pub remote: String,
    /// GitHub Enterprise host (`None` for github.com)
    pub host: Option<String>,
}

impl Config {
    /// Layer `overrides` over `file` over defaults
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self> {
        let interval = match (overrides.interval, file.interval) {
            (Some(interval), _) => interval,
            (None, Some(text)) => parse_duration(&text)?,
            (None, None) => DEFAULT_INTERVAL,
        };

        let repo_root = match overrides.repo_root.or(file.repo_root) {
            Some(root) => root,
            None => default_repo_root()?,
        };

        Ok(Self {
            interval,
            method: overrides.method.or(file.method).unwrap_or_default(),
            repo_root,
            remote: overrides
                .remote
                .or(file.remote)
                .unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
            host: overrides.host.or(file.host),
        })
    }

    /// Settings handed to the merge loop
    pub fn loop_config(&self) -> MergeLoopConfig {
        MergeLoopConfig {
            interval: self.interval,
            method: self.method,
            repo_root: self.repo_root.clone(),
        }
    }
}

/// Load a TOML configuration file
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
}

/// Local mirror root: `$GOPATH/src/github.com`, else `~/go/src/github.com`
pub fn default_repo_root() -> Result<PathBuf> {
    repo_root_from(std::env::var("GOPATH").ok(), dirs::home_dir()).ok_or_else(|| {
        Error::Config("cannot determine repo root; set GOPATH or pass --repo-root".to_string())
    })
}

fn repo_root_from(gopath: Option<String>, home: Option<PathBuf>) -> Option<PathBuf> {
    let gopath = gopath
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|h| h.join("go")))?;
    Some(gopath.join("src").join("github.com"))
}

/// Parse a duration such as `10s`, `500ms`, `2m`, `1h30m` or bare seconds
pub fn parse_duration(text: &str) -> Result<Duration> {
    let invalid = || Error::Config(format!("invalid duration '{text}'"));
    let text = text.trim();

    if text.is_empty() {
        return Err(invalid());
    }
    if let Ok(secs) = text.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut rest = text;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).ok_or_else(invalid)?;
        if digits == 0 {
            return Err(invalid());
        }
        let value: u64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let part = match &rest[..unit_len] {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value * 60),
            "h" => Duration::from_secs(value * 3600),
            _ => return Err(invalid()),
        };
        total += part;
        rest = &rest[unit_len..];
    }

    Ok(total)
}
