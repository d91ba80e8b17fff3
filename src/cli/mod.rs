//! Command-line interface

mod context;
mod run;

pub use context::RunContext;
pub use run::run_automerge;

use clap::Parser;
use gh_automerge::config::{Overrides, parse_duration};
use gh_automerge::types::MergeMethod;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Merge GitHub pull requests automatically once they become mergeable
#[derive(Debug, Parser)]
#[command(name = "gh-automerge", version, about)]
pub struct Cli {
    /// Pull request URLs, e.g. <https://github.com/owner/repo/pull/1>
    #[arg(required = true, value_name = "PR_URL")]
    pub prs: Vec<String>,

    /// Wait before every merge attempt (e.g. 10s, 500ms, 2m) [default: 10s]
    #[arg(short, long, value_parser = parse_interval)]
    pub interval: Option<Duration>,

    /// Create a merge commit (default)
    #[arg(long, group = "method")]
    pub merge: bool,

    /// Squash commits into one
    #[arg(long, group = "method")]
    pub squash: bool,

    /// Rebase commits onto the base branch
    #[arg(long, group = "method")]
    pub rebase: bool,

    /// Directory holding local mirrors as <owner>/<repo> [default: $GOPATH/src/github.com]
    #[arg(long, value_name = "PATH")]
    pub repo_root: Option<PathBuf>,

    /// Remote used when updating branches [default: origin]
    #[arg(long)]
    pub remote: Option<String>,

    /// GitHub Enterprise host
    #[arg(long)]
    pub host: Option<String>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    /// Merge method chosen by switches, if any
    pub const fn method(&self) -> Option<MergeMethod> {
        if self.squash {
            Some(MergeMethod::Squash)
        } else if self.rebase {
            Some(MergeMethod::Rebase)
        } else if self.merge {
            Some(MergeMethod::Merge)
        } else {
            None
        }
    }

    /// Values given on the command line, for layering over the config file
    pub fn overrides(&self) -> Overrides {
        Overrides {
            interval: self.interval,
            method: self.method(),
            repo_root: self.repo_root.clone(),
            remote: self.remote.clone(),
            host: self.host.clone(),
        }
    }
}

fn parse_interval(text: &str) -> Result<Duration, String> {
    parse_duration(text).map_err(|e| e.to_string())
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `verbose`.
pub fn init_tracing(verbose: bool, json: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(fmt::layer().json()).try_init().ok();
    } else {
        registry.with(fmt::layer().with_target(false)).try_init().ok();
    }
}
