//! Startup wiring shared by the run command
//!
//! Resolves configuration, finds a token, and builds the collaborators the
//! merge loop consumes.

use crate::cli::Cli;
use gh_automerge::auth::get_github_auth;
use gh_automerge::config::{Config, FileConfig, load_file_config};
use gh_automerge::error::Result;
use gh_automerge::platform::{GitHubService, PlatformService};
use gh_automerge::update::{BranchUpdater, GitBranchUpdater};
use std::sync::Arc;
use tracing::debug;

/// Everything the merge loop needs, built once at startup
///
/// The platform client and the token are read-only for the rest of the
/// process, so they are shared without locking.
pub struct RunContext {
    /// Resolved configuration
    pub config: Config,
    /// GitHub service (state fetch and merge)
    pub platform: Arc<dyn PlatformService>,
    /// Branch updater for "not up to date" merges
    pub updater: Arc<dyn BranchUpdater>,
}

impl RunContext {
    /// Build the context from parsed arguments
    ///
    /// Fails on unreadable config files, invalid values, or a missing token.
    pub async fn new(args: &Cli) -> Result<Self> {
        let file = match &args.config {
            Some(path) => load_file_config(path)?,
            None => FileConfig::default(),
        };
        let config = Config::resolve(file, args.overrides())?;
        debug!(?config, "resolved configuration");

        let auth = get_github_auth(config.host.as_deref()).await?;
        debug!(source = ?auth.source, "found GitHub token");

        let platform = GitHubService::new(&auth.token, config.host.as_deref())?;
        let updater = GitBranchUpdater::new(&auth.token, &config.remote);

        Ok(Self {
            config,
            platform: Arc::new(platform),
            updater: Arc::new(updater),
        })
    }
}
