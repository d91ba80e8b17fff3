//! Branch updates using a local git mirror

use super::BranchUpdater;
use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Username sent alongside the token; GitHub ignores it but it must be non-empty
const TOKEN_USER: &str = "x-access-token";

/// Updates branches by shelling out to `git` in a local mirror
pub struct GitBranchUpdater {
    token: String,
    remote: String,
}

impl GitBranchUpdater {
    /// Create an updater that authenticates with `token` against `remote`
    pub fn new(token: &str, remote: &str) -> Self {
        Self {
            token: token.to_string(),
            remote: remote.to_string(),
        }
    }

    /// `Authorization` header value carrying basic auth for the token
    fn auth_header(&self) -> String {
        let credentials = STANDARD.encode(format!("{TOKEN_USER}:{}", self.token));
        format!("Authorization: Basic {credentials}")
    }

    /// Check the mirror and return the branch it has checked out, if any
    async fn inspect_mirror(&self, repo_path: &Path) -> Result<Option<String>> {
        let path = repo_path.to_path_buf();
        let remote = self.remote.clone();

        tokio::task::spawn_blocking(move || inspect_mirror_blocking(&path, &remote))
            .await
            .map_err(|e| Error::Internal(format!("mirror check panicked: {e}")))?
    }

    /// `git <args>` in `repo_path`, authenticated with the token
    fn git_command(&self, repo_path: &Path, args: &[&str]) -> Command {
        let mut command = Command::new("git");
        // Config through the environment keeps the token off the command line
        command
            .args(args)
            .current_dir(repo_path)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_CONFIG_COUNT", "1")
            .env("GIT_CONFIG_KEY_0", "http.extraHeader")
            .env("GIT_CONFIG_VALUE_0", self.auth_header());
        command
    }

    async fn run_git(&self, repo_path: &Path, args: &[&str]) -> Result<()> {
        debug!(path = %repo_path.display(), ?args, "running git");

        let output = self
            .git_command(repo_path, args)
            .output()
            .await
            .map_err(|e| Error::Git(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::BranchUpdate(format!(
                "git {} failed: {}",
                args.first().copied().unwrap_or_default(),
                stderr.trim()
            )));
        }

        Ok(())
    }
}

fn inspect_mirror_blocking(path: &Path, remote: &str) -> Result<Option<String>> {
    let repo = gix::open(path)
        .map_err(|e| Error::Git(format!("no git repository at {}: {e}", path.display())))?;

    repo.find_remote(remote).map_err(|e| {
        Error::Git(format!(
            "remote '{remote}' not configured in {}: {e}",
            path.display()
        ))
    })?;

    let head = repo
        .head_name()
        .map_err(|e| Error::Git(format!("cannot read HEAD in {}: {e}", path.display())))?;
    Ok(head.map(|name| name.shorten().to_string()))
}

#[async_trait]
impl BranchUpdater for GitBranchUpdater {
    async fn update(&self, repo_path: &Path, branch: &str) -> Result<()> {
        let checked_out = self.inspect_mirror(repo_path).await?;

        if checked_out.as_deref() == Some(branch) {
            self.run_git(repo_path, &["pull", "--no-rebase", &self.remote, branch])
                .await?;
        } else {
            // Fast-forward (or create) the local branch without touching the worktree
            let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
            self.run_git(repo_path, &["fetch", &self.remote, &refspec])
                .await?;
        }
        self.run_git(repo_path, &["push", &self.remote, branch])
            .await?;

        debug!(path = %repo_path.display(), branch, "branch updated");
        Ok(())
    }
}
