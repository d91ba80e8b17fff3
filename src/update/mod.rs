//! Branch update (remediation for "not up to date" merges)
//!
//! Pulls the pull request's branch into a local mirror and pushes it back,
//! which makes GitHub re-evaluate the merge state and re-run checks.

mod git;

pub use git::GitBranchUpdater;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Refreshes a remote branch through a local mirror
#[async_trait]
pub trait BranchUpdater: Send + Sync {
    /// Bring the local `branch` in the repository at `repo_path` up to date
    /// with the remote, then push it back
    ///
    /// Only `branch` itself is updated; whatever the mirror has checked out
    /// stays where it is.
    ///
    /// Fails on a missing repository, a pull conflict, rejected credentials
    /// or a rejected push. Callers only log the failure.
    async fn update(&self, repo_path: &Path, branch: &str) -> Result<()>;
}
