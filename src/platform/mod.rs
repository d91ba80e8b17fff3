//! Platform services for GitHub
//!
//! The merge loop only talks to the remote through [`PlatformService`],
//! which bundles the two capabilities it needs: fetching the current state
//! of a pull request and attempting the merge.

mod classify;
mod github;

pub use classify::{classify_merge_failure, classify_method_not_allowed};
pub use github::GitHubService;

use crate::error::Result;
use crate::types::{MergeMethod, MergeOutcome, PullRequestRef, PullRequestState};
use async_trait::async_trait;

/// Remote operations consumed by the merge loop
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Fetch a fresh snapshot of the pull request
    ///
    /// Any failure (auth, network, not found) is reported as an error and
    /// the caller drops the item.
    async fn get_pr_state(&self, pr: &PullRequestRef) -> Result<PullRequestState>;

    /// Merge the pull request using `title` as the commit title
    ///
    /// Refusals GitHub explains with a known status are returned as
    /// [`MergeOutcome::Blocked`]. A refusal without a decodable error
    /// envelope is returned as [`Error::UnexpectedMergeResponse`].
    ///
    /// [`Error::UnexpectedMergeResponse`]: crate::error::Error::UnexpectedMergeResponse
    async fn merge_pr(
        &self,
        pr: &PullRequestRef,
        title: &str,
        method: MergeMethod,
    ) -> Result<MergeOutcome>;
}
