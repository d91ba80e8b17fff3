//! Core types for gh-automerge

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;

/// Identifier of a pull request, parsed from its web URL
///
/// Immutable once parsed. The queue carries the raw URL and every attempt
/// re-parses it, so a `PullRequestRef` never outlives one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Pull request number
    pub number: u64,
    /// URL the reference was parsed from
    pub source_url: String,
}

impl PullRequestRef {
    /// Parse a pull request URL such as
    /// `https://github.com/yagi5/gh-auto-merge/pull/1`
    ///
    /// The path must be exactly `/{owner}/{repo}/pull/{number}` with a
    /// positive decimal number.
    pub fn parse(url: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidPrUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let parsed = Url::parse(url).map_err(|e| invalid(&e.to_string()))?;

        let segments: Vec<&str> = parsed
            .path_segments()
            .ok_or_else(|| invalid("URL has no path"))?
            .collect();

        let [owner, repo, "pull", number] = segments.as_slice() else {
            return Err(invalid("expected path /{owner}/{repo}/pull/{number}"));
        };

        if owner.is_empty() || repo.is_empty() {
            return Err(invalid("owner and repository must not be empty"));
        }

        let number: u64 = number
            .parse()
            .map_err(|_| invalid(&format!("'{number}' is not a pull request number")))?;
        if number == 0 {
            return Err(invalid("pull request number must be positive"));
        }

        Ok(Self {
            owner: (*owner).to_string(),
            repo: (*repo).to_string(),
            number,
            source_url: url.to_string(),
        })
    }
}

impl FromStr for PullRequestRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Snapshot of a pull request's remote attributes
///
/// Fetched fresh for every attempt and discarded afterwards, because
/// mergeability and review/draft status change between retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestState {
    /// Which pull request this describes
    pub pr: PullRequestRef,
    /// GitHub's mergeable flag (`false` while GitHub is still computing it)
    pub mergeable: bool,
    /// Whether the pull request has been merged
    pub merged: bool,
    /// When the pull request was closed, if it was
    pub closed_at: Option<DateTime<Utc>>,
    /// Pull request title, used as the merge commit title
    pub title: String,
    /// Head branch label (`owner:branch`)
    pub head_label: String,
}

impl PullRequestState {
    /// Closed pull requests carry a close timestamp
    pub const fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// Branch part of the head label (`owner:branch` -> `branch`)
    pub fn head_branch(&self) -> &str {
        self.head_label
            .split_once(':')
            .map_or(self.head_label.as_str(), |(_, branch)| branch)
    }
}

/// Merge strategy/method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Create a merge commit
    #[default]
    Merge,
    /// Squash all commits into one
    Squash,
    /// Rebase commits onto base branch
    Rebase,
}

impl MergeMethod {
    /// Value expected by the GitHub merge endpoint
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Squash => "squash",
            Self::Rebase => "rebase",
        }
    }
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "merge" => Ok(Self::Merge),
            "squash" => Ok(Self::Squash),
            "rebase" => Ok(Self::Rebase),
            other => Err(Error::Config(format!(
                "unknown merge method '{other}' (expected merge, squash or rebase)"
            ))),
        }
    }
}

/// Why GitHub refused to merge a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeBlocked {
    /// Head branch conflicts with the base branch
    Conflict,
    /// Pull request is still a draft
    StillDraft,
    /// A required review is missing
    ReviewRequired,
    /// Anything else GitHub reports as not mergeable; the branch is
    /// updated before the next attempt
    NotUpToDate,
}

impl std::fmt::Display for MergeBlocked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict => write!(f, "has conflicts"),
            Self::StillDraft => write!(f, "is still a draft"),
            Self::ReviewRequired => write!(f, "is not reviewed yet"),
            Self::NotUpToDate => write!(f, "is not up to date"),
        }
    }
}

/// Result of a merge call that reached GitHub and was understood
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The pull request was merged
    Merged {
        /// SHA of the merge commit, when GitHub reports one
        sha: Option<String>,
    },
    /// GitHub refused the merge for a classified reason
    Blocked(MergeBlocked),
}
