//! Merge decisions - pure functions from observations to actions
//!
//! No I/O happens here. The worker feeds in what it fetched or what the
//! merge call returned and performs whatever action comes back.

use crate::types::{MergeBlocked, MergeOutcome, PullRequestState};

/// Why an item leaves the queue for good
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The queued URL is not a pull request URL
    InvalidUrl,
    /// The pull request could not be fetched
    FetchFailed,
    /// The merge call failed before GitHub answered
    MergeFailed,
    /// Someone else merged it already
    AlreadyMerged,
    /// It was closed without merging
    AlreadyClosed,
    /// We merged it
    Merged,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUrl => write!(f, "invalid pull request URL"),
            Self::FetchFailed => write!(f, "could not fetch pull request"),
            Self::MergeFailed => write!(f, "merge request failed"),
            Self::AlreadyMerged => write!(f, "already merged"),
            Self::AlreadyClosed => write!(f, "already closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// Why an item goes back into the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequeueReason {
    /// GitHub reports the pull request as not mergeable; no merge was tried
    NotMergeable,
    /// The merge call was refused
    Blocked(MergeBlocked),
}

impl std::fmt::Display for RequeueReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotMergeable => write!(f, "not mergeable"),
            Self::Blocked(blocked) => write!(f, "{blocked}"),
        }
    }
}

/// Next step for an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Remove the item permanently
    Drop(DropReason),
    /// Put the item back at the tail of the queue
    Requeue(RequeueReason),
    /// Refresh the head branch, then requeue
    UpdateBranch,
}

/// What processing one dequeued item amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The item was removed permanently
    Dropped(DropReason),
    /// The item goes back into the queue
    Requeued(RequeueReason),
}

impl ItemOutcome {
    /// Whether the item goes back into the queue
    pub const fn is_requeue(&self) -> bool {
        matches!(self, Self::Requeued(_))
    }
}

/// Decide what to do with a freshly fetched pull request
///
/// Checks run in order: merged, closed, mergeable. Returns `None` when
/// the merge should be attempted.
pub const fn decide_on_state(state: &PullRequestState) -> Option<Action> {
    if state.merged {
        return Some(Action::Drop(DropReason::AlreadyMerged));
    }
    if state.is_closed() {
        return Some(Action::Drop(DropReason::AlreadyClosed));
    }
    if !state.mergeable {
        return Some(Action::Requeue(RequeueReason::NotMergeable));
    }
    None
}

/// Decide what to do after the merge endpoint answered
pub const fn decide_on_merge(outcome: &MergeOutcome) -> Action {
    match outcome {
        MergeOutcome::Merged { .. } => Action::Drop(DropReason::Merged),
        MergeOutcome::Blocked(MergeBlocked::NotUpToDate) => Action::UpdateBranch,
        MergeOutcome::Blocked(blocked) => Action::Requeue(RequeueReason::Blocked(*blocked)),
    }
}
