//! gh-automerge: merge GitHub pull requests once they become mergeable
//!
//! Pull request URLs go into a single-slot [`queue`]. One [`merge::MergeLoop`]
//! drains it, fetching fresh state before every attempt and requeueing until
//! the pull request is merged, closed, or cannot be processed at all.

pub mod auth;
pub mod config;
pub mod error;
pub mod merge;
pub mod platform;
pub mod queue;
pub mod types;
pub mod update;
