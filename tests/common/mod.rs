//! Shared test fixtures

#![allow(dead_code)]

mod mock_platform;
mod mock_updater;

pub use mock_platform::{MergeFailure, MergePrCall, MockPlatformService};
pub use mock_updater::{MockBranchUpdater, UpdateCall};

use gh_automerge::merge::{MergeLoop, MergeLoopConfig};
use gh_automerge::queue::{QueueSender, retry_queue};
use gh_automerge::types::{MergeMethod, PullRequestRef, PullRequestState};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Backoff used by loop tests (time is paused, so this costs nothing)
pub const TEST_INTERVAL: Duration = Duration::from_secs(10);

/// URL of PR `number` in `test/repo`
pub fn pr_url(number: u64) -> String {
    format!("https://github.com/test/repo/pull/{number}")
}

/// Open, mergeable PR state
pub fn make_state(number: u64, title: &str) -> PullRequestState {
    PullRequestState {
        pr: PullRequestRef::parse(&pr_url(number)).unwrap(),
        mergeable: true,
        merged: false,
        closed_at: None,
        title: title.to_string(),
        head_label: format!("test:feature-{number}"),
    }
}

/// Loop config pointing mirrors at `/mirrors`
pub fn loop_config(method: MergeMethod) -> MergeLoopConfig {
    MergeLoopConfig {
        interval: TEST_INTERVAL,
        method,
        repo_root: PathBuf::from("/mirrors"),
    }
}

/// A merge loop wired to mocks, plus a sender for seeding
pub fn make_loop(
    platform: &Arc<MockPlatformService>,
    updater: &Arc<MockBranchUpdater>,
) -> (MergeLoop, QueueSender) {
    let (sender, receiver) = retry_queue();
    let merge_loop = MergeLoop::new(
        platform.clone(),
        updater.clone(),
        loop_config(MergeMethod::Merge),
        sender.clone(),
        receiver,
    );
    (merge_loop, sender)
}
