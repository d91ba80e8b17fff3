//! The merge loop - single consumer of the retry queue
//!
//! For every dequeued URL: wait the backoff interval, parse, fetch fresh
//! state, then drop, requeue, merge or update the branch according to
//! [`decide_on_state`] and [`decide_on_merge`]. Only one loop may run per
//! queue; two would race on the same pull request and double-submit merges.

use super::decide::{
    Action, DropReason, ItemOutcome, RequeueReason, decide_on_merge, decide_on_state,
};
use crate::error::Result;
use crate::platform::PlatformService;
use crate::queue::{QueueReceiver, QueueSender};
use crate::types::{MergeBlocked, MergeMethod, PullRequestRef, PullRequestState};
use crate::update::BranchUpdater;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Settings the loop needs besides its collaborators
#[derive(Debug, Clone)]
pub struct MergeLoopConfig {
    /// Fixed wait before every attempt, including the first
    pub interval: Duration,
    /// Merge strategy passed to GitHub
    pub method: MergeMethod,
    /// Root holding local mirrors at `<root>/<owner>/<repo>`
    pub repo_root: PathBuf,
}

/// Retry loop draining the queue until cancelled
pub struct MergeLoop {
    platform: Arc<dyn PlatformService>,
    updater: Arc<dyn BranchUpdater>,
    config: MergeLoopConfig,
    sender: QueueSender,
    receiver: QueueReceiver,
    /// Attempts per URL, for logging only; retries are unlimited
    attempts: HashMap<String, u64>,
}

impl MergeLoop {
    /// Create a loop consuming `receiver` and requeueing through `sender`
    pub fn new(
        platform: Arc<dyn PlatformService>,
        updater: Arc<dyn BranchUpdater>,
        config: MergeLoopConfig,
        sender: QueueSender,
        receiver: QueueReceiver,
    ) -> Self {
        Self {
            platform,
            updater,
            config,
            sender,
            receiver,
            attempts: HashMap::new(),
        }
    }

    /// Run until `cancel` fires
    ///
    /// Returns an error only for defects (see [`Error::is_defect`]).
    ///
    /// [`Error::is_defect`]: crate::error::Error::is_defect
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.drive(cancel, None).await.map(|_| ())
    }

    /// Process at most `max_items` dequeued items, then return how many
    /// were processed. Stops early on cancellation.
    pub async fn run_iterations(
        &mut self,
        cancel: &CancellationToken,
        max_items: usize,
    ) -> Result<usize> {
        self.drive(cancel, Some(max_items)).await
    }

    async fn drive(&mut self, cancel: &CancellationToken, limit: Option<usize>) -> Result<usize> {
        let mut processed = 0;

        loop {
            if limit.is_some_and(|max| processed >= max) || cancel.is_cancelled() {
                break;
            }

            let item = tokio::select! {
                () = cancel.cancelled() => break,
                item = self.receiver.pop() => item,
            };
            let Some(url) = item else {
                debug!("retry queue closed");
                break;
            };

            tokio::select! {
                () = cancel.cancelled() => {
                    debug!(pr = %url, "cancelled during backoff");
                    break;
                }
                () = tokio::time::sleep(self.config.interval) => {}
            }

            let attempt = {
                let count = self.attempts.entry(url.clone()).or_default();
                *count += 1;
                *count
            };

            let span = info_span!("attempt", pr = %url, attempt);
            let outcome = self.process_item(&url).instrument(span).await?;

            if outcome.is_requeue() {
                self.requeue(url);
            } else {
                self.attempts.remove(&url);
            }
            processed += 1;
        }

        Ok(processed)
    }

    /// Put `url` back at the tail of the queue
    ///
    /// The push runs on its own task: the loop is the queue's only consumer,
    /// so waiting here for the slot could never succeed.
    fn requeue(&self, url: String) {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            if let Err(e) = sender.push(url.clone()).await {
                debug!(pr = %url, error = %e, "could not requeue");
            }
        });
    }

    /// Run one attempt for `url`, without the backoff wait
    ///
    /// Every per-item failure is logged and folded into the returned
    /// outcome; only defects surface as errors.
    pub async fn process_item(&self, url: &str) -> Result<ItemOutcome> {
        let pr = match PullRequestRef::parse(url) {
            Ok(pr) => pr,
            Err(e) => {
                error!(error = %e, "invalid PR URL, dropping");
                return Ok(ItemOutcome::Dropped(DropReason::InvalidUrl));
            }
        };

        let state = match self.platform.get_pr_state(&pr).await {
            Ok(state) => state,
            Err(e) => {
                error!(error = %e, "failed to fetch PR, dropping");
                return Ok(ItemOutcome::Dropped(DropReason::FetchFailed));
            }
        };

        if let Some(action) = decide_on_state(&state) {
            return Ok(self.finish(action, &state).await);
        }

        info!(title = %state.title, method = %self.config.method, "trying merge");

        match self
            .platform
            .merge_pr(&state.pr, &state.title, self.config.method)
            .await
        {
            Ok(outcome) => Ok(self.finish(decide_on_merge(&outcome), &state).await),
            Err(e) if e.is_defect() => {
                error!(error = %e, "merge returned an unrecognised response");
                Err(e)
            }
            Err(e) => {
                error!(error = %e, "merge request failed, dropping");
                Ok(ItemOutcome::Dropped(DropReason::MergeFailed))
            }
        }
    }

    async fn finish(&self, action: Action, state: &PullRequestState) -> ItemOutcome {
        match action {
            Action::Drop(DropReason::Merged) => {
                info!("merge succeeded");
                ItemOutcome::Dropped(DropReason::Merged)
            }
            Action::Drop(reason) => {
                info!(%reason, "PR is {reason}, dropping");
                ItemOutcome::Dropped(reason)
            }
            Action::Requeue(reason @ RequeueReason::NotMergeable) => {
                info!(%reason, "PR {reason}, requeueing");
                ItemOutcome::Requeued(reason)
            }
            Action::Requeue(reason @ RequeueReason::Blocked(_)) => {
                warn!(%reason, "PR {reason}, requeueing");
                ItemOutcome::Requeued(reason)
            }
            Action::UpdateBranch => {
                self.update_branch(state).await;
                ItemOutcome::Requeued(RequeueReason::Blocked(MergeBlocked::NotUpToDate))
            }
        }
    }

    /// Refresh the head branch through its local mirror
    ///
    /// Failures are logged only; the item is requeued either way.
    async fn update_branch(&self, state: &PullRequestState) {
        let path = self
            .config
            .repo_root
            .join(&state.pr.owner)
            .join(&state.pr.repo);
        let branch = state.head_branch();

        info!(path = %path.display(), branch, "PR is not up to date, updating branch");

        match self.updater.update(&path, branch).await {
            Ok(()) => info!(branch, "branch update succeeded, requeueing"),
            Err(e) => warn!(branch, error = %e, "branch update failed, requeueing"),
        }
    }
}
