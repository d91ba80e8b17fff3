//! Mock platform service for testing

use async_trait::async_trait;
use gh_automerge::error::{Error, Result};
use gh_automerge::platform::PlatformService;
use gh_automerge::types::{MergeMethod, MergeOutcome, PullRequestRef, PullRequestState};
use std::collections::HashMap;
use std::sync::Mutex;

/// Call record for `merge_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePrCall {
    pub pr_number: u64,
    pub title: String,
    pub method: MergeMethod,
}

/// Injected failure for `merge_pr`
#[derive(Debug, Clone)]
pub enum MergeFailure {
    /// No response from GitHub
    Transport(String),
    /// Response without a usable error envelope
    Unexpected { status: u16, body: String },
}

/// Simple mock platform service for testing
///
/// Features:
/// - Configurable state and merge responses per PR number
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockPlatformService {
    state_responses: Mutex<HashMap<u64, PullRequestState>>,
    merge_responses: Mutex<HashMap<u64, MergeOutcome>>,
    // Call tracking
    get_state_calls: Mutex<Vec<u64>>,
    merge_pr_calls: Mutex<Vec<MergePrCall>>,
    // Error injection
    error_on_get_state: Mutex<Option<String>>,
    error_on_merge_pr: Mutex<Option<MergeFailure>>,
}

impl MockPlatformService {
    /// Create a mock with no configured responses
    pub fn new() -> Self {
        Self {
            state_responses: Mutex::new(HashMap::new()),
            merge_responses: Mutex::new(HashMap::new()),
            get_state_calls: Mutex::new(Vec::new()),
            merge_pr_calls: Mutex::new(Vec::new()),
            error_on_get_state: Mutex::new(None),
            error_on_merge_pr: Mutex::new(None),
        }
    }

    // === Error injection methods ===

    /// Make `get_pr_state` return an error
    pub fn fail_get_state(&self, msg: &str) {
        *self.error_on_get_state.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `merge_pr` fail
    pub fn fail_merge_pr(&self, failure: MergeFailure) {
        *self.error_on_merge_pr.lock().unwrap() = Some(failure);
    }

    /// Set the response for `get_pr_state`
    pub fn set_state(&self, state: PullRequestState) {
        self.state_responses
            .lock()
            .unwrap()
            .insert(state.pr.number, state);
    }

    /// Set the response for `merge_pr` for a specific PR
    pub fn set_merge_response(&self, pr_number: u64, outcome: MergeOutcome) {
        self.merge_responses
            .lock()
            .unwrap()
            .insert(pr_number, outcome);
    }

    // === Call verification methods ===

    /// PR numbers `get_pr_state` was called with, in order
    pub fn get_state_calls(&self) -> Vec<u64> {
        self.get_state_calls.lock().unwrap().clone()
    }

    /// All `merge_pr` calls
    pub fn get_merge_pr_calls(&self) -> Vec<MergePrCall> {
        self.merge_pr_calls.lock().unwrap().clone()
    }

    /// Get count of `merge_pr` calls
    pub fn merge_call_count(&self) -> usize {
        self.merge_pr_calls.lock().unwrap().len()
    }

    /// Assert that `merge_pr` was NOT called for a specific PR
    pub fn assert_merge_not_called(&self, pr_number: u64) {
        let calls = self.get_merge_pr_calls();
        assert!(
            !calls.iter().any(|c| c.pr_number == pr_number),
            "Expected merge_pr({pr_number}) NOT to be called but it was: {calls:?}"
        );
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn get_pr_state(&self, pr: &PullRequestRef) -> Result<PullRequestState> {
        self.get_state_calls.lock().unwrap().push(pr.number);

        if let Some(msg) = self.error_on_get_state.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }

        let responses = self.state_responses.lock().unwrap();
        responses.get(&pr.number).cloned().ok_or_else(|| {
            Error::GitHubApi(format!(
                "get_pr_state: no response configured for PR #{}",
                pr.number
            ))
        })
    }

    async fn merge_pr(
        &self,
        pr: &PullRequestRef,
        title: &str,
        method: MergeMethod,
    ) -> Result<MergeOutcome> {
        self.merge_pr_calls.lock().unwrap().push(MergePrCall {
            pr_number: pr.number,
            title: title.to_string(),
            method,
        });

        if let Some(failure) = self.error_on_merge_pr.lock().unwrap().as_ref() {
            return Err(match failure.clone() {
                MergeFailure::Transport(msg) => Error::GitHubApi(msg),
                MergeFailure::Unexpected { status, body } => {
                    Error::UnexpectedMergeResponse { status, body }
                }
            });
        }

        let responses = self.merge_responses.lock().unwrap();
        responses.get(&pr.number).cloned().ok_or_else(|| {
            Error::GitHubApi(format!(
                "merge_pr: no response configured for PR #{}",
                pr.number
            ))
        })
    }
}
