//! Mock branch updater for testing

use async_trait::async_trait;
use gh_automerge::error::{Error, Result};
use gh_automerge::update::BranchUpdater;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Call record for `update`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCall {
    pub path: PathBuf,
    pub branch: String,
}

/// Branch updater that records calls and optionally fails
pub struct MockBranchUpdater {
    calls: Mutex<Vec<UpdateCall>>,
    error_on_update: Mutex<Option<String>>,
}

impl MockBranchUpdater {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            error_on_update: Mutex::new(None),
        }
    }

    /// Make `update` return an error
    pub fn fail_update(&self, msg: &str) {
        *self.error_on_update.lock().unwrap() = Some(msg.to_string());
    }

    pub fn get_calls(&self) -> Vec<UpdateCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BranchUpdater for MockBranchUpdater {
    async fn update(&self, repo_path: &Path, branch: &str) -> Result<()> {
        self.calls.lock().unwrap().push(UpdateCall {
            path: repo_path.to_path_buf(),
            branch: branch.to_string(),
        });

        if let Some(msg) = self.error_on_update.lock().unwrap().as_ref() {
            return Err(Error::BranchUpdate(msg.clone()));
        }
        Ok(())
    }
}
