//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::platform::classify::classify_merge_failure;
use crate::types::{MergeMethod, MergeOutcome, PullRequestRef, PullRequestState};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Public GitHub API root
const GITHUB_API: &str = "https://api.github.com";

/// Body of `PUT /repos/{owner}/{repo}/pulls/{number}/merge`
#[derive(Serialize)]
struct MergeRequest<'a> {
    commit_title: &'a str,
    merge_method: &'a str,
}

/// Successful merge response
#[derive(Deserialize)]
struct MergeResponse {
    merged: bool,
    sha: Option<String>,
}

/// Error envelope GitHub attaches to failed API calls
#[derive(Deserialize)]
struct ErrorEnvelope {
    message: String,
}

/// GitHub service using octocrab for reads and reqwest for the merge call
///
/// The merge goes through a raw request so the status code and the error
/// envelope are available for classification.
pub struct GitHubService {
    client: Octocrab,
    /// Token for raw HTTP requests (merge)
    token: String,
    /// HTTP client for raw requests (merge)
    http_client: Client,
    /// API root for raw requests, without trailing slash
    api_base: String,
}

impl GitHubService {
    /// Create a new GitHub service
    ///
    /// `host` selects a GitHub Enterprise instance; `None` means github.com.
    pub fn new(token: &str, host: Option<&str>) -> Result<Self> {
        let api_base = host.map_or_else(
            || GITHUB_API.to_string(),
            |h| format!("https://{h}/api/v3"),
        );
        Self::with_api_base(token, &api_base)
    }

    /// Create a service talking to an explicit API root
    pub fn with_api_base(token: &str, api_base: &str) -> Result<Self> {
        let api_base = api_base.trim_end_matches('/').to_string();

        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(&api_base)
            .map_err(|e| Error::GitHubApi(e.to_string()))?
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("gh-automerge")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token: token.to_string(),
            http_client,
            api_base,
        })
    }

    fn merge_url(&self, pr: &PullRequestRef) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}/merge",
            self.api_base,
            urlencoding::encode(&pr.owner),
            urlencoding::encode(&pr.repo),
            pr.number
        )
    }
}

/// Interpret the merge endpoint's response
fn merge_outcome_from_response(status: u16, body: &str) -> Result<MergeOutcome> {
    let unexpected = || Error::UnexpectedMergeResponse {
        status,
        body: body.to_string(),
    };

    if (200..300).contains(&status) {
        let response: MergeResponse = serde_json::from_str(body).map_err(|_| unexpected())?;
        if !response.merged {
            return Err(unexpected());
        }
        return Ok(MergeOutcome::Merged { sha: response.sha });
    }

    let envelope: ErrorEnvelope = serde_json::from_str(body).map_err(|_| unexpected())?;
    classify_merge_failure(status, &envelope.message)
        .map(MergeOutcome::Blocked)
        .ok_or_else(unexpected)
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn get_pr_state(&self, pr: &PullRequestRef) -> Result<PullRequestState> {
        debug!(pr = %pr, "fetching PR state");

        let remote = self
            .client
            .pulls(&pr.owner, &pr.repo)
            .get(pr.number)
            .await?;

        let state = PullRequestState {
            pr: pr.clone(),
            // GitHub returns null while it is still computing mergeability
            mergeable: remote.mergeable.unwrap_or(false),
            merged: remote.merged.unwrap_or(false) || remote.merged_at.is_some(),
            closed_at: remote.closed_at,
            title: remote.title.clone().unwrap_or_default(),
            head_label: remote
                .head
                .label
                .clone()
                .unwrap_or_else(|| format!("{}:{}", pr.owner, remote.head.ref_field)),
        };

        debug!(
            pr = %pr,
            mergeable = state.mergeable,
            merged = state.merged,
            closed = state.is_closed(),
            "fetched PR state"
        );
        Ok(state)
    }

    async fn merge_pr(
        &self,
        pr: &PullRequestRef,
        title: &str,
        method: MergeMethod,
    ) -> Result<MergeOutcome> {
        debug!(pr = %pr, %method, "merging PR");

        let response = self
            .http_client
            .put(self.merge_url(pr))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .json(&MergeRequest {
                commit_title: title,
                merge_method: method.as_str(),
            })
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Merge request failed: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to read merge response: {e}")))?;

        let outcome = merge_outcome_from_response(status, &body)?;
        debug!(pr = %pr, status, outcome = ?outcome, "merge call returned");
        Ok(outcome)
    }
}
