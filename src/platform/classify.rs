//! Classification of refused merge calls

use crate::types::MergeBlocked;

/// HTTP 405: GitHub reports the pull request is not mergeable
const METHOD_NOT_ALLOWED: u16 = 405;

/// HTTP 409: head branch conflicts with base
const CONFLICT: u16 = 409;

/// Classify a refused merge by status code and error message
///
/// Returns `None` for statuses the merge loop has no rule for.
pub fn classify_merge_failure(status: u16, message: &str) -> Option<MergeBlocked> {
    match status {
        CONFLICT => Some(MergeBlocked::Conflict),
        METHOD_NOT_ALLOWED => Some(classify_method_not_allowed(message)),
        _ => None,
    }
}

/// Classify the message of a 405 response
///
/// Unrecognised messages fall through to [`MergeBlocked::NotUpToDate`],
/// which covers "base branch was modified" and failing required checks.
pub fn classify_method_not_allowed(message: &str) -> MergeBlocked {
    if message.contains("still a draft") {
        MergeBlocked::StillDraft
    } else if message.contains("review is required") {
        MergeBlocked::ReviewRequired
    } else {
        MergeBlocked::NotUpToDate
    }
}
