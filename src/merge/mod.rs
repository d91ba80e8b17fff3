//! Merge-retry engine
//!
//! Two layers:
//! 1. Decide - map fetched state and merge outcomes to actions (pure, testable)
//! 2. Worker - the long-lived loop that drains the retry queue and performs
//!    those actions (effectful)

mod decide;
mod worker;

pub use decide::{Action, DropReason, ItemOutcome, RequeueReason, decide_on_merge, decide_on_state};
pub use worker::{MergeLoop, MergeLoopConfig};
