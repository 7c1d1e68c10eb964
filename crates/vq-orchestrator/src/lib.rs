// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # vq-orchestrator
//!
//! The workflow engine. Single-intent commands talk to the platform
//! client directly; everything that needs ordering, resumption, or
//! compensation goes through here:
//!
//! - **create-structure** — build a whole project tree, depth-first,
//!   honouring the initial-journey, attach-before-steps, and dense
//!   position invariants.
//! - **run-test** — land a compiled YAML scenario on a checkpoint.
//! - **execute-goal** — trigger a server-side run and poll it.
//! - **cleanup** — delete tagged resources, most-dependent-first.
//!
//! Workflows are sequential within one invocation: no call that depends
//! on a created id is issued before its dependency resolves. Every
//! successful create is recorded in a per-run state file so `--continue`
//! can resume without duplicating platform objects.

mod cancel;
mod cleanup;
mod execute;
mod plan;
mod runtest;
mod state;
mod structure;

pub use cancel::{cancel_pair, CancelHandle, CancelToken, CANCEL_GRACE};
pub use cleanup::CleanupFilter;
pub use execute::PollConfig;
pub use plan::{pending, Plan, PlannedCall};
pub use runtest::scenario_structure;
pub use state::{RunState, RunStateStore, RUNS_DIR};
pub use structure::{
    plan_structure, CheckpointSpec, GoalSpec, JourneySpec, ProjectRef, Structure,
    INITIAL_JOURNEY_NAME,
};

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use vq_client::PlatformApi;
use vq_core::{GoalId, OperationResult, SnapshotId};
use vq_error::PlatformError;

// ── Options ─────────────────────────────────────────────────────────────

/// How a workflow reacts to individual call failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort on the first failure.
    StopOnFirst,
    /// Record a warning and keep going.
    Continue,
    /// Keep going until this many failures happen in a row.
    MaxConsecutive(u32),
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self::MaxConsecutive(3)
    }
}

/// Consecutive-failure accounting for a running workflow.
#[derive(Debug)]
pub(crate) struct FailureTracker {
    pub(crate) policy: FailurePolicy,
    pub(crate) consecutive: u32,
}

/// Per-run workflow options.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Stable id for the run; generated when absent. Created resources
    /// are tagged with it and the resume file is named after it.
    pub run_id: Option<String>,
    /// Resume from the run's recorded state, skipping completed items.
    pub resume: bool,
    /// Failure policy (default: abort after 3 consecutive failures).
    pub failure_policy: FailurePolicy,
}

impl RunOptions {
    /// The run id to use, generating a fresh one when unset.
    #[must_use]
    pub fn effective_run_id(&self) -> String {
        self.run_id.clone().unwrap_or_else(generate_run_id)
    }
}

/// A short, filesystem-friendly run id.
#[must_use]
pub fn generate_run_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..12].to_string()
}

/// Outcome of a tree-building workflow.
#[derive(Debug, Clone)]
pub struct StructureOutcome {
    /// The structured result (created ids, warnings).
    pub result: OperationResult,
    /// The run id the resources were tagged with.
    pub run_id: String,
    /// Path of the resume state file.
    pub state_path: PathBuf,
}

// ── Orchestrator ────────────────────────────────────────────────────────

/// Drives workflows against a [`PlatformApi`].
pub struct Orchestrator {
    pub(crate) api: Arc<dyn PlatformApi>,
    pub(crate) runs: RunStateStore,
    pub(crate) cancel: CancelToken,
    snapshots: Mutex<BTreeMap<GoalId, SnapshotId>>,
}

impl Orchestrator {
    /// Orchestrator over a client, with run state in the given store.
    #[must_use]
    pub fn new(api: Arc<dyn PlatformApi>, runs: RunStateStore) -> Self {
        Self {
            api,
            runs,
            cancel: CancelToken::never(),
            snapshots: Mutex::new(BTreeMap::new()),
        }
    }

    /// Attach a cancellation token (Ctrl-C or an enclosing deadline).
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The underlying client.
    #[must_use]
    pub fn api(&self) -> &dyn PlatformApi {
        self.api.as_ref()
    }

    /// Resolve a goal's snapshot, memoised per invocation.
    ///
    /// Tries the goal record first, then the versions listing's current
    /// entry.
    pub async fn resolve_snapshot(&self, goal: GoalId) -> Result<SnapshotId, PlatformError> {
        if let Some(cached) = self.snapshots.lock().expect("snapshot memo poisoned").get(&goal) {
            return Ok(*cached);
        }

        let snapshot = match self.api.get_goal(goal).await?.snapshot_id {
            Some(s) => s,
            None => self
                .api
                .goal_versions(goal)
                .await?
                .into_iter()
                .find(|v| v.current)
                .map(|v| v.snapshot_id)
                .ok_or_else(|| {
                    PlatformError::new(
                        vq_error::ErrorKind::NotFound,
                        format!("goal {goal} has no current snapshot"),
                    )
                    .with_operation("GetGoalVersions")
                })?,
        };

        self.snapshots
            .lock()
            .expect("snapshot memo poisoned")
            .insert(goal, snapshot);
        Ok(snapshot)
    }

    /// Cancellation checkpoint between platform calls: persist state and
    /// surface a Cancelled error pointing at the resume file.
    pub(crate) fn cancelled_guard(
        &self,
        state: &mut RunState,
        operation: &str,
    ) -> Result<(), PlatformError> {
        if self.cancel.is_cancelled() {
            state.cancelled = true;
            self.runs.save(state)?;
            let path = self.runs.path(&state.run_id);
            return Err(PlatformError::cancelled("workflow cancelled")
                .with_operation(operation)
                .with_hint(format!(
                    "partial state saved to {}; resume with --continue {}",
                    path.display(),
                    state.run_id
                )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_is_short_and_unique() {
        let a = generate_run_id();
        let b = generate_run_id();
        assert_eq!(a.len(), 12);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn run_options_keep_explicit_id() {
        let opts = RunOptions {
            run_id: Some("fixed".into()),
            ..RunOptions::default()
        };
        assert_eq!(opts.effective_run_id(), "fixed");
    }

    #[test]
    fn default_policy_is_three_consecutive() {
        assert_eq!(FailurePolicy::default(), FailurePolicy::MaxConsecutive(3));
    }
}
