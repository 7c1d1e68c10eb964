// SPDX-License-Identifier: MIT OR Apache-2.0
//! execute-goal: trigger a server-side execution and optionally poll
//! it to completion.
//!
//! Polling backs off exponentially from the initial interval up to a cap,
//! and stops at a wall-clock timeout (default 30 minutes). A timeout is
//! not an error: the last observed state is surfaced with a warning.

use crate::Orchestrator;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};
use vq_client::ExecutionStatus;
use vq_core::{CreatedResource, GoalId, OperationResult, ResourceKind, SnapshotId, Warning};
use vq_error::PlatformError;

/// Polling parameters for execute-goal.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// First poll interval.
    pub initial_interval: Duration,
    /// Interval cap for the exponential backoff.
    pub max_interval: Duration,
    /// Wall-clock budget for the whole poll.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(2),
            max_interval: Duration::from_secs(30),
            timeout: Duration::from_secs(30 * 60),
        }
    }
}

impl Orchestrator {
    /// Execute a goal snapshot. When `poll` is set, wait for a terminal
    /// state within the poll budget.
    pub async fn execute_goal(
        &self,
        goal: GoalId,
        snapshot: Option<SnapshotId>,
        poll: Option<PollConfig>,
    ) -> Result<OperationResult, PlatformError> {
        // Executions reference goal content, so the snapshot must be
        // carried; resolve it from the goal when the caller omitted it.
        let snapshot = match snapshot {
            Some(s) => s,
            None => self.resolve_snapshot(goal).await?,
        };

        let execution = self.api.execute_goal(goal, snapshot).await?;
        info!(
            target: "vq.orchestrator",
            goal = %goal,
            snapshot = %snapshot,
            execution = %execution.id,
            "execution started"
        );

        let mut result = OperationResult::new("execute-goal")
            .with_input("goal", goal)
            .with_input("snapshot", snapshot)
            .with_created(CreatedResource::new(
                ResourceKind::Execution,
                execution.id.as_u32(),
            ));

        let Some(poll) = poll else {
            return Ok(result);
        };

        let started = Instant::now();
        let mut interval = poll.initial_interval;
        loop {
            if self.cancel.is_cancelled() {
                return Err(PlatformError::cancelled("execution polling cancelled")
                    .with_operation("execute-goal")
                    .with_hint(format!(
                        "the execution keeps running server-side; check it with \
                         `api-cli get-execution {}`",
                        execution.id
                    )));
            }
            if started.elapsed() >= poll.timeout {
                result = result.with_warning(Warning::from_source(
                    "orchestrator",
                    format!(
                        "poll budget ({}s) exhausted before the execution finished",
                        poll.timeout.as_secs()
                    ),
                ));
                return Ok(result.with_input("status", "running"));
            }

            tokio::time::sleep(interval).await;
            interval = (interval * 2).min(poll.max_interval);

            let current = self.api.get_execution(execution.id).await?;
            debug!(
                target: "vq.orchestrator",
                execution = %execution.id,
                status = ?current.status,
                "polled execution"
            );
            if current.status.is_terminal() {
                let status = match current.status {
                    ExecutionStatus::Passed => "passed",
                    ExecutionStatus::Failed => "failed",
                    ExecutionStatus::Cancelled => "cancelled",
                    _ => unreachable!("is_terminal checked"),
                };
                result = result.with_input("status", status);
                if let Some(summary) = current.summary {
                    result = result.with_input("summary", summary);
                }
                return Ok(result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_poll_config_matches_contract() {
        let cfg = PollConfig::default();
        assert_eq!(cfg.initial_interval, Duration::from_secs(2));
        assert_eq!(cfg.max_interval, Duration::from_secs(30));
        assert_eq!(cfg.timeout, Duration::from_secs(1800));
    }
}
