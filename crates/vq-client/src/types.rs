// SPDX-License-Identifier: MIT OR Apache-2.0
//! Request and response DTOs for the platform API.
//!
//! All wire fields are camelCase. Responses are deserialised leniently:
//! unknown fields are ignored, optional fields default.

use serde::{Deserialize, Serialize};
use vq_core::{
    CheckpointId, ExecutionId, GoalId, JourneyId, ProjectId, SnapshotId, StepId,
};

// ── Projects ────────────────────────────────────────────────────────────

/// `POST /projects` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    /// Display name; required, not unique.
    pub name: String,
    /// Run tag applied when a workflow carries a `run_id`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A project, as listed or created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Platform id.
    pub id: ProjectId,
    /// Display name.
    pub name: String,
    /// Tags, when the platform reports them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

// ── Goals ───────────────────────────────────────────────────────────────

/// `POST /goals` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    /// Owning project.
    pub project_id: ProjectId,
    /// Display name.
    pub name: String,
    /// Application URL the goal tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Run tag.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// `POST /goals` response. Creating a goal implicitly creates a snapshot
/// and an initial journey ("Suite 1"); the platform reports all three ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalCreated {
    /// The new goal.
    pub id: GoalId,
    /// Display name.
    pub name: String,
    /// Snapshot pinned to the goal.
    pub snapshot_id: SnapshotId,
    /// The implicit initial journey.
    pub initial_journey_id: JourneyId,
}

/// A goal, as listed or fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// Platform id.
    pub id: GoalId,
    /// Display name.
    pub name: String,
    /// Owning project.
    pub project_id: ProjectId,
    /// Current snapshot, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<SnapshotId>,
    /// Tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// One entry of `GET /goals/{id}/versions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalVersion {
    /// Snapshot id for this version.
    pub snapshot_id: SnapshotId,
    /// Whether this is the goal's current version.
    #[serde(default)]
    pub current: bool,
}

// ── Journeys ────────────────────────────────────────────────────────────

/// `POST /testsuites` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJourneyRequest {
    /// Owning goal.
    pub goal_id: GoalId,
    /// Snapshot the journey is created under; always carried.
    pub snapshot_id: SnapshotId,
    /// Display name.
    pub name: String,
    /// Run tag.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A journey (testsuite).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    /// Platform id.
    pub id: JourneyId,
    /// Display name.
    pub name: String,
    /// Owning goal, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<GoalId>,
    /// Tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

// ── Checkpoints ─────────────────────────────────────────────────────────

/// `POST /testcases` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckpointRequest {
    /// Display title.
    pub title: String,
    /// Run tag.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A checkpoint (testcase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    /// Platform id.
    pub id: CheckpointId,
    /// Display title.
    pub title: String,
    /// Position within its journey, when attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    /// Tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// `POST /testsuites/{journeyId}/checkpoints/attach` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachCheckpointRequest {
    /// Checkpoint to make live in the journey.
    pub checkpoint_id: CheckpointId,
    /// 1-based position within the journey.
    pub position: u32,
}

// ── Steps ───────────────────────────────────────────────────────────────

/// `POST /teststeps` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepCreated {
    /// The new step.
    pub id: StepId,
}

// ── Executions ──────────────────────────────────────────────────────────

/// Server-side execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// Accepted, not yet running.
    Queued,
    /// In progress.
    Running,
    /// Finished; all journeys passed.
    Passed,
    /// Finished with failures.
    Failed,
    /// Stopped before completion.
    Cancelled,
}

impl ExecutionStatus {
    /// Whether polling should stop.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Cancelled)
    }
}

/// `POST /goals/{id}/snapshots/{sid}/execute` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRef {
    /// The new execution.
    pub id: ExecutionId,
}

/// `GET /executions/{id}` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    /// Platform id.
    pub id: ExecutionId,
    /// Current state.
    pub status: ExecutionStatus,
    /// Failure summary, when the platform reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}
