// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory platform double used by the workflow tests.
//!
//! Records every call in order, assigns sequential ids per resource kind,
//! and can be scripted to fail specific operations or to fire a
//! cancellation after a given number of calls.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use vq_client::{
    Checkpoint, Execution, ExecutionRef, ExecutionStatus, Goal, GoalCreated, GoalVersion,
    Journey, PlatformApi, Project, StepCreated,
};
use vq_core::{
    CheckpointId, ExecutionId, GoalId, JourneyId, ProjectId, ResourceKind, SnapshotId, StepId,
    StepPayload,
};
use vq_error::{ErrorKind, PlatformError};
use vq_orchestrator::CancelHandle;

#[derive(Default)]
pub struct MockApi {
    pub calls: Mutex<Vec<String>>,
    next_id: AtomicU32,
    /// Operation names that should fail, consumed one entry per failure.
    pub fail_queue: Mutex<Vec<&'static str>>,
    /// Fire this handle once the recorded call count reaches the limit.
    pub cancel_after: Mutex<Option<(usize, CancelHandle)>>,
    /// Execution statuses returned by successive `get_execution` calls.
    pub execution_states: Mutex<Vec<ExecutionStatus>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU32::new(100),
            ..Self::default()
        }
    }

    pub fn recorded(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn id(&self) -> u32 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn note(&self, call: String, operation: &'static str) -> Result<(), PlatformError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        let count = calls.len();
        drop(calls);

        let mut cancel = self.cancel_after.lock().unwrap();
        let due = cancel.as_ref().is_some_and(|(limit, _)| count >= *limit);
        if due {
            if let Some((_, handle)) = cancel.take() {
                handle.cancel();
            }
        }
        drop(cancel);

        let mut queue = self.fail_queue.lock().unwrap();
        if let Some(pos) = queue.iter().position(|op| *op == operation) {
            queue.remove(pos);
            return Err(
                PlatformError::new(ErrorKind::Remote5xx, "scripted failure")
                    .with_operation(operation)
                    .with_status(503),
            );
        }
        Ok(())
    }
}

#[async_trait]
impl PlatformApi for MockApi {
    async fn create_project(&self, name: &str) -> Result<Project, PlatformError> {
        self.note(format!("CreateProject {name}"), "CreateProject")?;
        Ok(Project {
            id: ProjectId(self.id()),
            name: name.to_string(),
            tags: vec![],
        })
    }

    async fn list_projects(&self) -> Result<Vec<Project>, PlatformError> {
        self.note("ListProjects".into(), "ListProjects")?;
        Ok(vec![])
    }

    async fn create_goal(
        &self,
        project: ProjectId,
        name: &str,
        _url: Option<&str>,
    ) -> Result<GoalCreated, PlatformError> {
        self.note(format!("CreateGoal {project} {name}"), "CreateGoal")?;
        Ok(GoalCreated {
            id: GoalId(self.id()),
            name: name.to_string(),
            snapshot_id: SnapshotId(self.id()),
            initial_journey_id: JourneyId(self.id()),
        })
    }

    async fn get_goal(&self, goal: GoalId) -> Result<Goal, PlatformError> {
        self.note(format!("GetGoal {goal}"), "GetGoal")?;
        Ok(Goal {
            id: goal,
            name: "goal".into(),
            project_id: ProjectId(1),
            snapshot_id: Some(SnapshotId(goal.as_u32() + 1)),
            tags: vec![],
        })
    }

    async fn list_goals(&self, project: ProjectId) -> Result<Vec<Goal>, PlatformError> {
        self.note(format!("ListGoals {project}"), "ListGoals")?;
        Ok(vec![])
    }

    async fn goal_versions(&self, goal: GoalId) -> Result<Vec<GoalVersion>, PlatformError> {
        self.note(format!("GetGoalVersions {goal}"), "GetGoalVersions")?;
        Ok(vec![GoalVersion {
            snapshot_id: SnapshotId(goal.as_u32() + 1),
            current: true,
        }])
    }

    async fn execute_goal(
        &self,
        goal: GoalId,
        snapshot: SnapshotId,
    ) -> Result<ExecutionRef, PlatformError> {
        self.note(format!("Execute {goal} {snapshot}"), "ExecuteGoalSnapshot")?;
        Ok(ExecutionRef {
            id: ExecutionId(self.id()),
        })
    }

    async fn create_journey(
        &self,
        goal: GoalId,
        snapshot: SnapshotId,
        name: &str,
    ) -> Result<Journey, PlatformError> {
        self.note(
            format!("CreateJourney {goal} {snapshot} {name}"),
            "CreateJourney",
        )?;
        Ok(Journey {
            id: JourneyId(self.id()),
            name: name.to_string(),
            goal_id: Some(goal),
            tags: vec![],
        })
    }

    async fn list_journeys(
        &self,
        goal: GoalId,
        snapshot: SnapshotId,
    ) -> Result<Vec<Journey>, PlatformError> {
        self.note(format!("ListJourneys {goal} {snapshot}"), "ListJourneys")?;
        Ok(vec![])
    }

    async fn rename_journey(
        &self,
        journey: JourneyId,
        name: &str,
    ) -> Result<Journey, PlatformError> {
        self.note(format!("RenameJourney {journey} {name}"), "RenameJourney")?;
        Ok(Journey {
            id: journey,
            name: name.to_string(),
            goal_id: None,
            tags: vec![],
        })
    }

    async fn create_checkpoint(&self, title: &str) -> Result<Checkpoint, PlatformError> {
        self.note(format!("CreateCheckpoint {title}"), "CreateCheckpoint")?;
        Ok(Checkpoint {
            id: CheckpointId(self.id()),
            title: title.to_string(),
            position: None,
            tags: vec![],
        })
    }

    async fn list_checkpoints(
        &self,
        journey: JourneyId,
    ) -> Result<Vec<Checkpoint>, PlatformError> {
        self.note(format!("ListCheckpoints {journey}"), "ListCheckpoints")?;
        Ok(vec![])
    }

    async fn attach_checkpoint(
        &self,
        journey: JourneyId,
        checkpoint: CheckpointId,
        position: u32,
    ) -> Result<(), PlatformError> {
        self.note(
            format!("Attach {journey} {checkpoint} {position}"),
            "AttachCheckpoint",
        )?;
        Ok(())
    }

    async fn add_step(&self, payload: &StepPayload) -> Result<StepCreated, PlatformError> {
        self.note(
            format!(
                "AddStep {} {} {}",
                payload.checkpoint_id,
                payload.position,
                payload.parsed_step.action
            ),
            "AddStep",
        )?;
        Ok(StepCreated {
            id: StepId(self.id()),
        })
    }

    async fn get_execution(&self, execution: ExecutionId) -> Result<Execution, PlatformError> {
        self.note(format!("GetExecution {execution}"), "GetExecution")?;
        let mut states = self.execution_states.lock().unwrap();
        let status = if states.is_empty() {
            ExecutionStatus::Passed
        } else {
            states.remove(0)
        };
        Ok(Execution {
            id: execution,
            status,
            summary: None,
        })
    }

    async fn delete_resource(&self, kind: ResourceKind, id: u32) -> Result<(), PlatformError> {
        self.note(format!("Delete {kind} {id}"), "DeleteResource")?;
        Ok(())
    }
}
