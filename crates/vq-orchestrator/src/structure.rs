// SPDX-License-Identifier: MIT OR Apache-2.0
//! create-structure: build a whole project tree from one document.
//!
//! The plan is strictly ordered and leaves are built depth-first: project,
//! then per goal the implicit initial journey, additional journeys,
//! and per journey each checkpoint — created, attached, then its
//! steps in source order with dense 1-based positions.

use crate::plan::{pending, Plan};
use crate::{FailurePolicy, FailureTracker, Orchestrator, RunOptions, StructureOutcome};
use serde::{Deserialize, Serialize};
use tracing::info;
use vq_core::{
    CheckpointId, CreatedResource, GoalId, JourneyId, ProjectId, ResourceKind, SnapshotId,
    Warning,
};
use vq_error::PlatformError;
use vq_ir::UnifiedStep;

/// Platform-conventional name of the implicit initial journey.
pub const INITIAL_JOURNEY_NAME: &str = "Suite 1";

// ── Document ────────────────────────────────────────────────────────────

/// The create-structure input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// Project to create or reuse.
    pub project: ProjectRef,
    /// Goals built under the project, in order.
    #[serde(default)]
    pub goals: Vec<GoalSpec>,
}

/// Reference to a new or existing project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectRef {
    /// Reuse an existing project by id.
    Existing {
        /// The project id.
        id: ProjectId,
    },
    /// Create (or reuse by name) a project.
    Named {
        /// The project name.
        name: String,
    },
}

/// One goal in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSpec {
    /// Display name.
    pub name: String,
    /// Application URL the goal tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Journeys, in order. The first one names the implicit journey.
    #[serde(default)]
    pub journeys: Vec<JourneySpec>,
}

/// One journey in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneySpec {
    /// Display name.
    pub name: String,
    /// Checkpoints, in order.
    #[serde(default)]
    pub checkpoints: Vec<CheckpointSpec>,
}

/// One checkpoint in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointSpec {
    /// Display title.
    pub name: String,
    /// When present, a navigate step is auto-inserted at position 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_url: Option<String>,
    /// Steps, in order, in the unified AST form.
    #[serde(default)]
    pub steps: Vec<UnifiedStep>,
}

impl Structure {
    /// Parse a structure document from YAML.
    pub fn from_yaml(source: &str) -> Result<Self, PlatformError> {
        serde_yaml::from_str(source).map_err(|e| {
            PlatformError::validation(format!("structure document is invalid: {e}"))
        })
    }
}

// ── Dry run ─────────────────────────────────────────────────────────────

/// Walk the document and emit the calls a real run would make.
#[must_use]
pub fn plan_structure(structure: &Structure) -> Plan {
    let mut plan = Plan::new();

    let project_label = match &structure.project {
        ProjectRef::Existing { id } => id.to_string(),
        ProjectRef::Named { name } => {
            plan.push("CreateProject", format!("name={name}"));
            pending("project")
        }
    };

    for (gi, goal) in structure.goals.iter().enumerate() {
        plan.push(
            "CreateGoal",
            format!("project={project_label} name={}", goal.name),
        );
        let goal_label = pending(&format!("goal#{gi}"));
        let snapshot_label = pending(&format!("snapshot#{gi}"));

        for (ji, journey) in goal.journeys.iter().enumerate() {
            let journey_label = if ji == 0 {
                if journey.name != INITIAL_JOURNEY_NAME {
                    plan.push(
                        "RenameJourney",
                        format!(
                            "journey={} name={}",
                            pending(&format!("journey#{gi}.0")),
                            journey.name
                        ),
                    );
                }
                pending(&format!("journey#{gi}.0"))
            } else {
                plan.push(
                    "CreateJourney",
                    format!(
                        "goal={goal_label} snapshot={snapshot_label} name={}",
                        journey.name
                    ),
                );
                pending(&format!("journey#{gi}.{ji}"))
            };

            for (ci, checkpoint) in journey.checkpoints.iter().enumerate() {
                plan.push("CreateCheckpoint", format!("title={}", checkpoint.name));
                let checkpoint_label = pending(&format!("checkpoint#{gi}.{ji}.{ci}"));
                plan.push(
                    "AttachCheckpoint",
                    format!(
                        "journey={journey_label} checkpoint={checkpoint_label} position={}",
                        ci + 1
                    ),
                );
                let mut position = 1;
                if let Some(url) = &checkpoint.navigation_url {
                    plan.push(
                        "AddStep",
                        format!(
                            "checkpoint={checkpoint_label} position={position} navigate {url}"
                        ),
                    );
                    position += 1;
                }
                for step in &checkpoint.steps {
                    plan.push(
                        "AddStep",
                        format!(
                            "checkpoint={checkpoint_label} position={position} {}",
                            step.kind.name()
                        ),
                    );
                    position += 1;
                }
            }
        }
    }

    plan
}

// ── Real run ────────────────────────────────────────────────────────────

impl Orchestrator {
    /// Execute the create-structure workflow against the platform.
    pub async fn create_structure(
        &self,
        structure: &Structure,
        opts: &RunOptions,
    ) -> Result<StructureOutcome, PlatformError> {
        let run_id = opts.effective_run_id();
        let mut state = if opts.resume {
            self.runs.load(&run_id)?
        } else {
            crate::state::RunState::new(run_id.clone())
        };
        let mut warnings: Vec<Warning> = Vec::new();
        let mut tracker = FailureTracker::new(opts.failure_policy);

        info!(target: "vq.orchestrator", run_id = %run_id, resume = opts.resume, "create-structure starting");

        let project_id = self.resolve_project(structure, &mut state).await?;

        'goals: for (gi, goal) in structure.goals.iter().enumerate() {
            self.cancelled_guard(&mut state, "create-structure")?;

            let goal_key = format!("goal:{gi}");
            let (goal_id, snapshot_id, initial_journey) = if state.is_done(&goal_key) {
                let v = state.recorded(&goal_key).expect("checked").clone();
                (
                    GoalId(v["goal"].as_u64().unwrap_or_default() as u32),
                    SnapshotId(v["snapshot"].as_u64().unwrap_or_default() as u32),
                    JourneyId(v["journey"].as_u64().unwrap_or_default() as u32),
                )
            } else {
                let created = match self
                    .api
                    .create_goal(project_id, &goal.name, goal.url.as_deref())
                    .await
                {
                    Ok(created) => created,
                    Err(err) => {
                        tracker.note(err, &mut warnings)?;
                        continue 'goals;
                    }
                };
                tracker.reset();
                state.record(
                    &goal_key,
                    serde_json::json!({
                        "goal": created.id.as_u32(),
                        "snapshot": created.snapshot_id.as_u32(),
                        "journey": created.initial_journey_id.as_u32(),
                    }),
                    vec![
                        CreatedResource::named(ResourceKind::Goal, created.id.as_u32(), &goal.name),
                        CreatedResource::new(ResourceKind::Snapshot, created.snapshot_id.as_u32()),
                        CreatedResource::named(
                            ResourceKind::Journey,
                            created.initial_journey_id.as_u32(),
                            INITIAL_JOURNEY_NAME,
                        ),
                    ],
                );
                self.runs.save(&state)?;
                (created.id, created.snapshot_id, created.initial_journey_id)
            };

            for (ji, journey_spec) in goal.journeys.iter().enumerate() {
                self.cancelled_guard(&mut state, "create-structure")?;

                let journey_id = match self
                    .materialise_journey(
                        gi,
                        ji,
                        journey_spec,
                        goal_id,
                        snapshot_id,
                        initial_journey,
                        &mut state,
                        &mut warnings,
                    )
                    .await
                {
                    Ok(id) => id,
                    Err(err) => {
                        tracker.note(err, &mut warnings)?;
                        continue;
                    }
                };

                for (ci, checkpoint_spec) in journey_spec.checkpoints.iter().enumerate() {
                    self.cancelled_guard(&mut state, "create-structure")?;
                    match self
                        .materialise_checkpoint(
                            gi,
                            ji,
                            ci,
                            checkpoint_spec,
                            journey_id,
                            &mut state,
                        )
                        .await
                    {
                        Ok(()) => tracker.reset(),
                        Err(err) => tracker.note(err, &mut warnings)?,
                    }
                }
            }
        }

        self.runs.save(&state)?;
        let mut result = vq_core::OperationResult::new("create-structure")
            .with_input("run_id", &run_id)
            .with_input("goals", structure.goals.len());
        result.created = state.created.clone();
        result.warnings = warnings;
        Ok(StructureOutcome {
            result,
            run_id: run_id.clone(),
            state_path: self.runs.path(&run_id),
        })
    }

    async fn resolve_project(
        &self,
        structure: &Structure,
        state: &mut crate::state::RunState,
    ) -> Result<ProjectId, PlatformError> {
        match &structure.project {
            ProjectRef::Existing { id } => Ok(*id),
            ProjectRef::Named { name } => {
                if let Some(v) = state.recorded("project") {
                    return Ok(ProjectId(v.as_u64().unwrap_or_default() as u32));
                }
                // Reuse an existing project with this exact name.
                let existing = self
                    .api
                    .list_projects()
                    .await?
                    .into_iter()
                    .find(|p| p.name == *name);
                let id = match existing {
                    Some(p) => p.id,
                    None => {
                        let created = self.api.create_project(name).await?;
                        state.record(
                            "project",
                            serde_json::json!(created.id.as_u32()),
                            vec![CreatedResource::named(
                                ResourceKind::Project,
                                created.id.as_u32(),
                                name,
                            )],
                        );
                        self.runs.save(state)?;
                        return Ok(created.id);
                    }
                };
                state.record("project", serde_json::json!(id.as_u32()), vec![]);
                self.runs.save(state)?;
                Ok(id)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn materialise_journey(
        &self,
        gi: usize,
        ji: usize,
        spec: &JourneySpec,
        goal: GoalId,
        snapshot: SnapshotId,
        initial_journey: JourneyId,
        state: &mut crate::state::RunState,
        warnings: &mut Vec<Warning>,
    ) -> Result<JourneyId, PlatformError> {
        let key = format!("journey:{gi}/{ji}");
        if let Some(v) = state.recorded(&key) {
            return Ok(JourneyId(v.as_u64().unwrap_or_default() as u32));
        }

        let id = if ji == 0 {
            // The first user journey is the implicit one, renamed when
            // the document names it differently.
            if spec.name != INITIAL_JOURNEY_NAME {
                self.api.rename_journey(initial_journey, &spec.name).await?;
                warnings.push(Warning::from_source(
                    "orchestrator",
                    format!(
                        "renamed initial journey {initial_journey} to \"{}\"",
                        spec.name
                    ),
                ));
            }
            initial_journey
        } else {
            // Journey creation always carries goal + snapshot.
            let created = self.api.create_journey(goal, snapshot, &spec.name).await?;
            state.record(
                &key,
                serde_json::json!(created.id.as_u32()),
                vec![CreatedResource::named(
                    ResourceKind::Journey,
                    created.id.as_u32(),
                    &spec.name,
                )],
            );
            self.runs.save(state)?;
            return Ok(created.id);
        };

        state.record(&key, serde_json::json!(id.as_u32()), vec![]);
        self.runs.save(state)?;
        Ok(id)
    }

    async fn materialise_checkpoint(
        &self,
        gi: usize,
        ji: usize,
        ci: usize,
        spec: &CheckpointSpec,
        journey: JourneyId,
        state: &mut crate::state::RunState,
    ) -> Result<(), PlatformError> {
        let create_key = format!("checkpoint:{gi}/{ji}/{ci}");
        let checkpoint_id = if let Some(v) = state.recorded(&create_key) {
            CheckpointId(v.as_u64().unwrap_or_default() as u32)
        } else {
            let created = self.api.create_checkpoint(&spec.name).await?;
            state.record(
                &create_key,
                serde_json::json!(created.id.as_u32()),
                vec![CreatedResource::named(
                    ResourceKind::Checkpoint,
                    created.id.as_u32(),
                    &spec.name,
                )],
            );
            self.runs.save(state)?;
            created.id
        };

        // Attach before any step is added.
        let attach_key = format!("attach:{gi}/{ji}/{ci}");
        if !state.is_done(&attach_key) {
            self.api
                .attach_checkpoint(journey, checkpoint_id, ci as u32 + 1)
                .await?;
            state.record(&attach_key, serde_json::json!(true), vec![]);
            self.runs.save(&*state)?;
        }

        let mut position: u32 = 1;
        if let Some(url) = &spec.navigation_url {
            let key = format!("step:{gi}/{ji}/{ci}/nav");
            if !state.is_done(&key) {
                let payload = vq_catalog::apply(
                    "navigate",
                    &[url.clone()],
                    &vq_catalog::Options::new(),
                    vq_catalog::StepContext::new(checkpoint_id, position)?,
                )?;
                let created = self.api.add_step(&payload).await?;
                state.record(
                    &key,
                    serde_json::json!(created.id.as_u32()),
                    vec![CreatedResource::new(ResourceKind::Step, created.id.as_u32())],
                );
                self.runs.save(&*state)?;
            }
            position += 1;
        }

        for (si, step) in spec.steps.iter().enumerate() {
            let key = format!("step:{gi}/{ji}/{ci}/{si}");
            if !state.is_done(&key) {
                let invocation = step.to_invocation()?;
                let payload = vq_catalog::build(invocation.kind, &invocation.args, &invocation.options)?;
                let payload = vq_core::StepPayload {
                    checkpoint_id,
                    position,
                    parsed_step: payload,
                };
                let created = self.api.add_step(&payload).await?;
                state.record(
                    &key,
                    serde_json::json!(created.id.as_u32()),
                    vec![CreatedResource::new(ResourceKind::Step, created.id.as_u32())],
                );
                self.runs.save(&*state)?;
            }
            position += 1;
        }

        Ok(())
    }

}

/// How a workflow reacts to individual call failures.
impl FailureTracker {
    pub(crate) fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            consecutive: 0,
        }
    }

    /// Record a failure. Returns `Err` when the policy says to abort.
    pub(crate) fn note(
        &mut self,
        err: PlatformError,
        warnings: &mut Vec<Warning>,
    ) -> Result<(), PlatformError> {
        self.consecutive += 1;
        match self.policy {
            FailurePolicy::StopOnFirst => Err(err),
            FailurePolicy::Continue => {
                warnings.push(Warning::from_source("orchestrator", err.to_string()));
                Ok(())
            }
            FailurePolicy::MaxConsecutive(max) => {
                if self.consecutive >= max {
                    Err(err.with_hint(format!("{max} consecutive failures; aborting")))
                } else {
                    warnings.push(Warning::from_source("orchestrator", err.to_string()));
                    Ok(())
                }
            }
        }
    }

    pub(crate) fn reset(&mut self) {
        self.consecutive = 0;
    }
}
