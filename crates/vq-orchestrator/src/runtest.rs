// SPDX-License-Identifier: MIT OR Apache-2.0
//! run-test: execute a compiled YAML scenario against one checkpoint.
//!
//! With no target checkpoint the scenario is materialised as a fresh
//! project/goal/journey/checkpoint tree (reusing the create-structure machinery and its
//! ordering guarantees). With a supplied checkpoint the steps are issued
//! directly onto it: setup, main, teardown, in document order.

use crate::structure::{CheckpointSpec, GoalSpec, JourneySpec, ProjectRef, Structure};
use crate::{Orchestrator, RunOptions, StructureOutcome, INITIAL_JOURNEY_NAME};
use tracing::info;
use vq_core::{CheckpointId, CreatedResource, ResourceKind, Warning};
use vq_error::PlatformError;
use vq_ir::TestDoc;

impl Orchestrator {
    /// Run a compiled scenario.
    ///
    /// `target` selects an existing checkpoint; when `None`, the tree is
    /// auto-created with the document's name at every level.
    /// `start_position` is where step numbering begins on an existing
    /// checkpoint (callers pass the session's counter).
    pub async fn run_test(
        &self,
        doc: &TestDoc,
        target: Option<CheckpointId>,
        start_position: u32,
        opts: &RunOptions,
    ) -> Result<StructureOutcome, PlatformError> {
        match target {
            None => {
                let structure = scenario_structure(doc);
                let mut outcome = self.create_structure(&structure, opts).await?;
                outcome.result.operation = "run-test".to_string();
                if !doc.variables.is_empty() {
                    outcome.result.warnings.push(variables_warning(doc));
                }
                Ok(outcome)
            }
            Some(checkpoint) => self.run_on_checkpoint(doc, checkpoint, start_position, opts).await,
        }
    }

    async fn run_on_checkpoint(
        &self,
        doc: &TestDoc,
        checkpoint: CheckpointId,
        start_position: u32,
        opts: &RunOptions,
    ) -> Result<StructureOutcome, PlatformError> {
        let run_id = opts.effective_run_id();
        let mut state = if opts.resume {
            self.runs.load(&run_id)?
        } else {
            crate::state::RunState::new(run_id.clone())
        };
        let mut warnings = Vec::new();
        if !doc.variables.is_empty() {
            warnings.push(variables_warning(doc));
        }

        info!(
            target: "vq.orchestrator",
            run_id = %run_id,
            checkpoint = %checkpoint,
            steps = doc.step_count(),
            "run-test targeting existing checkpoint"
        );

        let mut position = start_position.max(1);
        if let Some(url) = &doc.starting_url {
            let key = "step:nav".to_string();
            if !state.is_done(&key) {
                self.cancelled_guard(&mut state, "run-test")?;
                let payload = vq_catalog::apply(
                    "navigate",
                    &[url.clone()],
                    &vq_catalog::Options::new(),
                    vq_catalog::StepContext::new(checkpoint, position)?,
                )?;
                let created = self.api.add_step(&payload).await?;
                state.record(
                    &key,
                    serde_json::json!(created.id.as_u32()),
                    vec![CreatedResource::new(ResourceKind::Step, created.id.as_u32())],
                );
                self.runs.save(&state)?;
            }
            position += 1;
        }

        for (si, step) in doc.steps_in_order().enumerate() {
            let key = format!("step:{si}");
            if !state.is_done(&key) {
                self.cancelled_guard(&mut state, "run-test")?;
                let invocation = step.to_invocation()?;
                let parsed = vq_catalog::build(invocation.kind, &invocation.args, &invocation.options)?;
                let payload = vq_core::StepPayload {
                    checkpoint_id: checkpoint,
                    position,
                    parsed_step: parsed,
                };
                let created = self.api.add_step(&payload).await?;
                state.record(
                    &key,
                    serde_json::json!(created.id.as_u32()),
                    vec![CreatedResource::new(ResourceKind::Step, created.id.as_u32())],
                );
                self.runs.save(&state)?;
            }
            position += 1;
        }

        self.runs.save(&state)?;
        let mut result = vq_core::OperationResult::new("run-test")
            .with_input("checkpoint", checkpoint)
            .with_input("steps", doc.step_count())
            .with_input("run_id", &run_id);
        result.created = state.created.clone();
        result.warnings = warnings;
        Ok(StructureOutcome {
            result,
            run_id: run_id.clone(),
            state_path: self.runs.path(&run_id),
        })
    }
}

/// A scenario expressed as a create-structure document.
#[must_use]
pub fn scenario_structure(doc: &TestDoc) -> Structure {
    let steps = doc.steps_in_order().cloned().collect();
    Structure {
        project: ProjectRef::Named {
            name: doc.name.clone(),
        },
        goals: vec![GoalSpec {
            name: doc.name.clone(),
            url: doc.starting_url.clone(),
            journeys: vec![JourneySpec {
                name: INITIAL_JOURNEY_NAME.to_string(),
                checkpoints: vec![CheckpointSpec {
                    name: doc.name.clone(),
                    navigation_url: doc.starting_url.clone(),
                    steps,
                }],
            }],
        }],
    }
}

fn variables_warning(doc: &TestDoc) -> Warning {
    Warning::from_source(
        "orchestrator",
        format!(
            "{} variable(s) are declared in the document but not provisioned on the platform",
            doc.variables.len()
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use vq_catalog::StepKind;
    use vq_ir::UnifiedStep;

    #[test]
    fn scenario_structure_merges_sections_in_order() {
        let mut doc = TestDoc::named("Login");
        doc.starting_url = Some("https://a.example/login".into());
        doc.setup
            .push(UnifiedStep::new(StepKind::CookieWipeAll));
        doc.main
            .push(UnifiedStep::new(StepKind::Click).with_target("#go"));
        doc.teardown
            .push(UnifiedStep::new(StepKind::Comment).with_value("done"));

        let structure = scenario_structure(&doc);
        assert!(matches!(&structure.project, ProjectRef::Named { name } if name == "Login"));
        let checkpoint = &structure.goals[0].journeys[0].checkpoints[0];
        assert_eq!(
            checkpoint.navigation_url.as_deref(),
            Some("https://a.example/login")
        );
        let kinds: Vec<_> = checkpoint.steps.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![StepKind::CookieWipeAll, StepKind::Click, StepKind::Comment]
        );
    }
}
