// SPDX-License-Identifier: MIT OR Apache-2.0
//! cleanup: delete resources matching a tag or name prefix,
//! most-dependent-first (checkpoints, journeys, goals, projects).
//!
//! Individual delete failures are logged and skipped; cleanup is a
//! best-effort sweep, not a transaction.

use crate::plan::Plan;
use crate::Orchestrator;
use tracing::warn;
use vq_core::{OperationResult, ResourceKind, Warning};
use vq_error::PlatformError;

/// What to match when sweeping.
#[derive(Debug, Clone, Default)]
pub struct CleanupFilter {
    /// Match resources tagged with this exact tag (e.g. `run:abc123`).
    pub tag: Option<String>,
    /// Match resources whose name starts with this prefix.
    pub name_prefix: Option<String>,
}

impl CleanupFilter {
    /// Whether a resource with this name and tags matches.
    #[must_use]
    pub fn matches(&self, name: &str, tags: &[String]) -> bool {
        if let Some(tag) = &self.tag {
            if tags.iter().any(|t| t == tag) {
                return true;
            }
        }
        if let Some(prefix) = &self.name_prefix {
            if name.starts_with(prefix.as_str()) {
                return true;
            }
        }
        false
    }

    /// A filter with nothing to match is almost certainly a mistake.
    pub fn ensure_bounded(&self) -> Result<(), PlatformError> {
        if self.tag.is_none() && self.name_prefix.is_none() {
            return Err(PlatformError::validation(
                "cleanup requires --tag or --name-prefix; refusing to delete everything",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    kind: ResourceKind,
    id: u32,
}

impl Orchestrator {
    /// Sweep the organization for matching resources and delete them.
    ///
    /// With `dry_run` the returned plan lists every delete that would be
    /// issued, and nothing is touched.
    pub async fn cleanup(
        &self,
        filter: &CleanupFilter,
        dry_run: bool,
    ) -> Result<(OperationResult, Plan), PlatformError> {
        filter.ensure_bounded()?;

        let mut warnings: Vec<Warning> = Vec::new();
        let mut candidates: Vec<Candidate> = Vec::new();

        // Discovery pushes each resource after its dependents (checkpoints
        // before their journey, journeys before their goal, goals before
        // their project), so the forward delete pass below always removes
        // dependents first. Keep that push order when touching this walk.
        let projects = self.api.list_projects().await?;
        for project in &projects {
            let goals = match self.api.list_goals(project.id).await {
                Ok(goals) => goals,
                Err(err) => {
                    note_skip(&mut warnings, "ListGoals", &err);
                    continue;
                }
            };
            for goal in &goals {
                let snapshot = match goal.snapshot_id {
                    Some(s) => s,
                    None => match self.resolve_snapshot(goal.id).await {
                        Ok(s) => s,
                        Err(err) => {
                            note_skip(&mut warnings, "GetGoalVersions", &err);
                            continue;
                        }
                    },
                };
                let journeys = match self.api.list_journeys(goal.id, snapshot).await {
                    Ok(journeys) => journeys,
                    Err(err) => {
                        note_skip(&mut warnings, "ListJourneys", &err);
                        continue;
                    }
                };
                for journey in &journeys {
                    let checkpoints = match self.api.list_checkpoints(journey.id).await {
                        Ok(checkpoints) => checkpoints,
                        Err(err) => {
                            note_skip(&mut warnings, "ListCheckpoints", &err);
                            continue;
                        }
                    };
                    for checkpoint in &checkpoints {
                        if filter.matches(&checkpoint.title, &checkpoint.tags) {
                            candidates.push(Candidate {
                                kind: ResourceKind::Checkpoint,
                                id: checkpoint.id.as_u32(),
                            });
                        }
                    }
                    if filter.matches(&journey.name, &journey.tags) {
                        candidates.push(Candidate {
                            kind: ResourceKind::Journey,
                            id: journey.id.as_u32(),
                        });
                    }
                }
                if filter.matches(&goal.name, &goal.tags) {
                    candidates.push(Candidate {
                        kind: ResourceKind::Goal,
                        id: goal.id.as_u32(),
                    });
                }
            }
            if filter.matches(&project.name, &project.tags) {
                candidates.push(Candidate {
                    kind: ResourceKind::Project,
                    id: project.id.as_u32(),
                });
            }
        }

        let mut plan = Plan::new();
        for c in &candidates {
            plan.push("DeleteResource", format!("{} {}", c.kind, c.id));
        }

        let mut result = OperationResult::new("cleanup")
            .with_input("matched", candidates.len())
            .with_input("dry_run", dry_run);
        if let Some(tag) = &filter.tag {
            result = result.with_input("tag", tag);
        }
        if let Some(prefix) = &filter.name_prefix {
            result = result.with_input("name_prefix", prefix);
        }

        if dry_run {
            result.warnings = warnings;
            return Ok((result, plan));
        }

        let mut deleted = 0usize;
        for c in candidates {
            if self.cancel.is_cancelled() {
                result.warnings = warnings;
                return Err(PlatformError::cancelled(format!(
                    "cleanup cancelled after {deleted} delete(s)"
                ))
                .with_operation("cleanup"));
            }
            match self.api.delete_resource(c.kind, c.id).await {
                Ok(()) => deleted += 1,
                Err(err) => {
                    // Per platform convention delete failures are non-fatal.
                    warn!(target: "vq.orchestrator", kind = %c.kind, id = c.id, error = %err, "delete failed, skipping");
                    warnings.push(Warning::from_source(
                        "orchestrator",
                        format!("failed to delete {} {}: {err}", c.kind, c.id),
                    ));
                }
            }
        }

        result = result.with_input("deleted", deleted);
        result.warnings = warnings;
        Ok((result, plan))
    }
}

fn note_skip(warnings: &mut Vec<Warning>, operation: &str, err: &PlatformError) {
    warn!(target: "vq.orchestrator", operation, error = %err, "listing failed, subtree skipped");
    warnings.push(Warning::from_source(
        "orchestrator",
        format!("{operation} failed, subtree skipped: {err}"),
    ));
}
