// SPDX-License-Identifier: MIT OR Apache-2.0
//! The AI-oriented output format: a prose summary of what happened plus a
//! ranked list of plausible follow-up invocations.
//!
//! Suggestions are constructed only from ids present in the result; the
//! renderer never invents an id it was not given.

use crate::Table;
use vq_core::{OperationResult, ResourceKind};
use vq_error::{ErrorKind, PlatformError};

/// Maximum number of follow-up suggestions.
const MAX_SUGGESTIONS: usize = 5;
/// Minimum number of follow-up suggestions (padded with safe generics).
const MIN_SUGGESTIONS: usize = 2;

/// Narrative rendering of a result.
pub(crate) fn narrative(result: &OperationResult) -> String {
    let mut out = String::new();
    out.push_str(&summary_sentence(result));
    out.push('\n');

    let next = suggestions(result);
    if !next.is_empty() {
        out.push_str("\nSuggested next steps:\n");
        for (i, s) in next.iter().enumerate() {
            out.push_str(&format!("  {}. {s}\n", i + 1));
        }
    }
    out
}

fn summary_sentence(result: &OperationResult) -> String {
    if result.created.is_empty() {
        return format!("Completed `{}` with no new resources.", result.operation);
    }
    let items: Vec<String> = result
        .created
        .iter()
        .map(|c| match &c.name {
            Some(name) => format!("{} {} (\"{name}\")", c.kind.label(), c.id),
            None => format!("{} {}", c.kind.label(), c.id),
        })
        .collect();
    let mut sentence = format!(
        "Completed `{}`, creating {}.",
        result.operation,
        items.join(", ")
    );
    if !result.warnings.is_empty() {
        sentence.push_str(&format!(
            " {} warning(s) were raised.",
            result.warnings.len()
        ));
    }
    sentence
}

/// Ranked follow-up CLI invocations for a result.
///
/// Only ids recorded in `result.created` are referenced.
#[must_use]
pub fn suggestions(result: &OperationResult) -> Vec<String> {
    let mut out = Vec::new();
    let id = |kind| result.id_of(kind);

    if let Some(checkpoint) = id(ResourceKind::Checkpoint) {
        out.push(format!(
            "api-cli create-step-navigate \"https://…\" --checkpoint {checkpoint}"
        ));
    }
    if let Some(journey) = id(ResourceKind::Journey) {
        out.push(format!("api-cli list-checkpoints {journey}"));
    }
    if let (Some(goal), Some(_snapshot)) = (id(ResourceKind::Goal), id(ResourceKind::Snapshot)) {
        out.push(format!("api-cli execute-goal {goal}"));
    }
    if let Some(goal) = id(ResourceKind::Goal) {
        out.push(format!("api-cli list-journeys {goal}"));
    }
    if let Some(project) = id(ResourceKind::Project) {
        out.push(format!("api-cli list-goals {project}"));
    }
    if let Some(execution) = id(ResourceKind::Execution) {
        out.push(format!("api-cli get-execution {execution}"));
    }

    // Pad with id-free generics so there are always a couple of leads.
    if out.len() < MIN_SUGGESTIONS {
        out.push("api-cli show-context".to_string());
    }
    if out.len() < MIN_SUGGESTIONS {
        out.push("api-cli list-projects".to_string());
    }
    out.truncate(MAX_SUGGESTIONS);
    out
}

/// Narrative rendering of a listing.
pub(crate) fn listing_narrative(operation: &str, table: &Table) -> String {
    if table.is_empty() {
        return format!("`{operation}` returned no results.");
    }
    let mut out = format!("`{operation}` returned {} item(s):\n", table.len());
    out.push_str(&table.render(crate::DEFAULT_WIDTH));
    out.push('\n');
    out
}

/// Narrative rendering of an error.
pub(crate) fn error_narrative(err: &PlatformError) -> String {
    let mut out = format!("The operation failed: {err}.\n");
    let mut next: Vec<String> = Vec::new();
    match err.kind {
        ErrorKind::Auth => {
            next.push("api-cli validate-config".into());
        }
        ErrorKind::Validation => {
            if let Some(hint) = &err.hint {
                out.push_str(&format!("{hint}.\n"));
            }
        }
        ErrorKind::NotFound => {
            next.push("api-cli list-projects".into());
        }
        ErrorKind::Cancelled => {
            next.push("api-cli create-structure --continue <run-id>".into());
        }
        _ => {}
    }
    if !next.is_empty() {
        out.push_str("Try next:\n");
        for s in next.iter().take(2) {
            out.push_str(&format!("  - {s}\n"));
        }
    }
    out
}
