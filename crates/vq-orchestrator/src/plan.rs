// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dry-run plans.
//!
//! A dry run walks the same code path as a real run but records what it
//! *would* call instead of touching the transport. Ids that would only
//! exist after a prior call are rendered as `<pending:…>` placeholders.

use std::fmt;

/// One call a workflow would make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCall {
    /// Operation name (e.g. `CreateGoal`).
    pub operation: String,
    /// Human description of the inputs, placeholders included.
    pub detail: String,
}

/// An ordered list of planned calls.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    calls: Vec<PlannedCall>,
}

impl Plan {
    /// Empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call.
    pub fn push(&mut self, operation: &str, detail: impl Into<String>) {
        self.calls.push(PlannedCall {
            operation: operation.to_string(),
            detail: detail.into(),
        });
    }

    /// The planned calls, in order.
    #[must_use]
    pub fn calls(&self) -> &[PlannedCall] {
        &self.calls
    }

    /// Number of planned calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Whether nothing would be called.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, call) in self.calls.iter().enumerate() {
            writeln!(f, "{:>3}. {:<20} {}", i + 1, call.operation, call.detail)?;
        }
        Ok(())
    }
}

/// Placeholder for an id that a prior planned call would produce.
#[must_use]
pub fn pending(label: &str) -> String {
    format!("<pending:{label}>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_preserves_order() {
        let mut plan = Plan::new();
        plan.push("CreateProject", "name=Demo");
        plan.push("CreateGoal", format!("project={}", pending("project")));
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.calls()[1].detail, "project=<pending:project>");
    }

    #[test]
    fn display_numbers_calls() {
        let mut plan = Plan::new();
        plan.push("AddStep", "checkpoint=<pending:checkpoint#0> position=1");
        let text = plan.to_string();
        assert!(text.contains("  1. AddStep"));
        assert!(text.contains("<pending:checkpoint#0>"));
    }
}
