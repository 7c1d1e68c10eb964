// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structured operation results.
//!
//! Every command the engine runs — a single step creation or a whole
//! structure build — produces one [`OperationResult`]. The renderer turns
//! it into the requested output format; nothing downstream ever re-parses
//! free text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ── Resource kinds ──────────────────────────────────────────────────────

/// Kind tag for a created platform resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Project.
    Project,
    /// Goal.
    Goal,
    /// Snapshot version token.
    Snapshot,
    /// Journey (testsuite).
    Journey,
    /// Checkpoint (testcase).
    Checkpoint,
    /// Step.
    Step,
    /// Server-side execution.
    Execution,
}

impl ResourceKind {
    /// Lowercase label used in human output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Goal => "goal",
            Self::Snapshot => "snapshot",
            Self::Journey => "journey",
            Self::Checkpoint => "checkpoint",
            Self::Step => "step",
            Self::Execution => "execution",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Created resources ───────────────────────────────────────────────────

/// A resource the platform created during an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResource {
    /// What was created.
    pub kind: ResourceKind,
    /// Platform-assigned identifier.
    pub id: u32,
    /// Display name, when the operation knows one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CreatedResource {
    /// Resource without a name.
    #[must_use]
    pub fn new(kind: ResourceKind, id: u32) -> Self {
        Self {
            kind,
            id,
            name: None,
        }
    }

    /// Resource with a display name.
    #[must_use]
    pub fn named(kind: ResourceKind, id: u32, name: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            name: Some(name.into()),
        }
    }
}

// ── Warnings ────────────────────────────────────────────────────────────

/// A non-fatal advisory attached to an operation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// What to tell the user.
    pub message: String,
    /// Where the warning originated (e.g. `dialect`, `orchestrator`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Warning {
    /// Warning with no source tag.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Warning tagged with its originating component.
    #[must_use]
    pub fn from_source(source: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.to_string()),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "[{src}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

// ── Operation result ────────────────────────────────────────────────────

/// Structured outcome of a core operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    /// Operation name (e.g. `create-step-navigate`, `create-structure`).
    pub operation: String,
    /// Summary of the validated inputs, keyed for deterministic output.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, String>,
    /// Every resource the operation created, in creation order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub created: Vec<CreatedResource>,
    /// Non-fatal advisories.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
    /// Raw remote payload, carried when the caller asked for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_payload: Option<serde_json::Value>,
}

impl OperationResult {
    /// Empty result for the named operation.
    #[must_use]
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            inputs: BTreeMap::new(),
            created: Vec::new(),
            warnings: Vec::new(),
            remote_payload: None,
        }
    }

    /// Record an input key/value pair.
    #[must_use]
    pub fn with_input(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.inputs.insert(key.to_string(), value.to_string());
        self
    }

    /// Record a created resource.
    #[must_use]
    pub fn with_created(mut self, resource: CreatedResource) -> Self {
        self.created.push(resource);
        self
    }

    /// Attach a warning.
    #[must_use]
    pub fn with_warning(mut self, warning: Warning) -> Self {
        self.warnings.push(warning);
        self
    }

    /// First created id of the given kind, if any.
    #[must_use]
    pub fn id_of(&self, kind: ResourceKind) -> Option<u32> {
        self.created.iter().find(|c| c.kind == kind).map(|c| c.id)
    }
}
