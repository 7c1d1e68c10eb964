// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # vq-ir
//!
//! The intermediate AST every YAML dialect parses into and renders from.
//! A [`TestDoc`] holds the test's name, entry URL, variables, and three
//! step sections; each [`UnifiedStep`] names a catalog primitive plus the
//! target/value/options it was written with. The `raw` field preserves
//! the original source fragment so lossy dialect conversions can warn
//! without dropping data.
//!
//! [`UnifiedStep::to_invocation`] lowers a step to the positional-argument
//! form the catalog's `apply` expects — the single seam between the YAML
//! surface and the payload builders.

mod lower;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vq_catalog::StepKind;

/// Keyword options attached to a step (pointer modifiers, pick index, …).
pub type StepOptions = BTreeMap<String, serde_json::Value>;

// ── Steps ───────────────────────────────────────────────────────────────

/// One step, in dialect-neutral form.
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedStep {
    /// The catalog primitive this step lowers to.
    pub kind: StepKind,
    /// Element selector or clue, when the primitive is element-scoped.
    pub target: Option<String>,
    /// Primary scalar operand (text, URL, duration, expected value, …).
    pub value: Option<String>,
    /// Keyword operands that have no positional slot.
    pub options: StepOptions,
    /// The original source fragment, for lossless round-tripping of
    /// features a target dialect cannot express. Ignored by equality
    /// checks via [`UnifiedStep::without_raw`].
    pub raw: Option<serde_json::Value>,
}

impl UnifiedStep {
    /// A step with only a kind.
    #[must_use]
    pub fn new(kind: StepKind) -> Self {
        Self {
            kind,
            target: None,
            value: None,
            options: StepOptions::new(),
            raw: None,
        }
    }

    /// Attach a target.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Attach a value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Attach an option.
    #[must_use]
    pub fn with_option(mut self, key: &str, value: serde_json::Value) -> Self {
        self.options.insert(key.to_string(), value);
        self
    }

    /// Attach the raw source fragment.
    #[must_use]
    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Clone with `raw` cleared, for AST comparisons.
    #[must_use]
    pub fn without_raw(&self) -> Self {
        Self {
            raw: None,
            ..self.clone()
        }
    }
}

// ── Document ────────────────────────────────────────────────────────────

/// A whole test in dialect-neutral form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TestDoc {
    /// Test name.
    pub name: String,
    /// Entry URL; lowered to an initial navigate step when present.
    pub starting_url: Option<String>,
    /// Named variables available to steps.
    pub variables: BTreeMap<String, String>,
    /// Steps run before the main body.
    pub setup: Vec<UnifiedStep>,
    /// The main step sequence.
    pub main: Vec<UnifiedStep>,
    /// Steps run after the main body.
    pub teardown: Vec<UnifiedStep>,
    /// Execution-infrastructure block, passed through opaquely.
    pub infrastructure: Option<serde_json::Value>,
}

impl TestDoc {
    /// A named, empty document.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// All steps in execution order: setup, main, teardown.
    pub fn steps_in_order(&self) -> impl Iterator<Item = &UnifiedStep> {
        self.setup
            .iter()
            .chain(self.main.iter())
            .chain(self.teardown.iter())
    }

    /// Clone with every step's `raw` cleared, for AST comparisons
    /// (the round-trip law compares documents ignoring `raw`).
    #[must_use]
    pub fn without_raw(&self) -> Self {
        let strip = |steps: &[UnifiedStep]| steps.iter().map(UnifiedStep::without_raw).collect();
        Self {
            name: self.name.clone(),
            starting_url: self.starting_url.clone(),
            variables: self.variables.clone(),
            setup: strip(&self.setup),
            main: strip(&self.main),
            teardown: strip(&self.teardown),
            infrastructure: self.infrastructure.clone(),
        }
    }

    /// Total number of steps across all sections.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.setup.len() + self.main.len() + self.teardown.len()
    }
}

// ── Invocation ──────────────────────────────────────────────────────────

/// A lowered step: the positional-argument form `vq_catalog::apply`
/// consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// The primitive.
    pub kind: StepKind,
    /// Positional arguments, in the primitive's declared order.
    pub args: Vec<String>,
    /// Keyword options passed through to the builder.
    pub options: StepOptions,
}

// Serde for UnifiedStep: `kind` serialises as the primitive name so JSON
// dumps of the AST read naturally.
impl Serialize for UnifiedStep {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let len = 1
            + usize::from(self.target.is_some())
            + usize::from(self.value.is_some())
            + usize::from(!self.options.is_empty())
            + usize::from(self.raw.is_some());
        let mut s = serializer.serialize_struct("UnifiedStep", len)?;
        s.serialize_field("kind", self.kind.name())?;
        if let Some(target) = &self.target {
            s.serialize_field("target", target)?;
        }
        if let Some(value) = &self.value {
            s.serialize_field("value", value)?;
        }
        if !self.options.is_empty() {
            s.serialize_field("options", &self.options)?;
        }
        if let Some(raw) = &self.raw {
            s.serialize_field("raw", raw)?;
        }
        s.end()
    }
}

impl<'de> Deserialize<'de> for UnifiedStep {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Repr {
            kind: String,
            #[serde(default)]
            target: Option<String>,
            #[serde(default)]
            value: Option<String>,
            #[serde(default)]
            options: StepOptions,
            #[serde(default)]
            raw: Option<serde_json::Value>,
        }
        let repr = Repr::deserialize(deserializer)?;
        let kind = StepKind::from_name(&repr.kind).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown step primitive '{}'", repr.kind))
        })?;
        Ok(Self {
            kind,
            target: repr.target,
            value: repr.value,
            options: repr.options,
            raw: repr.raw,
        })
    }
}
