// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # vq-dialect
//!
//! Three surface syntaxes — compact, simplified, extended — all describe
//! the same tests. This crate detects which dialect a YAML document is
//! written in (scored heuristics with a confidence), parses it into the
//! shared `vq-ir` AST, and renders an AST back out in any dialect.
//! Features a target dialect cannot express are reported as warnings; the
//! source fragment survives in each step's `raw` field.

mod compact;
mod detect;
mod extended;
mod simplified;

pub use detect::{DetectionResult, DialectDetector};

use vq_core::Warning;
use vq_error::PlatformError;
use vq_ir::TestDoc;

/// Detection below this confidence still proceeds, but warns.
pub const CONFIDENCE_FLOOR: f64 = 0.6;

// ── Dialect enum ────────────────────────────────────────────────────────

/// The recognised surface syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Terse single-letter step keys (`c`, `t`, `ch`, …).
    Compact,
    /// Single-key step maps named after the action (`click:`, `write:`).
    Simplified,
    /// Explicit `{type, command, target, value}` step records.
    Extended,
}

impl Dialect {
    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Simplified => "simplified",
            Self::Extended => "extended",
        }
    }

    /// All dialects, in detection order.
    #[must_use]
    pub fn all() -> &'static [Dialect] {
        &[Self::Compact, Self::Simplified, Self::Extended]
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Dialect {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "simplified" => Ok(Self::Simplified),
            "extended" => Ok(Self::Extended),
            other => Err(PlatformError::validation(format!(
                "unknown dialect '{other}' (expected compact, simplified or extended)"
            ))),
        }
    }
}

// ── Compile ─────────────────────────────────────────────────────────────

/// Output of [`compile`]: the AST, the dialect it was parsed as, and any
/// warnings raised along the way.
#[derive(Debug, Clone)]
pub struct Compiled {
    /// The parsed document.
    pub doc: TestDoc,
    /// Dialect the source was parsed as.
    pub dialect: Dialect,
    /// Detection confidence in `[0, 1]`.
    pub confidence: f64,
    /// Parse and detection warnings.
    pub warnings: Vec<Warning>,
}

/// Parse a YAML document in whichever dialect it is written in.
///
/// Low-confidence detection (< [`CONFIDENCE_FLOOR`]) adds a warning but
/// still proceeds with the best guess.
pub fn compile(source: &str) -> Result<Compiled, PlatformError> {
    let value: serde_yaml::Value = serde_yaml::from_str(source)
        .map_err(|e| PlatformError::validation(format!("document is not valid YAML: {e}")))?;

    let detection = DialectDetector::new().detect(&value).ok_or_else(|| {
        PlatformError::validation(
            "document does not match any dialect (expected compact, simplified or extended keys)",
        )
    })?;

    let mut warnings = Vec::new();
    if detection.confidence < CONFIDENCE_FLOOR {
        warnings.push(Warning::from_source(
            "dialect",
            format!(
                "low detection confidence ({:.2}); proceeding as {}",
                detection.confidence, detection.dialect
            ),
        ));
    }

    let doc = parse_as(&value, detection.dialect, &mut warnings)?;
    Ok(Compiled {
        doc,
        dialect: detection.dialect,
        confidence: detection.confidence,
        warnings,
    })
}

/// Parse a YAML document as a specific dialect, bypassing detection.
pub fn compile_as(source: &str, dialect: Dialect) -> Result<(TestDoc, Vec<Warning>), PlatformError> {
    let value: serde_yaml::Value = serde_yaml::from_str(source)
        .map_err(|e| PlatformError::validation(format!("document is not valid YAML: {e}")))?;
    let mut warnings = Vec::new();
    let doc = parse_as(&value, dialect, &mut warnings)?;
    Ok((doc, warnings))
}

fn parse_as(
    value: &serde_yaml::Value,
    dialect: Dialect,
    warnings: &mut Vec<Warning>,
) -> Result<TestDoc, PlatformError> {
    match dialect {
        Dialect::Compact => compact::parse(value, warnings),
        Dialect::Simplified => simplified::parse(value, warnings),
        Dialect::Extended => extended::parse(value, warnings),
    }
}

/// Render an AST in the requested dialect.
///
/// Returns the YAML text plus warnings for anything the dialect cannot
/// express (the information stays available via each step's `raw`).
pub fn render(doc: &TestDoc, dialect: Dialect) -> Result<(String, Vec<Warning>), PlatformError> {
    let mut warnings = Vec::new();
    let value = match dialect {
        Dialect::Compact => compact::render(doc, &mut warnings),
        Dialect::Simplified => simplified::render(doc, &mut warnings),
        Dialect::Extended => extended::render(doc, &mut warnings),
    };
    let text = serde_yaml::to_string(&value)
        .map_err(|e| PlatformError::internal(format!("failed to render YAML: {e}")))?;
    Ok((text, warnings))
}

// ── Shared helpers for the dialect modules ──────────────────────────────

pub(crate) fn str_key<'a>(
    mapping: &'a serde_yaml::Mapping,
    key: &str,
) -> Option<&'a serde_yaml::Value> {
    mapping.get(&serde_yaml::Value::String(key.to_string()))
}

pub(crate) fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn yaml_to_json(value: &serde_yaml::Value) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}
