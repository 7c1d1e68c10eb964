// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scored dialect detection.
//!
//! Each dialect contributes points for format-specific keys; the highest
//! score wins. Scores are capped at 1.0 and reported as the confidence,
//! with the matched evidence kept for diagnostics.

use crate::{str_key, Dialect};
use serde_yaml::{Mapping, Value};

/// Result of detection on one document.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// Most likely dialect.
    pub dialect: Dialect,
    /// Confidence score in `[0.0, 1.0]`.
    pub confidence: f64,
    /// Human-readable evidence for the match.
    pub evidence: Vec<String>,
}

/// Analyzes a YAML document and determines its most likely [`Dialect`].
#[derive(Debug, Default)]
pub struct DialectDetector {
    _priv: (),
}

impl DialectDetector {
    /// Create a new detector.
    #[must_use]
    pub fn new() -> Self {
        Self { _priv: () }
    }

    /// Detect the dialect of a parsed YAML value.
    ///
    /// Returns `None` when the document is not a mapping or no heuristic
    /// matches.
    #[must_use]
    pub fn detect(&self, value: &Value) -> Option<DetectionResult> {
        self.detect_all(value).into_iter().next()
    }

    /// Scored results for every dialect that matched at least one
    /// heuristic, sorted by descending confidence.
    #[must_use]
    pub fn detect_all(&self, value: &Value) -> Vec<DetectionResult> {
        let Value::Mapping(map) = value else {
            return Vec::new();
        };

        let mut results: Vec<DetectionResult> = Dialect::all()
            .iter()
            .filter_map(|&dialect| {
                let (score, evidence) = match dialect {
                    Dialect::Compact => score_compact(map),
                    Dialect::Simplified => score_simplified(map),
                    Dialect::Extended => score_extended(map),
                };
                (score > 0.0).then(|| DetectionResult {
                    dialect,
                    confidence: score,
                    evidence,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results
    }
}

type Score = (f64, Vec<String>);

fn score_compact(map: &Mapping) -> Score {
    let mut pts = 0.0_f64;
    let mut ev = Vec::new();

    if str_key(map, "test").is_some() {
        pts += 0.35;
        ev.push("has \"test\" key".into());
    }
    if str_key(map, "do").is_some() {
        pts += 0.4;
        ev.push("has \"do\" step list".into());
    }
    if str_key(map, "nav").is_some() {
        pts += 0.15;
        ev.push("has top-level \"nav\"".into());
    }
    if str_key(map, "data").is_some() {
        pts += 0.1;
        ev.push("has \"data\" variables".into());
    }

    (pts.min(1.0), ev)
}

fn score_simplified(map: &Mapping) -> Score {
    let mut pts = 0.0_f64;
    let mut ev = Vec::new();

    if str_key(map, "name").is_some() {
        pts += 0.15;
        ev.push("has \"name\" key".into());
    }
    if str_key(map, "starting_url").is_some() {
        pts += 0.2;
        ev.push("has \"starting_url\" key".into());
    }
    match str_key(map, "steps") {
        Some(Value::Sequence(steps)) => {
            pts += 0.3;
            ev.push("has \"steps\" list".into());
            if steps.iter().any(is_single_action_key_map) {
                pts += 0.25;
                ev.push("steps are single-key action maps".into());
            }
            if steps.iter().any(is_typed_step) {
                // Typed records belong to the extended dialect.
                pts -= 0.3;
            }
        }
        Some(_) => {}
        None => {}
    }
    if str_key(map, "config").is_some() || str_key(map, "infrastructure").is_some() {
        pts += 0.1;
        ev.push("has config/infrastructure block".into());
    }

    (pts.clamp(0.0, 1.0), ev)
}

fn score_extended(map: &Mapping) -> Score {
    let mut pts = 0.0_f64;
    let mut ev: Vec<String> = Vec::new();

    if let Some(Value::Sequence(steps)) = str_key(map, "steps") {
        if steps.iter().any(is_typed_step) {
            pts += 0.7;
            ev.push("steps carry \"type\" and \"command\"".into());
        }
    }
    if str_key(map, "name").is_some() {
        pts += 0.15;
        ev.push("has \"name\" key".into());
    }
    if str_key(map, "starting_url").is_some() {
        pts += 0.15;
        ev.push("has \"starting_url\" key".into());
    }

    // Without typed steps this is indistinguishable from simplified;
    // don't claim the document on top-level keys alone.
    if !ev.iter().any(|e| e.contains("type")) {
        return (0.0, Vec::new());
    }

    (pts.min(1.0), ev)
}

fn is_single_action_key_map(step: &Value) -> bool {
    match step {
        Value::Mapping(m) if m.len() == 1 => !is_typed_step(step),
        _ => false,
    }
}

fn is_typed_step(step: &Value) -> bool {
    match step {
        Value::Mapping(m) => str_key(m, "type").is_some() && str_key(m, "command").is_some(),
        _ => false,
    }
}
