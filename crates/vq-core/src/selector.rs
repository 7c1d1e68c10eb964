// SPDX-License-Identifier: MIT OR Apache-2.0
//! Selector strategies for element-scoped steps.
//!
//! The platform resolves a step's target through one of two strategies:
//! `GUESS`, where the value is a JSON object literal `{"clue": …}` and the
//! platform heuristically resolves the element from natural text, or an
//! explicit `CSS` / `XPATH` selector passed through verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

// ── Strategy ────────────────────────────────────────────────────────────

/// How the platform should resolve the selector value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectorKind {
    /// Natural-text clue; the platform guesses the element.
    Guess,
    /// Raw CSS selector.
    Css,
    /// Raw XPath expression.
    Xpath,
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Guess => "GUESS",
            Self::Css => "CSS",
            Self::Xpath => "XPATH",
        };
        f.write_str(s)
    }
}

// ── Selector ────────────────────────────────────────────────────────────

/// A single `{type, value}` entry in a step target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    /// Resolution strategy.
    #[serde(rename = "type")]
    pub kind: SelectorKind,
    /// Strategy-dependent value. For `GUESS` this is the JSON object
    /// literal `{"clue":"…"}`; for `CSS`/`XPATH` the raw selector text.
    pub value: String,
}

impl Selector {
    /// Build a `GUESS` selector from free text.
    ///
    /// The clue is embedded as a JSON object literal, matching the wire
    /// format the platform expects inside the selector value string.
    #[must_use]
    pub fn guess(clue: &str) -> Self {
        let value = serde_json::json!({ "clue": clue }).to_string();
        Self {
            kind: SelectorKind::Guess,
            value,
        }
    }

    /// Build an explicit CSS selector.
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            kind: SelectorKind::Css,
            value: selector.into(),
        }
    }

    /// Build an explicit XPath selector.
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self {
            kind: SelectorKind::Xpath,
            value: expr.into(),
        }
    }

    /// Choose a strategy for caller-supplied text.
    ///
    /// Syntactically valid selectors become `CSS` or `XPATH`; anything
    /// else is treated as a natural-text clue and becomes `GUESS`.
    #[must_use]
    pub fn infer(input: &str) -> Self {
        let trimmed = input.trim();
        if looks_like_xpath(trimmed) {
            Self::xpath(trimmed)
        } else if looks_like_css(trimmed) {
            Self::css(trimmed)
        } else {
            Self::guess(trimmed)
        }
    }
}

/// A step target: the ordered list of selectors the platform will try.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Candidate selectors, tried in order.
    pub selectors: Vec<Selector>,
}

impl Target {
    /// Target with a single selector.
    #[must_use]
    pub fn single(selector: Selector) -> Self {
        Self {
            selectors: vec![selector],
        }
    }
}

impl From<Selector> for Target {
    fn from(selector: Selector) -> Self {
        Self::single(selector)
    }
}

// ── Heuristics ──────────────────────────────────────────────────────────

fn looks_like_xpath(s: &str) -> bool {
    s.starts_with('/') || s.starts_with("//") || s.starts_with("./") || s.starts_with("(//")
}

fn looks_like_css(s: &str) -> bool {
    if s.is_empty() || s.contains(char::is_whitespace) && !s.contains(['>', '+', '~']) {
        // Multi-word text without combinators reads as a clue, not CSS.
        return s.starts_with(['#', '.', '[']);
    }
    if s.starts_with(['#', '.', '[']) {
        return true;
    }
    // tag[attr=…], tag.class, tag#id, tag:pseudo — a bare tag alone is
    // ambiguous and stays a clue.
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            s.contains(['[', '.', '#', ':', '>']) && !s.contains("://")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Strategy inference ──────────────────────────────────────────

    #[test]
    fn infer_css_from_id_prefix() {
        let s = Selector::infer("#email");
        assert_eq!(s.kind, SelectorKind::Css);
        assert_eq!(s.value, "#email");
    }

    #[test]
    fn infer_css_from_class_prefix() {
        assert_eq!(Selector::infer(".btn-primary").kind, SelectorKind::Css);
    }

    #[test]
    fn infer_css_from_attribute_prefix() {
        assert_eq!(
            Selector::infer("[data-test=submit]").kind,
            SelectorKind::Css
        );
    }

    #[test]
    fn infer_css_from_compound_selector() {
        assert_eq!(Selector::infer("input[type=text]").kind, SelectorKind::Css);
        assert_eq!(Selector::infer("button.primary").kind, SelectorKind::Css);
    }

    #[test]
    fn infer_xpath_from_slash_prefix() {
        assert_eq!(
            Selector::infer("//div[@id='x']").kind,
            SelectorKind::Xpath
        );
        assert_eq!(Selector::infer("/html/body").kind, SelectorKind::Xpath);
    }

    #[test]
    fn infer_guess_from_free_text() {
        let s = Selector::infer("Login button");
        assert_eq!(s.kind, SelectorKind::Guess);
        assert_eq!(s.value, r#"{"clue":"Login button"}"#);
    }

    #[test]
    fn infer_guess_from_url() {
        // URLs contain "://" and must not be mistaken for CSS.
        let s = Selector::infer("https://example.com");
        assert_eq!(s.kind, SelectorKind::Guess);
    }

    #[test]
    fn infer_guess_from_bare_word() {
        assert_eq!(Selector::infer("Welcome").kind, SelectorKind::Guess);
    }

    // ── Wire format ─────────────────────────────────────────────────

    #[test]
    fn selector_serialises_with_type_key() {
        let s = Selector::css("#submit");
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json, serde_json::json!({"type": "CSS", "value": "#submit"}));
    }

    #[test]
    fn guess_value_is_clue_object_literal() {
        let s = Selector::guess("https://example.com");
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["type"], "GUESS");
        assert_eq!(json["value"], r#"{"clue":"https://example.com"}"#);
    }

    #[test]
    fn target_wraps_selector_list() {
        let t = Target::single(Selector::xpath("//a"));
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["selectors"][0]["type"], "XPATH");
    }

    #[test]
    fn selector_roundtrips_through_json() {
        for s in [
            Selector::guess("hello world"),
            Selector::css("#a.b"),
            Selector::xpath("//x"),
        ] {
            let json = serde_json::to_string(&s).unwrap();
            let back: Selector = serde_json::from_str(&json).unwrap();
            assert_eq!(back, s);
        }
    }
}
