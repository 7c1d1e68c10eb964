// SPDX-License-Identifier: MIT OR Apache-2.0
//! Builders for the twelve assertion primitives.
//!
//! Comparison variants carry the expected value in `value`; the regex for
//! `assert-matches` is validated before any platform call is made.

use crate::args::{parse_i64, parse_regex};
use vq_core::{ActionCode, ParsedStep, Selector};
use vq_error::PlatformError;

/// Element-presence assertions: `assert-exists`, `assert-not-exists`,
/// `assert-checked`, `assert-selected`.
pub(crate) fn presence(action: ActionCode, args: &[String]) -> ParsedStep {
    ParsedStep::bare(action).with_target(Selector::infer(&args[0]).into())
}

/// Text comparisons: `assert-equals`, `assert-not-equals`.
pub(crate) fn text_comparison(action: ActionCode, args: &[String]) -> ParsedStep {
    ParsedStep::bare(action)
        .with_target(Selector::infer(&args[0]).into())
        .with_value(args[1].clone())
}

/// Numeric comparisons: `assert-gt`, `assert-gte`, `assert-lt`, `assert-lte`.
pub(crate) fn numeric_comparison(
    action: ActionCode,
    args: &[String],
) -> Result<ParsedStep, PlatformError> {
    // The platform compares numerically; reject values it would choke on.
    parse_i64("expected", &args[1])?;
    Ok(ParsedStep::bare(action)
        .with_target(Selector::infer(&args[0]).into())
        .with_value(args[1].trim().to_string()))
}

/// `assert-matches(selector, pattern)`.
pub(crate) fn matches(args: &[String]) -> Result<ParsedStep, PlatformError> {
    let pattern = parse_regex("pattern", &args[1])?;
    Ok(ParsedStep::bare(ActionCode::AssertMatches)
        .with_target(Selector::infer(&args[0]).into())
        .with_value(pattern))
}

/// `assert-variable(variable, expected)`.
///
/// The pair is encoded into `value` the same way targeted writes encode
/// selector and text.
pub(crate) fn variable(args: &[String]) -> Result<ParsedStep, PlatformError> {
    let variable = args[0].trim();
    if variable.is_empty() {
        return Err(PlatformError::validation("variable name must not be empty"));
    }
    let mut pair = serde_json::Map::new();
    pair.insert(
        variable.to_string(),
        serde_json::Value::String(args[1].clone()),
    );
    let value = serde_json::Value::Object(pair).to_string();
    Ok(ParsedStep::bare(ActionCode::AssertVariable).with_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn exists_has_target_only() {
        let step = presence(ActionCode::AssertExists, &s(&["Welcome"]));
        let v = serde_json::to_value(&step).unwrap();
        assert_eq!(v["action"], "ASSERT_EXISTS");
        assert_eq!(v["target"]["selectors"][0]["type"], "GUESS");
        assert!(v.get("value").is_none());
        assert!(v.get("meta").is_none());
    }

    #[test]
    fn equals_carries_expected_value() {
        let step = text_comparison(ActionCode::AssertEquals, &s(&["#total", "42.00"]));
        let v = serde_json::to_value(&step).unwrap();
        assert_eq!(v["action"], "ASSERT_EQUALS");
        assert_eq!(v["value"], "42.00");
    }

    #[test]
    fn numeric_comparison_validates_number() {
        assert!(numeric_comparison(ActionCode::AssertGt, &s(&["#n", "abc"])).is_err());
        let step = numeric_comparison(ActionCode::AssertLte, &s(&["#n", " -3 "])).unwrap();
        let v = serde_json::to_value(&step).unwrap();
        assert_eq!(v["action"], "ASSERT_LTE");
        assert_eq!(v["value"], "-3");
    }

    #[test]
    fn matches_validates_regex_at_apply_time() {
        assert!(matches(&s(&["#code", "(unclosed"])).is_err());
        let step = matches(&s(&["#code", r"^\d+$"])).unwrap();
        let v = serde_json::to_value(&step).unwrap();
        assert_eq!(v["action"], "ASSERT_MATCHES");
        assert_eq!(v["value"], r"^\d+$");
    }

    #[test]
    fn variable_encodes_pair_in_value() {
        let step = variable(&s(&["username", "admin"])).unwrap();
        let v = serde_json::to_value(&step).unwrap();
        assert_eq!(v["action"], "ASSERT_VARIABLE");
        assert_eq!(v["value"], r#"{"username":"admin"}"#);
        assert!(v.get("target").is_none());
    }

    #[test]
    fn variable_rejects_empty_name() {
        assert!(variable(&s(&["", "x"])).is_err());
    }
}
