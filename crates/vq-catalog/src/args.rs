// SPDX-License-Identifier: MIT OR Apache-2.0
//! Positional-argument validation shared by the payload builders.

use crate::kinds::StepSpec;
use vq_core::KeyModifier;
use vq_error::PlatformError;

/// Check the positional argument count against the declared arity.
pub(crate) fn check_arity(spec: &StepSpec, args: &[String]) -> Result<(), PlatformError> {
    let min = spec.min_arity();
    let max = spec.max_arity();
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            format!("{min}")
        } else {
            format!("{min}..{max}")
        };
        return Err(PlatformError::validation(format!(
            "{} expects {expected} argument(s), got {}",
            spec.name,
            args.len()
        ))
        .with_hint(usage(spec)));
    }
    Ok(())
}

/// Human usage line for a primitive, e.g. `write <text> [selector]`.
pub(crate) fn usage(spec: &StepSpec) -> String {
    let mut out = String::from(spec.name);
    for a in spec.required {
        out.push_str(&format!(" <{}>", a.name));
    }
    for a in spec.optional {
        out.push_str(&format!(" [{}]", a.name));
    }
    out
}

pub(crate) fn parse_u32(name: &str, raw: &str) -> Result<u32, PlatformError> {
    raw.trim().parse::<u32>().map_err(|_| {
        PlatformError::validation(format!("{name} must be a non-negative integer, got '{raw}'"))
    })
}

pub(crate) fn parse_i32(name: &str, raw: &str) -> Result<i32, PlatformError> {
    raw.trim().parse::<i32>().map_err(|_| {
        PlatformError::validation(format!("{name} must be an integer, got '{raw}'"))
    })
}

pub(crate) fn parse_i64(name: &str, raw: &str) -> Result<i64, PlatformError> {
    raw.trim().parse::<i64>().map_err(|_| {
        PlatformError::validation(format!("{name} must be an integer, got '{raw}'"))
    })
}

/// Durations are accepted as integer milliseconds or the human form
/// `"<n>s"` (whole seconds), which is converted to milliseconds.
pub(crate) fn parse_duration_ms(name: &str, raw: &str) -> Result<u64, PlatformError> {
    let trimmed = raw.trim();
    if let Some(secs) = trimmed.strip_suffix(['s', 'S']) {
        let n: u64 = secs.trim().parse().map_err(|_| {
            PlatformError::validation(format!(
                "{name} must be milliseconds or '<n>s', got '{raw}'"
            ))
        })?;
        return Ok(n * 1000);
    }
    trimmed.parse::<u64>().map_err(|_| {
        PlatformError::validation(format!("{name} must be milliseconds or '<n>s', got '{raw}'"))
    })
}

/// URLs for navigation and uploads must be absolute.
pub(crate) fn parse_absolute_url(name: &str, raw: &str) -> Result<String, PlatformError> {
    let trimmed = raw.trim();
    match url::Url::parse(trimmed) {
        Ok(u) if !u.scheme().is_empty() && u.has_host() => Ok(trimmed.to_string()),
        Ok(_) => Err(PlatformError::validation(format!(
            "{name} must be an absolute URL with a host, got '{raw}'"
        ))),
        Err(_) => Err(PlatformError::validation(format!(
            "{name} must be an absolute URL, got '{raw}'"
        ))),
    }
}

/// Regex patterns are validated at apply time, before any platform call.
pub(crate) fn parse_regex(name: &str, raw: &str) -> Result<String, PlatformError> {
    regex::Regex::new(raw).map_err(|e| {
        PlatformError::validation(format!("{name} is not a valid regular expression: {e}"))
    })?;
    Ok(raw.to_string())
}

pub(crate) fn parse_modifier(raw: &str) -> Result<KeyModifier, PlatformError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "ctrl" | "control" => Ok(KeyModifier::Ctrl),
        "alt" | "option" => Ok(KeyModifier::Alt),
        "shift" => Ok(KeyModifier::Shift),
        "meta" | "cmd" | "command" => Ok(KeyModifier::Meta),
        other => Err(PlatformError::validation(format!(
            "unknown key modifier '{other}' (expected ctrl, alt, shift or meta)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::StepKind;

    #[test]
    fn arity_errors_carry_usage_hint() {
        let spec = StepKind::Write.spec();
        let err = check_arity(&spec, &[]).unwrap_err();
        assert_eq!(err.kind, vq_error::ErrorKind::Validation);
        assert_eq!(err.hint.as_deref(), Some("write <text> [selector]"));
    }

    #[test]
    fn arity_accepts_optional_range() {
        let spec = StepKind::WaitElement.spec();
        assert!(check_arity(&spec, &["#x".into()]).is_ok());
        assert!(check_arity(&spec, &["#x".into(), "5000".into()]).is_ok());
        assert!(check_arity(&spec, &["#x".into(), "5000".into(), "extra".into()]).is_err());
    }

    #[test]
    fn duration_accepts_ms_and_seconds() {
        assert_eq!(parse_duration_ms("duration", "1500").unwrap(), 1500);
        assert_eq!(parse_duration_ms("duration", "2s").unwrap(), 2000);
        assert_eq!(parse_duration_ms("duration", " 10S ").unwrap(), 10_000);
        assert!(parse_duration_ms("duration", "2.5s").is_err());
        assert!(parse_duration_ms("duration", "soon").is_err());
    }

    #[test]
    fn urls_must_be_absolute() {
        assert!(parse_absolute_url("url", "https://example.com/login").is_ok());
        assert!(parse_absolute_url("url", "/login").is_err());
        assert!(parse_absolute_url("url", "example.com").is_err());
    }

    #[test]
    fn regex_is_validated() {
        assert!(parse_regex("pattern", r"^\d{4}$").is_ok());
        assert!(parse_regex("pattern", "(unclosed").is_err());
    }

    #[test]
    fn negative_coordinates_parse() {
        assert_eq!(parse_i32("dx", "-10").unwrap(), -10);
        assert_eq!(parse_i64("y", "-250").unwrap(), -250);
    }

    #[test]
    fn modifiers_parse_case_insensitively() {
        assert_eq!(parse_modifier("CTRL").unwrap(), KeyModifier::Ctrl);
        assert_eq!(parse_modifier("cmd").unwrap(), KeyModifier::Meta);
        assert!(parse_modifier("hyper").is_err());
    }
}
