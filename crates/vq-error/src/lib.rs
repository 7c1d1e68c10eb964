// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # vq-error
//!
//! Unified error taxonomy for the Virtuoso CLI.
//!
//! Every failure the engine surfaces carries an [`ErrorKind`] (a small,
//! stable classification), the originating operation name, an optional
//! remote status and body, and a `retryable` flag the retry layer keys
//! off. Classification from remote responses follows a fixed rule order;
//! see [`classify_status`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ── Kind ────────────────────────────────────────────────────────────────

/// The error taxonomy. Small on purpose: every transport failure and
/// remote response code maps into exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Locally detected schema or argument violation.
    Validation,
    /// Remote 401/403 — token or organization problem.
    Auth,
    /// Remote 404.
    NotFound,
    /// Remote 409 or duplicate-name response.
    Conflict,
    /// Remote 429.
    RateLimit,
    /// No response, connection reset, or timeout.
    Transport,
    /// Remote 5xx.
    Remote5xx,
    /// Remote 4xx not covered by a more specific kind.
    Remote4xx,
    /// The operation was cancelled by the user or a deadline.
    Cancelled,
    /// Invariant violation inside the engine. Always a bug.
    Internal,
}

impl ErrorKind {
    /// Stable wire string (e.g. `"not_found"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Auth => "auth",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::RateLimit => "rate_limit",
            Self::Transport => "transport",
            Self::Remote5xx => "remote_5xx",
            Self::Remote4xx => "remote_4xx",
            Self::Cancelled => "cancelled",
            Self::Internal => "internal",
        }
    }

    /// Whether the retry layer may re-issue an operation that failed with
    /// this kind (the operation descriptor must also allow it).
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Transport | Self::Remote5xx | Self::RateLimit)
    }

    /// Process exit code for this kind.
    ///
    /// 0 success, 2 validation, 3 auth, 4 not-found, 5 conflict,
    /// 6 transport/remote, 130 cancelled. Internal errors exit 1.
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Validation => 2,
            Self::Auth => 3,
            Self::NotFound => 4,
            Self::Conflict => 5,
            Self::RateLimit | Self::Transport | Self::Remote5xx | Self::Remote4xx => 6,
            Self::Cancelled => 130,
            Self::Internal => 1,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Error ───────────────────────────────────────────────────────────────

/// A classified failure.
///
/// # Builder usage
///
/// ```
/// use vq_error::{ErrorKind, PlatformError};
///
/// let err = PlatformError::new(ErrorKind::Auth, "401 Unauthorized")
///     .with_operation("CreateGoal")
///     .with_status(401)
///     .with_hint("check VIRTUOSO_API_TOKEN and VIRTUOSO_ORGANIZATION_ID");
/// assert_eq!(err.exit_code(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformError {
    /// Classification.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Operation name this failure originated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Remote HTTP status, when a response was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_status: Option<u16>,
    /// Remote response body, when captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_body: Option<String>,
    /// Remediation hint shown to the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the retry layer may re-issue the operation.
    pub retryable: bool,
    /// Server-advised retry delay in milliseconds (rate limiting).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
    /// Attempts made before this error surfaced (set by the retry layer).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
}

impl PlatformError {
    /// New error of the given kind; `retryable` defaults from the kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            operation: None,
            remote_status: None,
            remote_body: None,
            hint: None,
            retryable: kind.is_retryable(),
            retry_after_ms: None,
            attempts: None,
        }
    }

    /// Shorthand for a local validation failure.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Shorthand for an internal invariant violation.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
            .with_hint("this is a bug in the CLI — please report it with --verbose output")
    }

    /// Shorthand for a cancellation.
    #[must_use]
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    /// Classify a remote HTTP response into an error.
    ///
    /// `retry_after` is the parsed `Retry-After` header, if the response
    /// carried one.
    #[must_use]
    pub fn from_response(
        operation: &str,
        status: u16,
        body: &str,
        retry_after: Option<Duration>,
    ) -> Self {
        let kind = classify_status(status, body);
        let message = if body.trim().is_empty() {
            format!("{operation} failed with status {status}")
        } else {
            format!(
                "{operation} failed with status {status}: {}",
                truncate(body.trim(), 200)
            )
        };
        let mut err = Self::new(kind, message)
            .with_operation(operation)
            .with_status(status);
        if !body.trim().is_empty() {
            err.remote_body = Some(body.to_string());
        }
        if kind == ErrorKind::RateLimit {
            err.retry_after_ms = Some(advised_delay(retry_after).as_millis() as u64);
        }
        if kind == ErrorKind::Auth {
            err = err.with_hint(
                "check VIRTUOSO_API_TOKEN and VIRTUOSO_ORGANIZATION_ID, or run `api-cli validate-config`",
            );
        }
        err
    }

    /// Record the originating operation.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Record the remote status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.remote_status = Some(status);
        self
    }

    /// Attach a remediation hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Record how many attempts were made before surfacing.
    #[must_use]
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind.as_str())?;
        if let Some(op) = &self.operation {
            write!(f, " {op}:")?;
        }
        write!(f, " {}", self.message)?;
        if let Some(attempts) = self.attempts {
            write!(f, " (after {attempts} attempts)")?;
        }
        Ok(())
    }
}

impl std::error::Error for PlatformError {}

// ── Classification ──────────────────────────────────────────────────────

/// Classify a remote HTTP status (plus body) into an [`ErrorKind`].
///
/// Rules are applied in order: 401/403 → Auth; 404 → NotFound; 409 or a
/// duplicate-name body → Conflict; 429 → RateLimit; 5xx → Remote5xx;
/// remaining 4xx → Remote4xx. Anything else (including 3xx the transport
/// did not follow) is Internal — the transport should not hand those up.
#[must_use]
pub fn classify_status(status: u16, body: &str) -> ErrorKind {
    match status {
        401 | 403 => ErrorKind::Auth,
        404 => ErrorKind::NotFound,
        409 => ErrorKind::Conflict,
        429 => ErrorKind::RateLimit,
        s if (500..600).contains(&s) => ErrorKind::Remote5xx,
        s if (400..500).contains(&s) => {
            if looks_like_duplicate(body) {
                ErrorKind::Conflict
            } else {
                ErrorKind::Remote4xx
            }
        }
        _ => ErrorKind::Internal,
    }
}

/// Clamp a server-advised retry delay to `[1 s, 30 s]`; default 1 s when
/// the server gave none.
#[must_use]
pub fn advised_delay(retry_after: Option<Duration>) -> Duration {
    const MIN: Duration = Duration::from_secs(1);
    const MAX: Duration = Duration::from_secs(30);
    retry_after.unwrap_or(MIN).clamp(MIN, MAX)
}

fn looks_like_duplicate(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    lower.contains("already exists") || lower.contains("duplicate")
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let cut = s
            .char_indices()
            .take_while(|(i, _)| *i < max)
            .last()
            .map_or(0, |(i, c)| i + c.len_utf8());
        format!("{}…", &s[..cut])
    }
}

// ── Error body (rendered form) ──────────────────────────────────────────

/// The `{error: {…}}` envelope emitted by the JSON/YAML renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error itself.
    pub error: ErrorBody,
}

/// Rendered error fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Classification.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Originating operation, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Remote status, when a response was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_status: Option<u16>,
}

impl From<&PlatformError> for ErrorEnvelope {
    fn from(err: &PlatformError) -> Self {
        Self {
            error: ErrorBody {
                kind: err.kind,
                message: err.message.clone(),
                operation: err.operation.clone(),
                remote_status: err.remote_status,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// All kinds, for exhaustive iteration.
    const ALL_KINDS: &[ErrorKind] = &[
        ErrorKind::Validation,
        ErrorKind::Auth,
        ErrorKind::NotFound,
        ErrorKind::Conflict,
        ErrorKind::RateLimit,
        ErrorKind::Transport,
        ErrorKind::Remote5xx,
        ErrorKind::Remote4xx,
        ErrorKind::Cancelled,
        ErrorKind::Internal,
    ];

    // ── Classification rules ────────────────────────────────────────

    #[test]
    fn auth_statuses() {
        assert_eq!(classify_status(401, ""), ErrorKind::Auth);
        assert_eq!(classify_status(403, ""), ErrorKind::Auth);
    }

    #[test]
    fn not_found_status() {
        assert_eq!(classify_status(404, ""), ErrorKind::NotFound);
    }

    #[test]
    fn conflict_status_and_duplicate_body() {
        assert_eq!(classify_status(409, ""), ErrorKind::Conflict);
        assert_eq!(
            classify_status(400, r#"{"error":"goal with this name already exists"}"#),
            ErrorKind::Conflict
        );
        assert_eq!(
            classify_status(422, "Duplicate entry"),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn rate_limit_status() {
        assert_eq!(classify_status(429, ""), ErrorKind::RateLimit);
    }

    #[test]
    fn server_errors_are_5xx() {
        assert_eq!(classify_status(500, ""), ErrorKind::Remote5xx);
        assert_eq!(classify_status(503, ""), ErrorKind::Remote5xx);
        assert_eq!(classify_status(599, ""), ErrorKind::Remote5xx);
    }

    #[test]
    fn other_client_errors_are_4xx() {
        assert_eq!(classify_status(400, "bad request"), ErrorKind::Remote4xx);
        assert_eq!(classify_status(418, ""), ErrorKind::Remote4xx);
    }

    #[test]
    fn unexpected_status_is_internal() {
        assert_eq!(classify_status(302, ""), ErrorKind::Internal);
    }

    // ── Retryability ────────────────────────────────────────────────

    #[test]
    fn retryable_kinds() {
        assert!(ErrorKind::Transport.is_retryable());
        assert!(ErrorKind::Remote5xx.is_retryable());
        assert!(ErrorKind::RateLimit.is_retryable());
    }

    #[test]
    fn non_retryable_kinds() {
        for kind in [
            ErrorKind::Validation,
            ErrorKind::Auth,
            ErrorKind::NotFound,
            ErrorKind::Conflict,
            ErrorKind::Remote4xx,
            ErrorKind::Cancelled,
            ErrorKind::Internal,
        ] {
            assert!(!kind.is_retryable(), "{kind} must not be retryable");
        }
    }

    // ── Exit codes ──────────────────────────────────────────────────

    #[test]
    fn exit_code_mapping() {
        assert_eq!(ErrorKind::Validation.exit_code(), 2);
        assert_eq!(ErrorKind::Auth.exit_code(), 3);
        assert_eq!(ErrorKind::NotFound.exit_code(), 4);
        assert_eq!(ErrorKind::Conflict.exit_code(), 5);
        assert_eq!(ErrorKind::Transport.exit_code(), 6);
        assert_eq!(ErrorKind::Remote5xx.exit_code(), 6);
        assert_eq!(ErrorKind::Remote4xx.exit_code(), 6);
        assert_eq!(ErrorKind::RateLimit.exit_code(), 6);
        assert_eq!(ErrorKind::Cancelled.exit_code(), 130);
        assert_eq!(ErrorKind::Internal.exit_code(), 1);
    }

    // ── Advised delay ───────────────────────────────────────────────

    #[test]
    fn advised_delay_clamps_to_bounds() {
        assert_eq!(advised_delay(None), Duration::from_secs(1));
        assert_eq!(
            advised_delay(Some(Duration::from_millis(10))),
            Duration::from_secs(1)
        );
        assert_eq!(
            advised_delay(Some(Duration::from_secs(120))),
            Duration::from_secs(30)
        );
        assert_eq!(
            advised_delay(Some(Duration::from_secs(7))),
            Duration::from_secs(7)
        );
    }

    // ── from_response ───────────────────────────────────────────────

    #[test]
    fn from_response_auth_carries_hint() {
        let err = PlatformError::from_response("CreateGoal", 401, "", None);
        assert_eq!(err.kind, ErrorKind::Auth);
        assert!(!err.retryable);
        assert!(err.hint.as_deref().unwrap().contains("VIRTUOSO_API_TOKEN"));
        assert_eq!(err.operation.as_deref(), Some("CreateGoal"));
        assert_eq!(err.remote_status, Some(401));
    }

    #[test]
    fn from_response_rate_limit_records_delay() {
        let err =
            PlatformError::from_response("AddStep", 429, "", Some(Duration::from_secs(5)));
        assert_eq!(err.kind, ErrorKind::RateLimit);
        assert!(err.retryable);
        assert_eq!(err.retry_after_ms, Some(5000));
    }

    #[test]
    fn from_response_truncates_long_bodies_in_message() {
        let body = "x".repeat(500);
        let err = PlatformError::from_response("ListProjects", 500, &body, None);
        assert!(err.message.len() < 300);
        // The full body is still preserved.
        assert_eq!(err.remote_body.as_deref(), Some(body.as_str()));
    }

    // ── Display & serde ─────────────────────────────────────────────

    #[test]
    fn display_format() {
        let err = PlatformError::new(ErrorKind::NotFound, "no such goal")
            .with_operation("GetGoal")
            .with_attempts(1);
        assert_eq!(
            err.to_string(),
            "[not_found] GetGoal: no such goal (after 1 attempts)"
        );
    }

    #[test]
    fn kinds_have_unique_wire_strings() {
        let mut seen = std::collections::HashSet::new();
        for kind in ALL_KINDS {
            assert!(seen.insert(kind.as_str()));
        }
        assert_eq!(seen.len(), ALL_KINDS.len());
    }

    #[test]
    fn kind_serde_matches_as_str() {
        for kind in ALL_KINDS {
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn error_envelope_shape() {
        let err = PlatformError::from_response("CreateProject", 409, "duplicate", None);
        let env = ErrorEnvelope::from(&err);
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["error"]["kind"], "conflict");
        assert_eq!(v["error"]["operation"], "CreateProject");
        assert_eq!(v["error"]["remote_status"], 409);
    }

    #[test]
    fn error_roundtrips_through_json() {
        let err = PlatformError::from_response("AddStep", 503, "unavailable", None);
        let json = serde_json::to_string(&err).unwrap();
        let back: PlatformError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }
}
