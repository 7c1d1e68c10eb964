// SPDX-License-Identifier: MIT OR Apache-2.0
//! Retry policy: exponential backoff with jitter.
//!
//! Delays double from the base (250 ms → 500 ms → 1 s → 2 s → 4 s) with
//! ±20 % jitter, capped at five attempts total. Rate-limited responses
//! override the computed delay with the server-advised one (already
//! clamped to `[1 s, 30 s]` by the classifier). Whether an operation may
//! be retried at all is decided by its descriptor, never here.

use std::future::Future;
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};
use vq_error::PlatformError;

/// Backoff configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Base delay before the first retry.
    pub base_delay: Duration,
    /// Jitter factor in `[0.0, 1.0]`; applied as ± this fraction.
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(250),
            jitter_factor: 0.2,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries (single attempt).
    #[must_use]
    pub fn no_retries() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Backoff delay before retry number `retry` (zero-indexed), with
    /// jitter applied.
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let nominal_ms =
            (self.base_delay.as_millis() as u64).saturating_mul(2u64.saturating_pow(retry));
        jittered(nominal_ms, self.jitter_factor, retry)
    }
}

/// Apply ±`factor` jitter to `nominal_ms`.
///
/// Pseudo-randomness comes from the system clock's sub-second nanos mixed
/// with the retry index; good enough to de-synchronise concurrent
/// invocations without pulling in an RNG.
fn jittered(nominal_ms: u64, factor: f64, salt: u32) -> Duration {
    let factor = factor.clamp(0.0, 1.0);
    if factor == 0.0 || nominal_ms == 0 {
        return Duration::from_millis(nominal_ms);
    }
    let span = (nominal_ms as f64 * factor * 2.0) as u64;
    if span == 0 {
        return Duration::from_millis(nominal_ms);
    }
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos() as u64;
    let offset = nanos.wrapping_mul(salt as u64 + 1) % span;
    let low = nominal_ms - (span / 2);
    Duration::from_millis(low + offset)
}

/// Run `op` up to `policy.max_attempts` times.
///
/// `eligible` is the descriptor's verdict for this call; when false the
/// first error surfaces immediately. Errors that are not retryable by
/// kind (validation, auth, …) also surface immediately. The surfaced
/// error carries the attempt count.
pub async fn retry_async<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    eligible: bool,
    mut op: F,
) -> Result<T, PlatformError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlatformError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(target: "vq.retry", operation, attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                let exhausted = attempt >= max_attempts;
                if !eligible || !err.retryable || exhausted {
                    if exhausted && err.retryable && eligible {
                        warn!(target: "vq.retry", operation, attempt, "retries exhausted");
                    }
                    return Err(err.with_attempts(attempt));
                }

                // Server-advised delay (rate limiting) wins over backoff.
                let delay = match err.retry_after_ms {
                    Some(ms) => Duration::from_millis(ms),
                    None => policy.delay_for(attempt - 1),
                };
                warn!(
                    target: "vq.retry",
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "retryable failure, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use vq_error::ErrorKind;

    fn transport_err() -> PlatformError {
        PlatformError::new(ErrorKind::Transport, "connection reset")
    }

    #[test]
    fn delays_double_from_base() {
        let policy = RetryPolicy {
            jitter_factor: 0.0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(250));
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(4), Duration::from_millis(4000));
    }

    #[test]
    fn jitter_stays_within_twenty_percent() {
        let policy = RetryPolicy::default();
        for retry in 0..5 {
            let nominal = 250u64 * 2u64.pow(retry);
            let d = policy.delay_for(retry).as_millis() as u64;
            let low = nominal - nominal / 5;
            let high = nominal + nominal / 5;
            assert!(
                (low..=high).contains(&d),
                "retry {retry}: {d}ms outside [{low}, {high}]"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = retry_async(&RetryPolicy::default(), "AddStep", true, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(PlatformError::from_response("AddStep", 503, "", None))
                } else {
                    Ok(42u32)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_async(&RetryPolicy::default(), "GetGoal", true, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(transport_err()) }
        })
        .await;
        let err = result.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(err.attempts, Some(5));
    }

    #[tokio::test]
    async fn non_retryable_error_surfaces_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> =
            retry_async(&RetryPolicy::default(), "CreateGoal", true, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(PlatformError::from_response("CreateGoal", 409, "dup", None)) }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.unwrap_err().kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn ineligible_operation_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_async(&RetryPolicy::default(), "AddStep", false, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(transport_err()) }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_uses_server_delay() {
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();
        let result = retry_async(&RetryPolicy::default(), "AddStep", true, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(PlatformError::from_response(
                        "AddStep",
                        429,
                        "",
                        Some(Duration::from_secs(5)),
                    ))
                } else {
                    Ok(())
                }
            }
        })
        .await;
        assert!(result.is_ok());
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
