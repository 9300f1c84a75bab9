//! Retry with exponential back-off and jitter for the gateway client.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 429, 5xx). Everything else is
//! returned on the first failure.

use std::future::Future;
use std::time::Duration;

use crate::error::ProviderError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection refused or reset.
/// - HTTP 429 and 5xx responses.
///
/// **Not retriable:** other 4xx statuses, malformed bodies, an empty route
/// list, and configuration errors.
pub(crate) fn is_retriable(err: &ProviderError) -> bool {
    match err {
        ProviderError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ProviderError::RateLimited { .. } => true,
        ProviderError::UnexpectedStatus { status, .. } => *status >= 500,
        ProviderError::Deserialize { .. }
        | ProviderError::NoRoute
        | ProviderError::InvalidBaseUrl { .. } => false,
    }
}

/// Delay before retry number `attempt` (1-based), before jitter.
///
/// A `Retry-After` hint from a 429 raises the delay but never past the cap.
pub(crate) fn base_delay_ms(attempt: u32, backoff_base_ms: u64, err: &ProviderError) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let hinted = match err {
        ProviderError::RateLimited {
            retry_after_secs: Some(secs),
            ..
        } => computed.max(secs.saturating_mul(1000)),
        _ => computed,
    };
    hinted.min(MAX_DELAY_MS)
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 500`:
///
/// | Attempt | Sleep before next attempt   |
/// |---------|-----------------------------|
/// | 1       | 500 ms × 2⁰ ± 25 % jitter   |
/// | 2       | 500 ms × 2¹ ± 25 % jitter   |
/// | 3       | 500 ms × 2² ± 25 % jitter   |
///
/// Delay is capped at 30 s. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let capped = base_delay_ms(attempt, backoff_base_ms, &err);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "gateway transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
