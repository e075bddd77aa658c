//! Retry with exponential back-off and jitter for the Graph API client.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 5xx, rate limiting). Hard failures such
//! as [`GraphError::InvalidToken`] are returned immediately: retrying a
//! rejected token only burns time and quota.

use std::future::Future;
use std::time::Duration;

use crate::error::GraphError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection reset.
/// - HTTP 5xx responses: transient server/infrastructure errors.
/// - [`GraphError::RateLimited`]: the rate window clears after a pause.
///
/// **Not retriable (hard stop):**
/// - [`GraphError::InvalidToken`] / [`GraphError::NotFound`] /
///   [`GraphError::Api`]: application-level rejections; retrying won't fix them.
/// - [`GraphError::Deserialize`]: malformed response; retrying won't fix it.
pub(crate) fn is_retriable(err: &GraphError) -> bool {
    match err {
        GraphError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        GraphError::RateLimited { .. } => true,
        GraphError::UnexpectedStatus { status, .. } => *status >= 500,
        GraphError::InvalidToken(_)
        | GraphError::NotFound(_)
        | GraphError::Api { .. }
        | GraphError::Deserialize { .. }
        | GraphError::PaginationLimit { .. }
        | GraphError::InvalidUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 1_000`:
///
/// | Attempt | Sleep before next attempt        |
/// |---------|----------------------------------|
/// | 1       | 1 000 ms × 2⁰ ± 25 % jitter     |
/// | 2       | 1 000 ms × 2¹ ± 25 % jitter     |
/// | 3       | 1 000 ms × 2² ± 25 % jitter     |
///
/// Delay is capped at 60 s. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, GraphError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GraphError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
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
                    "transient Graph API error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
