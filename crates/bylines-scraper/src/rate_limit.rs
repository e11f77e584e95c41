//! Backoff retry for rate-limited page fetches.
//!
//! Only HTTP 429 is retried. Network failures, other non-2xx statuses, and
//! unparsable bodies are returned to the caller on the first occurrence.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Returns `true` if `err` should be retried after a backoff delay.
///
/// Only [`ScraperError::RateLimited`] qualifies. Connection failures and
/// timeouts ([`ScraperError::Http`]) are terminal for a single fetch.
fn is_retriable(err: &ScraperError) -> bool {
    matches!(err, ScraperError::RateLimited { .. })
}

/// Delay before retry number `attempt` (0-based): `base_ms * 2^attempt`.
#[must_use]
pub fn backoff_delay(backoff_base_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(backoff_base_ms.saturating_mul(1u64 << attempt.min(62)))
}

/// Executes `operation`, retrying on [`ScraperError::RateLimited`].
///
/// Up to `max_retries` additional attempts are made after the first try.
/// Before retry `n` (0-based) the task sleeps for [`backoff_delay`]`(base, n)`.
///
/// | Attempt | Sleep before it (`backoff_base_ms = 100`) |
/// |---------|-------------------------------------------|
/// | initial | none                                      |
/// | retry 1 | 100 ms                                    |
/// | retry 2 | 200 ms                                    |
/// | retry 3 | 400 ms                                    |
///
/// When the ceiling is reached the last `RateLimited` error is returned with
/// `attempts` set to the total number of requests issued.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_retriable(&err) {
            return Err(err);
        }
        if attempt >= max_retries {
            let mut err = err;
            if let ScraperError::RateLimited { attempts, .. } = &mut err {
                *attempts = attempt + 1;
            }
            return Err(err);
        }

        let delay = backoff_delay(backoff_base_ms, attempt);
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "rate limited, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
