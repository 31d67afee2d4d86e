//! Bounded retry with exponential backoff
//!
//! Generic combinator for recoverable failures like "another synchronizer
//! with the same alias is still shutting down". Not special-cased per
//! chain: the caller supplies the retryable predicate.

use std::future::Future;
use std::time::Duration;

/// Maximum backoff between attempts
pub const MAX_BACKOFF_MS: u64 = 5_000;

/// Run `op` up to `max_attempts` times, sleeping with exponential backoff
/// and jitter between attempts. Only errors for which `retryable` returns
/// true are retried; the final error is returned unchanged.
pub async fn with_backoff<T, E, F, Fut, P>(
    max_attempts: u32,
    base_delay: Duration,
    mut op: F,
    retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0u32;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if retryable(&e) && attempt + 1 < max_attempts => {
                attempt += 1;
                let backoff = calculate_backoff(attempt, base_delay);
                tracing::debug!(
                    attempt,
                    max_attempts,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %e,
                    "Retrying after recoverable failure"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Exponential backoff with jitter.
fn calculate_backoff(attempt: u32, base_delay: Duration) -> Duration {
    let base = base_delay.as_millis() as u64 * (1 << attempt.min(6));
    let jitter = rand::random::<u64>() % (base / 4 + 1);
    Duration::from_millis((base + jitter).min(MAX_BACKOFF_MS))
}
