use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::core::errors::ApiError;

pub const MAX_RETRIES: usize = 3;

/// Retry `op` for rate-limit-class failures only: up to `max_retries`
/// attempts with exponential backoff (1s base, doubling) plus 0-500ms of
/// jitter. Any other error propagates immediately.
pub async fn retry_rate_limited<T, F, Fut>(max_retries: usize, mut op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0usize;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if !err.is_rate_limit() || attempt >= max_retries {
                    return Err(err);
                }
                let base_ms = 1000u64 << (attempt - 1);
                let jitter_ms = rand::rng().random_range(0..500u64);
                let delay = Duration::from_millis(base_ms + jitter_ms);
                tracing::warn!(
                    "rate limit hit, retrying in {:?} (attempt {}/{})",
                    delay,
                    attempt,
                    max_retries
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn non_rate_limit_errors_are_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), ApiError> = retry_rate_limited(3, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ApiError::unavailable("ollama", "connection refused")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rate_limit_errors_retry_up_to_the_ceiling() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), ApiError> = retry_rate_limited(3, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ApiError::rate_limited("gemini")) }
        })
        .await;

        assert!(matches!(result, Err(ApiError::RateLimited { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn success_after_one_rate_limit_is_returned() {
        let calls = AtomicUsize::new(0);
        let result = retry_rate_limited(3, || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(ApiError::rate_limited("gemini"))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
