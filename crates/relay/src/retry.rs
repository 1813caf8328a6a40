use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Run `attempt` until it succeeds, the error stops being retryable, or the
/// budget of `retry_limit` retries is spent. Total attempts are
/// `retry_limit + 1`. Backoff is linear: the n-th retry waits `base_delay * n`.
pub async fn retry_with_backoff<T, E, F, Fut>(
    retry_limit: usize,
    base_delay: Duration,
    is_retryable: impl Fn(&E) -> bool,
    mut attempt: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempts = 0usize;
    loop {
        attempts += 1;
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempts > retry_limit || !is_retryable(&error) {
                    return Err(error);
                }
                let delay = base_delay * attempts as u32;
                debug!("attempt {attempts} failed ({error}), retrying in {delay:?}");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn always_retryable(_: &String) -> bool {
        true
    }

    #[tokio::test(start_paused = true)]
    async fn returns_first_success() {
        let calls = AtomicUsize::new(0);
        let result = retry_with_backoff(2, Duration::from_millis(600), always_retryable, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, String>(42) }
        })
        .await;
        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_budget_is_spent() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), String> =
            retry_with_backoff(2, Duration::from_millis(600), always_retryable, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("timeout".to_string()) }
            })
            .await;
        assert_eq!(result, Err("timeout".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_failures() {
        let calls = AtomicUsize::new(0);
        let result = retry_with_backoff(2, Duration::from_millis(600), always_retryable, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err("timeout".to_string())
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_immediately_on_permanent_errors() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), String> =
            retry_with_backoff(2, Duration::from_millis(600), |_: &String| false, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("404".to_string()) }
            })
            .await;
        assert_eq!(result, Err("404".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
