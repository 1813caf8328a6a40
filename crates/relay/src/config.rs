use std::time::Duration;

pub(crate) const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Tuning for upstream media fetches.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Bound on connection setup and on each stall between chunks. A
    /// transfer that keeps making progress is never interrupted, however
    /// long it runs.
    pub timeout: Duration,

    /// Redirect hops followed before giving up.
    pub max_redirects: usize,

    /// Retries after the first attempt; total attempts are `retry_limit + 1`.
    pub retry_limit: usize,

    /// Base delay for linear backoff: the n-th retry waits `base * n`.
    pub retry_delay_base: Duration,

    /// User agent presented to media hosts.
    pub user_agent: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_redirects: 5,
            retry_limit: 2,
            retry_delay_base: Duration::from_millis(600),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}
