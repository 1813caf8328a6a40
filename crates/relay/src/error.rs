use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    UpstreamStatus(StatusCode),
}

impl RelayError {
    /// Connect/response timeouts are worth retrying. Everything else
    /// (DNS failures, refused connections, non-2xx statuses) fails fast.
    pub fn is_retryable(&self) -> bool {
        match self {
            RelayError::Http(error) => {
                error.is_timeout() || error.to_string().to_lowercase().contains("timeout")
            }
            RelayError::UpstreamStatus(_) => false,
        }
    }
}
