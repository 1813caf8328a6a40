use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected page shape: {0}")]
    Scrape(String),
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("failed to resolve a playable url: {0}")]
    ResolutionFailed(String),
}
