use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt, TryStreamExt};
use reqwest::Client;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};

use crate::client::create_client;
use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::retry::retry_with_backoff;

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, RelayError>> + Send>>;

/// An open upstream response ready to be forwarded.
///
/// The headers the relay forwards are captured before the body starts
/// flowing; the body itself is a forward-only stream.
pub struct RelayedStream {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    stream: ByteStream,
}

impl RelayedStream {
    pub fn into_stream(self) -> ByteStream {
        self.stream
    }
}

impl std::fmt::Debug for RelayedStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayedStream")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Fetches media URLs with retry and hands back streaming responses.
pub struct StreamRelay {
    client: Client,
    config: RelayConfig,
}

impl StreamRelay {
    pub fn new(config: RelayConfig) -> Result<Self, RelayError> {
        let client = create_client(&config)?;
        Ok(Self { client, config })
    }

    /// GET `url` and return its body as a stream.
    ///
    /// Timeouts are retried up to the configured budget with linear backoff.
    /// A non-2xx status fails immediately; serving a decoy error page as
    /// audio would be worse than failing.
    pub async fn open(&self, url: &str) -> Result<RelayedStream, RelayError> {
        retry_with_backoff(
            self.config.retry_limit,
            self.config.retry_delay_base,
            RelayError::is_retryable,
            || self.attempt(url),
        )
        .await
    }

    async fn attempt(&self, url: &str) -> Result<RelayedStream, RelayError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::UpstreamStatus(status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let content_length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok());
        let stream = response.bytes_stream().map_err(RelayError::from).boxed();

        Ok(RelayedStream {
            content_type,
            content_length,
            stream,
        })
    }
}
