use async_trait::async_trait;
use tracing::warn;

use crate::error::ProviderError;
use crate::media::{MusicItem, PlayInfo};

/// One upstream music source.
///
/// Implementations are stateless beyond configuration constants, so a single
/// instance serves unsynchronized concurrent requests for the process
/// lifetime. Result ordering follows the upstream; no deduplication happens
/// at this layer.
#[async_trait]
pub trait MusicProvider: Send + Sync {
    /// Registry name of this provider.
    fn name(&self) -> &'static str;

    /// Search the upstream, propagating any transport or parse failure.
    async fn try_search(&self, query: &str) -> Result<Vec<MusicItem>, ProviderError>;

    /// Resolve an opaque id (plus the optional `extra` payload captured at
    /// search time) into a direct media URL.
    ///
    /// Never yields a placeholder URL: when nothing playable can be derived
    /// this fails, because the download path depends on `url` being real.
    async fn get_play_info(
        &self,
        id: &str,
        extra: Option<&serde_json::Value>,
    ) -> Result<PlayInfo, ProviderError>;

    /// Search with empty-list degradation: one broken upstream must not take
    /// the whole search surface down.
    async fn search(&self, query: &str) -> Vec<MusicItem> {
        match self.try_search(query).await {
            Ok(items) => items,
            Err(error) => {
                warn!(provider = self.name(), %error, "search failed, returning no results");
                Vec::new()
            }
        }
    }
}
