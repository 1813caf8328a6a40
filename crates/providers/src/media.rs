use serde::{Deserialize, Serialize};

/// Placeholder title for items whose scraped title came back empty.
pub const UNKNOWN_TITLE: &str = "未知歌曲";
/// Placeholder artist for items whose scraped artist came back empty.
pub const UNKNOWN_ARTIST: &str = "未知歌手";

/// A single search result from one provider.
///
/// Immutable once produced. `id` is provider-scoped and opaque to the core;
/// some providers encode a whole URL in it. `id` plus `extra` must be enough
/// to resolve the item again later, possibly in a different process, so no
/// adapter may stash resolution state anywhere else.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MusicItem {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    pub provider: String,
    /// Opaque provider-specific payload carried between search and resolve
    /// (detail-page URL and the like).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

/// A resolved direct media URL, valid for a single download attempt.
///
/// Never persisted; resolved fresh per request.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PlayInfo {
    pub url: String,
    /// Lowercase file extension inferred from the URL path.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}
