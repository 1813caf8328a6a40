//! Adapter for the jbsou.cn aggregation API.
//!
//! Unlike the scraping adapters this upstream is a JSON API fronting several
//! real music services; one implementation is registered once per backing
//! source. Search results already carry the final download URL, which is
//! percent-encoded and passed through as the opaque item id, so resolution
//! needs no upstream state beyond a redirect probe to find the true final
//! URL behind the link shortener.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;
use crate::fetch::Fetcher;
use crate::media::{MusicItem, PlayInfo, UNKNOWN_ARTIST, UNKNOWN_TITLE};
use crate::provider::MusicProvider;
use crate::text::{absolutize, decode_lenient, extract_ext};

#[derive(Deserialize, Default)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchHit>,
}

#[derive(Deserialize, Default)]
struct SearchHit {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    album: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    cover: Option<String>,
}

pub struct Jianbin {
    name: &'static str,
    source: &'static str,
    base_url: String,
    fetcher: Fetcher,
}

impl Jianbin {
    /// `name` is the registry name (e.g. `jianbin-netease`); `source` is the
    /// upstream service the API should query (netease/qq/kugou/kuwo).
    pub fn new(name: &'static str, source: &'static str, client: Client) -> Self {
        let mut fetcher = Fetcher::new(client).with_timeout(Duration::from_secs(30));
        fetcher.add_header("accept", "application/json, text/javascript, */*; q=0.01");
        fetcher.add_header("origin", "https://www.jbsou.cn");
        fetcher.add_header("referer", "https://www.jbsou.cn/");
        fetcher.add_header("x-requested-with", "XMLHttpRequest");
        Self {
            name,
            source,
            base_url: "https://www.jbsou.cn/".to_string(),
            fetcher,
        }
    }

    /// Point the adapter at a different host. Intended for tests.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = format!("{}/", base_url.trim_end_matches('/'));
        self
    }

    /// Decode an id back into an absolute URL. Ids are percent-encoded URLs
    /// (sometimes doubly, after a round trip through a query string).
    fn id_to_url(&self, id: &str) -> String {
        let value = id.trim();
        if value.is_empty() {
            return String::new();
        }
        let decoded = decode_lenient(value);
        if decoded.starts_with("http") {
            decoded
        } else {
            absolutize(&self.base_url, &decoded)
        }
    }

    /// Follow the link shortener with a header-only probe, keeping the
    /// original URL if the probe fails.
    async fn resolve_final_url(&self, url: &str) -> String {
        match self.fetcher.head(url).send().await {
            Ok(response) => {
                let resolved = response.url().to_string();
                if resolved.starts_with("http") {
                    resolved
                } else {
                    url.to_string()
                }
            }
            Err(error) => {
                debug!(%error, "redirect probe failed, keeping original url");
                url.to_string()
            }
        }
    }
}

#[async_trait]
impl MusicProvider for Jianbin {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn try_search(&self, query: &str) -> Result<Vec<MusicItem>, ProviderError> {
        let response = self
            .fetcher
            .post(&self.base_url)
            .form(&[
                ("input", query),
                ("filter", "name"),
                ("type", self.source),
                ("page", "1"),
            ])
            .send()
            .await?;
        // Some mirrors serve JSON with a text content type; parse leniently
        // and treat an unreadable payload as zero hits.
        let text = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&text).unwrap_or_default();
        debug!(provider = self.name, hits = parsed.data.len(), "search response parsed");

        Ok(parsed
            .data
            .into_iter()
            .filter_map(|hit| {
                let download_url = absolutize(&self.base_url, hit.url.as_deref().unwrap_or(""));
                if download_url.is_empty() {
                    return None;
                }
                let cover = hit
                    .cover
                    .as_deref()
                    .map(|value| absolutize(&self.base_url, value))
                    .filter(|value| !value.is_empty());
                Some(MusicItem {
                    id: urlencoding::encode(&download_url).into_owned(),
                    title: hit.name.filter(|v| !v.is_empty()).unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
                    artist: hit.artist.filter(|v| !v.is_empty()).unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
                    album: hit.album.filter(|v| !v.is_empty()),
                    cover,
                    provider: self.name.to_string(),
                    extra: None,
                })
            })
            .collect())
    }

    async fn get_play_info(
        &self,
        id: &str,
        _extra: Option<&serde_json::Value>,
    ) -> Result<PlayInfo, ProviderError> {
        let url = self.id_to_url(id);
        if url.is_empty() {
            return Err(ProviderError::InvalidId(id.to_string()));
        }
        let final_url = self.resolve_final_url(&url).await;
        if !final_url.starts_with("http") {
            return Err(ProviderError::ResolutionFailed(format!(
                "{}: id did not decode to an http url",
                self.name
            )));
        }
        Ok(PlayInfo {
            kind: extract_ext(&final_url),
            url: final_url,
            cover: None,
        })
    }
}
