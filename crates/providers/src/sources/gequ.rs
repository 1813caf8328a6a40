//! Adapter for the gequ-style song table sites (gequbao.com, gequhai.com).
//!
//! The two sites are clones of one page grammar: a search page with a
//! `table#myTables` result table, a play page inlining metadata as
//! `window.*` script globals, and an XHR `/api/music` endpoint returning the
//! direct media URL. One implementation serves both, instantiated per site.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;
use crate::fetch::Fetcher;
use crate::media::{MusicItem, PlayInfo, UNKNOWN_ARTIST, UNKNOWN_TITLE};
use crate::provider::MusicProvider;
use crate::sources::page_vars::extract_page_vars;
use crate::text::{absolutize, extract_ext};

static PLAY_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/play/(\d+)").unwrap());

static ROW_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table#myTables tbody tr").unwrap());
static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

#[derive(Deserialize)]
struct MusicApiResponse {
    data: Option<MusicApiData>,
}

#[derive(Deserialize)]
struct MusicApiData {
    url: Option<String>,
}

struct SearchRow {
    id: String,
    title: String,
    artist: String,
    play_url: String,
}

pub struct Gequ {
    name: &'static str,
    base_url: String,
    page: Fetcher,
    api: Fetcher,
}

impl Gequ {
    /// The gequbao.com instance (the registry default).
    pub fn gequbao(client: Client) -> Self {
        let mut provider = Self::new("gequbao", "https://www.gequbao.com", client);
        provider.api.add_header("origin", "https://www.gequbao.com");
        provider.api.add_header("referer", "https://www.gequbao.com/");
        provider
    }

    /// The gequhai.com instance. Same grammar, plus the site's static
    /// `x-custom-header` token expected by its API.
    pub fn gequhai(client: Client) -> Self {
        let mut provider = Self::new("gequhai", "https://www.gequhai.com", client);
        provider.api.add_header("origin", "https://www.gequhai.com");
        provider.api.add_header("referer", "https://www.gequhai.com/");
        provider.api.add_header("x-custom-header", "SecretKey");
        provider
    }

    fn new(name: &'static str, base_url: &str, client: Client) -> Self {
        let page = Fetcher::new(client.clone()).with_timeout(Duration::from_secs(15));
        let mut api = Fetcher::new(client).with_timeout(Duration::from_secs(15));
        api.add_header("accept", "application/json, text/javascript, */*; q=0.01");
        api.add_header("x-requested-with", "XMLHttpRequest");
        api.add_header("sec-fetch-dest", "empty");
        api.add_header("sec-fetch-mode", "cors");
        Self {
            name,
            base_url: base_url.to_string(),
            page,
            api,
        }
    }

    /// Point the adapter at a different host. Intended for tests.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn parse_search_page(&self, html: &str) -> Vec<SearchRow> {
        let document = Html::parse_document(html);
        let mut rows = Vec::new();
        for tr in document.select(&ROW_SEL) {
            let cells: Vec<_> = tr.select(&CELL_SEL).collect();
            if cells.len() < 3 {
                continue;
            }
            let title_cell = cells[1];
            let singer_cell = cells[2];
            let link = title_cell.select(&LINK_SEL).next();
            let (title, href) = match link {
                Some(anchor) => (
                    anchor.text().collect::<String>(),
                    anchor.value().attr("href").unwrap_or("").to_string(),
                ),
                None => (title_cell.text().collect::<String>(), String::new()),
            };
            let Some(id) = PLAY_ID_RE
                .captures(&href)
                .map(|caps| caps[1].to_string())
            else {
                continue;
            };
            rows.push(SearchRow {
                id,
                title: title.trim().to_string(),
                artist: singer_cell.text().collect::<String>().trim().to_string(),
                play_url: absolutize(&self.base_url, &href),
            });
        }
        rows
    }

    /// Detail-page URL for an id, preferring the one captured at search time.
    fn detail_url(&self, id: &str, extra: Option<&serde_json::Value>) -> String {
        extra
            .and_then(|value| value.get("play_url"))
            .and_then(|value| value.as_str())
            .filter(|url| !url.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}/play/{id}", self.base_url))
    }

    async fn fetch_api_url(&self, play_id: &str) -> Result<Option<String>, ProviderError> {
        let response = self
            .api
            .post(&format!("{}/api/music", self.base_url))
            .form(&[("id", play_id), ("type", "0")])
            .send()
            .await?;
        // A malformed body falls through to the backup URL channel.
        let payload = response.json::<MusicApiResponse>().await.ok();
        Ok(payload
            .and_then(|body| body.data)
            .and_then(|data| data.url)
            .filter(|url| url.starts_with("http")))
    }
}

#[async_trait]
impl MusicProvider for Gequ {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn try_search(&self, query: &str) -> Result<Vec<MusicItem>, ProviderError> {
        let url = format!("{}/s/{}", self.base_url, urlencoding::encode(query));
        let html = self.page.get(&url).send().await?.text().await?;
        let rows = self.parse_search_page(&html);
        debug!(provider = self.name, results = rows.len(), "parsed search page");
        Ok(rows
            .into_iter()
            .map(|row| MusicItem {
                id: row.id,
                title: if row.title.is_empty() {
                    UNKNOWN_TITLE.to_string()
                } else {
                    row.title
                },
                artist: if row.artist.is_empty() {
                    UNKNOWN_ARTIST.to_string()
                } else {
                    row.artist
                },
                album: None,
                cover: None,
                provider: self.name.to_string(),
                extra: Some(serde_json::json!({ "play_url": row.play_url })),
            })
            .collect())
    }

    async fn get_play_info(
        &self,
        id: &str,
        extra: Option<&serde_json::Value>,
    ) -> Result<PlayInfo, ProviderError> {
        let play_url = self.detail_url(id, extra);
        let html = self.page.get(&play_url).send().await?.text().await?;
        let vars = extract_page_vars(&html);

        let play_id = vars
            .get("play_id")
            .or_else(|| vars.get("mp3_id"))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
            .unwrap_or(id);

        let mut download_url = String::new();
        if !play_id.is_empty() {
            if let Some(url) = self.fetch_api_url(play_id).await? {
                download_url = url;
            }
        }
        if download_url.is_empty() {
            if let Some(decoded) = vars.get("mp3_extra_url_decoded") {
                if decoded.starts_with("http") {
                    debug!(provider = self.name, id, "using decoded backup url");
                    download_url = decoded.clone();
                }
            }
        }
        if download_url.is_empty() {
            return Err(ProviderError::ResolutionFailed(format!(
                "{}: no playable url for id {id}",
                self.name
            )));
        }

        let cover = vars
            .get("mp3_cover")
            .filter(|value| !value.is_empty())
            .cloned();
        Ok(PlayInfo {
            kind: extract_ext(&download_url),
            url: download_url,
            cover,
        })
    }
}
