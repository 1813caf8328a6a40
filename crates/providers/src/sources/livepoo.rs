//! Adapter for livepoo.cn.
//!
//! Search results come from a recommendation-style song list whose items mix
//! title and artist into one text node, so titles go through the shared
//! `artist《title》` / dash splitting. The play endpoint returns the media
//! URL as plain text rather than JSON.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::error::ProviderError;
use crate::fetch::Fetcher;
use crate::media::{MusicItem, PlayInfo, UNKNOWN_ARTIST, UNKNOWN_TITLE};
use crate::provider::MusicProvider;
use crate::text::{extract_ext, normalize_text, split_title_artist};

static COVER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""music_cover"\s*:\s*"(.*?)""#).unwrap());

static ITEM_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul.tuij_song li.song_item2").unwrap());
static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static TITLE_DIV_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".song_info2 > div").unwrap());
static SONG_NAME_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".song_info2 .song_name").unwrap());
static INFO_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".song_info2").unwrap());
static ARTIST_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="singer"], a[href*="artist"]"#).unwrap());

struct ListedSong {
    id: String,
    title: String,
    artist: String,
    detail_url: String,
}

fn text_of(element: Option<ElementRef<'_>>) -> String {
    element
        .map(|node| node.text().collect::<String>())
        .unwrap_or_default()
}

fn extract_cover(html: &str) -> Option<String> {
    let raw = COVER_RE.captures(html)?.get(1)?.as_str();
    // The value is a JSON string fragment with escaped slashes.
    let unescaped = serde_json::from_str::<String>(&format!("\"{raw}\""))
        .unwrap_or_else(|_| raw.replace("\\/", "/"));
    if unescaped.is_empty() {
        None
    } else {
        Some(unescaped)
    }
}

pub struct Livepoo {
    base_url: String,
    fetcher: Fetcher,
}

impl Livepoo {
    pub fn new(client: Client) -> Self {
        Self {
            base_url: "https://www.livepoo.cn".to_string(),
            fetcher: Fetcher::new(client).with_timeout(Duration::from_secs(15)),
        }
    }

    /// Point the adapter at a different host. Intended for tests.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn parse_search_page(&self, html: &str) -> Vec<ListedSong> {
        let document = Html::parse_document(html);
        let mut songs = Vec::new();
        for item in document.select(&ITEM_SEL) {
            let Some(anchor) = item.select(&ANCHOR_SEL).next() else {
                continue;
            };
            let href = anchor.value().attr("href").unwrap_or("");
            let Ok(link) = Url::parse(&format!("{}/", self.base_url))
                .and_then(|base| base.join(href))
            else {
                continue;
            };
            let id_param = link
                .query_pairs()
                .find(|(key, _)| key == "id")
                .map(|(_, value)| value.into_owned())
                .unwrap_or_default();
            let id = id_param
                .strip_prefix("MUSIC_")
                .unwrap_or(&id_param)
                .to_string();

            let mut candidate = text_of(item.select(&TITLE_DIV_SEL).next());
            if candidate.trim().is_empty() {
                candidate = text_of(item.select(&SONG_NAME_SEL).next());
            }
            if candidate.trim().is_empty() {
                candidate = text_of(item.select(&INFO_SEL).next());
            }
            if candidate.trim().is_empty() {
                candidate = anchor.text().collect::<String>();
            }
            let title_text = normalize_text(&candidate);
            if id.is_empty() || title_text.is_empty() {
                continue;
            }

            let artist_from_link = item
                .select(&ARTIST_LINK_SEL)
                .next()
                .map(|node| normalize_text(&node.text().collect::<String>()))
                .unwrap_or_default();
            let (artist, title) = split_title_artist(&title_text);

            songs.push(ListedSong {
                id,
                title: if title.is_empty() { title_text } else { title },
                artist: if artist.is_empty() {
                    artist_from_link
                } else {
                    artist
                },
                detail_url: link.to_string(),
            });
        }
        songs
    }

    /// Detail-page URL, preferring the one captured at search time and
    /// reconstructing it from the bare id otherwise.
    fn detail_url(&self, id: &str, extra: Option<&serde_json::Value>) -> Option<String> {
        if let Some(url) = extra
            .and_then(|value| value.get("detail_url"))
            .and_then(|value| value.as_str())
        {
            if url.starts_with("http") {
                return Some(url.to_string());
            }
        }
        if id.is_empty() {
            return None;
        }
        Some(format!("{}/music/info.html?id=MUSIC_{id}", self.base_url))
    }
}

#[async_trait]
impl MusicProvider for Livepoo {
    fn name(&self) -> &'static str {
        "livepoo"
    }

    async fn try_search(&self, query: &str) -> Result<Vec<MusicItem>, ProviderError> {
        let url = format!(
            "{}/search?keyword={}&page=0",
            self.base_url,
            urlencoding::encode(query)
        );
        let html = self.fetcher.get(&url).send().await?.text().await?;
        let songs = self.parse_search_page(&html);
        debug!(results = songs.len(), "parsed livepoo search page");
        Ok(songs
            .into_iter()
            .map(|song| MusicItem {
                id: song.id,
                title: if song.title.is_empty() {
                    UNKNOWN_TITLE.to_string()
                } else {
                    song.title
                },
                artist: if song.artist.is_empty() {
                    UNKNOWN_ARTIST.to_string()
                } else {
                    song.artist
                },
                album: None,
                cover: None,
                provider: self.name().to_string(),
                extra: Some(serde_json::json!({ "detail_url": song.detail_url })),
            })
            .collect())
    }

    async fn get_play_info(
        &self,
        id: &str,
        extra: Option<&serde_json::Value>,
    ) -> Result<PlayInfo, ProviderError> {
        let mut cover = None;
        if let Some(detail_url) = self.detail_url(id, extra) {
            let detail_html = self.fetcher.get(&detail_url).send().await?.text().await?;
            cover = extract_cover(&detail_html);
        }

        let play_url = format!(
            "{}/audio/play?id={}",
            self.base_url,
            urlencoding::encode(id)
        );
        let body = self.fetcher.get(&play_url).send().await?.text().await?;
        let url = body.trim().to_string();
        if !url.starts_with("http") {
            return Err(ProviderError::ResolutionFailed(format!(
                "livepoo returned a non-http play url for id {id}"
            )));
        }

        Ok(PlayInfo {
            kind: extract_ext(&url),
            url,
            cover,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::default_client;

    const SEARCH_PAGE: &str = r#"
        <html><body>
        <ul class="tuij_song">
          <li class="song_item2">
            <a href="/music/info.html?id=MUSIC_1001">
              <div class="song_info2"><div>周杰伦《晴天》 播放 下载</div></div>
            </a>
          </li>
          <li class="song_item2">
            <a href="/music/info.html?id=MUSIC_1002">
              <div class="song_info2"><div>孤勇者</div></div>
            </a>
            <a href="/singer/123">陈奕迅</a>
          </li>
          <li class="song_item2">
            <a href="/music/info.html">
              <div class="song_info2"><div>没有编号</div></div>
            </a>
          </li>
        </ul>
        </body></html>
    "#;

    fn provider() -> Livepoo {
        Livepoo::new(default_client())
    }

    #[test]
    fn parses_items_splitting_title_and_artist() {
        let songs = provider().parse_search_page(SEARCH_PAGE);
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].id, "1001");
        assert_eq!(songs[0].title, "晴天");
        assert_eq!(songs[0].artist, "周杰伦");
        assert_eq!(
            songs[0].detail_url,
            "https://www.livepoo.cn/music/info.html?id=MUSIC_1001"
        );
    }

    #[test]
    fn falls_back_to_artist_link_when_title_has_no_delimiter() {
        let songs = provider().parse_search_page(SEARCH_PAGE);
        assert_eq!(songs[1].title, "孤勇者");
        assert_eq!(songs[1].artist, "陈奕迅");
    }

    #[test]
    fn detail_url_reconstructs_from_bare_id() {
        let provider = provider();
        assert_eq!(
            provider.detail_url("7", None).as_deref(),
            Some("https://www.livepoo.cn/music/info.html?id=MUSIC_7")
        );
        assert_eq!(provider.detail_url("", None), None);
    }

    #[test]
    fn detail_url_prefers_extra() {
        let provider = provider();
        let extra = serde_json::json!({ "detail_url": "https://www.livepoo.cn/music/info.html?id=MUSIC_9" });
        assert_eq!(
            provider.detail_url("9", Some(&extra)).as_deref(),
            Some("https://www.livepoo.cn/music/info.html?id=MUSIC_9")
        );
    }

    #[test]
    fn unescapes_cover_url() {
        let html = r#"{"music_cover":"https:\/\/img.example\/c.jpg"}"#;
        assert_eq!(
            extract_cover(html).as_deref(),
            Some("https://img.example/c.jpg")
        );
        assert_eq!(extract_cover("<html></html>"), None);
    }
}
