// Router-level tests with a mock provider and throwaway upstreams.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::routing::get;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

use music_providers::error::ProviderError;
use music_providers::{MusicItem, MusicProvider, PlayInfo, ProviderRegistry};
use stream_relay::{RelayConfig, StreamRelay};
use tunerelay_server::{AppState, routes};

const PAYLOAD: &[u8] = b"ID3\x04\x00fake mp3 payload";

struct MockProvider {
    play_url: Option<String>,
    search_calls: AtomicUsize,
    resolve_calls: AtomicUsize,
}

impl MockProvider {
    fn new(play_url: Option<String>) -> Arc<Self> {
        Arc::new(Self {
            play_url,
            search_calls: AtomicUsize::new(0),
            resolve_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl MusicProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn try_search(&self, query: &str) -> Result<Vec<MusicItem>, ProviderError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![MusicItem {
            id: "1".to_owned(),
            title: query.to_owned(),
            artist: "tester".to_owned(),
            album: None,
            cover: None,
            provider: "mock".to_owned(),
            extra: None,
        }])
    }

    async fn get_play_info(
        &self,
        id: &str,
        _extra: Option<&Value>,
    ) -> Result<PlayInfo, ProviderError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        match &self.play_url {
            Some(url) => Ok(PlayInfo {
                url: url.clone(),
                kind: "mp3".to_owned(),
                cover: None,
            }),
            None => Err(ProviderError::ResolutionFailed(format!("no track {id}"))),
        }
    }
}

fn app_with(provider: Arc<MockProvider>) -> Router {
    let registry = Arc::new(ProviderRegistry::with_providers(
        vec![provider as Arc<dyn MusicProvider>],
        "mock",
    ));
    let relay = Arc::new(StreamRelay::new(RelayConfig::default()).unwrap());
    routes::router(AppState { registry, relay })
}

async fn serve_upstream(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    base
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn download_without_id_is_rejected_up_front() {
    let provider = MockProvider::new(Some("http://127.0.0.1:9/x.mp3".to_owned()));
    let app = app_with(provider.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/download")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Missing id");
    assert_eq!(provider.resolve_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unresolvable_track_maps_to_not_found() {
    let provider = MockProvider::new(None);
    let app = app_with(provider.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/download?id=42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "Failed to get url");
    assert_eq!(provider.resolve_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn successful_download_relays_headers_and_body() {
    let upstream = serve_upstream(Router::new().route(
        "/track.mp3",
        get(|| async { ([(header::CONTENT_TYPE, "audio/flac")], PAYLOAD) }),
    ))
    .await;
    let provider = MockProvider::new(Some(format!("{upstream}/track.mp3")));
    let app = app_with(provider);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/download?id=42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "audio/flac"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_LENGTH).unwrap(),
        &PAYLOAD.len().to_string()
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(disposition.contains("music-42.mp3"), "{disposition}");

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], PAYLOAD);
}

#[tokio::test]
async fn explicit_filename_is_encoded_with_plus_for_spaces() {
    // Build the response by hand so no content-type header is attached;
    // returning PAYLOAD directly would make axum add application/octet-stream.
    let upstream = serve_upstream(Router::new().route(
        "/t",
        get(|| async { axum::response::Response::new(Body::from(PAYLOAD)) }),
    ))
    .await;
    let provider = MockProvider::new(Some(format!("{upstream}/t")));
    let app = app_with(provider);

    let uri = format!(
        "/api/download?id=42&filename={}",
        urlencoding::encode("my song.mp3")
    );
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    // No upstream content-type, so the audio default applies.
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "audio/mpeg"
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(disposition.contains("my+song.mp3"), "{disposition}");
    assert!(disposition.contains("filename*=UTF-8''"), "{disposition}");
}

#[tokio::test]
async fn upstream_failure_after_resolution_maps_to_server_error() {
    let upstream = serve_upstream(
        Router::new().route("/gone", get(|| async { StatusCode::NOT_FOUND })),
    )
    .await;
    let provider = MockProvider::new(Some(format!("{upstream}/gone")));
    let app = app_with(provider);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/download?id=42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "Download failed");
}

#[tokio::test]
async fn search_requires_a_query() {
    let provider = MockProvider::new(None);
    let app = app_with(provider.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/search")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Missing q");
    assert_eq!(provider.search_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn search_returns_provider_results() {
    let provider = MockProvider::new(None);
    let app = app_with(provider.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/search?q=rain")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["provider"], "mock");
    assert_eq!(body["results"][0]["title"], "rain");
    assert_eq!(provider.search_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn providers_endpoint_lists_registered_adapters() {
    let provider = MockProvider::new(None);
    let app = app_with(provider);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/providers")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["providers"], serde_json::json!(["mock"]));
    assert_eq!(body["default"], "mock");
}
