use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use serde::Deserialize;
use tracing::{error, warn};

use super::error_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct DownloadParams {
    id: Option<String>,
    filename: Option<String>,
    provider: Option<String>,
}

/// GET /api/download?id=...&filename=...&provider=...
///
/// Resolves the track through the chosen provider, then relays the upstream
/// body without buffering it. Failure mapping: missing id is 400, a track
/// that cannot be resolved is 404, a fetch that dies after resolution is 500.
pub(super) async fn download(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> Response {
    let Some(id) = params.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing id");
    };

    let provider = state.registry.get(params.provider.as_deref());
    let play_info = match provider.get_play_info(id, None).await {
        Ok(info) => info,
        Err(cause) => {
            warn!(provider = provider.name(), id, "resolution failed: {cause}");
            return error_response(StatusCode::NOT_FOUND, "Failed to get url");
        }
    };

    let relayed = match state.relay.open(&play_info.url).await {
        Ok(relayed) => relayed,
        Err(cause) => {
            error!(url = %play_info.url, "upstream fetch failed: {cause}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Download failed");
        }
    };

    let content_type = relayed
        .content_type
        .clone()
        .unwrap_or_else(|| "audio/mpeg".to_owned());

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            attachment_disposition(params.filename.as_deref(), id),
        );
    // Only forward a length the upstream actually declared; chunked bodies
    // stay chunked.
    if let Some(length) = relayed.content_length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    match builder.body(Body::from_stream(relayed.into_stream())) {
        Ok(response) => response,
        Err(cause) => {
            error!("failed to assemble relay response: {cause}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Download failed")
        }
    }
}

/// Percent-encoded attachment header with spaces folded to `+`, plus the
/// RFC 5987 `filename*` form for clients that understand it.
fn attachment_disposition(filename: Option<&str>, id: &str) -> String {
    let name = filename
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| format!("music-{id}.mp3"));
    let safe = urlencoding::encode(&name).replace("%20", "+");
    format!("attachment; filename=\"{safe}\"; filename*=UTF-8''{safe}")
}

#[cfg(test)]
mod tests {
    use super::attachment_disposition;

    #[test]
    fn encodes_spaces_as_plus() {
        let value = attachment_disposition(Some("晴天 - 周杰伦.mp3"), "1");
        assert!(value.starts_with("attachment; filename=\""));
        assert!(value.contains('+'));
        assert!(!value.contains("%20"));
        assert!(value.contains("filename*=UTF-8''"));
    }

    #[test]
    fn falls_back_to_id_based_name() {
        let value = attachment_disposition(None, "42");
        assert!(value.contains("music-42.mp3"));
    }

    #[test]
    fn blank_filename_uses_fallback() {
        let value = attachment_disposition(Some("   "), "7");
        assert!(value.contains("music-7.mp3"));
    }
}
