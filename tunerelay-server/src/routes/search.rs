use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;

use super::error_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct SearchParams {
    q: Option<String>,
    provider: Option<String>,
}

/// GET /api/search?q=...&provider=...
///
/// Provider failures degrade to an empty result list rather than an error;
/// only a missing query is the caller's fault.
pub(super) async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let Some(query) = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|query| !query.is_empty())
    else {
        return error_response(StatusCode::BAD_REQUEST, "Missing q");
    };

    let provider = state.registry.get(params.provider.as_deref());
    let results = provider.search(query).await;
    Json(json!({ "provider": provider.name(), "results": results })).into_response()
}
