use axum::extract::State;
use axum::response::Json;
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /api/providers
pub(super) async fn providers(State(state): State<AppState>) -> Json<Value> {
    let names: Vec<&str> = state
        .registry
        .all()
        .iter()
        .map(|provider| provider.name())
        .collect();
    Json(json!({
        "providers": names,
        "default": state.registry.get(None).name(),
    }))
}
