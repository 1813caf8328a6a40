use std::sync::Arc;

use music_providers::ProviderRegistry;
use stream_relay::StreamRelay;

/// Shared handles cloned into every request handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ProviderRegistry>,
    pub relay: Arc<StreamRelay>,
}
