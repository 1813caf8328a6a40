use std::sync::Arc;

use reqwest::Client;
use rustc_hash::FxHashMap;

use crate::fetch::default_client;
use crate::provider::MusicProvider;
use crate::sources::{Gequ, Jianbin, Livepoo};

/// Provider used when a request names none, or names one we don't know.
pub const DEFAULT_PROVIDER: &str = "gequbao";

/// Immutable table of provider singletons.
///
/// Built once at startup and shared read-only between in-flight requests;
/// lookups never fail, unknown names fall back to the default so callers
/// always get a usable provider.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn MusicProvider>>,
    index: FxHashMap<&'static str, usize>,
    default_index: usize,
}

impl ProviderRegistry {
    /// Registry with every built-in provider, in registration order.
    pub fn standard() -> Self {
        Self::standard_with_client(default_client())
    }

    pub fn standard_with_client(client: Client) -> Self {
        let providers: Vec<Arc<dyn MusicProvider>> = vec![
            Arc::new(Gequ::gequbao(client.clone())),
            Arc::new(Gequ::gequhai(client.clone())),
            Arc::new(Livepoo::new(client.clone())),
            Arc::new(Jianbin::new("jianbin-netease", "netease", client.clone())),
            Arc::new(Jianbin::new("jianbin-qq", "qq", client.clone())),
            Arc::new(Jianbin::new("jianbin-kugou", "kugou", client.clone())),
            Arc::new(Jianbin::new("jianbin-kuwo", "kuwo", client)),
        ];
        Self::with_providers(providers, DEFAULT_PROVIDER)
    }

    /// Build a registry from explicit instances (tests register mocks this
    /// way). Must not be empty; the default falls back to the first entry
    /// when `default_name` is not present.
    pub fn with_providers(
        providers: Vec<Arc<dyn MusicProvider>>,
        default_name: &str,
    ) -> Self {
        debug_assert!(!providers.is_empty());
        let mut index = FxHashMap::default();
        for (position, provider) in providers.iter().enumerate() {
            index.insert(provider.name(), position);
        }
        let default_index = index.get(default_name).copied().unwrap_or(0);
        Self {
            providers,
            index,
            default_index,
        }
    }

    /// Look up a provider by name, falling back to the default.
    pub fn get(&self, name: Option<&str>) -> Arc<dyn MusicProvider> {
        let position = name
            .and_then(|key| self.index.get(key).copied())
            .unwrap_or(self.default_index);
        Arc::clone(&self.providers[position])
    }

    /// All providers in registration order, stable across calls.
    pub fn all(&self) -> &[Arc<dyn MusicProvider>] {
        &self.providers
    }
}
