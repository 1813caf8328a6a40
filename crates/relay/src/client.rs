use std::sync::Arc;

use reqwest::Client;
use rustls::{ClientConfig, crypto::ring};
use rustls_platform_verifier::BuilderVerifierExt;

use crate::config::RelayConfig;
use crate::error::RelayError;

/// Create a reqwest client configured for media fetches.
pub fn create_client(config: &RelayConfig) -> Result<Client, RelayError> {
    let provider = Arc::new(ring::default_provider());
    let tls_config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .expect("Failed to configure default TLS protocol versions")
        .with_platform_verifier()
        .unwrap()
        .with_no_client_auth();

    Client::builder()
        .user_agent(&config.user_agent)
        .use_preconfigured_tls(tls_config)
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
        // Bounds connection setup and inter-chunk stalls, never the total
        // transfer; a slow but progressing download must not be cut off.
        .connect_timeout(config.timeout)
        .read_timeout(config.timeout)
        // Media bodies pass through verbatim; transparent decompression
        // would drop the upstream content-length.
        .no_gzip()
        .no_deflate()
        .build()
        .map_err(RelayError::from)
}
