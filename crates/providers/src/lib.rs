//! # music-providers
//!
//! Search and resolution adapters for unofficial music sources.
//!
//! Each upstream site is an independent implementation of the two-method
//! [`MusicProvider`] contract: `search` turns a query into a list of
//! [`MusicItem`]s, and `get_play_info` turns an opaque item id back into a
//! directly fetchable media URL ([`PlayInfo`]). Adapters are stateless beyond
//! configuration constants and are held as singletons in a
//! [`ProviderRegistry`] for the lifetime of the process.
//!
//! The upstreams are undocumented third parties; every adapter isolates its
//! scraping grammar behind the contract so a site redesign only ever costs
//! one file.

pub mod error;
pub mod fetch;
pub mod media;
pub mod provider;
pub mod registry;
pub mod sources;
pub mod text;

pub use error::ProviderError;
pub use fetch::{Fetcher, default_client};
pub use media::{MusicItem, PlayInfo};
pub use provider::MusicProvider;
pub use registry::{DEFAULT_PROVIDER, ProviderRegistry};
