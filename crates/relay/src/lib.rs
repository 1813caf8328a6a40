//! # stream-relay
//!
//! Retrying, redirect-following HTTP relay for resolved media URLs.
//!
//! [`StreamRelay::open`] fetches a direct media URL with a browser-like user
//! agent and exposes the body as a forward-only byte stream so large files
//! never sit in memory whole. Transient timeouts are retried with bounded
//! linear backoff; a non-2xx upstream status fails immediately.

pub mod client;
pub mod config;
pub mod error;
mod relay;
pub mod retry;

pub use client::create_client;
pub use config::RelayConfig;
pub use error::RelayError;
pub use relay::{RelayedStream, StreamRelay};
pub use retry::retry_with_backoff;
