//! Route handlers and shared state for the tunerelay HTTP service.
//!
//! The binary in `main.rs` wires these into a listening server; keeping them
//! in a library crate lets integration tests drive the router directly.

pub mod routes;
pub mod state;

pub use state::AppState;
