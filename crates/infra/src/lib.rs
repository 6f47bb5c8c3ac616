//! # linkscout Infrastructure
//!
//! Infrastructure implementations of the core link-discovery ports and the
//! public client.
//!
//! This crate contains:
//! - The reqwest-backed HTTP client
//! - The HTTP link fetcher
//! - `ApiClient`, the caller-facing client
//! - Configuration loading (environment and files)
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `linkscout-core`
//! - Depends on `linkscout-domain` and `linkscout-core`
//! - Contains all "impure" code (network, environment, files)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::*;
pub use errors::InfraError;
pub use http::*;
