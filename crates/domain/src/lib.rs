//! # linkscout Domain
//!
//! Hypermedia link types and models for linkscout.
//!
//! This crate contains:
//! - Link data types (`Link`, `LinkDocument`) and the wire payload
//! - The pure link resolver
//! - Error taxonomy and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other linkscout crates
//! - Only external dependencies allowed
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod resolver;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use resolver::{resolve, resolve_namespaced};
pub use types::*;
pub use url::Url;
