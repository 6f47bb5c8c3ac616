//! Domain types and models

pub mod links;

pub use links::{Link, LinkDocument, LinksPayload, RawLink};
