//! Link discovery client for a hypermedia API
//!
//! This module provides the HTTP link fetcher and [`ApiClient`], which
//! bootstraps the API's link document in the background and exposes
//! accessors over it.
//!
//! # Architecture
//!
//! - Uses [`HttpClient`](crate::http::HttpClient) (no direct reqwest client)
//! - Single-attempt requests; retrying lives in the core bootstrapper
//! - Every network call is bounded by the configured timeout

pub mod action;
pub mod client;
pub mod links;

pub use action::ActionResponse;
pub use client::{ApiClient, ApiClientBuilder};
pub use links::HttpLinkFetcher;
