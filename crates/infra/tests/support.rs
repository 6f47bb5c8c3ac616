use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use linkscout_core::LogSink;
use linkscout_domain::{BootstrapConfig, ClientConfig, Url};
use wiremock::{Request, Respond, ResponseTemplate};

/// Root resource served by a healthy API.
pub const API_LINKS_RESPONSE: &str = r#"{
    "links": [
        { "href": "http://example.com/v1", "rel": "self" },
        { "href": "http://example.com/", "rel": "up" },
        { "href": "http://example.com/swagger#!/info/v1", "rel": "help" },
        { "href": "http://example.com/v1/health", "rel": "http://example.com/swagger#!/info/health" },
        { "href": "http://example.com/v1/packs", "rel": "http://example.com/swagger#!/pack/listPacks" },
        { "href": "http://example.com/v1/flows", "rel": "http://example.com/swagger#!/flow/listFlows" },
        { "href": "http://example.com/v1/datastore", "rel": "http://example.com/swagger#!/datastore/listDataItems" },
        { "href": "http://example.com/v1/audit/flows", "rel": "http://example.com/swagger#!/audit/findFlows" },
        { "href": "http://example.com/v1/swagger", "rel": "http://example.com/swagger" }
    ]
}"#;

pub const NO_LINKS_RESPONSE: &str = r#"{
    "links": []
}"#;

/// Not a links payload; decoding fails.
pub const ERROR_RESPONSE: &str = r#"{
    "error!"
}"#;

/// Log sink that records every bootstrap failure report.
#[derive(Default)]
pub struct CapturingSink {
    entries: Mutex<Vec<String>>,
}

impl CapturingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Return all captured messages.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().expect("log mutex poisoned").clone()
    }

    /// Check whether a captured message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|entry| entry.contains(needle))
    }
}

impl LogSink for CapturingSink {
    fn error(&self, message: &str) {
        self.entries.lock().expect("log mutex poisoned").push(message.to_string());
    }
}

/// Serves `failures` error payloads, then the canonical links payload.
pub struct FailThenLinks {
    failures: usize,
    calls: Arc<AtomicUsize>,
}

impl FailThenLinks {
    pub fn new(failures: usize) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Self { failures, calls: Arc::clone(&calls) }, calls)
    }
}

impl Respond for FailThenLinks {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            ResponseTemplate::new(200).set_body_string(ERROR_RESPONSE)
        } else {
            ResponseTemplate::new(200).set_body_string(API_LINKS_RESPONSE)
        }
    }
}

/// Client configuration retrying every 10ms.
pub fn fast_config(base_url: &str) -> ClientConfig {
    ClientConfig::new(Url::parse(base_url).expect("valid base url"), Duration::from_secs(5))
        .with_bootstrap(BootstrapConfig::fixed(Duration::from_millis(10)))
}
