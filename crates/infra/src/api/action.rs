//! Response of a successful action invocation

use linkscout_domain::{ClientError, Result};
use serde::de::DeserializeOwned;
use url::Url;

/// A 2xx response from the action endpoint, body fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    url: Url,
    status: u16,
    body: Vec<u8>,
}

impl ActionResponse {
    pub fn new(url: Url, status: u16, body: Vec<u8>) -> Self {
        Self { url, status, body }
    }

    /// URL the action was sent to
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Body as UTF-8 text, invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    /// Returns `ClientError::Invocation` when the body is not valid JSON for
    /// `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| ClientError::Invocation {
            url: self.url.clone(),
            status: Some(self.status),
            cause: format!("Failed to parse response: {e}"),
        })
    }
}
