//! HTTP implementation of [`LinkFetcher`]

use std::sync::Arc;

use async_trait::async_trait;
use linkscout_core::LinkFetcher;
use linkscout_domain::{FetchError, LinkDocument};
use reqwest::header::ACCEPT;
use reqwest::Method;
use tracing::{debug, instrument};
use url::Url;

use crate::errors::IntoFetchError;
use crate::http::HttpClient;

/// Fetches the link document with a single GET per call.
#[derive(Debug, Clone)]
pub struct HttpLinkFetcher {
    http: Arc<HttpClient>,
}

impl HttpLinkFetcher {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl LinkFetcher for HttpLinkFetcher {
    #[instrument(skip(self), fields(base_url = %base_url))]
    async fn fetch(&self, base_url: &Url) -> Result<LinkDocument, FetchError> {
        let request =
            self.http.request(Method::GET, base_url.clone()).header(ACCEPT, "application/json");

        let response = self.http.send(request).await.map_err(IntoFetchError::into_fetch_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: base_url.clone(), status: status.as_u16() });
        }

        // Relative hrefs resolve against the final URL after redirects.
        let source = response.url().clone();
        let body = response.bytes().await.map_err(IntoFetchError::into_fetch_error)?;

        let document = LinkDocument::from_json_slice(&body, &source)?;
        debug!(links = document.len(), "decoded link document");
        Ok(document)
    }
}
