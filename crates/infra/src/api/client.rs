//! Caller-facing link discovery client
//!
//! Construction starts a background bootstrap that fetches the API's link
//! document, retrying until it succeeds. Every link accessor waits for that
//! document; when the bootstrap is cancelled first they fail with
//! `ClientError::NotReady` instead of hanging.

use std::sync::Arc;
use std::time::Duration;

use linkscout_core::{
    link_cache, BackoffPolicy, Bootstrapper, LinkCache, LinkFetcher, LogSink, TracingLogSink,
};
use linkscout_domain::constants::HEALTH_CHECK_REL;
use linkscout_domain::{
    resolve, resolve_namespaced, ClientConfig, ClientError, LinkDocument, Result,
};
use parking_lot::RwLock;
use reqwest::{Method, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::action::ActionResponse;
use super::links::HttpLinkFetcher;
use crate::errors::{invocation_error, InfraError};
use crate::http::HttpClient;

/// Hypermedia client for one remote API.
///
/// Cheap accessors read the cached link document; the only network calls
/// after bootstrap are [`ApiClient::check_health`] and
/// [`ApiClient::take_action`], each bounded by the configured timeout.
pub struct ApiClient {
    config: ClientConfig,
    http: Arc<HttpClient>,
    links: LinkCache,
    action_url: RwLock<Option<Url>>,
    action_method: Method,
    cancel: CancellationToken,
}

impl ApiClient {
    /// Connect to `base_url` with default settings, waiting for the link
    /// document without a deadline.
    ///
    /// # Errors
    /// Returns `ClientError::Config` for an unparsable URL or a zero timeout.
    pub async fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(InfraError::from)?;
        Self::connect(ClientConfig::new(base_url, timeout)).await
    }

    /// Like [`ApiClient::new`], but accepts invalid TLS certificates.
    pub async fn new_insecure(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(InfraError::from)?;
        Self::connect(ClientConfig::new(base_url, timeout).with_insecure_tls(true)).await
    }

    /// Build a client from `config` and wait for the link document, giving up
    /// after `bootstrap.max_wait_ms` when set.
    ///
    /// # Errors
    /// Returns `ClientError::Config` for invalid configuration and
    /// `ClientError::NotReady` when the wait expires.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        Self::builder().config(config).connect().await
    }

    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// Whether the link document has been fetched.
    pub fn is_ready(&self) -> bool {
        self.links.is_ready()
    }

    /// Wait until the link document has been fetched.
    ///
    /// # Errors
    /// Returns `ClientError::NotReady` if the bootstrap stopped first.
    pub async fn wait_ready(&self) -> Result<()> {
        self.links.ready().await.map(|_| ())
    }

    /// The fetched link document.
    pub async fn links(&self) -> Result<Arc<LinkDocument>> {
        self.links.ready().await
    }

    /// Resolve `rel` by exact relation match.
    ///
    /// # Errors
    /// Returns `ClientError::Resolution` when no link has that relation.
    pub async fn resolve(&self, rel: &str) -> Result<Url> {
        let document = self.links.ready().await?;
        Ok(resolve(&document, rel)?)
    }

    /// URL of the API's health-check resource.
    ///
    /// # Errors
    /// Returns `ClientError::Resolution` when the document has no
    /// `info/health` link.
    pub async fn health_check_url(&self) -> Result<Url> {
        let document = self.links.ready().await?;
        Ok(resolve_namespaced(&document, HEALTH_CHECK_REL)?)
    }

    /// GET the health-check URL. Returns `false` for a non-2xx answer.
    ///
    /// # Errors
    /// Returns `ClientError::Invocation` when the request itself fails.
    #[instrument(skip(self))]
    pub async fn check_health(&self) -> Result<bool> {
        let url = self.health_check_url().await?;

        let request = self.http.request(Method::GET, url.clone());
        match self.http.send(request).await {
            Ok(response) if response.status().is_success() => {
                debug!(%url, "API is healthy");
                Ok(true)
            }
            Ok(response) => {
                warn!(%url, status = %response.status(), "API returned non-success status");
                Ok(false)
            }
            Err(err) => {
                warn!(%url, error = %err, "Health check failed");
                Err(invocation_error(&url, &err))
            }
        }
    }

    /// Target of [`ApiClient::take_action`]; replaces any previous URL.
    pub fn set_take_action_url(&self, url: Url) {
        *self.action_url.write() = Some(url);
    }

    pub fn take_action_url(&self) -> Option<Url> {
        self.action_url.read().clone()
    }

    /// Resolve `rel` and use it as the action target.
    pub async fn use_take_action_link(&self, rel: &str) -> Result<Url> {
        let url = self.resolve(rel).await?;
        self.set_take_action_url(url.clone());
        Ok(url)
    }

    /// Invoke the action URL with the configured method.
    ///
    /// # Errors
    /// - `ClientError::MissingActionUrl` when no action URL has been set
    /// - `ClientError::NotFound` for a 404 answer
    /// - `ClientError::Invocation` for any other non-2xx answer or a
    ///   transport failure
    #[instrument(skip(self), fields(method = %self.action_method))]
    pub async fn take_action(&self) -> Result<ActionResponse> {
        let url = self.take_action_url().ok_or(ClientError::MissingActionUrl)?;

        let request = self.http.request(self.action_method.clone(), url.clone());
        let response = self.http.send(request).await.map_err(|err| {
            warn!(%url, error = %err, "action request failed");
            invocation_error(&url, &err)
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound { url });
        }
        if !status.is_success() {
            warn!(%url, %status, "action returned non-success status");
            return Err(ClientError::from_status(url, status.as_u16(), status.canonical_reason()));
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => {
                return Err(ClientError::Invocation {
                    status: Some(status.as_u16()),
                    cause: format!("failed to read response body: {err}"),
                    url,
                })
            }
        };

        debug!(%url, %status, bytes = body.len(), "action completed");
        Ok(ActionResponse::new(url, status.as_u16(), body.to_vec()))
    }

    /// Stop an in-flight bootstrap. Pending and future accessors fail with
    /// `ClientError::NotReady` unless the links were already fetched.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for ApiClient {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url.as_str())
            .field("ready", &self.is_ready())
            .field("action_url", &self.take_action_url())
            .field("action_method", &self.action_method)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ClientConfig>,
    log_sink: Option<Arc<dyn LogSink>>,
    fetcher: Option<Arc<dyn LinkFetcher>>,
    backoff: Option<BackoffPolicy>,
    cancellation: Option<CancellationToken>,
}

impl ApiClientBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Where bootstrap failures are reported. Defaults to `tracing`.
    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    /// Replace the HTTP link fetcher.
    pub fn fetcher(mut self, fetcher: Arc<dyn LinkFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Override the backoff derived from `bootstrap` configuration.
    pub fn backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = Some(backoff);
        self
    }

    /// Cancel the bootstrap when `token` is cancelled.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Create the client and start the bootstrap in the background.
    ///
    /// Returns immediately; accessors wait for the link document.
    ///
    /// # Errors
    /// Returns `ClientError::Config` for missing or invalid configuration,
    /// or when called outside a Tokio runtime.
    pub fn build(self) -> Result<ApiClient> {
        let config = self
            .config
            .ok_or_else(|| ClientError::Config("client configuration is required".to_string()))?;
        config.validate()?;

        if tokio::runtime::Handle::try_current().is_err() {
            return Err(ClientError::Config(
                "ApiClient must be built inside a Tokio runtime".to_string(),
            ));
        }

        let method_name = config.action_method.trim().to_ascii_uppercase();
        let action_method = Method::from_bytes(method_name.as_bytes()).map_err(|e| {
            ClientError::Config(format!("invalid action_method {:?}: {e}", config.action_method))
        })?;

        let backoff = match self.backoff {
            Some(backoff) => {
                backoff.validate()?;
                backoff
            }
            None => BackoffPolicy::from_config(&config.bootstrap)?,
        };

        let http = Arc::new(HttpClient::from_config(&config)?);

        let fetcher: Arc<dyn LinkFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpLinkFetcher::new(Arc::clone(&http))),
        };
        let sink: Arc<dyn LogSink> = match self.log_sink {
            Some(sink) => sink,
            None => Arc::new(TracingLogSink),
        };

        // Dropping the client must not cancel the caller's token.
        let cancel = match self.cancellation {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };

        let (publisher, links) = link_cache();
        Bootstrapper::new(fetcher, sink)
            .with_backoff(backoff)
            .with_cancellation(cancel.clone())
            .spawn(config.base_url.clone(), publisher);

        info!(
            base_url = %config.base_url,
            timeout_ms = config.timeout.as_millis(),
            "link bootstrap started"
        );

        Ok(ApiClient {
            config,
            http,
            links,
            action_url: RwLock::new(None),
            action_method,
            cancel,
        })
    }

    /// Build the client and wait for the link document.
    ///
    /// Waits at most `bootstrap.max_wait_ms` when configured; on expiry the
    /// bootstrap is cancelled.
    ///
    /// # Errors
    /// Returns `ClientError::NotReady` when the wait expires or the bootstrap
    /// is cancelled, and `ClientError::Config` for invalid configuration.
    pub async fn connect(self) -> Result<ApiClient> {
        let client = self.build()?;

        match client.config.bootstrap.max_wait {
            None => client.wait_ready().await?,
            Some(limit) => match tokio::time::timeout(limit, client.wait_ready()).await {
                Ok(result) => result?,
                Err(_) => {
                    client.shutdown();
                    let err = ClientError::NotReady(format!(
                        "links not available after {}ms",
                        limit.as_millis()
                    ));
                    warn!(
                        base_url = %client.config.base_url,
                        kind = err.kind().as_str(),
                        retryable = err.kind().is_retryable(),
                        "gave up waiting for api links"
                    );
                    return Err(err);
                }
            },
        }

        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use linkscout_domain::{BootstrapConfig, ErrorKind, FetchError, Link};

    use super::*;

    struct StaticFetcher {
        document: Option<LinkDocument>,
        calls: AtomicU32,
    }

    #[async_trait]
    impl LinkFetcher for StaticFetcher {
        async fn fetch(&self, _base_url: &Url) -> std::result::Result<LinkDocument, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.document.clone().ok_or_else(|| FetchError::Transport("refused".to_string()))
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::new(Url::parse("http://api.invalid/").unwrap(), Duration::from_secs(1))
            .with_bootstrap(BootstrapConfig::fixed(Duration::from_millis(10)))
    }

    fn document() -> LinkDocument {
        LinkDocument::new(vec![
            Link::new("self", Url::parse("http://api.invalid/").unwrap()),
            Link::new("info/health", Url::parse("http://api.invalid/health").unwrap()),
        ])
    }

    fn fetcher(document: Option<LinkDocument>) -> Arc<StaticFetcher> {
        Arc::new(StaticFetcher { document, calls: AtomicU32::new(0) })
    }

    #[tokio::test]
    async fn accessors_read_the_fetched_document() {
        let client = ApiClient::builder()
            .config(config())
            .fetcher(fetcher(Some(document())))
            .connect()
            .await
            .unwrap();

        assert!(client.is_ready());
        assert_eq!(client.links().await.unwrap().len(), 2);
        assert_eq!(client.resolve("self").await.unwrap().as_str(), "http://api.invalid/");
        assert_eq!(client.health_check_url().await.unwrap().as_str(), "http://api.invalid/health");
    }

    #[tokio::test]
    async fn missing_relation_reports_searched_relations() {
        let client = ApiClient::builder()
            .config(config())
            .fetcher(fetcher(Some(document())))
            .connect()
            .await
            .unwrap();

        let err = client.resolve("users").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Resolution);
        assert_eq!(
            err.to_string(),
            r#"could not find link with rel "users" in ["self", "info/health"]"#
        );
    }

    #[tokio::test]
    async fn build_requires_configuration() {
        let err = ApiClient::builder().build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[tokio::test]
    async fn build_rejects_invalid_action_method() {
        let err = ApiClient::builder()
            .config(config().with_action_method("NOT A METHOD"))
            .build()
            .unwrap_err();

        assert!(err.to_string().contains("invalid action_method"));
    }

    #[test]
    fn build_outside_runtime_is_a_config_error() {
        let err = ApiClient::builder().config(config()).build().unwrap_err();
        assert!(err.to_string().contains("Tokio runtime"));
    }

    #[tokio::test]
    async fn build_rejects_backoff_beyond_ceiling() {
        let err = ApiClient::builder()
            .config(config())
            .fetcher(fetcher(Some(document())))
            .backoff(BackoffPolicy::exponential(Duration::from_secs(1), 2.0, Duration::MAX))
            .build()
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("max_delay"));
    }

    #[tokio::test]
    async fn take_action_without_url_is_a_config_error() {
        let client = ApiClient::builder()
            .config(config())
            .fetcher(fetcher(Some(document())))
            .build()
            .unwrap();

        let err = client.take_action().await.unwrap_err();

        assert_eq!(err, ClientError::MissingActionUrl);
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[tokio::test]
    async fn dropping_the_client_stops_the_bootstrap() {
        let failing = fetcher(None);
        let client =
            ApiClient::builder().config(config()).fetcher(failing.clone()).build().unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(client);
        tokio::time::sleep(Duration::from_millis(20)).await;
        let calls = failing.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(failing.calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test]
    async fn parent_token_cancels_the_bootstrap() {
        let parent = CancellationToken::new();
        let client = ApiClient::builder()
            .config(config())
            .fetcher(fetcher(None))
            .cancellation(parent.clone())
            .build()
            .unwrap();

        parent.cancel();

        assert_eq!(client.wait_ready().await.unwrap_err().kind(), ErrorKind::NotReady);
    }

    #[tokio::test]
    async fn dropping_the_client_leaves_the_parent_token_alone() {
        let parent = CancellationToken::new();
        let client = ApiClient::builder()
            .config(config())
            .fetcher(fetcher(Some(document())))
            .cancellation(parent.clone())
            .build()
            .unwrap();

        drop(client);

        assert!(!parent.is_cancelled());
    }
}
