//! Retrying link bootstrap
//!
//! The bootstrapper drives a [`LinkFetcher`] until it returns a document,
//! then publishes that document into the client's [`LinkCache`] and stops.
//!
//! - Every failed attempt is reported once to the injected [`LogSink`] as
//!   `cannot get api links: <cause>`.
//! - Retries are unbounded; the [`BackoffPolicy`] spaces them out.
//! - A [`CancellationToken`] stops the loop at the next await point and marks
//!   the cache as cancelled so waiters do not hang.

pub mod backoff;
pub mod cache;

use std::sync::Arc;

use linkscout_domain::constants::BOOTSTRAP_LOG_PREFIX;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use self::backoff::BackoffPolicy;
use self::cache::LinkPublisher;
use crate::ports::{LinkFetcher, LogSink};

/// How a bootstrap run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The document was published after `attempts` fetches
    Ready { attempts: u32 },
    /// Cancelled after `attempts` completed fetches
    Cancelled { attempts: u32 },
}

impl BootstrapOutcome {
    pub fn attempts(self) -> u32 {
        match self {
            Self::Ready { attempts } | Self::Cancelled { attempts } => attempts,
        }
    }
}

/// Retry loop around a [`LinkFetcher`]
pub struct Bootstrapper {
    fetcher: Arc<dyn LinkFetcher>,
    sink: Arc<dyn LogSink>,
    backoff: BackoffPolicy,
    cancel: CancellationToken,
}

impl Bootstrapper {
    /// Create a bootstrapper with the default backoff and its own
    /// cancellation token.
    pub fn new(fetcher: Arc<dyn LinkFetcher>, sink: Arc<dyn LogSink>) -> Self {
        Self { fetcher, sink, backoff: BackoffPolicy::default(), cancel: CancellationToken::new() }
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Stop the loop when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this bootstrapper
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the loop on a new Tokio task.
    pub fn spawn(self, base_url: Url, publisher: LinkPublisher) -> JoinHandle<BootstrapOutcome> {
        tokio::spawn(self.run(base_url, publisher))
    }

    /// Fetch until success or cancellation, publishing the result exactly
    /// once.
    #[instrument(skip_all, fields(base_url = %base_url))]
    pub async fn run(self, base_url: Url, publisher: LinkPublisher) -> BootstrapOutcome {
        let mut attempts: u32 = 0;

        loop {
            let result = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Self::stop(publisher, attempts),
                result = self.fetcher.fetch(&base_url) => result,
            };
            attempts = attempts.saturating_add(1);

            match result {
                Ok(document) => {
                    let links = document.len();
                    publisher.publish(document);
                    info!(attempts, links, "api links available");
                    return BootstrapOutcome::Ready { attempts };
                }
                Err(err) => {
                    self.sink.error(&format!("{BOOTSTRAP_LOG_PREFIX} {err}"));

                    let delay = self.backoff.delay(attempts);
                    debug!(attempt = attempts, delay_ms = delay.as_millis(), "retrying link fetch");

                    tokio::select! {
                        biased;
                        () = self.cancel.cancelled() => return Self::stop(publisher, attempts),
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    fn stop(publisher: LinkPublisher, attempts: u32) -> BootstrapOutcome {
        warn!(attempts, "link bootstrap cancelled");
        publisher.cancel();
        BootstrapOutcome::Cancelled { attempts }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use linkscout_domain::{ErrorKind, FetchError, Link, LinkDocument};

    use super::*;
    use crate::bootstrap::cache::{link_cache, LinkState};

    /// Replays scripted results, then keeps returning the fallback.
    struct ScriptedFetcher {
        script: Mutex<VecDeque<Result<LinkDocument, FetchError>>>,
        fallback: Result<LinkDocument, FetchError>,
        calls: AtomicU32,
    }

    impl ScriptedFetcher {
        fn new(
            script: Vec<Result<LinkDocument, FetchError>>,
            fallback: Result<LinkDocument, FetchError>,
        ) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                fallback,
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LinkFetcher for ScriptedFetcher {
        async fn fetch(&self, _base_url: &Url) -> Result<LinkDocument, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| self.fallback.clone())
        }
    }

    #[derive(Default)]
    struct CapturingSink {
        messages: Mutex<Vec<String>>,
    }

    impl CapturingSink {
        fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl LogSink for CapturingSink {
        fn error(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    fn base_url() -> Url {
        Url::parse("http://api.example.com/").unwrap()
    }

    fn document() -> LinkDocument {
        LinkDocument::new(vec![Link::new(
            "http://example.com/swagger#!/info/health",
            Url::parse("http://example.com/v1/health").unwrap(),
        )])
    }

    fn decode_failure() -> FetchError {
        FetchError::Decode("invalid links payload: expected `:`".to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn retries_after_one_failure_and_logs_once() {
        let fetcher = ScriptedFetcher::new(vec![Err(decode_failure())], Ok(document()));
        let sink = Arc::new(CapturingSink::default());
        let (publisher, cache) = link_cache();

        let outcome = Bootstrapper::new(fetcher.clone(), sink.clone())
            .with_backoff(BackoffPolicy::fixed(Duration::from_millis(10)))
            .run(base_url(), publisher)
            .await;

        assert_eq!(outcome, BootstrapOutcome::Ready { attempts: 2 });
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(*cache.ready().await.unwrap(), document());

        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("cannot get api links:"));
        assert!(messages[0].contains("invalid links payload"));
    }

    #[tokio::test(start_paused = true)]
    async fn first_success_publishes_without_logging() {
        let fetcher = ScriptedFetcher::new(vec![], Ok(document()));
        let sink = Arc::new(CapturingSink::default());
        let (publisher, cache) = link_cache();

        let outcome = Bootstrapper::new(fetcher, sink.clone()).run(base_url(), publisher).await;

        assert_eq!(outcome.attempts(), 1);
        assert!(cache.is_ready());
        assert!(sink.messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_failure_logs_at_bounded_rate() {
        let fetcher = ScriptedFetcher::new(vec![], Err(FetchError::Transport("refused".into())));
        let sink = Arc::new(CapturingSink::default());
        let (publisher, cache) = link_cache();

        let bootstrapper = Bootstrapper::new(fetcher.clone(), sink.clone())
            .with_backoff(BackoffPolicy::fixed(Duration::from_millis(100)));
        let token = bootstrapper.cancellation_token();
        let handle = bootstrapper.spawn(base_url(), publisher);

        tokio::time::sleep(Duration::from_millis(1_000)).await;
        let logged = sink.messages().len();

        // One attempt at t=0 plus one per 100ms interval.
        assert!((9..=11).contains(&logged), "logged {logged} failures in 1s");
        assert!(cache.state().is_pending());

        token.cancel();
        let outcome = handle.await.unwrap();

        assert!(matches!(outcome, BootstrapOutcome::Cancelled { .. }));
        assert_eq!(outcome.attempts(), fetcher.calls());
        assert!(matches!(cache.state(), LinkState::Cancelled));
        assert_eq!(cache.ready().await.unwrap_err().kind(), ErrorKind::NotReady);
    }

    #[tokio::test(start_paused = true)]
    async fn default_policy_bounds_logging_under_persistent_failure() {
        let fetcher = ScriptedFetcher::new(vec![], Err(FetchError::Transport("refused".into())));
        let sink = Arc::new(CapturingSink::default());
        let (publisher, _cache) = link_cache();

        let bootstrapper = Bootstrapper::new(fetcher, sink.clone());
        let token = bootstrapper.cancellation_token();
        let handle = bootstrapper.spawn(base_url(), publisher);

        tokio::time::sleep(Duration::from_secs(60)).await;
        token.cancel();
        handle.await.unwrap();

        // Delays never drop below 500ms and grow towards 15-30s.
        let logged = sink.messages().len();
        assert!(logged >= 2, "expected retries, logged {logged}");
        assert!(logged <= 12, "logged {logged} failures in 60s");
    }

    #[tokio::test]
    async fn cancelled_before_start_never_fetches() {
        let fetcher = ScriptedFetcher::new(vec![], Ok(document()));
        let sink = Arc::new(CapturingSink::default());
        let (publisher, cache) = link_cache();
        let token = CancellationToken::new();
        token.cancel();

        let outcome = Bootstrapper::new(fetcher.clone(), sink)
            .with_cancellation(token)
            .run(base_url(), publisher)
            .await;

        assert_eq!(outcome, BootstrapOutcome::Cancelled { attempts: 0 });
        assert_eq!(fetcher.calls(), 0);
        assert!(matches!(cache.state(), LinkState::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn waiters_block_until_publication() {
        let fetcher = ScriptedFetcher::new(
            vec![Err(decode_failure()), Err(decode_failure())],
            Ok(document()),
        );
        let sink = Arc::new(CapturingSink::default());
        let (publisher, cache) = link_cache();

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.ready().await })
            })
            .collect();

        Bootstrapper::new(fetcher, sink.clone())
            .with_backoff(BackoffPolicy::fixed(Duration::from_secs(5)))
            .spawn(base_url(), publisher);

        for waiter in waiters {
            assert_eq!(*waiter.await.unwrap().unwrap(), document());
        }
        assert_eq!(sink.messages().len(), 2);
    }
}
