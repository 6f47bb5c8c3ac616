//! Write-once link cache
//!
//! The cache moves through `Pending -> Ready` or `Pending -> Cancelled` and
//! never changes again. [`LinkPublisher`] is the only writer and is consumed
//! by its single write, so a second write cannot be expressed. Readers share
//! the document through an `Arc` and need no lock once it is published.

use std::sync::Arc;

use linkscout_domain::{ClientError, LinkDocument, Result};
use tokio::sync::watch;

/// Bootstrap state observed by readers
#[derive(Debug, Clone)]
pub enum LinkState {
    /// No document yet; the bootstrap is still running
    Pending,
    /// The document was fetched
    Ready(Arc<LinkDocument>),
    /// The bootstrap stopped before a document was fetched
    Cancelled,
}

impl LinkState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Create a connected publisher/cache pair in the `Pending` state.
pub fn link_cache() -> (LinkPublisher, LinkCache) {
    let (tx, rx) = watch::channel(LinkState::Pending);
    (LinkPublisher { tx }, LinkCache { rx })
}

/// Single writer of a [`LinkCache`]
#[derive(Debug)]
pub struct LinkPublisher {
    tx: watch::Sender<LinkState>,
}

impl LinkPublisher {
    /// Store the fetched document and wake every waiting reader.
    pub fn publish(self, document: LinkDocument) -> Arc<LinkDocument> {
        let document = Arc::new(document);
        self.tx.send_replace(LinkState::Ready(Arc::clone(&document)));
        document
    }

    /// Mark the bootstrap as stopped without a document.
    pub fn cancel(self) {
        self.tx.send_replace(LinkState::Cancelled);
    }
}

/// Read side of the link cache; cheap to clone.
#[derive(Debug, Clone)]
pub struct LinkCache {
    rx: watch::Receiver<LinkState>,
}

impl LinkCache {
    /// Snapshot of the current state
    pub fn state(&self) -> LinkState {
        self.rx.borrow().clone()
    }

    /// The document if it has been published, without waiting.
    pub fn current(&self) -> Option<Arc<LinkDocument>> {
        match &*self.rx.borrow() {
            LinkState::Ready(document) => Some(Arc::clone(document)),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.rx.borrow().is_ready()
    }

    /// Wait until the document is published.
    ///
    /// # Errors
    /// Returns `ClientError::NotReady` if the bootstrap was cancelled or its
    /// publisher was dropped without writing.
    pub async fn ready(&self) -> Result<Arc<LinkDocument>> {
        let mut rx = self.rx.clone();
        let state = {
            let guard = rx.wait_for(|state| !state.is_pending()).await.map_err(|_| {
                ClientError::NotReady("link bootstrap stopped before links were fetched".into())
            })?;
            guard.clone()
        };

        match state {
            LinkState::Ready(document) => Ok(document),
            LinkState::Pending | LinkState::Cancelled => {
                Err(ClientError::NotReady("link bootstrap was cancelled".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use linkscout_domain::{ErrorKind, Link, Url};

    use super::*;

    fn document() -> LinkDocument {
        LinkDocument::new(vec![Link::new("self", Url::parse("http://example.com/v1").unwrap())])
    }

    #[test]
    fn starts_pending() {
        let (_publisher, cache) = link_cache();

        assert!(cache.state().is_pending());
        assert!(cache.current().is_none());
        assert!(!cache.is_ready());
    }

    #[tokio::test]
    async fn publish_makes_document_visible() {
        let (publisher, cache) = link_cache();

        let published = publisher.publish(document());

        assert!(cache.is_ready());
        let current = cache.current().unwrap();
        assert!(Arc::ptr_eq(&current, &published));
        assert_eq!(*cache.ready().await.unwrap(), document());
    }

    #[tokio::test]
    async fn concurrent_waiters_all_observe_the_same_document() {
        let (publisher, cache) = link_cache();

        let waiters: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.ready().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(10)).await;
        let published = publisher.publish(document());

        for waiter in waiters {
            let seen = waiter.await.unwrap().unwrap();
            assert!(Arc::ptr_eq(&seen, &published));
        }
    }

    #[tokio::test]
    async fn cancelled_bootstrap_reports_not_ready() {
        let (publisher, cache) = link_cache();
        let waiter = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.ready().await })
        };

        publisher.cancel();

        let err = waiter.await.unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotReady);
        assert!(matches!(cache.state(), LinkState::Cancelled));
    }

    #[tokio::test]
    async fn dropped_publisher_reports_not_ready() {
        let (publisher, cache) = link_cache();
        drop(publisher);

        let err = cache.ready().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotReady);
    }

    #[tokio::test]
    async fn published_document_survives_dropped_publisher() {
        let (publisher, cache) = link_cache();
        publisher.publish(document());

        assert!(cache.ready().await.is_ok());
    }
}
