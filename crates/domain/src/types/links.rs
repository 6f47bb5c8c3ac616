//! Hypermedia link types
//!
//! A [`LinkDocument`] is the decoded root resource of the remote API: an
//! ordered list of `(rel, href)` pairs. Documents are immutable once built.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::FetchError;

/// A single navigable link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    rel: String,
    href: Url,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: Url) -> Self {
        Self { rel: rel.into(), href }
    }

    /// Relation identifier, either a short token (`self`) or a namespaced URI.
    pub fn rel(&self) -> &str {
        &self.rel
    }

    pub fn href(&self) -> &Url {
        &self.href
    }
}

/// Ordered, possibly empty sequence of links.
///
/// Relations are not required to be unique. Lookups always return the first
/// match in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDocument {
    links: Vec<Link>,
}

impl LinkDocument {
    pub fn new(links: Vec<Link>) -> Self {
        Self { links }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Link> {
        self.links.iter()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Relations in document order, duplicates included.
    pub fn relations(&self) -> Vec<String> {
        self.links.iter().map(|link| link.rel.clone()).collect()
    }

    /// Decode a links payload fetched from `source`.
    ///
    /// Relative hrefs are resolved against `source`.
    ///
    /// # Errors
    /// Returns [`FetchError::Decode`] when the body is not a links payload or
    /// an href cannot be parsed.
    pub fn from_json_slice(body: &[u8], source: &Url) -> Result<Self, FetchError> {
        let payload: LinksPayload = serde_json::from_slice(body)
            .map_err(|e| FetchError::Decode(format!("invalid links payload: {e}")))?;
        payload.into_document(source)
    }
}

impl<'a> IntoIterator for &'a LinkDocument {
    type Item = &'a Link;
    type IntoIter = std::slice::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

/// Wire representation of the root resource: `{"links": [{"href", "rel"}]}`.
///
/// A missing or `null` `links` field decodes as an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinksPayload {
    #[serde(default)]
    pub links: Option<Vec<RawLink>>,
}

/// Undecoded link as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLink {
    pub href: String,
    pub rel: String,
}

impl LinksPayload {
    /// Convert into a [`LinkDocument`], preserving link order.
    ///
    /// # Errors
    /// Returns [`FetchError::Decode`] for the first href that is not a valid
    /// URL (absolute, or relative to `source`).
    pub fn into_document(self, source: &Url) -> Result<LinkDocument, FetchError> {
        let links = self
            .links
            .unwrap_or_default()
            .into_iter()
            .map(|raw| {
                let href = source.join(&raw.href).map_err(|e| {
                    FetchError::Decode(format!(
                        "invalid href {:?} for rel {:?}: {e}",
                        raw.href, raw.rel
                    ))
                })?;
                Ok(Link { rel: raw.rel, href })
            })
            .collect::<Result<Vec<_>, FetchError>>()?;

        Ok(LinkDocument { links })
    }
}
