//! Link resolution
//!
//! Maps a relation to its href within a [`LinkDocument`]. Resolution is pure:
//! it never mutates the document and never performs I/O.

use url::Url;

use crate::errors::ResolutionError;
use crate::types::{Link, LinkDocument};

/// Return the href of the first link whose relation equals `rel`.
///
/// # Errors
/// Returns [`ResolutionError`] naming `rel` and every relation searched when
/// no link matches.
pub fn resolve(document: &LinkDocument, rel: &str) -> Result<Url, ResolutionError> {
    find(document, rel, |link| link.rel() == rel)
}

/// Like [`resolve`], but a namespaced relation also matches when it ends in
/// `/<rel>`.
///
/// `info/health` matches both `info/health` and
/// `http://example.com/swagger#!/info/health`. The first match in document
/// order wins, whichever form it has.
///
/// # Errors
/// Returns [`ResolutionError`] when no link matches.
pub fn resolve_namespaced(document: &LinkDocument, rel: &str) -> Result<Url, ResolutionError> {
    let suffix = format!("/{rel}");
    find(document, rel, |link| link.rel() == rel || link.rel().ends_with(&suffix))
}

fn find<F>(document: &LinkDocument, rel: &str, matches: F) -> Result<Url, ResolutionError>
where
    F: Fn(&Link) -> bool,
{
    document.iter().find(|link| matches(link)).map(|link| link.href().clone()).ok_or_else(|| {
        ResolutionError { rel: rel.to_string(), relations: document.relations() }
    })
}
