//! Error types used throughout linkscout
//!
//! Three layers of error exist:
//! - [`FetchError`]: one failed attempt to download the link document. Only
//!   ever logged and retried by the bootstrapper.
//! - [`ResolutionError`]: a relation is absent from a fetched document.
//! - [`ClientError`]: everything a caller of the client can observe. Callers
//!   branch on [`ClientError::kind`], never on the message text.

use std::fmt;

use thiserror::Error;
use url::Url;

/// A single failed attempt to fetch the link document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("{url} returned status {status}")]
    Status { url: Url, status: u16 },

    #[error("{0}")]
    Decode(String),
}

/// No link with the requested relation exists in the document.
///
/// The message format is a stable contract:
/// `could not find link with rel "<rel>" in [<relations>]`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not find link with rel \"{rel}\" in {relations:?}")]
pub struct ResolutionError {
    /// Relation that was requested
    pub rel: String,
    /// Every relation searched, in document order
    pub relations: Vec<String>,
}

/// Caller-facing client error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The action target answered 404.
    #[error("Resource not found at {url}")]
    NotFound { url: Url },

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Any other failed action or health call.
    #[error("request to {url} failed: {cause}")]
    Invocation { url: Url, status: Option<u16>, cause: String },

    /// Links are not available because the bootstrap stopped before success.
    #[error("links are not available: {0}")]
    NotReady(String),

    #[error("no take action url has been set")]
    MissingActionUrl,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Discriminant of [`ClientError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Resolution,
    Fetch,
    Invocation,
    NotReady,
    Config,
}

impl ClientError {
    /// Get the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Resolution(_) => ErrorKind::Resolution,
            Self::Fetch(_) => ErrorKind::Fetch,
            Self::Invocation { .. } => ErrorKind::Invocation,
            Self::NotReady(_) => ErrorKind::NotReady,
            Self::MissingActionUrl | Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Build an invocation error from a non-success status.
    pub fn from_status(url: Url, status: u16, reason: Option<&str>) -> Self {
        let cause = match reason {
            Some(reason) => format!("status {status} {reason}"),
            None => format!("status {status}"),
        };
        Self::Invocation { url, status: Some(status), cause }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Invocation { status, .. } => *status,
            Self::Fetch(FetchError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

impl ErrorKind {
    /// Whether waiting and trying again can change the outcome.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Fetch | Self::NotReady)
    }

    /// Stable label suitable for logging fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Resolution => "resolution",
            Self::Fetch => "fetch",
            Self::Invocation => "invocation",
            Self::NotReady => "not_ready",
            Self::Config => "config",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type alias for linkscout operations
pub type Result<T> = std::result::Result<T, ClientError>;
