//! Conversions from external infrastructure errors into domain errors.

use std::error::Error as StdError;

use linkscout_domain::{ClientError, FetchError};
use reqwest::Error as HttpError;
use url::Url;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ClientError);

impl From<InfraError> for ClientError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ClientError> for InfraError {
    fn from(value: ClientError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → FetchError / ClientError */
/* -------------------------------------------------------------------------- */

/// Extension trait to make the conversion of a failed link fetch explicit.
pub(crate) trait IntoFetchError {
    fn into_fetch_error(self) -> FetchError;
}

impl IntoFetchError for HttpError {
    fn into_fetch_error(self) -> FetchError {
        FetchError::Transport(describe_transport_error(&self))
    }
}

/// Human-readable cause of a transport failure, including its source chain.
pub(crate) fn describe_transport_error(err: &HttpError) -> String {
    let kind = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else if err.is_body() || err.is_decode() {
        "failed to read response body"
    } else if err.is_redirect() {
        "too many redirects"
    } else {
        "request failed"
    };

    let mut message = format!("{kind}: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Classify a failed action or health request.
pub(crate) fn invocation_error(url: &Url, err: &HttpError) -> ClientError {
    ClientError::Invocation {
        url: url.clone(),
        status: err.status().map(|status| status.as_u16()),
        cause: describe_transport_error(err),
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(ClientError::Config(format!(
            "failed to build HTTP client: {}",
            describe_transport_error(&value)
        )))
    }
}

/* -------------------------------------------------------------------------- */
/* configuration formats → ClientError::Config */
/* -------------------------------------------------------------------------- */

impl From<url::ParseError> for InfraError {
    fn from(value: url::ParseError) -> Self {
        InfraError(ClientError::Config(format!("invalid URL: {value}")))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(ClientError::Config(format!("Invalid TOML format: {value}")))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(ClientError::Config(format!("Invalid JSON format: {value}")))
    }
}

impl From<reqwest::header::InvalidHeaderValue> for InfraError {
    fn from(value: reqwest::header::InvalidHeaderValue) -> Self {
        InfraError(ClientError::Config(format!("invalid header value: {value}")))
    }
}
