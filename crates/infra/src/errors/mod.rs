//! Infrastructure error conversions

pub mod conversions;

pub use conversions::InfraError;
pub(crate) use conversions::{invocation_error, IntoFetchError};
