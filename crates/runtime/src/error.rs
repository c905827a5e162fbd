//! Transport and operator failures.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

/// Failures while talking to the API.
///
/// Clone so that every awaiter of a shared fetch gets the same error.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The base URL does not parse.
    #[error("invalid base url `{url}`: {source}")]
    InvalidBaseUrl {
        /// Rejected input.
        url: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },

    /// The base URL is opaque, like `mailto:`.
    #[error("base url `{0}` cannot carry a path")]
    OpaqueBaseUrl(String),

    /// A `{placeholder}` of the path had no value.
    #[error("operation `{operation_id}` needs path parameter `{name}`")]
    MissingPathParameter {
        /// Operation being called.
        operation_id: String,
        /// Placeholder without a value.
        name: String,
    },

    /// reqwest failed to send or read.
    #[error("request failed: {0}")]
    Request(#[source] Arc<reqwest::Error>),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Request(Arc::new(err))
    }
}

/// Failures resolving or running an operator.
#[derive(Debug, Clone, Error)]
pub enum OperatorError {
    /// No operator is registered for the operation.
    #[error("operator `{operation_id}` not found with parameters: {parameters}")]
    OperatorNotFound {
        /// Operation that was asked for.
        operation_id: String,
        /// Parameters it was asked with.
        parameters: Value,
    },

    /// The API answered with a non-2xx status.
    #[error("request rejected with status {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response payload.
        detail: Value,
    },

    /// The call itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
