//! Operators and the explicit registry the cache resolves them from.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use contentgen_common::camel_case;
use contentgen_core::ClientError;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::Value;
use tracing::debug;

use crate::error::{OperatorError, TransportError};
use crate::transport::HttpTransport;

/// Status and decoded payload of one API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded JSON body, or the raw text when it is not JSON.
    pub data: Value,
}

/// One callable API operation.
pub trait Operator: Send + Sync {
    /// Start the call. Nothing is sent until the future is polled.
    fn call(&self, parameters: Value) -> BoxFuture<'static, Result<ApiResponse, TransportError>>;
}

impl<F, Fut> Operator for F
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ApiResponse, TransportError>> + Send + 'static,
{
    fn call(&self, parameters: Value) -> BoxFuture<'static, Result<ApiResponse, TransportError>> {
        self(parameters).boxed()
    }
}

/// 2xx payloads resolve, anything else is rejected with the payload as detail.
pub fn handle_response(response: ApiResponse) -> Result<Value, OperatorError> {
    if (200..300).contains(&response.status) {
        Ok(response.data)
    } else {
        Err(OperatorError::Rejected {
            status: response.status,
            detail: response.data,
        })
    }
}

/// Operation id to operator, keyed by camel-cased id.
#[derive(Default, Clone)]
pub struct OperatorRegistry {
    operators: BTreeMap<String, Arc<dyn Operator>>,
}

impl fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("operations", &self.operators.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl OperatorRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// One HTTP operator per operation of an OpenAPI document.
    pub fn from_document(document: &str, transport: &HttpTransport) -> Result<Self, ClientError> {
        let mut registry = Self::new();
        for endpoint in contentgen_core::client::endpoints(document)? {
            let id = endpoint.operation_id.clone();
            registry.register(&id, transport.operator(endpoint));
        }
        debug!(operations = registry.len(), "Built operator registry from document.");
        Ok(registry)
    }

    /// Register `operator`, replacing any operator under the same id.
    pub fn register(&mut self, operation_id: &str, operator: impl Operator + 'static) -> &mut Self {
        self.operators
            .insert(camel_case(operation_id), Arc::new(operator));
        self
    }

    /// Operator for `operation_id`, in any casing.
    pub fn get(&self, operation_id: &str) -> Option<Arc<dyn Operator>> {
        self.operators.get(&camel_case(operation_id)).cloned()
    }

    /// True when an operator is registered for `operation_id`.
    pub fn contains(&self, operation_id: &str) -> bool {
        self.operators.contains_key(&camel_case(operation_id))
    }

    /// Number of registered operators.
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}
