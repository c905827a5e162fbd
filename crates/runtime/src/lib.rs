//! Runtime side of the generated client: operators resolved from an explicit
//! registry, called over HTTP and cached per operation and parameters.

pub mod cache;
pub mod error;
pub mod key;
pub mod operator;
pub mod transport;

pub use cache::{Resource, ResourceCache};
pub use error::{OperatorError, TransportError};
pub use key::{CacheKey, stable_parameters};
pub use operator::{ApiResponse, Operator, OperatorRegistry, handle_response};
pub use transport::{BODY_PARAMETER, HttpOperator, HttpTransport};
