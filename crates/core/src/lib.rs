//! contentgen core: from Strapi content-type schemas to components, an
//! OpenAPI document and a typed client.
//!
//! A run loads the [`schema::SchemaGraph`], derives one
//! [`context::GenerationContext`] from it and hands that context to each
//! synthesizer. [`pipeline::Generator`] wires the stages to the filesystem.

pub mod client;
pub mod components;
pub mod config;
pub mod context;
pub mod error;
pub mod openapi;
pub mod pipeline;
pub mod resolve;
pub mod schema;
pub mod ts;

pub use config::{ConfigError, GeneratorConfig};
pub use context::{EntityNames, GenerationContext, Warning};
pub use error::{ClientError, EntityFailure, GenerateError, SchemaError};
pub use pipeline::{Action, Generator, RunReport};
