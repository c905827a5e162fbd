//! Error taxonomy for schema loading and artifact generation.

use std::io;
use std::path::PathBuf;

use contentgen_common::PersistError;
use thiserror::Error;

/// Failures while building the schema graph.
///
/// Loading is all-or-nothing: any of these aborts the run for that root.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema root is missing.
    #[error("schema root {} does not exist or is not a directory", .path.display())]
    MissingSchemaRoot {
        /// Expected directory.
        path: PathBuf,
    },

    /// The schema root could not be listed.
    #[error("failed to read schema root {}: {source}", .path.display())]
    ReadRoot {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },

    /// An entity directory has no `schema.json`.
    #[error("entity `{entity}` has no schema description at {}", .path.display())]
    MissingSchemaFile {
        /// Entity directory name.
        entity: String,
        /// Expected file.
        path: PathBuf,
    },

    /// A schema file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },

    /// A schema file is not valid JSON for a content type.
    #[error("invalid schema description {}: {source}", .path.display())]
    InvalidSchema {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },

    /// An attribute failed validation.
    #[error("attribute `{attribute}` of entity `{entity}` is invalid: {reason}")]
    InvalidAttribute {
        /// Owning entity.
        entity: String,
        /// Attribute name.
        attribute: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A documentation fragment is not valid JSON.
    #[error("invalid documentation fragment {}: {source}", .path.display())]
    InvalidFragment {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },

    /// A loader task panicked or was cancelled.
    #[error("schema loading task failed: {0}")]
    Task(String),
}

/// Failures while turning the aggregate document into client source.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The document is not valid OpenAPI JSON.
    #[error("failed to parse OpenAPI document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two operations resolve to the same name.
    #[error("duplicate operation id `{0}`; each operation must have a unique identifier")]
    DuplicateOperation(String),

    /// The document lacks a component the guards need.
    #[error("document has no `{schema}` schema for entity `{entity}`; guards not generated")]
    MissingSchema {
        /// Entity the guards are for.
        entity: String,
        /// Component name looked up.
        schema: String,
    },
}

/// Failures of a generation stage.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Loading the schema failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Persisting an artifact failed.
    #[error(transparent)]
    Persist(#[from] PersistError),

    /// Client synthesis failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A component template did not render.
    #[error("failed to render component `{component}`: {source}")]
    Template {
        /// Component name.
        component: String,
        /// Template failure.
        #[source]
        source: tera::Error,
    },

    /// An artifact did not serialize.
    #[error("failed to serialize {what}: {source}")]
    Serialize {
        /// Artifact being serialized.
        what: String,
        /// Serialization failure.
        #[source]
        source: serde_json::Error,
    },

    /// The client stage ran before the document existed.
    #[error("aggregate OpenAPI document not found at {}; run the api-documentation stage first", .path.display())]
    MissingDocument {
        /// Expected document location.
        path: PathBuf,
    },

    /// An input file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },

    /// A generation task panicked or was cancelled.
    #[error("generation task failed: {0}")]
    Task(String),
}

/// One entity's synthesis failed; siblings are unaffected.
#[derive(Debug)]
pub struct EntityFailure {
    /// Entity key.
    pub entity: String,
    /// What went wrong.
    pub error: GenerateError,
}

impl std::fmt::Display for EntityFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.entity, self.error)
    }
}
