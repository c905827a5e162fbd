//! On-disk layout of the schema input and the generated output.

use std::path::{Path, PathBuf};

/// Schema root relative to the Strapi project directory.
pub const SCHEMA_ROOT: &str = "src/api";

/// Documentation version directory used by the Strapi documentation plugin.
pub const DOCUMENTATION_VERSION: &str = "1.0.0";

/// Per-entity OpenAPI component files, relative to the documentation output.
pub const COMPONENT_SCHEMAS_DIR: &str = "components";

/// Aggregated component schemas.
pub const COMPONENTS_FILE: &str = "components.json";

/// Aggregated OpenAPI document consumed by the client stage.
pub const OPENAPI_DOC_FILE: &str = "openapi-doc.json";

/// Generated client source.
pub const CLIENT_FILE: &str = "client.ts";

/// Runtime resource cache module copied next to the client.
pub const RUNTIME_FILE: &str = "apiResource.ts";

/// Component index file name.
pub const INDEX_FILE: &str = "index.tsx";

/// Directory holding the attribute-level components of one entity.
pub const ATTRIBUTES_DIR: &str = "Attributes";

/// `<root>/<key>/content-types/<key>/schema.json`
pub fn schema_file(root: &Path, key: &str) -> PathBuf {
    root.join(key)
        .join("content-types")
        .join(key)
        .join("schema.json")
}

/// `<root>/<key>/documentation/1.0.0/<key>.json`
pub fn documentation_file(root: &Path, key: &str) -> PathBuf {
    root.join(key)
        .join("documentation")
        .join(DOCUMENTATION_VERSION)
        .join(format!("{key}.json"))
}
