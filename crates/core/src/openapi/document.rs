//! The aggregate document.

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::config::DocumentConfig;

/// OpenAPI 3.0 skeleton with the shared `Error` and `ListResponseMeta`
/// schemas and an empty `paths` map.
pub fn base_document(config: &DocumentConfig) -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {
            "version": config.version,
            "title": config.title,
            "description": config.description,
        },
        "servers": [
            { "url": config.server_url, "description": config.server_description }
        ],
        "security": [ { "bearerAuth": [] } ],
        "components": {
            "securitySchemes": {
                "bearerAuth": { "type": "http", "scheme": "bearer", "bearerFormat": "JWT" }
            },
            "schemas": {
                "Error": {
                    "type": "object",
                    "required": ["error"],
                    "properties": {
                        "data": {
                            "nullable": true,
                            "oneOf": [
                                { "type": "object" },
                                { "type": "array", "items": { "type": "object" } }
                            ]
                        },
                        "error": {
                            "type": "object",
                            "properties": {
                                "status": { "type": "integer" },
                                "name": { "type": "string" },
                                "message": { "type": "string" },
                                "details": { "type": "object" }
                            }
                        }
                    }
                },
                "ListResponseMeta": {
                    "type": "object",
                    "properties": {
                        "pagination": {
                            "properties": {
                                "page": { "type": "integer" },
                                "pageSize": { "type": "integer", "minimum": 25 },
                                "pageCount": { "type": "integer", "maximum": 1 },
                                "total": { "type": "integer" }
                            }
                        }
                    }
                }
            }
        },
        "paths": {}
    })
}

/// Merge `components` into `target`; a later schema replaces an earlier one
/// of the same name.
pub fn merge_components(target: &mut Map<String, Value>, components: Map<String, Value>) {
    for (name, schema) in components {
        if target.insert(name.clone(), schema).is_some() {
            debug!(schema = %name, "Component schema replaced by a later definition.");
        }
    }
}

/// Base document + entity components + path items.
pub fn assemble_document(
    config: &DocumentConfig,
    components: &Map<String, Value>,
    paths: Map<String, Value>,
) -> Value {
    let mut document = base_document(config);

    if let Some(Value::Object(schemas)) = document.pointer_mut("/components/schemas") {
        merge_components(schemas, components.clone());
    }
    if let Some(slot) = document.get_mut("paths") {
        *slot = Value::Object(paths);
    }

    document
}
