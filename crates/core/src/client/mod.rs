//! TypeScript client and guard synthesis from the aggregate OpenAPI document.
//!
//! The pipeline mirrors the component side:
//! - `spec`: serde model of the document
//! - `normalize`: document to operations and component types
//! - `codegen`: operations to a [`TsModule`]
//! - `guards`: per-entity `is<P>`, `is<P>Response`, `from<P>Response`

mod codegen;
mod guards;
mod normalize;
mod spec;

use tracing::{debug, warn};

use crate::context::GenerationContext;
use crate::error::{ClientError, EntityFailure, GenerateError};
use crate::ts::{Emit, TsModule};

pub use codegen::{DEFAULT_BASE_URL, OPERATION_PATHS_CONST, OPERATIONS_CONST};
pub use normalize::{HttpMethod, operation_name};
pub use spec::OpenApiDocument;

/// Generated `client.ts` plus the entities whose guards were skipped.
#[derive(Debug)]
pub struct ClientSource {
    /// Emitted TypeScript.
    pub source: String,
    /// Entities without guards.
    pub failures: Vec<EntityFailure>,
}

/// Client module for `document` with guards for every entity of `ctx`.
///
/// Guards refer to the `<P>` and `<P>Response` types of the document; an
/// entity missing either is reported as a failure and gets no guards.
pub fn client_module(ctx: &GenerationContext, document: &OpenApiDocument) -> Result<(TsModule, Vec<EntityFailure>), ClientError> {
    let ir = normalize::normalize_document(document)?;
    let mut module = codegen::codegen_module(&ir);
    let mut failures = Vec::new();

    for (entity, names) in ctx.entities() {
        let missing = [&names.pascal, &names.response]
            .into_iter()
            .find(|schema| !document.has_schema(schema));
        if let Some(schema) = missing {
            warn!(entity = %entity.key, schema = %schema, "Skipping guards; schema missing from document.");
            failures.push(EntityFailure {
                entity: entity.key.clone(),
                error: GenerateError::Client(ClientError::MissingSchema {
                    entity: entity.key.clone(),
                    schema: schema.clone(),
                }),
            });
            continue;
        }
        module.functions.extend(guards::entity_guards(entity, names));
    }

    debug!(
        operations = ir.operations.len(),
        types = ir.types.len(),
        "Built client module."
    );
    Ok((module, failures))
}

/// Parse `document_source` and emit the client.
pub fn generate_client(ctx: &GenerationContext, document_source: &str) -> Result<ClientSource, ClientError> {
    let document = OpenApiDocument::parse(document_source)?;
    let (module, failures) = client_module(ctx, &document)?;
    Ok(ClientSource {
        source: module.emit(),
        failures,
    })
}

/// One callable operation of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Camel-cased, as exported by the generated client.
    pub operation_id: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template relative to the base URL.
    pub path: String,
}

/// Every operation of `document_source`, named as the generated client names them.
pub fn endpoints(document_source: &str) -> Result<Vec<Endpoint>, ClientError> {
    let document = OpenApiDocument::parse(document_source)?;
    let ir = normalize::normalize_document(&document)?;
    Ok(ir
        .operations
        .into_iter()
        .map(|op| Endpoint {
            operation_id: op.name,
            method: op.method,
            path: op.path,
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::{Map, json};

    use super::*;
    use crate::config::DocumentConfig;
    use crate::openapi::{assemble_document, entity_components, merge_components};
    use crate::schema::{SchemaGraph, parse_entity};

    fn context() -> GenerationContext {
        let tag = parse_entity(
            "tag",
            r#"{
                "info": { "singularName": "tag", "pluralName": "tags" },
                "attributes": { "label": { "type": "string", "required": true } }
            }"#,
        )
        .unwrap();
        let note = parse_entity(
            "note",
            r#"{
                "info": { "singularName": "note", "pluralName": "notes" },
                "attributes": { "body": { "type": "text" } }
            }"#,
        )
        .unwrap();
        GenerationContext::new(SchemaGraph::new([note, tag]))
    }

    fn document(ctx: &GenerationContext, with_note: bool) -> String {
        let mut components = Map::new();
        for (entity, names) in ctx.entities() {
            if entity.key == "note" && !with_note {
                continue;
            }
            merge_components(&mut components, entity_components(ctx, entity, names));
        }
        let mut paths = Map::new();
        paths.insert(
            "/tags/{id}".into(),
            json!({
                "get": {
                    "operationId": "get/tags/{id}",
                    "parameters": [{ "name": "id", "in": "path", "required": true, "schema": { "type": "number" } }],
                    "responses": { "200": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/TagResponse" } } } } }
                }
            }),
        );
        paths.insert(
            "/tags".into(),
            json!({ "get": { "operationId": "get/tags" }, "post": { "operationId": "post/tags" } }),
        );
        assemble_document(&DocumentConfig::default(), &components, paths).to_string()
    }

    #[test]
    fn client_carries_types_operations_and_guards() {
        let ctx = context();
        let client = generate_client(&ctx, &document(&ctx, true)).unwrap();

        assert!(client.failures.is_empty());
        assert!(client.source.contains("export interface Tag {\n  label: string;\n}\n"));
        assert!(client.source.contains("export interface TagResponse {"));
        assert!(client.source.contains("export async function getTagsId("));
        assert!(client.source.contains("export function isTag(o: any): o is Tag {"));
        assert!(client.source.contains("export function fromNoteResponse(data: any)"));
        assert!(client.source.contains("export const operations = { getTags, postTags, getTagsId };"));
    }

    #[test]
    fn entities_missing_from_the_document_get_no_guards() {
        let ctx = context();
        let client = generate_client(&ctx, &document(&ctx, false)).unwrap();

        assert_eq!(client.failures.len(), 1);
        assert_eq!(client.failures[0].entity, "note");
        assert!(matches!(
            &client.failures[0].error,
            GenerateError::Client(ClientError::MissingSchema { schema, .. }) if schema == "Note"
        ));
        assert!(!client.source.contains("isNote"));
        assert!(client.source.contains("export function isTag("));
    }

    #[test]
    fn endpoints_use_client_names() {
        let ctx = context();
        let endpoints = endpoints(&document(&ctx, true)).unwrap();
        assert_eq!(
            endpoints[2],
            Endpoint {
                operation_id: "getTagsId".into(),
                method: HttpMethod::Get,
                path: "/tags/{id}".into(),
            }
        );
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let ctx = context();
        assert!(matches!(
            generate_client(&ctx, "{ not json"),
            Err(ClientError::Parse(_))
        ));
    }
}
