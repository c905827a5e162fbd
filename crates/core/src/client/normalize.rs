//! OpenAPI document to client IR.
//!
//! Every OpenAPI corner the client cares about is settled here; codegen only
//! sees operations with resolved names, parameter types and payload types.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use contentgen_common::pascal_case;
use serde_json::Value;

use crate::error::ClientError;
use crate::ts::ident::{needs_quoting, sanitize_identifier};
use crate::ts::{TsLiteral, TsPrimitive, TsProp, TsType, TsTypeDef, TypeDefKind};

use super::spec::{
    AdditionalProperties, MediaType, OpenApiDocument, Operation, Parameter, Schema,
};

/// Methods the client generates calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case method name.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether the remaining parameters travel in the query string.
    pub fn has_query(self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path or query parameter of an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamIr {
    /// Name as it appears in the path or query.
    pub name: String,
    /// Value type.
    pub ty: TsType,
    /// Path parameters are always required.
    pub required: bool,
}

/// One operation, ready for codegen.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationIr {
    /// Camel-cased identifier of the generated function.
    pub name: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template with `{placeholders}`.
    pub path: String,
    /// Emitted as the function's doc comment.
    pub summary: Option<String>,
    /// Placeholders of `path`, in order.
    pub path_params: Vec<ParamIr>,
    /// Query parameters.
    pub query_params: Vec<ParamIr>,
    /// JSON request payload, if any.
    pub body: Option<TsType>,
    /// Payload of the first 2xx response.
    pub response: TsType,
}

impl OperationIr {
    /// True when the `params` argument cannot be omitted.
    pub fn params_required(&self) -> bool {
        !self.path_params.is_empty() || self.query_params.iter().any(|p| p.required)
    }
}

/// Everything codegen needs from one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientIr {
    /// URL of the first server.
    pub base_url: Option<String>,
    /// One declaration per component schema.
    pub types: Vec<TsTypeDef>,
    /// Operations in emission order.
    pub operations: Vec<OperationIr>,
}

/// Normalize a parsed document. Paths are visited in sorted order and, within
/// a path, GET, POST, PUT, PATCH, DELETE.
pub fn normalize_document(document: &OpenApiDocument) -> Result<ClientIr, ClientError> {
    let mut operations = Vec::new();
    let mut seen = HashSet::new();

    for (path, item) in &document.paths {
        for (method, operation) in [
            (HttpMethod::Get, item.get.as_ref()),
            (HttpMethod::Post, item.post.as_ref()),
            (HttpMethod::Put, item.put.as_ref()),
            (HttpMethod::Patch, item.patch.as_ref()),
            (HttpMethod::Delete, item.delete.as_ref()),
        ] {
            let Some(operation) = operation else {
                continue;
            };
            let ir = normalize_operation(path, method, operation, &item.parameters);
            if !seen.insert(ir.name.clone()) {
                return Err(ClientError::DuplicateOperation(ir.name));
            }
            operations.push(ir);
        }
    }

    let types = document
        .components
        .schemas
        .iter()
        .map(|(name, schema)| schema_type_def(name, schema))
        .collect();

    Ok(ClientIr {
        base_url: document.servers.first().map(|server| server.url.clone()),
        types,
        operations,
    })
}

/// Function name for an operation: its camel-cased `operationId`, or method
/// and path when the id is absent.
pub fn operation_name(method: HttpMethod, path: &str, operation_id: Option<&str>) -> String {
    match operation_id {
        Some(id) => sanitize_identifier(id),
        None => sanitize_identifier(&format!("{} {path}", method.as_str().to_lowercase())),
    }
}

fn normalize_operation(
    path: &str,
    method: HttpMethod,
    operation: &Operation,
    shared: &[Parameter],
) -> OperationIr {
    // Operation-level parameters override path-level ones of the same name and location.
    let mut params: Vec<&Parameter> = shared
        .iter()
        .filter(|p| {
            !operation
                .parameters
                .iter()
                .any(|o| o.name == p.name && o.location == p.location)
        })
        .collect();
    params.extend(operation.parameters.iter());

    let to_ir = |p: &&Parameter| ParamIr {
        name: p.name.clone(),
        ty: p
            .schema
            .as_ref()
            .map(schema_type)
            .unwrap_or(TsType::Primitive(TsPrimitive::String)),
        required: p.required || p.location == "path",
    };
    let path_params = params.iter().filter(|p| p.location == "path").map(to_ir).collect();
    let query_params = params.iter().filter(|p| p.location == "query").map(to_ir).collect();

    let body = operation
        .request_body
        .as_ref()
        .and_then(|body| json_schema(&body.content))
        .map(schema_type);

    let response = operation
        .responses
        .iter()
        .find(|(status, _)| status.starts_with('2'))
        .and_then(|(_, response)| json_schema(&response.content))
        .map(schema_type)
        .unwrap_or(TsType::Primitive(TsPrimitive::Unknown));

    OperationIr {
        name: operation_name(method, path, operation.operation_id.as_deref()),
        method,
        path: path.to_string(),
        summary: operation.summary.clone(),
        path_params,
        query_params,
        body,
        response,
    }
}

/// `application/json` schema, else the first media type's.
fn json_schema(content: &BTreeMap<String, MediaType>) -> Option<&Schema> {
    content
        .get("application/json")
        .or_else(|| content.values().next())
        .and_then(|media| media.schema.as_ref())
}

/// TypeScript name for a component schema.
pub fn type_name(schema_name: &str) -> String {
    if needs_quoting(schema_name) {
        pascal_case(schema_name)
    } else {
        schema_name.to_string()
    }
}

fn schema_type_def(name: &str, schema: &Schema) -> TsTypeDef {
    let name = type_name(name);
    let is_plain_object = !schema.properties.is_empty()
        && schema.all_of.is_empty()
        && schema.one_of.is_empty()
        && schema.any_of.is_empty()
        && !schema.nullable;

    let kind = if is_plain_object {
        TypeDefKind::Interface {
            properties: object_props(schema),
        }
    } else {
        TypeDefKind::TypeAlias {
            ty: schema_type(schema),
        }
    };
    TsTypeDef { name, kind }
}

fn object_props(schema: &Schema) -> Vec<TsProp> {
    schema
        .properties
        .iter()
        .map(|(name, prop)| TsProp {
            name: name.clone(),
            ty: schema_type(prop),
            optional: !schema.required.contains(name),
        })
        .collect()
}

fn enum_literal(value: &Value) -> TsType {
    match value {
        Value::String(s) => TsType::Literal(TsLiteral::String(s.clone())),
        Value::Bool(b) => TsType::Literal(TsLiteral::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => TsType::Literal(TsLiteral::Int(i)),
            None => TsType::Literal(TsLiteral::Number(n.as_f64().unwrap_or_default())),
        },
        Value::Null => TsType::Primitive(TsPrimitive::Null),
        Value::Array(_) | Value::Object(_) => TsType::Primitive(TsPrimitive::Unknown),
    }
}

/// TypeScript type for a schema.
pub fn schema_type(schema: &Schema) -> TsType {
    let ty = base_type(schema);
    if schema.nullable { ty.nullable() } else { ty }
}

fn base_type(schema: &Schema) -> TsType {
    if let Some(name) = schema.ref_name() {
        return TsType::named(type_name(name));
    }
    if !schema.all_of.is_empty() {
        return TsType::Intersection(schema.all_of.iter().map(schema_type).collect());
    }
    let variants = if schema.one_of.is_empty() {
        &schema.any_of
    } else {
        &schema.one_of
    };
    if !variants.is_empty() {
        return TsType::Union(variants.iter().map(schema_type).collect());
    }
    if !schema.enum_values.is_empty() {
        return TsType::Union(schema.enum_values.iter().map(enum_literal).collect());
    }

    match schema.schema_type.as_deref() {
        Some("string") => TsType::Primitive(TsPrimitive::String),
        Some("integer" | "number") => TsType::Primitive(TsPrimitive::Number),
        Some("boolean") => TsType::Primitive(TsPrimitive::Boolean),
        Some("array") => TsType::Array(Box::new(
            schema
                .items
                .as_deref()
                .map(schema_type)
                .unwrap_or(TsType::Primitive(TsPrimitive::Unknown)),
        )),
        Some("object") | None if !schema.properties.is_empty() => TsType::Object(object_props(schema)),
        Some("object") => match &schema.additional_properties {
            Some(AdditionalProperties::Schema(values)) => TsType::Record {
                key: Box::new(TsType::Primitive(TsPrimitive::String)),
                value: Box::new(schema_type(values)),
            },
            _ => TsType::unknown_record(),
        },
        _ => TsType::Primitive(TsPrimitive::Unknown),
    }
}
