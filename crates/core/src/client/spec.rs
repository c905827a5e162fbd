//! The subset of OpenAPI 3.0 the client generator reads.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Parsed OpenAPI document. Unknown keys are ignored.
#[derive(Debug, Deserialize)]
pub struct OpenApiDocument {
    /// The first server supplies the client's base URL.
    #[serde(default)]
    pub servers: Vec<Server>,
    /// Path template to path item, in sorted order.
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    /// `components` section.
    #[serde(default)]
    pub components: Components,
}

/// Entry of `servers`.
#[derive(Debug, Deserialize)]
pub struct Server {
    /// Base URL.
    pub url: String,
}

/// `components`; only schemas matter here.
#[derive(Debug, Default, Deserialize)]
pub struct Components {
    /// Named component schemas.
    #[serde(default)]
    pub schemas: BTreeMap<String, Schema>,
}

/// Operations of one path, by method.
#[derive(Debug, Deserialize)]
pub struct PathItem {
    /// `get`
    pub get: Option<Operation>,
    /// `post`
    pub post: Option<Operation>,
    /// `put`
    pub put: Option<Operation>,
    /// `patch`
    pub patch: Option<Operation>,
    /// `delete`
    pub delete: Option<Operation>,
    /// Shared by every operation of the path.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

/// One operation of a path item.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// `operationId`; derived from method and path when absent.
    pub operation_id: Option<String>,
    /// Becomes the doc comment of the generated function.
    pub summary: Option<String>,
    /// Operation-level parameters, overriding path-level ones.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// `requestBody`
    pub request_body: Option<RequestBody>,
    /// Status code to response.
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
}

/// Path, query or header parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// `in`: `path`, `query`, `header` or `cookie`.
    #[serde(rename = "in")]
    pub location: String,
    /// `required`
    #[serde(default)]
    pub required: bool,
    /// Value schema.
    pub schema: Option<Schema>,
}

/// `requestBody`
#[derive(Debug, Deserialize)]
pub struct RequestBody {
    /// `required`
    #[serde(default)]
    pub required: bool,
    /// Media type to payload.
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

/// One entry of `responses`.
#[derive(Debug, Deserialize)]
pub struct Response {
    /// Media type to payload.
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

/// Payload of one media type.
#[derive(Debug, Deserialize)]
pub struct MediaType {
    /// Payload schema.
    pub schema: Option<Schema>,
}

/// JSON Schema as used by OpenAPI 3.0 component and parameter schemas.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// `type`
    #[serde(rename = "type")]
    pub schema_type: Option<String>,
    /// `$ref`
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,
    /// `format`
    pub format: Option<String>,
    /// Object members.
    #[serde(default)]
    pub properties: BTreeMap<String, Schema>,
    /// Members that are not optional.
    #[serde(default)]
    pub required: Vec<String>,
    /// Array element schema.
    pub items: Option<Box<Schema>>,
    /// `enum`
    #[serde(rename = "enum", default)]
    pub enum_values: Vec<Value>,
    /// `oneOf`
    #[serde(default)]
    pub one_of: Vec<Schema>,
    /// `anyOf`
    #[serde(default)]
    pub any_of: Vec<Schema>,
    /// `allOf`
    #[serde(default)]
    pub all_of: Vec<Schema>,
    /// `additionalProperties`
    pub additional_properties: Option<AdditionalProperties>,
    /// `nullable`
    #[serde(default)]
    pub nullable: bool,
}

/// `additionalProperties`: a flag or a value schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` or `false`
    Allowed(bool),
    /// Schema of every extra value.
    Schema(Box<Schema>),
}

impl Schema {
    /// Name of the referenced component: `#/components/schemas/Tag` -> `Tag`.
    pub fn ref_name(&self) -> Option<&str> {
        self.ref_path
            .as_deref()
            .map(|path| path.rsplit('/').next().unwrap_or(path))
    }
}

impl OpenApiDocument {
    /// Parse document JSON.
    pub fn parse(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    /// True when `components.schemas` declares `name`.
    pub fn has_schema(&self, name: &str) -> bool {
        self.components.schemas.contains_key(name)
    }
}
