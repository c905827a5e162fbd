//! Serde shapes of a Strapi `schema.json`.

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSchema {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub collection_name: Option<String>,
    pub info: RawInfo,
    /// Kept as a JSON map so declaration order survives.
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawInfo {
    pub singular_name: String,
    pub plural_name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawAttribute {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "enum", default)]
    pub enum_values: Vec<String>,
}
