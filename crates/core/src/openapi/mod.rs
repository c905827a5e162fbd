//! OpenAPI document synthesis.
//!
//! Every entity contributes four component schemas: the entity itself and
//! its response, list-response and request envelopes. They are merged into
//! a base document together with the path items from the documentation
//! fragments.

mod document;
mod schema;

pub use document::{assemble_document, base_document, merge_components};
pub use schema::{attribute_schema, entity_components, entity_schema, envelopes};
