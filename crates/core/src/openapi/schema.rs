//! Component schemas for one entity.

use serde_json::{Map, Value, json};

use crate::context::{EntityNames, GenerationContext, schema_ref};
use crate::resolve::TypeSignature;
use crate::schema::{Attribute, Entity};

/// Schema fragment for one attribute.
pub fn attribute_schema(ctx: &GenerationContext, attribute: &Attribute) -> Value {
    signature_schema(ctx, attribute, &ctx.signature(attribute))
}

fn signature_schema(ctx: &GenerationContext, attribute: &Attribute, signature: &TypeSignature) -> Value {
    match signature {
        TypeSignature::Primitive(_) => {
            let rule = attribute.kind.rule();
            let mut schema = Map::new();
            schema.insert("type".into(), json!(rule.openapi_type));
            if let Some(format) = rule.format {
                schema.insert("format".into(), json!(format));
            }
            if !attribute.enum_values.is_empty() {
                schema.insert("enum".into(), json!(attribute.enum_values));
            }
            Value::Object(schema)
        }
        TypeSignature::Reference(target) => {
            json!({ "$ref": schema_ref(&ctx.target_names(target).pascal) })
        }
        TypeSignature::ArrayOf(inner) => json!({
            "type": "array",
            "items": signature_schema(ctx, attribute, inner),
        }),
    }
}

/// `{ type: object, properties, required? }` in attribute order.
pub fn entity_schema(ctx: &GenerationContext, entity: &Entity) -> Value {
    let properties: Map<String, Value> = entity
        .attributes
        .iter()
        .map(|attribute| (attribute.name.clone(), attribute_schema(ctx, attribute)))
        .collect();

    let required: Vec<&str> = entity
        .attributes
        .iter()
        .filter(|a| a.required)
        .map(|a| a.name.as_str())
        .collect();

    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), json!(required));
    }
    Value::Object(schema)
}

/// Response, list-response and request envelopes, in that order.
pub fn envelopes(names: &EntityNames) -> [(String, Value); 3] {
    [
        (
            names.response.clone(),
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "number" },
                    "attributes": { "$ref": schema_ref(&names.pascal) },
                },
            }),
        ),
        (
            names.list_response.clone(),
            json!({
                "type": "object",
                "properties": {
                    "data": {
                        "type": "array",
                        "items": { "$ref": schema_ref(&names.response) },
                    },
                    "meta": { "$ref": schema_ref("ListResponseMeta") },
                },
            }),
        ),
        (
            names.request.clone(),
            json!({
                "type": "object",
                "properties": {
                    "data": { "$ref": schema_ref(&names.pascal) },
                },
            }),
        ),
    ]
}

/// All four component schemas contributed by `entity`.
pub fn entity_components(
    ctx: &GenerationContext,
    entity: &Entity,
    names: &EntityNames,
) -> Map<String, Value> {
    let mut components = Map::new();
    components.insert(names.pascal.clone(), entity_schema(ctx, entity));
    components.extend(envelopes(names));
    components
}
