//! Type resolution: attribute kinds to target shapes.
//!
//! [`AttributeKind::rule`] is the only table mapping Strapi kinds to
//! TypeScript primitives, OpenAPI types and input controls. The OpenAPI and
//! component emitters both read it.

use crate::schema::{Attribute, AttributeKind, Relation, SchemaGraph, trailing_segment};

/// Target-language primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Text.
    String,
    /// Integers and decimals alike.
    Number,
    /// True or false.
    Boolean,
    /// Date-like values.
    Date,
    /// Open string-keyed map.
    Map,
}

/// Where a relation points.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationTarget {
    /// Key of an entity present in the graph.
    Entity(String),
    /// Best-effort name used when the reference did not resolve.
    Unresolved(String),
}

impl RelationTarget {
    /// Entity key, or the fallback name.
    pub fn name(&self) -> &str {
        match self {
            RelationTarget::Entity(key) | RelationTarget::Unresolved(key) => key,
        }
    }

    /// True when the target exists in the graph.
    pub fn is_resolved(&self) -> bool {
        matches!(self, RelationTarget::Entity(_))
    }
}

/// Derived shape of an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSignature {
    /// Scalar value.
    Primitive(Primitive),
    /// Single related entity.
    Reference(RelationTarget),
    /// Collection of the inner shape.
    ArrayOf(Box<TypeSignature>),
}

impl TypeSignature {
    /// Relation target, looking through arrays.
    pub fn target(&self) -> Option<&RelationTarget> {
        match self {
            TypeSignature::Primitive(_) => None,
            TypeSignature::Reference(target) => Some(target),
            TypeSignature::ArrayOf(inner) => inner.target(),
        }
    }

    /// True for to-many shapes.
    pub fn is_array(&self) -> bool {
        matches!(self, TypeSignature::ArrayOf(_))
    }
}

/// Form control rendered for an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputControl {
    /// No scalar input (json, media, relations).
    None,
    /// Date picker.
    Date,
    /// Checkbox bound to `checked`.
    Checkbox,
    /// Multi-line text.
    TextArea,
    /// Email field.
    Email,
    /// Masked field.
    Password,
    /// Select over the enumeration values.
    Select,
    /// Single-line text.
    Text,
}

/// Everything the emitters need to know about one attribute kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindRule {
    /// TypeScript primitive.
    pub primitive: Primitive,
    /// OpenAPI `type`.
    pub openapi_type: &'static str,
    /// OpenAPI `format`, if any.
    pub format: Option<&'static str>,
    /// Control used by the input node.
    pub input: InputControl,
    /// Whether the input is preceded by a `<Form.Label>`.
    pub labelled: bool,
}

impl KindRule {
    const fn new(primitive: Primitive, openapi_type: &'static str, input: InputControl) -> Self {
        KindRule {
            primitive,
            openapi_type,
            format: None,
            input,
            labelled: true,
        }
    }

    const fn format(mut self, format: &'static str) -> Self {
        self.format = Some(format);
        self
    }

    const fn unlabelled(mut self) -> Self {
        self.labelled = false;
        self
    }
}

impl AttributeKind {
    /// Resolution rule for this kind.
    ///
    /// Relations are resolved against the graph by [`resolve`]; their rule
    /// only describes the (absent) input.
    pub fn rule(&self) -> KindRule {
        use InputControl as I;
        use Primitive as P;

        match self {
            AttributeKind::String | AttributeKind::Other(_) => {
                KindRule::new(P::String, "string", I::Text)
            }
            AttributeKind::Text | AttributeKind::RichText => {
                KindRule::new(P::String, "string", I::TextArea)
            }
            AttributeKind::Email => KindRule::new(P::String, "string", I::Email).format("email"),
            AttributeKind::Password => {
                KindRule::new(P::String, "string", I::Password).format("password")
            }
            AttributeKind::Uid => KindRule::new(P::String, "string", I::Text).unlabelled(),
            AttributeKind::Integer | AttributeKind::BigInteger => {
                KindRule::new(P::Number, "integer", I::Text)
            }
            AttributeKind::Decimal | AttributeKind::Float => {
                KindRule::new(P::Number, "number", I::Text)
            }
            AttributeKind::Date => KindRule::new(P::Date, "string", I::Date).format("date"),
            AttributeKind::Time => KindRule::new(P::Date, "string", I::Date).format("time"),
            AttributeKind::DateTime => {
                KindRule::new(P::Date, "string", I::Date).format("date-time")
            }
            AttributeKind::Timestamp => {
                KindRule::new(P::Date, "string", I::Date).format("timestamp")
            }
            AttributeKind::Boolean => {
                KindRule::new(P::Boolean, "boolean", I::Checkbox).unlabelled()
            }
            AttributeKind::Json => KindRule::new(P::Map, "object", I::None).unlabelled(),
            AttributeKind::Media => KindRule::new(P::String, "string", I::None).unlabelled(),
            AttributeKind::Enumeration => KindRule::new(P::String, "string", I::Select),
            AttributeKind::Relation => KindRule::new(P::String, "object", I::None).unlabelled(),
        }
    }
}

/// Derive the signature of `attribute`.
///
/// To-many relations become arrays of references; everything else maps
/// through [`AttributeKind::rule`].
pub fn resolve(attribute: &Attribute, graph: &SchemaGraph) -> TypeSignature {
    match &attribute.relation {
        Some(relation) => {
            let reference = TypeSignature::Reference(resolve_target(attribute, relation, graph));
            if relation.cardinality.is_to_many() {
                TypeSignature::ArrayOf(Box::new(reference))
            } else {
                reference
            }
        }
        None => TypeSignature::Primitive(attribute.kind.rule().primitive),
    }
}

/// Resolve a relation's target, falling back to the trailing segment of the
/// reference (or the attribute name when that is empty).
pub fn resolve_target(
    attribute: &Attribute,
    relation: &Relation,
    graph: &SchemaGraph,
) -> RelationTarget {
    if let Some(entity) = graph.resolve_target(&relation.target_ref) {
        return RelationTarget::Entity(entity.key.clone());
    }

    let segment = trailing_segment(&relation.target_ref);
    if segment.is_empty() {
        RelationTarget::Unresolved(attribute.name.clone())
    } else {
        RelationTarget::Unresolved(segment.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::schema::parse_entity;

    fn graph() -> SchemaGraph {
        let article = parse_entity(
            "article",
            r#"{
                "info": { "singularName": "article", "pluralName": "articles" },
                "attributes": {
                    "title": { "type": "string" },
                    "publishedAt": { "type": "datetime" },
                    "views": { "type": "integer" },
                    "meta": { "type": "json" },
                    "category": { "type": "relation", "relation": "manyToOne", "target": "api::category.category" },
                    "tags": { "type": "relation", "relation": "manyToMany", "target": "api::tag.tag" },
                    "author": { "type": "relation", "relation": "oneToOne", "target": "plugin::users-permissions.user" },
                    "ghost": { "type": "relation", "relation": "oneToMany", "target": "" }
                }
            }"#,
        )
        .unwrap();
        let category = parse_entity(
            "category",
            r#"{ "info": { "singularName": "category", "pluralName": "categories" } }"#,
        )
        .unwrap();
        let tag = parse_entity(
            "tag",
            r#"{ "info": { "singularName": "tag", "pluralName": "tags" } }"#,
        )
        .unwrap();
        SchemaGraph::new([article, category, tag])
    }

    fn signature(graph: &SchemaGraph, name: &str) -> TypeSignature {
        let attr = graph.get("article").unwrap().attribute(name).unwrap();
        resolve(attr, graph)
    }

    #[test]
    fn scalar_kinds_map_to_primitives() {
        let graph = graph();
        assert_eq!(signature(&graph, "title"), TypeSignature::Primitive(Primitive::String));
        assert_eq!(signature(&graph, "publishedAt"), TypeSignature::Primitive(Primitive::Date));
        assert_eq!(signature(&graph, "views"), TypeSignature::Primitive(Primitive::Number));
        assert_eq!(signature(&graph, "meta"), TypeSignature::Primitive(Primitive::Map));
    }

    #[test]
    fn many_to_one_is_a_single_reference() {
        let graph = graph();
        assert_eq!(
            signature(&graph, "category"),
            TypeSignature::Reference(RelationTarget::Entity("category".into()))
        );
    }

    #[test]
    fn many_to_many_is_an_array_of_references() {
        let graph = graph();
        let sig = signature(&graph, "tags");
        assert!(sig.is_array());
        assert_eq!(
            sig,
            TypeSignature::ArrayOf(Box::new(TypeSignature::Reference(RelationTarget::Entity(
                "tag".into()
            ))))
        );
    }

    #[test]
    fn unresolved_targets_fall_back_detectably() {
        let graph = graph();
        let author = signature(&graph, "author");
        assert_eq!(author, TypeSignature::Reference(RelationTarget::Unresolved("user".into())));
        assert!(!author.target().unwrap().is_resolved());

        let ghost = signature(&graph, "ghost");
        assert_eq!(ghost.target().unwrap().name(), "ghost");
    }

    #[test]
    fn rules_drive_openapi_and_inputs() {
        let float = AttributeKind::Float.rule();
        assert_eq!(float.openapi_type, "number");

        let datetime = AttributeKind::DateTime.rule();
        assert_eq!(datetime.format, Some("date-time"));
        assert_eq!(datetime.input, InputControl::Date);

        assert!(!AttributeKind::Boolean.rule().labelled);
        assert_eq!(AttributeKind::Enumeration.rule().input, InputControl::Select);
        assert_eq!(AttributeKind::Media.rule().input, InputControl::None);
        assert_eq!(AttributeKind::Other("x".into()).rule().openapi_type, "string");
    }
}
