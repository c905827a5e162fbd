//! Per-run, read-only state shared by every emitter.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use contentgen_common::{camel_case, param_case, pascal_case};
use tracing::warn;

use crate::resolve::{Primitive, RelationTarget, TypeSignature, resolve};
use crate::schema::{Attribute, Entity, SchemaGraph};
use crate::ts::{TsPrimitive, TsType};

/// Schema problem that degraded output without aborting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A relation points outside the graph; `fallback` names stand in for it.
    UnresolvedRelationTarget {
        /// Owning entity key.
        entity: String,
        /// Relation attribute.
        attribute: String,
        /// `target` as written in the schema.
        target_ref: String,
        /// Name used in its place.
        fallback: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnresolvedRelationTarget {
                entity,
                attribute,
                target_ref,
                fallback,
            } => write!(
                f,
                "{entity}.{attribute}: relation target `{target_ref}` is not in the schema graph, using `{fallback}`"
            ),
        }
    }
}

/// Every name derived from one entity.
///
/// All artifacts refer to each other through these, never by re-deriving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityNames {
    /// Directory name under the schema root.
    pub key: String,
    /// `singularName` from the schema info.
    pub singular: String,
    /// `Article`; also the component schema name.
    pub pascal: String,
    /// `article`; prop name on the main node.
    pub camel: String,
    /// `article`; CSS class prefix.
    pub kebab: String,
    /// `articles`; prop name on the list node.
    pub plural_camel: String,
    /// `ArticleT`; type declared by the main node.
    pub type_name: String,
    /// `ArticleList`
    pub list: String,
    /// `ArticleForm`
    pub form: String,
    /// `ArticleResponse` envelope schema.
    pub response: String,
    /// `ArticleListResponse` envelope schema.
    pub list_response: String,
    /// `ArticleRequest` envelope schema.
    pub request: String,
    /// Display component per scalar attribute, unique within the entity.
    attributes: BTreeMap<String, String>,
}

impl EntityNames {
    /// Names for `entity`, including its attribute components.
    pub fn new(entity: &Entity) -> Self {
        let mut names = Self::derive(&entity.key, &entity.singular_name, &entity.plural_name);
        names.attributes = names.attribute_components(entity);
        names
    }

    /// Attribute components never reuse an aggregate name (`list` would
    /// otherwise give `ArticleList`); clashes get an `Attribute` suffix.
    fn attribute_components(&self, entity: &Entity) -> BTreeMap<String, String> {
        let mut taken: BTreeSet<String> = [&self.pascal, &self.list, &self.form, &self.type_name]
            .into_iter()
            .cloned()
            .collect();
        let mut components = BTreeMap::new();
        for attribute in entity.scalar_attributes() {
            let mut component = self.derived_component(&attribute.name);
            while taken.contains(&component) || taken.contains(&format!("{component}Input")) {
                component.push_str("Attribute");
            }
            taken.insert(format!("{component}Input"));
            taken.insert(component.clone());
            components.insert(attribute.name.clone(), component);
        }
        components
    }

    fn derived_component(&self, attribute: &str) -> String {
        pascal_case(&format!("{}-{attribute}", self.singular))
    }

    fn derive(key: &str, singular: &str, plural: &str) -> Self {
        let pascal = pascal_case(singular);
        EntityNames {
            key: key.to_string(),
            singular: singular.to_string(),
            camel: camel_case(singular),
            kebab: param_case(singular),
            plural_camel: camel_case(plural),
            type_name: format!("{pascal}T"),
            list: format!("{pascal}List"),
            form: format!("{pascal}Form"),
            response: format!("{pascal}Response"),
            list_response: format!("{pascal}ListResponse"),
            request: format!("{pascal}Request"),
            pascal,
            attributes: BTreeMap::new(),
        }
    }

    /// Names for a relation target that is not in the graph.
    fn fallback(name: &str) -> Self {
        Self::derive(name, name, name)
    }

    /// `Article` + `publishedAt` -> `ArticlePublishedAt`
    pub fn attribute_component(&self, attribute: &str) -> String {
        self.attributes
            .get(attribute)
            .cloned()
            .unwrap_or_else(|| self.derived_component(attribute))
    }

    /// Display component name plus `Input`.
    pub fn attribute_input(&self, attribute: &str) -> String {
        format!("{}Input", self.attribute_component(attribute))
    }
}

/// `#/components/schemas/<name>`
pub fn schema_ref(name: &str) -> String {
    format!("#/components/schemas/{name}")
}

/// Schema graph plus the names and warnings derived from it.
#[derive(Debug)]
pub struct GenerationContext {
    graph: SchemaGraph,
    names: BTreeMap<String, EntityNames>,
    warnings: Vec<Warning>,
}

impl GenerationContext {
    /// Derive names for every entity and record unresolved relations.
    pub fn new(graph: SchemaGraph) -> Self {
        let names = graph
            .entities()
            .map(|entity| (entity.key.clone(), EntityNames::new(entity)))
            .collect();

        let mut warnings = Vec::new();
        for entity in graph.entities() {
            for (attribute, relation) in entity.relation_attributes() {
                let signature = resolve(attribute, &graph);
                if let Some(RelationTarget::Unresolved(fallback)) = signature.target() {
                    let warning = Warning::UnresolvedRelationTarget {
                        entity: entity.key.clone(),
                        attribute: attribute.name.clone(),
                        target_ref: relation.target_ref.clone(),
                        fallback: fallback.clone(),
                    };
                    warn!(
                        entity = %entity.key,
                        attribute = %attribute.name,
                        target = %relation.target_ref,
                        fallback = %fallback,
                        "Unresolved relation target."
                    );
                    warnings.push(warning);
                }
            }
        }

        GenerationContext {
            graph,
            names,
            warnings,
        }
    }

    /// The graph the context was built from.
    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    /// Warnings collected while building the context.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Names of the entity stored under `key`.
    pub fn names(&self, key: &str) -> Option<&EntityNames> {
        self.names.get(key)
    }

    /// Entities with their names, in key order.
    pub fn entities(&self) -> impl Iterator<Item = (&Entity, &EntityNames)> {
        self.graph
            .entities()
            .filter_map(|entity| self.names.get(&entity.key).map(|names| (entity, names)))
    }

    /// Type signature of `attribute` against this graph.
    pub fn signature(&self, attribute: &Attribute) -> TypeSignature {
        resolve(attribute, &self.graph)
    }

    /// Names of a relation target, resolved or not.
    pub fn target_names(&self, target: &RelationTarget) -> EntityNames {
        match target {
            RelationTarget::Entity(key) => self
                .names
                .get(key)
                .cloned()
                .unwrap_or_else(|| EntityNames::fallback(key)),
            RelationTarget::Unresolved(name) => EntityNames::fallback(name),
        }
    }

    /// TypeScript type declared by the component tree for `signature`.
    pub fn ts_type(&self, signature: &TypeSignature) -> TsType {
        match signature {
            TypeSignature::Primitive(primitive) => match primitive {
                Primitive::String => TsType::Primitive(TsPrimitive::String),
                Primitive::Number => TsType::Primitive(TsPrimitive::Number),
                Primitive::Boolean => TsType::Primitive(TsPrimitive::Boolean),
                Primitive::Date => TsType::named("Date"),
                Primitive::Map => TsType::unknown_record(),
            },
            TypeSignature::Reference(RelationTarget::Unresolved(_)) => TsType::unknown_record(),
            TypeSignature::Reference(target) => TsType::named(self.target_names(target).type_name),
            TypeSignature::ArrayOf(inner) => TsType::Array(Box::new(self.ts_type(inner))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::schema::parse_entity;
    use crate::ts::Emit;

    fn context() -> GenerationContext {
        let article = parse_entity(
            "article",
            r#"{
                "info": { "singularName": "article", "pluralName": "articles" },
                "attributes": {
                    "publishedAt": { "type": "datetime" },
                    "tags": { "type": "relation", "relation": "manyToMany", "target": "api::tag.tag" },
                    "owner": { "type": "relation", "relation": "manyToOne", "target": "plugin::users-permissions.user" }
                }
            }"#,
        )
        .unwrap();
        let tag = parse_entity(
            "tag",
            r#"{ "info": { "singularName": "tag", "pluralName": "tags" } }"#,
        )
        .unwrap();
        GenerationContext::new(SchemaGraph::new([article, tag]))
    }

    #[test]
    fn derives_names_from_singular_and_plural() {
        let entity = parse_entity(
            "blog-post",
            r#"{ "info": { "singularName": "blog-post", "pluralName": "blog-posts" } }"#,
        )
        .unwrap();
        let names = EntityNames::new(&entity);

        assert_eq!(names.pascal, "BlogPost");
        assert_eq!(names.camel, "blogPost");
        assert_eq!(names.kebab, "blog-post");
        assert_eq!(names.plural_camel, "blogPosts");
        assert_eq!(names.type_name, "BlogPostT");
        assert_eq!(names.list_response, "BlogPostListResponse");
        assert_eq!(names.attribute_component("publishedAt"), "BlogPostPublishedAt");
        assert_eq!(names.attribute_input("title"), "BlogPostTitleInput");
    }

    #[test]
    fn attribute_components_avoid_aggregate_names() {
        let entity = parse_entity(
            "article",
            r#"{
                "info": { "singularName": "article", "pluralName": "articles" },
                "attributes": {
                    "list": { "type": "string" },
                    "form": { "type": "string" },
                    "t": { "type": "string" },
                    "listAttributeInput": { "type": "string" },
                    "title": { "type": "string" }
                }
            }"#,
        )
        .unwrap();
        let names = EntityNames::new(&entity);

        assert_eq!(names.attribute_component("list"), "ArticleListAttribute");
        assert_eq!(names.attribute_input("list"), "ArticleListAttributeInput");
        assert_eq!(names.attribute_component("form"), "ArticleFormAttribute");
        assert_eq!(names.attribute_component("t"), "ArticleTAttribute");
        assert_eq!(
            names.attribute_component("listAttributeInput"),
            "ArticleListAttributeInputAttribute"
        );
        assert_eq!(names.attribute_component("title"), "ArticleTitle");
    }

    #[test]
    fn collects_unresolved_relation_warnings() {
        let ctx = context();
        assert_eq!(
            ctx.warnings(),
            [Warning::UnresolvedRelationTarget {
                entity: "article".into(),
                attribute: "owner".into(),
                target_ref: "plugin::users-permissions.user".into(),
                fallback: "user".into(),
            }]
        );
    }

    #[test]
    fn maps_signatures_to_declared_types() {
        let ctx = context();
        let article = ctx.graph().get("article").unwrap();
        let ts = |name: &str| ctx.ts_type(&ctx.signature(article.attribute(name).unwrap())).emit();

        assert_eq!(ts("publishedAt"), "Date");
        assert_eq!(ts("tags"), "TagT[]");
        assert_eq!(ts("owner"), "Record<string, unknown>");
    }
}
