//! The resolved entity graph shared by every emitter.

use std::collections::{BTreeMap, HashMap};

use super::Entity;

/// Entities keyed by directory name, plus a reverse index for relation targets.
///
/// Iteration is sorted by key so every artifact comes out in the same order on
/// every run.
#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    entities: BTreeMap<String, Entity>,
    /// `api::<key>.<singularName>` -> key
    by_uid: HashMap<String, String>,
    /// singularName -> key
    by_singular: HashMap<String, String>,
}

impl SchemaGraph {
    /// Graph over `entities`, keyed by entity key.
    pub fn new(entities: impl IntoIterator<Item = Entity>) -> Self {
        let mut graph = SchemaGraph::default();
        for entity in entities {
            graph.insert(entity);
        }
        graph
    }

    fn insert(&mut self, entity: Entity) {
        self.by_uid.insert(
            format!("api::{}.{}", entity.key, entity.singular_name),
            entity.key.clone(),
        );
        self.by_singular
            .insert(entity.singular_name.clone(), entity.key.clone());
        self.entities.insert(entity.key.clone(), entity);
    }

    /// Entity loaded from directory `key`.
    pub fn get(&self, key: &str) -> Option<&Entity> {
        self.entities.get(key)
    }

    /// Entities in key order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True for an empty schema root.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Find the entity a raw relation reference points at.
    ///
    /// Tries the full uid first, then the trailing segment as an entity key,
    /// then as a singular name.
    pub fn resolve_target(&self, target_ref: &str) -> Option<&Entity> {
        if let Some(key) = self.by_uid.get(target_ref) {
            return self.entities.get(key);
        }

        let segment = trailing_segment(target_ref);
        if segment.is_empty() {
            return None;
        }

        self.entities.get(segment).or_else(|| {
            self.by_singular
                .get(segment)
                .and_then(|key| self.entities.get(key))
        })
    }
}

/// `api::category.category` -> `category`, `plugin::upload.file` -> `file`.
pub fn trailing_segment(target_ref: &str) -> &str {
    let last = target_ref.rsplit('.').next().unwrap_or(target_ref);
    last.rsplit("::").next().unwrap_or(last)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::schema::parse_entity;

    fn entity(key: &str, singular: &str) -> Entity {
        parse_entity(
            key,
            &format!(
                r#"{{ "info": {{ "singularName": "{singular}", "pluralName": "{singular}s" }} }}"#
            ),
        )
        .unwrap()
    }

    #[test]
    fn trailing_segment_strips_namespace() {
        assert_eq!(trailing_segment("api::category.category"), "category");
        assert_eq!(trailing_segment("plugin::upload.file"), "file");
        assert_eq!(trailing_segment("api::tag"), "tag");
        assert_eq!(trailing_segment("tag"), "tag");
        assert_eq!(trailing_segment(""), "");
    }

    #[test]
    fn resolves_by_uid_key_and_singular_name() {
        let graph = SchemaGraph::new([entity("category", "category"), entity("people", "person")]);

        assert_eq!(graph.resolve_target("api::category.category").unwrap().key, "category");
        assert_eq!(graph.resolve_target("category").unwrap().key, "category");
        assert_eq!(graph.resolve_target("api::people.person").unwrap().key, "people");
        assert_eq!(graph.resolve_target("api::whatever.person").unwrap().key, "people");
        assert!(graph.resolve_target("plugin::users-permissions.user").is_none());
        assert!(graph.resolve_target("").is_none());
    }

    #[test]
    fn iterates_in_key_order() {
        let graph = SchemaGraph::new([entity("tag", "tag"), entity("article", "article")]);
        let keys: Vec<_> = graph.entities().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["article", "tag"]);
        assert_eq!(graph.len(), 2);
    }
}
