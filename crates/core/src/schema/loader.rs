//! Loading schema descriptions and documentation fragments from disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use contentgen_common::layout;
use serde_json::{Map, Value};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::raw::RawSchema;
use super::{Entity, SchemaGraph};
use crate::error::{EntityFailure, GenerateError, SchemaError};

/// Build the schema graph from `<root>/<entity>/content-types/<entity>/schema.json`.
///
/// Entities load concurrently. If any of them fails the whole graph is
/// rejected; the failure of the first entity (by name) is returned and the
/// others are logged.
pub async fn load_graph(root: &Path) -> Result<SchemaGraph, SchemaError> {
    let keys = entity_dirs(root).await?;

    let mut tasks = JoinSet::new();
    for key in keys {
        let root = root.to_path_buf();
        tasks.spawn(async move {
            let result = load_entity(&root, &key).await;
            (key, result)
        });
    }

    let mut entities = Vec::new();
    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(entity))) => entities.push(entity),
            Ok((key, Err(err))) => failures.push((key, err)),
            Err(err) => failures.push((String::new(), SchemaError::Task(err.to_string()))),
        }
    }

    if !failures.is_empty() {
        failures.sort_by(|a, b| a.0.cmp(&b.0));
        let mut failures = failures.into_iter();
        if let Some((_, first)) = failures.next() {
            for (entity, err) in failures {
                warn!(entity = %entity, error = %err, "Schema description failed to load.");
            }
            return Err(first);
        }
    }

    info!(
        root = %root.display(),
        entities = entities.len(),
        "Loaded schema graph."
    );

    Ok(SchemaGraph::new(entities))
}

/// Immediate subdirectories of `root`, sorted.
async fn entity_dirs(root: &Path) -> Result<Vec<String>, SchemaError> {
    match tokio::fs::metadata(root).await {
        Ok(meta) if meta.is_dir() => {}
        _ => {
            return Err(SchemaError::MissingSchemaRoot {
                path: root.to_path_buf(),
            });
        }
    }

    let read_err = |source| SchemaError::ReadRoot {
        path: root.to_path_buf(),
        source,
    };

    let mut keys = Vec::new();
    let mut entries = tokio::fs::read_dir(root).await.map_err(read_err)?;
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        if !entry.file_type().await.map_err(read_err)?.is_dir() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) => keys.push(name.to_string()),
            None => warn!(path = %entry.path().display(), "Skipping non UTF-8 entity directory."),
        }
    }

    keys.sort();
    Ok(keys)
}

async fn load_entity(root: &Path, key: &str) -> Result<Entity, SchemaError> {
    let path = layout::schema_file(root, key);
    let contents = match tokio::fs::read_to_string(&path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(SchemaError::MissingSchemaFile {
                entity: key.to_string(),
                path,
            });
        }
        Err(source) => return Err(SchemaError::Read { path, source }),
    };

    let raw: RawSchema = serde_json::from_str(&contents)
        .map_err(|source| SchemaError::InvalidSchema { path: path.clone(), source })?;

    debug!(entity = key, path = %path.display(), "Loaded schema description.");
    Entity::from_raw(key, raw)
}

/// Path items collected from the per-entity documentation fragments.
#[derive(Debug, Default)]
pub struct PathFragments {
    /// Path -> path item, merged in entity order; later entries win.
    pub paths: Map<String, Value>,
    /// Fragments that could not be read or parsed.
    pub failures: Vec<EntityFailure>,
}

/// Read `<root>/<entity>/documentation/1.0.0/<entity>.json` for every entity.
///
/// Fragments are optional. Unreadable or malformed ones are reported per
/// entity and do not prevent the others from being merged.
pub async fn load_path_fragments(root: &Path, graph: &SchemaGraph) -> PathFragments {
    let mut tasks = JoinSet::new();
    for entity in graph.entities() {
        let key = entity.key.clone();
        let path = layout::documentation_file(root, &key);
        tasks.spawn(async move {
            let result = load_fragment(&path).await;
            (key, result)
        });
    }

    let mut loaded = Vec::new();
    let mut fragments = PathFragments::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((key, Ok(Some(paths)))) => loaded.push((key, paths)),
            Ok((_, Ok(None))) => {}
            Ok((entity, Err(err))) => fragments.failures.push(EntityFailure {
                entity,
                error: GenerateError::Schema(err),
            }),
            Err(err) => fragments.failures.push(EntityFailure {
                entity: String::new(),
                error: GenerateError::Task(err.to_string()),
            }),
        }
    }

    loaded.sort_by(|a, b| a.0.cmp(&b.0));
    for (_, paths) in loaded {
        fragments.paths.extend(paths);
    }
    fragments.failures.sort_by(|a, b| a.entity.cmp(&b.entity));

    fragments
}

async fn load_fragment(path: &PathBuf) -> Result<Option<Map<String, Value>>, SchemaError> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No documentation fragment.");
            return Ok(None);
        }
        Err(source) => {
            return Err(SchemaError::Read {
                path: path.clone(),
                source,
            });
        }
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| SchemaError::InvalidFragment {
            path: path.clone(),
            source,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_schema(root: &Path, key: &str, json: &str) {
        let path = layout::schema_file(root, key);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, json).unwrap();
    }

    fn schema(singular: &str, plural: &str) -> String {
        format!(
            r#"{{ "info": {{ "singularName": "{singular}", "pluralName": "{plural}" }},
                  "attributes": {{ "name": {{ "type": "string" }} }} }}"#
        )
    }

    #[tokio::test]
    async fn loads_every_entity_directory() {
        let dir = TempDir::new().unwrap();
        write_schema(dir.path(), "tag", &schema("tag", "tags"));
        write_schema(dir.path(), "article", &schema("article", "articles"));
        std::fs::write(dir.path().join("README.md"), "not an entity").unwrap();

        let graph = load_graph(dir.path()).await.unwrap();

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.get("article").unwrap().plural_name, "articles");
    }

    #[tokio::test]
    async fn missing_schema_file_aborts_the_load() {
        let dir = TempDir::new().unwrap();
        write_schema(dir.path(), "article", &schema("article", "articles"));
        std::fs::create_dir_all(dir.path().join("orphan")).unwrap();

        let err = load_graph(dir.path()).await.unwrap_err();

        assert!(matches!(err, SchemaError::MissingSchemaFile { ref entity, .. } if entity == "orphan"));
    }

    #[tokio::test]
    async fn missing_root_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = load_graph(&dir.path().join("nope")).await.unwrap_err();
        assert!(matches!(err, SchemaError::MissingSchemaRoot { .. }));
    }

    #[tokio::test]
    async fn fragments_are_optional_and_merged() {
        let dir = TempDir::new().unwrap();
        write_schema(dir.path(), "article", &schema("article", "articles"));
        write_schema(dir.path(), "tag", &schema("tag", "tags"));
        let doc = layout::documentation_file(dir.path(), "article");
        std::fs::create_dir_all(doc.parent().unwrap()).unwrap();
        std::fs::write(&doc, r#"{ "/articles": { "get": { "operationId": "get/articles" } } }"#)
            .unwrap();

        let graph = load_graph(dir.path()).await.unwrap();
        let fragments = load_path_fragments(dir.path(), &graph).await;

        assert!(fragments.failures.is_empty());
        assert_eq!(fragments.paths.len(), 1);
        assert!(fragments.paths.contains_key("/articles"));
    }

    #[tokio::test]
    async fn malformed_fragment_is_reported_per_entity() {
        let dir = TempDir::new().unwrap();
        write_schema(dir.path(), "tag", &schema("tag", "tags"));
        let doc = layout::documentation_file(dir.path(), "tag");
        std::fs::create_dir_all(doc.parent().unwrap()).unwrap();
        std::fs::write(&doc, "{ not json").unwrap();

        let graph = load_graph(dir.path()).await.unwrap();
        let fragments = load_path_fragments(dir.path(), &graph).await;

        assert_eq!(fragments.failures.len(), 1);
        assert_eq!(fragments.failures[0].entity, "tag");
    }
}
