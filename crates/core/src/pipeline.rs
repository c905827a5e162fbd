//! Generation stages and the per-run report.
//!
//! `all` runs components, documentation and client in that order; the client
//! stage reads the document the documentation stage persisted.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use contentgen_common::layout::{
    CLIENT_FILE, COMPONENT_SCHEMAS_DIR, COMPONENTS_FILE, OPENAPI_DOC_FILE, RUNTIME_FILE,
};
use contentgen_common::{Saved, save_as};
use serde_json::{Map, Value};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::client;
use crate::components;
use crate::config::GeneratorConfig;
use crate::context::{GenerationContext, Warning};
use crate::error::{EntityFailure, GenerateError};
use crate::openapi;
use crate::schema::{load_graph, load_path_fragments};

const RUNTIME_SOURCE: &str = include_str!("../templates/apiResource.ts");

/// What a run should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// SolidJS component trees.
    Components,
    /// Per-entity schemas and the aggregate OpenAPI document.
    Documentation,
    /// Typed client, guards and runtime module.
    Client,
    /// Every stage in order.
    All,
}

impl Action {
    /// `components`, `api-documentation`, `api`; anything else means all.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "components" => Action::Components,
            "api-documentation" => Action::Documentation,
            "api" => Action::Client,
            _ => Action::All,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Components => "components",
            Action::Documentation => "api-documentation",
            Action::Client => "api",
            Action::All => "all",
        })
    }
}

/// Outcome of one or more stages.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Files written, in order.
    pub written: Vec<PathBuf>,
    /// Previous versions preserved as `.bak`.
    pub backups: Vec<PathBuf>,
    /// Non-fatal findings about the schema.
    pub warnings: Vec<Warning>,
    /// Entities whose artifacts were skipped.
    pub failures: Vec<EntityFailure>,
}

impl RunReport {
    fn record(&mut self, saved: Saved) {
        if let Some(backup) = saved.backup {
            self.backups.push(backup);
        }
        self.written.push(saved.path);
    }

    fn absorb(&mut self, other: RunReport) {
        self.written.extend(other.written);
        self.backups.extend(other.backups);
        self.failures.extend(other.failures);
    }

    /// True when no entity failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives the stages for one Strapi project.
#[derive(Debug, Clone)]
pub struct Generator {
    strapi_dir: PathBuf,
    config: GeneratorConfig,
}

impl Generator {
    /// Generator for the Strapi project at `strapi_dir`.
    pub fn new(strapi_dir: impl Into<PathBuf>, config: GeneratorConfig) -> Self {
        Generator {
            strapi_dir: strapi_dir.into(),
            config,
        }
    }

    /// Directory holding one sub-directory per content type.
    pub fn schema_root(&self) -> PathBuf {
        self.config.schema_root(&self.strapi_dir)
    }

    /// Load the schema graph and derive the shared context.
    pub async fn context(&self) -> Result<Arc<GenerationContext>, GenerateError> {
        let graph = load_graph(&self.schema_root()).await?;
        Ok(Arc::new(GenerationContext::new(graph)))
    }

    /// Run `action` with outputs laid out under `output_dir`.
    pub async fn run(&self, action: Action, output_dir: &Path) -> Result<RunReport, GenerateError> {
        let ctx = self.context().await?;
        let mut report = RunReport {
            warnings: ctx.warnings().to_vec(),
            ..RunReport::default()
        };

        match action {
            Action::Components => {
                report.absorb(self.generate_components(&ctx, output_dir).await?);
            }
            Action::Documentation => {
                report.absorb(self.generate_documentation(&ctx, output_dir).await?);
            }
            Action::Client => {
                let document = sibling_document(output_dir);
                report.absorb(self.generate_client(&ctx, &document, output_dir).await?);
            }
            Action::All => {
                let src = output_dir.join("src");
                let docs = output_dir.join("openapi");
                report.absorb(self.generate_components(&ctx, &src.join("components")).await?);
                report.absorb(self.generate_documentation(&ctx, &docs).await?);
                report.absorb(
                    self.generate_client(&ctx, &docs.join(OPENAPI_DOC_FILE), &src)
                        .await?,
                );
            }
        }

        info!(
            action = %action,
            written = report.written.len(),
            backups = report.backups.len(),
            warnings = report.warnings.len(),
            failures = report.failures.len(),
            "Generation finished."
        );
        Ok(report)
    }

    /// Component tree of every entity under `out/<Pascal>/`.
    ///
    /// Entities are synthesized and written concurrently; one entity failing
    /// does not stop the others.
    pub async fn generate_components(
        &self,
        ctx: &Arc<GenerationContext>,
        out: &Path,
    ) -> Result<RunReport, GenerateError> {
        let mut tasks = JoinSet::new();
        for (entity, _) in ctx.entities() {
            let ctx = Arc::clone(ctx);
            let key = entity.key.clone();
            let out = out.to_path_buf();
            tasks.spawn(async move {
                let result = write_entity_components(&ctx, &key, &out).await;
                (key, result)
            });
        }

        let report = collect(tasks).await;
        info!(
            out = %out.display(),
            files = report.written.len(),
            failures = report.failures.len(),
            "Generated components."
        );
        Ok(report)
    }

    /// Per-entity `components/<P>.json`, then `components.json` and
    /// `openapi-doc.json` once every entity is done.
    pub async fn generate_documentation(
        &self,
        ctx: &Arc<GenerationContext>,
        out: &Path,
    ) -> Result<RunReport, GenerateError> {
        let mut tasks = JoinSet::new();
        for (entity, _) in ctx.entities() {
            let ctx = Arc::clone(ctx);
            let key = entity.key.clone();
            let dir = out.join(COMPONENT_SCHEMAS_DIR);
            tasks.spawn(async move {
                let result = write_entity_schemas(&ctx, &key, &dir).await;
                (key, result)
            });
        }

        let mut report = RunReport::default();
        let mut contributed = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((key, Ok((saved, components)))) => {
                    report.record(saved);
                    contributed.push((key, components));
                }
                Ok((entity, Err(error))) => report.failures.push(EntityFailure { entity, error }),
                Err(err) => report.failures.push(EntityFailure {
                    entity: String::new(),
                    error: GenerateError::Task(err.to_string()),
                }),
            }
        }

        contributed.sort_by(|a, b| a.0.cmp(&b.0));
        let mut components = Map::new();
        for (_, entity_components) in contributed {
            openapi::merge_components(&mut components, entity_components);
        }
        report.record(save_json(&out.join(COMPONENTS_FILE), &Value::Object(components.clone())).await?);

        let fragments = load_path_fragments(&self.schema_root(), ctx.graph()).await;
        report.failures.extend(fragments.failures);
        let document = openapi::assemble_document(&self.config.document, &components, fragments.paths);
        report.record(save_json(&out.join(OPENAPI_DOC_FILE), &document).await?);

        report.failures.sort_by(|a, b| a.entity.cmp(&b.entity));
        info!(
            out = %out.display(),
            schemas = components.len(),
            failures = report.failures.len(),
            "Generated OpenAPI documentation."
        );
        Ok(report)
    }

    /// `client.ts` from `document`, plus the runtime module next to it.
    pub async fn generate_client(
        &self,
        ctx: &Arc<GenerationContext>,
        document: &Path,
        out: &Path,
    ) -> Result<RunReport, GenerateError> {
        let source = match tokio::fs::read_to_string(document).await {
            Ok(source) => source,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(GenerateError::MissingDocument {
                    path: document.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(GenerateError::Read {
                    path: document.to_path_buf(),
                    source,
                });
            }
        };

        let client = client::generate_client(ctx, &source)?;
        let mut report = RunReport {
            failures: client.failures,
            ..RunReport::default()
        };
        report.record(save_as(&out.join(CLIENT_FILE), client.source).await?);
        report.record(save_as(&out.join(RUNTIME_FILE), RUNTIME_SOURCE).await?);

        info!(
            document = %document.display(),
            out = %out.display(),
            "Generated API client."
        );
        Ok(report)
    }
}

/// `<output_dir>/../openapi/openapi-doc.json`, resolved without touching the filesystem.
fn sibling_document(output_dir: &Path) -> PathBuf {
    let openapi = match (output_dir.file_name(), output_dir.parent()) {
        (Some(_), Some(parent)) => parent.join("openapi"),
        _ => output_dir.join("..").join("openapi"),
    };
    openapi.join(OPENAPI_DOC_FILE)
}

async fn collect(
    mut tasks: JoinSet<(String, Result<Vec<Saved>, GenerateError>)>,
) -> RunReport {
    let mut report = RunReport::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(saved))) => saved.into_iter().for_each(|s| report.record(s)),
            Ok((entity, Err(error))) => {
                warn!(entity = %entity, error = %error, "Entity synthesis failed.");
                report.failures.push(EntityFailure { entity, error });
            }
            Err(err) => report.failures.push(EntityFailure {
                entity: String::new(),
                error: GenerateError::Task(err.to_string()),
            }),
        }
    }
    report.written.sort();
    report.backups.sort();
    report.failures.sort_by(|a, b| a.entity.cmp(&b.entity));
    report
}

fn lookup<'a>(
    ctx: &'a GenerationContext,
    key: &str,
) -> Result<(&'a crate::schema::Entity, &'a crate::context::EntityNames), GenerateError> {
    ctx.graph()
        .get(key)
        .zip(ctx.names(key))
        .ok_or_else(|| GenerateError::Task(format!("entity `{key}` vanished from the context")))
}

async fn write_entity_components(
    ctx: &GenerationContext,
    key: &str,
    out: &Path,
) -> Result<Vec<Saved>, GenerateError> {
    let (entity, names) = lookup(ctx, key)?;
    let files = components::entity_components(ctx, entity, names)?;

    let mut saved = Vec::with_capacity(files.len());
    for file in files {
        saved.push(save_as(&out.join(&file.path), file.contents).await?);
    }
    Ok(saved)
}

async fn write_entity_schemas(
    ctx: &GenerationContext,
    key: &str,
    dir: &Path,
) -> Result<(Saved, Map<String, Value>), GenerateError> {
    let (entity, names) = lookup(ctx, key)?;
    let components = openapi::entity_components(ctx, entity, names);
    let path = dir.join(format!("{}.json", names.pascal));
    let saved = save_json(&path, &Value::Object(components.clone())).await?;
    Ok((saved, components))
}

async fn save_json(path: &Path, value: &Value) -> Result<Saved, GenerateError> {
    let mut contents =
        serde_json::to_string_pretty(value).map_err(|source| GenerateError::Serialize {
            what: path.display().to_string(),
            source,
        })?;
    contents.push('\n');
    Ok(save_as(path, contents).await?)
}
