//! Optional `contentgen.toml` overrides.
//!
//! ```toml
//! [document]
//! title = "Blog API"
//! server_url = "https://cms.example.com/api"
//!
//! [layout]
//! schema_root = "src/api"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use contentgen_common::layout::SCHEMA_ROOT;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Config file looked up in the Strapi project when `--config` is absent.
pub const CONFIG_FILENAME: &str = "contentgen.toml";

/// Failures loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        /// Config file.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`GeneratorConfig`].
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        /// Config file.
        path: PathBuf,
        /// TOML failure.
        #[source]
        source: toml::de::Error,
    },
}

/// Header fields of the aggregate OpenAPI document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// `info.title`
    pub title: String,
    /// `info.version`
    pub version: String,
    /// `info.description`
    pub description: String,
    /// URL of the single entry in `servers`.
    pub server_url: String,
    /// Description of that server.
    pub server_description: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: "DOCUMENTATION".to_string(),
            version: "1.0.0".to_string(),
            description: String::new(),
            server_url: "http://localhost:1337/api".to_string(),
            server_description: "Development server".to_string(),
        }
    }
}

/// Where inputs are looked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Schema root relative to the Strapi project directory.
    pub schema_root: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            schema_root: PathBuf::from(SCHEMA_ROOT),
        }
    }
}

/// Contents of `contentgen.toml`. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// `[document]` section.
    pub document: DocumentConfig,
    /// `[layout]` section.
    pub layout: LayoutConfig,
}

impl GeneratorConfig {
    /// Parse the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `explicit` if given, else `<strapi_dir>/contentgen.toml` if it
    /// exists, else defaults.
    pub fn discover(explicit: Option<&Path>, strapi_dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = strapi_dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "Using project config.");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// `<strapi_dir>/<schema_root>`
    pub fn schema_root(&self, strapi_dir: &Path) -> PathBuf {
        strapi_dir.join(&self.layout.schema_root)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: GeneratorConfig = toml::from_str(
            r#"
            [document]
            title = "Blog API"
            "#,
        )
        .unwrap();

        assert_eq!(config.document.title, "Blog API");
        assert_eq!(config.document.server_url, "http://localhost:1337/api");
        assert_eq!(config.layout.schema_root, PathBuf::from("src/api"));
    }

    #[test]
    fn discovers_project_config() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            GeneratorConfig::discover(None, dir.path()).unwrap(),
            GeneratorConfig::default()
        );

        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "[layout]\nschema_root = \"cms/api\"\n",
        )
        .unwrap();
        let config = GeneratorConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.schema_root(dir.path()), dir.path().join("cms/api"));
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = GeneratorConfig::discover(Some(&dir.path().join("nope.toml")), dir.path())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "[document\n").unwrap();
        assert!(matches!(GeneratorConfig::load(&path), Err(ConfigError::Parse { .. })));
    }
}
