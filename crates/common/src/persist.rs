//! Persisted-state contract for generated files.
//!
//! Writing creates missing parent directories. When the destination already
//! exists its previous content is copied to a `.bak` sibling first; there is no
//! recovery beyond that single backup.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors raised while persisting a generated file.
#[derive(Debug, Error)]
pub enum PersistError {
    /// A parent directory could not be created.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        /// Directory being created.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The previous version could not be copied aside.
    #[error("failed to back up {}: {source}", .path.display())]
    Backup {
        /// Path being written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The new contents could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// Path being written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Outcome of a successful [`save_as`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved {
    /// Destination that was written.
    pub path: PathBuf,
    /// Set when a previous version was preserved.
    pub backup: Option<PathBuf>,
}

/// `out/Article.tsx` -> `out/Article.tsx.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

/// Write `contents` to `path`, keeping the previous version as `<path>.bak`.
pub async fn save_as(path: &Path, contents: impl AsRef<[u8]>) -> Result<Saved, PersistError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| PersistError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let existing = tokio::fs::try_exists(path)
        .await
        .map_err(|source| PersistError::Backup {
            path: path.to_path_buf(),
            source,
        })?;

    let backup = if existing {
        let bak = backup_path(path);
        tokio::fs::copy(path, &bak)
            .await
            .map_err(|source| PersistError::Backup {
                path: path.to_path_buf(),
                source,
            })?;
        Some(bak)
    } else {
        None
    };

    tokio::fs::write(path, contents)
        .await
        .map_err(|source| PersistError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(
        path = %path.display(),
        backed_up = backup.is_some(),
        "Saved generated file."
    );

    Ok(Saved {
        path: path.to_path_buf(),
        backup,
    })
}
