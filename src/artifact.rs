//! Versioned plugin artifact naming and loading.

use crate::error::{ArtifactError, Result};
use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Derive the artifact file name for a plugin version
pub fn artifact_file_name(plugin_name: &str, version: &str) -> String {
    format!("{}.{}.zip", plugin_name, version)
}

/// Reference to the `{plugin}.{version}.zip` artifact of one release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    plugin_name: String,
    version: String,
}

impl ArtifactRef {
    /// Create a reference for `plugin_name` at `version`
    pub fn new(plugin_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            version: version.into(),
        }
    }

    /// Plugin name
    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    /// Release version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// File name of the artifact
    pub fn file_name(&self) -> String {
        artifact_file_name(&self.plugin_name, &self.version)
    }

    /// Path of the artifact within `dir`, whether or not it exists
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }

    /// Resolve the artifact within `dir`, failing if it is not a file
    pub fn locate(&self, dir: &Path) -> Result<PathBuf> {
        let path = self.path_in(dir);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ArtifactError::Missing {
                name: self.file_name(),
                path,
            }
            .into())
        }
    }

    /// Locate and read the artifact within `dir`
    pub async fn load(&self, dir: &Path) -> Result<LoadedArtifact> {
        let path = self.locate(dir)?;
        let data = tokio::fs::read(&path)
            .await
            .map_err(|source| ArtifactError::Unreadable {
                path: path.clone(),
                source,
            })?;

        let sha256 = sha256_hex(&data);
        log::info!(
            "Loaded artifact {} ({} bytes, sha256 {})",
            path.display(),
            data.len(),
            sha256
        );

        Ok(LoadedArtifact {
            file_name: self.file_name(),
            path,
            data: Bytes::from(data),
            sha256,
        })
    }
}

/// Artifact contents held in memory for upload
#[derive(Debug, Clone)]
pub struct LoadedArtifact {
    /// File name sent with the upload
    pub file_name: String,
    /// Where the artifact was read from
    pub path: PathBuf,
    /// Raw archive bytes
    pub data: Bytes,
    /// Hex-encoded SHA-256 of `data`
    pub sha256: String,
}

impl LoadedArtifact {
    /// Size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the artifact is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
