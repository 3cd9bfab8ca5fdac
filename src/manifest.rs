//! Plugin metadata manifest.
//!
//! QGIS plugins ship a `metadata.txt` of `key=value` lines, usually under a
//! `[general]` section header. Only `version` is required for releasing.

use crate::error::{ManifestError, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Dotted numeric plugin version, e.g. `0.4.4`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginVersion {
    raw: String,
    components: Vec<u64>,
}

impl PluginVersion {
    /// Parse a dotted numeric version string.
    ///
    /// Returns the reason on failure so callers can attach their own context.
    pub fn parse(raw: &str) -> std::result::Result<Self, String> {
        if raw.is_empty() {
            return Err("version is empty".to_string());
        }

        let mut components = Vec::new();
        for part in raw.split('.') {
            if part.is_empty() {
                return Err("empty version component".to_string());
            }
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(format!("component '{}' is not numeric", part));
            }
            let value = part
                .parse::<u64>()
                .map_err(|e| format!("component '{}' out of range: {}", part, e))?;
            components.push(value);
        }

        Ok(Self {
            raw: raw.to_string(),
            components,
        })
    }

    /// Numeric components in order
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Version exactly as written in the manifest
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PluginVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parsed manifest entries in declaration order
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    entries: Vec<(String, String)>,
    version: PluginVersion,
}

impl Manifest {
    /// Read and parse a manifest from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse manifest text; `path` is only used for error messages.
    ///
    /// Indented lines continue the previous value, as multi-line `about` and
    /// `changelog` fields do. Only the `version` field can fail parsing.
    pub fn parse(content: &str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut entries: Vec<(String, String)> = Vec::new();

        for (index, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty()
                || trimmed.starts_with('#')
                || trimmed.starts_with(';')
                || (trimmed.starts_with('[') && trimmed.ends_with(']'))
            {
                continue;
            }

            if line.starts_with(char::is_whitespace) {
                if let Some((_, value)) = entries.last_mut() {
                    if !value.is_empty() {
                        value.push('\n');
                    }
                    value.push_str(trimmed);
                    continue;
                }
            }

            let Some((key, value)) = trimmed.split_once('=') else {
                log::warn!(
                    "{}:{}: ignoring line without '=': {}",
                    path.display(),
                    index + 1,
                    trimmed
                );
                continue;
            };

            entries.push((key.trim().to_string(), value.trim().to_string()));
        }

        let mut versions = entries
            .iter()
            .filter(|(key, _)| key == "version")
            .map(|(_, value)| value);
        let raw = versions
            .next()
            .cloned()
            .ok_or_else(|| ManifestError::MissingVersion { path: path.clone() })?;
        if let Some(second) = versions.find(|value| **value != raw) {
            return Err(ManifestError::ConflictingVersion {
                path,
                first: raw,
                second: second.clone(),
            }
            .into());
        }

        let version = PluginVersion::parse(&raw).map_err(|reason| ManifestError::InvalidVersion {
            path: path.clone(),
            version: raw.clone(),
            reason,
        })?;

        log::debug!("Parsed manifest {} (version {})", path.display(), version);

        Ok(Self {
            path,
            entries,
            version,
        })
    }

    /// The plugin version
    pub fn plugin_version(&self) -> &PluginVersion {
        &self.version
    }

    /// The plugin version as written
    pub fn version(&self) -> &str {
        self.version.as_str()
    }

    /// First value declared for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Where this manifest was read from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;

    const QGIS_METADATA: &str = "\
[general]
name=Lizard
qgisMinimumVersion=3.22
description=Browse and download Lizard rasters and scenario results
version=0.4.4
author=Lutra Consulting for 3Di Water Management
; comment
# another comment
tags=python, 3di, lizard
";

    #[test]
    fn test_parses_qgis_metadata() {
        let manifest = Manifest::parse(QGIS_METADATA, "metadata.txt").unwrap();
        assert_eq!(manifest.version(), "0.4.4");
        assert_eq!(manifest.plugin_version().components(), &[0, 4, 4]);
        assert_eq!(manifest.get("name"), Some("Lizard"));
        assert_eq!(manifest.get("tags"), Some("python, 3di, lizard"));
        assert_eq!(manifest.get("missing"), None);
    }

    #[test]
    fn test_trims_whitespace_around_version() {
        let manifest = Manifest::parse("version = 1.2.3  \n", "metadata.txt").unwrap();
        assert_eq!(manifest.version(), "1.2.3");
    }

    #[test]
    fn test_missing_version_is_rejected() {
        let err = Manifest::parse("[general]\nname=Lizard\n", "metadata.txt").unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Manifest(ManifestError::MissingVersion { .. })
        ));
    }

    #[test]
    fn test_malformed_versions_are_rejected() {
        for bad in ["", "v1.0", "1..2", "0.4.4-beta", ".1", "1."] {
            let content = format!("version={}\n", bad);
            let err = Manifest::parse(&content, "metadata.txt").unwrap_err();
            assert!(
                matches!(err, ReleaseError::Manifest(ManifestError::InvalidVersion { .. })),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_versionless_key_prefix_is_not_version() {
        let err = Manifest::parse("versionNote=1.0\n", "metadata.txt").unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Manifest(ManifestError::MissingVersion { .. })
        ));
    }

    #[test]
    fn test_conflicting_versions_are_rejected() {
        let err = Manifest::parse("version=1.0\nversion=1.1\n", "metadata.txt").unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Manifest(ManifestError::ConflictingVersion { .. })
        ));

        let same = Manifest::parse("version=1.0\nversion=1.0\n", "metadata.txt").unwrap();
        assert_eq!(same.version(), "1.0");
    }

    #[test]
    fn test_multi_line_changelog_is_continued() {
        let content = "\
[general]
name=Lizard
version=0.4.4
changelog=
    0.4.4: Fixed raster downloads for large extents
    0.4.3: Added scenario filters
about=Browse Lizard data
  from inside QGIS
tags=python, lizard
";
        let manifest = Manifest::parse(content, "metadata.txt").unwrap();
        assert_eq!(manifest.version(), "0.4.4");
        assert_eq!(
            manifest.get("changelog"),
            Some("0.4.4: Fixed raster downloads for large extents\n0.4.3: Added scenario filters")
        );
        assert_eq!(
            manifest.get("about"),
            Some("Browse Lizard data\nfrom inside QGIS")
        );
        assert_eq!(manifest.get("tags"), Some("python, lizard"));
    }

    #[test]
    fn test_stray_line_without_separator_is_ignored() {
        let manifest = Manifest::parse("version=1.0
just text
", "metadata.txt").unwrap();
        assert_eq!(manifest.version(), "1.0");
        assert_eq!(manifest.get("just text"), None);
    }

    #[test]
    fn test_continuation_of_version_is_invalid() {
        let err = Manifest::parse("version=1.0
  beta
", "metadata.txt").unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Manifest(ManifestError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_byte_order_mark_is_stripped() {
        let content = "\u{feff}[general]\r\nname=Lizard\r\nversion=0.4.4\r\n";
        let manifest = Manifest::parse(content, "metadata.txt").unwrap();
        assert_eq!(manifest.version(), "0.4.4");

        let bare = Manifest::parse("\u{feff}version=2.0\n", "metadata.txt").unwrap();
        assert_eq!(bare.version(), "2.0");
    }

    #[test]
    fn test_load_reports_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::load(&dir.path().join("metadata.txt")).unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Manifest(ManifestError::Unreadable { .. })
        ));
    }

    #[test]
    fn test_load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.txt");
        std::fs::write(&path, QGIS_METADATA).unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.version(), "0.4.4");
        assert_eq!(manifest.path(), path.as_path());
    }
}
