//! Plugin packaging into a versioned zip artifact.
//!
//! The QGIS plugin installer expects every entry of the archive to live under a
//! single top-level folder named after the plugin.

use crate::artifact::ArtifactRef;
use crate::error::{CliError, ReleaseError, Result};
use crate::manifest::Manifest;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Directory and file names never shipped in an artifact
const EXCLUDED_NAMES: &[&str] = &["__pycache__", ".git", ".DS_Store", ".idea", ".vscode"];

/// File extensions never shipped in an artifact
const EXCLUDED_EXTENSIONS: &[&str] = &["pyc", "pyo"];

/// Inputs for building an artifact
#[derive(Debug, Clone)]
pub struct PackageOptions {
    /// Plugin name; also the archive's top-level folder
    pub plugin_name: String,
    /// Directory with the plugin sources
    pub plugin_dir: PathBuf,
    /// Manifest holding the `version` field
    pub manifest_path: PathBuf,
    /// Where the archive is written
    pub output_dir: PathBuf,
}

/// Result of packaging
#[derive(Debug, Clone)]
pub struct PackageReport {
    /// Artifact that was built
    pub artifact: ArtifactRef,
    /// Written archive
    pub archive_path: PathBuf,
    /// Number of files stored
    pub files: usize,
}

/// Build `{plugin}.{version}.zip` in the output directory, replacing any previous one
pub async fn package_plugin(options: &PackageOptions) -> Result<PackageReport> {
    if !options.plugin_dir.is_dir() {
        return Err(CliError::InvalidArguments {
            reason: format!(
                "plugin directory {} does not exist",
                options.plugin_dir.display()
            ),
        }
        .into());
    }

    let manifest = Manifest::load(&options.manifest_path)?;
    let artifact = ArtifactRef::new(&options.plugin_name, manifest.version());

    tokio::fs::create_dir_all(&options.output_dir).await?;
    let archive_path = artifact.path_in(&options.output_dir);

    log::info!(
        "Packaging {} into {}",
        options.plugin_dir.display(),
        archive_path.display()
    );

    let plugin_dir = options.plugin_dir.clone();
    let prefix = options.plugin_name.clone();
    let target = archive_path.clone();

    let files = tokio::task::spawn_blocking(move || write_archive(&plugin_dir, &prefix, &target))
        .await
        .map_err(|e| {
            ReleaseError::Io(io::Error::other(format!("Packaging task failed: {}", e)))
        })??;

    log::info!("Packaged {} file(s) into {}", files, archive_path.display());

    Ok(PackageReport {
        artifact,
        archive_path,
        files,
    })
}

fn is_excluded(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    if EXCLUDED_NAMES.iter().any(|excluded| name == *excluded) {
        return true;
    }
    entry.file_type().is_file()
        && entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| EXCLUDED_EXTENSIONS.contains(&ext))
}

/// Archive entry name: `{prefix}/{relative path with forward slashes}`
fn entry_name(prefix: &str, relative: &Path) -> String {
    let mut name = prefix.to_string();
    for component in relative.components() {
        name.push('/');
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    name
}

fn write_archive(plugin_dir: &Path, prefix: &str, target: &Path) -> Result<usize> {
    // Canonical form lets us skip the archive when it is written inside the plugin dir
    let target_canonical_parent = target.parent().and_then(|p| p.canonicalize().ok());
    let target_name = target.file_name().map(|n| n.to_os_string());

    let file = File::create(target)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.add_directory(format!("{}/", prefix), options)?;

    let mut files = 0;
    let walker = WalkDir::new(plugin_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry));

    for entry in walker {
        let entry = entry?;
        if entry.depth() == 0 {
            continue;
        }

        let path = entry.path();
        if entry.file_type().is_file()
            && path.file_name().map(|n| n.to_os_string()) == target_name
            && path.parent().and_then(|p| p.canonicalize().ok()) == target_canonical_parent
        {
            continue;
        }

        let relative = path.strip_prefix(plugin_dir).map_err(|e| {
            ReleaseError::Io(io::Error::other(format!(
                "{} is outside {}: {}",
                path.display(),
                plugin_dir.display(),
                e
            )))
        })?;
        let name = entry_name(prefix, relative);

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{}/", name), options)?;
        } else if entry.file_type().is_file() {
            log::debug!("Adding {}", name);
            zip.start_file(name, options)?;
            let mut source = File::open(path)?;
            io::copy(&mut source, &mut zip)?;
            files += 1;
        }
    }

    zip.finish()?.flush()?;
    Ok(files)
}
