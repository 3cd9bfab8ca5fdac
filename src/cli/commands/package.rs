//! Package command implementation.

use crate::cli::RuntimeConfig;
use crate::error::Result;
use crate::package::{PackageOptions, package_plugin};
use std::path::Path;

/// Execute package command
pub(super) async fn execute_package(
    plugin_name: &str,
    plugin_dir: &Path,
    manifest: Option<&Path>,
    output_dir: &Path,
    config: &RuntimeConfig,
) -> Result<()> {
    let options = PackageOptions {
        plugin_name: plugin_name.to_string(),
        plugin_dir: plugin_dir.to_path_buf(),
        manifest_path: manifest
            .map(Path::to_path_buf)
            .unwrap_or_else(|| plugin_dir.join("metadata.txt")),
        output_dir: output_dir.to_path_buf(),
    };

    config.progress_println(&format!("Packaging {}", plugin_dir.display()));
    let report = package_plugin(&options).await?;

    config.success_println(&format!(
        "Created {} ({} file(s))",
        report.archive_path.display(),
        report.files
    ));

    Ok(())
}
