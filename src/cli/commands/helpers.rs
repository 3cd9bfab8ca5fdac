//! Helpers shared by command implementations.

use crate::cli::{ReleaseArgs, RetrySettings, UploadArgs};
use crate::error::Result;
use crate::publisher::PublishConfig;
use crate::target::UploadTarget;
use std::time::Duration;

/// Build the publish configuration for one run from parsed flags and the environment
pub(super) fn publish_config(release: &ReleaseArgs, upload: &UploadArgs) -> Result<PublishConfig> {
    let retry = RetrySettings::from_env().with_overrides(upload.attempts, upload.backoff_ms);

    Ok(PublishConfig {
        plugin_name: release.plugin_name.clone(),
        manifest_path: release.manifest.clone(),
        artifact_dir: release.artifact_dir.clone(),
        target: UploadTarget::new(&upload.endpoint, &upload.project)?,
        retry: retry.policy(),
        timeout: (upload.timeout > 0).then(|| Duration::from_secs(upload.timeout)),
    })
}

/// Human-readable byte count
pub(super) fn format_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
