//! Preview command implementation.
//!
//! Resolves everything a publish would use and reports it without uploading.

use super::helpers::publish_config;
use crate::cli::{ReleaseArgs, RuntimeConfig, UploadArgs};
use crate::error::Result;
use crate::publisher::Publisher;

/// Execute preview command
pub(super) async fn execute_preview(
    release: &ReleaseArgs,
    upload: &UploadArgs,
    config: &RuntimeConfig,
) -> Result<()> {
    let publish_config = publish_config(release, upload)?;
    let attempts = publish_config.retry.max_attempts;
    let backoff = publish_config.retry.backoff;
    let publisher = Publisher::new(publish_config)?;
    let plan = publisher.plan()?;

    let _ = config.output().info("Release preview (nothing will be uploaded)");
    config.indent(&format!("Version:  {}", plan.version));
    config.indent(&format!("Artifact: {}", plan.artifact.file_name()));
    config.indent(&format!("Path:     {}", plan.artifact_path.display()));
    config.indent(&format!("Endpoint: {}", plan.upload_url));
    config.indent(&format!(
        "Retries:  {} attempt(s), {}ms apart",
        attempts,
        backoff.as_millis()
    ));

    if !std::env::var(&upload.key_env).is_ok_and(|v| !v.trim().is_empty()) {
        config.warning_println(&format!("{} is not set; publish would fail", upload.key_env));
    }

    if plan.artifact_present {
        config.success_println("Artifact is present");
    } else {
        config.warning_println("Artifact not found; run the package command first");
    }

    Ok(())
}
