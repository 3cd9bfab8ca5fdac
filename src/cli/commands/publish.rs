//! Publish command implementation.

use super::helpers::{format_size, publish_config};
use crate::cli::{ReleaseArgs, RuntimeConfig, UploadArgs};
use crate::credential::Credential;
use crate::error::Result;
use crate::publisher::Publisher;

/// Execute publish command
pub(super) async fn execute_publish(
    release: &ReleaseArgs,
    upload: &UploadArgs,
    config: &RuntimeConfig,
) -> Result<()> {
    let publisher = Publisher::new(publish_config(release, upload)?)?;

    // Manifest problems take precedence over a missing key
    let plan = publisher.plan()?;
    let credential = Credential::from_env(&upload.key_env)?;

    config.progress_println(&format!(
        "Publishing {} from {}",
        plan.artifact.file_name(),
        publisher.config().manifest_path.display()
    ));

    let report = publisher.publish(&credential).await?;

    config.success_println(&format!(
        "Uploaded {} ({}) to {}",
        report.artifact_name,
        format_size(report.size),
        report.upload_url
    ));
    config.indent(&format!("Version:  {}", report.version));
    config.indent(&format!("SHA-256:  {}", report.sha256));
    config.indent(&format!(
        "Response: HTTP {} after {} attempt(s)",
        report.status, report.attempts
    ));

    Ok(())
}
