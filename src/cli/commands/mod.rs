//! Command execution functions.

mod helpers;
mod package;
mod preview;
mod publish;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::{ReleaseError, Result};

use package::execute_package;
use preview::execute_preview;
use publish::execute_publish;

/// Execute the command and map its outcome to a process exit code
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        // Never quiet for validation errors
        let output = super::OutputManager::new(false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);

    let result = match &args.command {
        Command::Publish { release, upload } => execute_publish(release, upload, &config).await,
        Command::Preview { release, upload } => execute_preview(release, upload, &config).await,
        Command::Package {
            plugin_name,
            plugin_dir,
            manifest,
            output_dir,
        } => {
            execute_package(
                plugin_name,
                plugin_dir,
                manifest.as_deref(),
                output_dir,
                &config,
            )
            .await
        }
    };

    match result {
        Ok(()) => Ok(0),
        Err(e) => {
            config.error_println(&format!("Command '{}' failed: {}", args.command.name(), e));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() && !config.is_quiet() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }
            if let Some(hint) = rerun_hint(&e) {
                config.warning_println(hint);
            }

            Ok(e.exit_code())
        }
    }
}

/// Hint shown when running the same command again may succeed
fn rerun_hint(error: &ReleaseError) -> Option<&'static str> {
    error
        .is_recoverable()
        .then_some("This failure may be temporary; re-running the command can succeed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ManifestError, UploadAttemptError, UploadError};
    use std::path::PathBuf;

    #[test]
    fn test_rerun_hint_only_for_recoverable_errors() {
        let exhausted = ReleaseError::from(UploadError::Exhausted {
            url: "https://artifacts.example.net/upload/threedi-api-qgis-client/".to_string(),
            attempts: 3,
            last: UploadAttemptError::Status { status: 502 },
        });
        assert!(rerun_hint(&exhausted).is_some());

        let manifest = ReleaseError::from(ManifestError::MissingVersion {
            path: PathBuf::from("metadata.txt"),
        });
        assert!(rerun_hint(&manifest).is_none());
    }
}
