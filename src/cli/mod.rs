//! Command line interface for lizard_plugin_release.

mod args;
pub mod commands;
mod output;
mod retry_config;

pub use args::{Args, Command, ReleaseArgs, RuntimeConfig, UploadArgs};
pub use commands::execute_command;
pub use output::OutputManager;
pub use retry_config::RetrySettings;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}
