//! Command line argument parsing and validation.

use crate::credential::DEFAULT_KEY_ENV;
use crate::publisher::{DEFAULT_MANIFEST, DEFAULT_PLUGIN_NAME};
use crate::target::{DEFAULT_ENDPOINT, DEFAULT_PROJECT};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Package and publish QGIS plugin artifacts
#[derive(Parser, Debug)]
#[command(
    name = "lizard_plugin_release",
    version,
    about = "Package and publish QGIS plugin artifacts",
    long_about = "Package a QGIS plugin into {plugin}.{version}.zip and upload it to the artifact server.

The version is read from the plugin's metadata.txt. The upload key is read from the
environment variable named by --key-env (THREEDI_API_QGIS_CLIENT_ARTIFACTS_KEY by default).

Usage:
  lizard_plugin_release package --plugin-dir lizard_qgis_plugin
  lizard_plugin_release preview --manifest lizard_qgis_plugin/metadata.txt
  lizard_plugin_release publish --manifest lizard_qgis_plugin/metadata.txt"
)]
pub struct Args {
    /// Command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload the artifact for the manifest's current version
    Publish {
        /// Artifact selection
        #[command(flatten)]
        release: ReleaseArgs,

        /// Upload settings
        #[command(flatten)]
        upload: UploadArgs,
    },

    /// Show what publish would upload without sending anything
    Preview {
        /// Artifact selection
        #[command(flatten)]
        release: ReleaseArgs,

        /// Upload settings
        #[command(flatten)]
        upload: UploadArgs,
    },

    /// Zip the plugin directory into {plugin}.{version}.zip
    Package {
        /// Plugin name; also the archive's top-level folder
        #[arg(long, env = "LIZARD_RELEASE_PLUGIN_NAME", default_value = DEFAULT_PLUGIN_NAME)]
        plugin_name: String,

        /// Directory holding the plugin sources
        #[arg(long, default_value = ".")]
        plugin_dir: PathBuf,

        /// Manifest path (defaults to metadata.txt inside --plugin-dir)
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Where to write the archive
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Publish { .. } => "publish",
            Command::Preview { .. } => "preview",
            Command::Package { .. } => "package",
        }
    }
}

/// Which artifact to release
#[derive(clap::Args, Debug, Clone)]
pub struct ReleaseArgs {
    /// Manifest holding the version field
    #[arg(long, env = "LIZARD_RELEASE_MANIFEST", default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Plugin name used in the artifact file name
    #[arg(long, env = "LIZARD_RELEASE_PLUGIN_NAME", default_value = DEFAULT_PLUGIN_NAME)]
    pub plugin_name: String,

    /// Directory holding the built artifact
    #[arg(long, default_value = ".")]
    pub artifact_dir: PathBuf,
}

/// Where and how to upload
#[derive(clap::Args, Debug, Clone)]
pub struct UploadArgs {
    /// Artifact server base URL
    #[arg(long, env = "LIZARD_RELEASE_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Project identifier on the artifact server
    #[arg(long, env = "LIZARD_RELEASE_PROJECT", default_value = DEFAULT_PROJECT)]
    pub project: String,

    /// Environment variable holding the upload key
    #[arg(long, default_value = DEFAULT_KEY_ENV)]
    pub key_env: String,

    /// Total upload attempts (overrides LIZARD_RELEASE_ATTEMPTS)
    #[arg(long)]
    pub attempts: Option<u32>,

    /// Pause between attempts in milliseconds (overrides LIZARD_RELEASE_BACKOFF_MS)
    #[arg(long)]
    pub backoff_ms: Option<u64>,

    /// Per-request timeout in seconds (0 waits indefinitely)
    #[arg(long, default_value_t = 0)]
    pub timeout: u64,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Publish { release, upload } | Command::Preview { release, upload } => {
                if release.plugin_name.trim().is_empty() {
                    return Err("--plugin-name must not be empty".to_string());
                }
                if upload.key_env.trim().is_empty() {
                    return Err("--key-env must name an environment variable".to_string());
                }
                if upload.attempts == Some(0) {
                    return Err("--attempts must be at least 1".to_string());
                }
            }
            Command::Package { plugin_name, .. } => {
                if plugin_name.trim().is_empty() {
                    return Err("--plugin-name must not be empty".to_string());
                }
            }
        }
        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print progress message
    pub fn progress_println(&self, message: &str) {
        let _ = self.output.progress(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Whether non-error output is suppressed
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.quiet)
    }
}
