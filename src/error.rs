//! Error types for plugin release operations.
//!
//! Every failure surfaces as a [`ReleaseError`] carrying an actionable message,
//! recovery suggestions, and the process exit code the CLI should terminate with.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Manifest could not be read or carries no usable version
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Artifact file problems
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// Upload failed after the retry budget was spent
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// CLI argument and configuration errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive writing errors
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Directory traversal errors while packaging
    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

/// Manifest parsing errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file could not be read
    #[error("Failed to read manifest {path}: {source}")]
    Unreadable {
        /// Manifest path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// No `version` key present
    #[error("Manifest {path} has no 'version' field")]
    MissingVersion {
        /// Manifest path
        path: PathBuf,
    },

    /// `version` present but not a dotted numeric string
    #[error("Manifest {path} has invalid version '{version}': {reason}")]
    InvalidVersion {
        /// Manifest path
        path: PathBuf,
        /// Raw version value
        version: String,
        /// Reason for the error
        reason: String,
    },

    /// `version` declared twice with different values
    #[error("Manifest {path} declares conflicting versions '{first}' and '{second}'")]
    ConflictingVersion {
        /// Manifest path
        path: PathBuf,
        /// First declared value
        first: String,
        /// Later declared value
        second: String,
    },
}

/// Artifact file errors
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// Expected artifact does not exist
    #[error("Artifact '{name}' not found at {path}")]
    Missing {
        /// Artifact file name
        name: String,
        /// Path that was checked
        path: PathBuf,
    },

    /// Artifact exists but could not be read
    #[error("Failed to read artifact {path}: {source}")]
    Unreadable {
        /// Artifact path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// A single failed upload attempt
#[derive(Error, Debug)]
pub enum UploadAttemptError {
    /// Connection, DNS, TLS or timeout failure
    #[error("transport failure: {reason}")]
    Transport {
        /// Reason for the error
        reason: String,
    },

    /// Server answered with a non-2xx status
    #[error("server responded with HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The request itself could not be built
    #[error("invalid upload request: {reason}")]
    InvalidRequest {
        /// Reason for the error
        reason: String,
    },
}

impl UploadAttemptError {
    /// Whether another attempt may succeed
    pub fn is_transient(&self) -> bool {
        !matches!(self, UploadAttemptError::InvalidRequest { .. })
    }
}

/// Upload errors after retries
#[derive(Error, Debug)]
pub enum UploadError {
    /// Every allowed attempt failed
    #[error("Upload to {url} failed after {attempts} attempt(s): {last}")]
    Exhausted {
        /// Endpoint URL
        url: String,
        /// Number of attempts made
        attempts: u32,
        /// Error from the final attempt
        #[source]
        last: UploadAttemptError,
    },

    /// An attempt failed in a way retrying cannot fix
    #[error("Upload to {url} aborted after {attempts} attempt(s): {source}")]
    Aborted {
        /// Endpoint URL
        url: String,
        /// Number of attempts made
        attempts: u32,
        /// Error that stopped the upload
        #[source]
        source: UploadAttemptError,
    },
}

impl UploadError {
    /// Number of attempts that were made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            UploadError::Exhausted { attempts, .. } | UploadError::Aborted { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Credential environment variable unset or empty
    #[error("Upload key not provided. Set the {var} environment variable")]
    MissingCredential {
        /// Environment variable name
        var: String,
    },

    /// Endpoint base URL or project identifier cannot form a URL
    #[error("Invalid endpoint '{url}': {reason}")]
    InvalidEndpoint {
        /// Offending URL
        url: String,
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Manifest(ManifestError::MissingVersion { path }) => vec![
                format!("Add a line such as 'version=0.1.0' to {}", path.display()),
                "Check that --manifest points at the plugin's metadata.txt".to_string(),
            ],
            ReleaseError::Manifest(ManifestError::InvalidVersion { .. }) => vec![
                "Use a dotted numeric version such as 'version=0.4.4'".to_string(),
            ],
            ReleaseError::Manifest(ManifestError::Unreadable { .. }) => vec![
                "Check that --manifest points at an existing file".to_string(),
            ],
            ReleaseError::Artifact(ArtifactError::Missing { name, .. }) => vec![
                "Build the artifact first: lizard_plugin_release package".to_string(),
                format!("Or pass --artifact-dir pointing at the directory holding {}", name),
            ],
            ReleaseError::Cli(CliError::MissingCredential { var }) => vec![
                format!("Export the upload key: export {}=<key>", var),
                "Or name a different variable with --key-env".to_string(),
            ],
            ReleaseError::Upload(UploadError::Exhausted { .. }) => vec![
                "Check network connectivity to the artifact server".to_string(),
                "Verify the upload key is valid for this project".to_string(),
                "Raise --attempts or --backoff-ms for flaky connections".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable by retrying the same operation
    pub fn is_recoverable(&self) -> bool {
        match self {
            ReleaseError::Upload(UploadError::Exhausted { .. }) => true,
            ReleaseError::Io(_) => true,
            _ => false,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ReleaseError::Manifest(_) => 2,
            ReleaseError::Artifact(ArtifactError::Missing { .. }) => 3,
            ReleaseError::Upload(_) => 4,
            _ => 1,
        }
    }
}
