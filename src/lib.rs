//! # Lizard Plugin Release
//!
//! Packaging and publishing for the Lizard QGIS plugin.
//!
//! A release reads the `version` from the plugin's `metadata.txt`, expects a
//! `{plugin}.{version}.zip` artifact next to it and uploads that artifact to the
//! artifact server as `multipart/form-data`, retrying failed attempts.
//!
//! ## Usage
//!
//! ```bash
//! lizard_plugin_release package --plugin-dir lizard_qgis_plugin
//! lizard_plugin_release preview --manifest lizard_qgis_plugin/metadata.txt
//! lizard_plugin_release publish --manifest lizard_qgis_plugin/metadata.txt
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod artifact;
pub mod cli;
pub mod credential;
pub mod error;
pub mod manifest;
pub mod package;
pub mod publisher;
pub mod retry;
pub mod target;
pub mod upload;

pub use artifact::{ArtifactRef, LoadedArtifact, artifact_file_name};
pub use cli::Args;
pub use credential::Credential;
pub use error::{ReleaseError, Result};
pub use manifest::{Manifest, PluginVersion};
pub use package::{PackageOptions, PackageReport, package_plugin};
pub use publisher::{PublishConfig, PublishPlan, PublishReport, Publisher, publish};
pub use retry::{RetryPolicy, retry_with_policy};
pub use target::UploadTarget;
pub use upload::{ArtifactUploader, HttpUploader, UploadReceipt, UploadRequest};
