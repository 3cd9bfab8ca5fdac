//! Release publishing: manifest version to uploaded artifact.

use crate::artifact::ArtifactRef;
use crate::credential::Credential;
use crate::error::{Result, UploadError};
use crate::manifest::Manifest;
use crate::retry::{RetryPolicy, retry_with_policy};
use crate::target::UploadTarget;
use crate::upload::{ArtifactUploader, HttpUploader, UploadRequest};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Plugin whose artifacts are published by default
pub const DEFAULT_PLUGIN_NAME: &str = "lizard_qgis_plugin";

/// Default manifest location, relative to the working directory
pub const DEFAULT_MANIFEST: &str = "metadata.txt";

/// Configuration for one publish run
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Plugin name used in the artifact file name
    pub plugin_name: String,
    /// Manifest holding the `version` field
    pub manifest_path: PathBuf,
    /// Directory holding the built artifact
    pub artifact_dir: PathBuf,
    /// Artifact server endpoint
    pub target: UploadTarget,
    /// Upload retry behaviour
    pub retry: RetryPolicy,
    /// Per-request timeout (`None` waits indefinitely)
    pub timeout: Option<Duration>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            plugin_name: DEFAULT_PLUGIN_NAME.to_string(),
            manifest_path: PathBuf::from(DEFAULT_MANIFEST),
            artifact_dir: PathBuf::from("."),
            target: UploadTarget::default(),
            retry: RetryPolicy::default(),
            timeout: None,
        }
    }
}

/// What a publish run would do, resolved without touching the network
#[derive(Debug, Clone)]
pub struct PublishPlan {
    /// Version read from the manifest
    pub version: String,
    /// Artifact derived from the version
    pub artifact: ArtifactRef,
    /// Expected artifact location
    pub artifact_path: PathBuf,
    /// Whether the artifact currently exists
    pub artifact_present: bool,
    /// Upload endpoint
    pub upload_url: Url,
}

/// Outcome of a successful publish
#[derive(Debug, Clone)]
pub struct PublishReport {
    /// Published version
    pub version: String,
    /// Uploaded file name
    pub artifact_name: String,
    /// Where the artifact was read from
    pub artifact_path: PathBuf,
    /// Upload endpoint
    pub upload_url: Url,
    /// Attempts made, first try included
    pub attempts: u32,
    /// Artifact size in bytes
    pub size: usize,
    /// Hex-encoded SHA-256 of the artifact
    pub sha256: String,
    /// HTTP status of the accepting response
    pub status: u16,
}

/// Publishes versioned plugin artifacts
pub struct Publisher<U = HttpUploader> {
    config: PublishConfig,
    uploader: U,
}

impl Publisher<HttpUploader> {
    /// Create a publisher that uploads over HTTP
    pub fn new(config: PublishConfig) -> Result<Self> {
        let uploader = HttpUploader::new(config.timeout)?;
        Ok(Self { config, uploader })
    }
}

impl<U: ArtifactUploader> Publisher<U> {
    /// Create a publisher with a custom uploader
    pub fn with_uploader(config: PublishConfig, uploader: U) -> Self {
        Self { config, uploader }
    }

    /// Configuration in use
    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// The uploader in use
    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    /// Resolve manifest, artifact and endpoint without uploading
    pub fn plan(&self) -> Result<PublishPlan> {
        let manifest = Manifest::load(&self.config.manifest_path)?;
        let artifact = ArtifactRef::new(&self.config.plugin_name, manifest.version());
        let artifact_path = artifact.path_in(&self.config.artifact_dir);

        Ok(PublishPlan {
            version: manifest.version().to_string(),
            artifact_present: artifact_path.is_file(),
            artifact_path,
            artifact,
            upload_url: self.config.target.upload_url(),
        })
    }

    /// Upload the artifact matching the manifest's current version.
    ///
    /// Manifest and artifact problems fail before any request is sent.
    pub async fn publish(&self, credential: &Credential) -> Result<PublishReport> {
        let manifest = Manifest::load(&self.config.manifest_path)?;
        let artifact = ArtifactRef::new(&self.config.plugin_name, manifest.version());
        let loaded = artifact.load(&self.config.artifact_dir).await?;
        let upload_url = self.config.target.upload_url();

        log::info!(
            "Publishing {} to {} (up to {} attempt(s))",
            loaded.file_name,
            upload_url,
            self.config.retry.max_attempts.max(1)
        );

        let request = UploadRequest {
            url: upload_url.clone(),
            credential: credential.clone(),
            file_name: loaded.file_name.clone(),
            data: loaded.data.clone(),
        };

        let outcome = retry_with_policy(
            |_| self.uploader.upload(&request),
            &self.config.retry,
            &format!("Upload of {}", loaded.file_name),
        )
        .await
        .map_err(|failure| {
            if failure.exhausted {
                UploadError::Exhausted {
                    url: upload_url.to_string(),
                    attempts: failure.attempts,
                    last: failure.error,
                }
            } else {
                UploadError::Aborted {
                    url: upload_url.to_string(),
                    attempts: failure.attempts,
                    source: failure.error,
                }
            }
        })?;

        Ok(PublishReport {
            version: artifact.version().to_string(),
            artifact_name: loaded.file_name.clone(),
            size: loaded.len(),
            sha256: loaded.sha256.clone(),
            artifact_path: loaded.path,
            upload_url,
            attempts: outcome.attempts,
            status: outcome.value.status,
        })
    }
}

/// Publish the default plugin's artifact for the version in `manifest_path`.
///
/// The artifact is looked up in the process working directory and sent to
/// the default endpoint with the default retry policy.
pub async fn publish(manifest_path: &Path, credential: &Credential) -> Result<PublishReport> {
    let config = PublishConfig {
        manifest_path: manifest_path.to_path_buf(),
        ..PublishConfig::default()
    };
    Publisher::new(config)?.publish(credential).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ArtifactError, ManifestError, ReleaseError, UploadAttemptError};
    use crate::upload::UploadReceipt;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` calls, then succeeds (unless `always_fail`)
    struct ScriptedUploader {
        failures: u32,
        always_fail: bool,
        calls: AtomicU32,
        seen: Mutex<Vec<UploadRequest>>,
    }

    impl ScriptedUploader {
        fn failing_first(failures: u32) -> Self {
            Self {
                failures,
                always_fail: false,
                calls: AtomicU32::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn always_failing() -> Self {
            Self {
                always_fail: true,
                ..Self::failing_first(0)
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ArtifactUploader for ScriptedUploader {
        async fn upload(
            &self,
            request: &UploadRequest,
        ) -> std::result::Result<UploadReceipt, UploadAttemptError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.seen.lock().unwrap().push(request.clone());
            if self.always_fail || call <= self.failures {
                Err(UploadAttemptError::Status { status: 502 })
            } else {
                Ok(UploadReceipt { status: 201 })
            }
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new(manifest: &str, with_artifact: bool) -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("metadata.txt"), manifest).unwrap();
            if with_artifact {
                std::fs::write(
                    dir.path().join("lizard_qgis_plugin.0.4.4.zip"),
                    b"PK\x03\x04fake",
                )
                .unwrap();
            }
            Self { dir }
        }

        fn config(&self) -> PublishConfig {
            PublishConfig {
                manifest_path: self.dir.path().join("metadata.txt"),
                artifact_dir: self.dir.path().to_path_buf(),
                ..PublishConfig::default()
            }
        }
    }

    fn key() -> Credential {
        Credential::new("s3cret")
    }

    #[tokio::test]
    async fn test_single_call_on_first_success() {
        let fixture = Fixture::new("[general]\nversion=0.4.4\n", true);
        let publisher =
            Publisher::with_uploader(fixture.config(), ScriptedUploader::failing_first(0));

        let report = publisher.publish(&key()).await.unwrap();

        assert_eq!(publisher.uploader().calls(), 1);
        assert_eq!(report.attempts, 1);
        assert_eq!(report.status, 201);
        assert_eq!(report.artifact_name, "lizard_qgis_plugin.0.4.4.zip");
        assert_eq!(report.size, 8);

        let seen = publisher.uploader().seen.lock().unwrap();
        assert_eq!(seen[0].url.path(), "/upload/threedi-api-qgis-client/");
        assert_eq!(seen[0].file_name, "lizard_qgis_plugin.0.4.4.zip");
        assert_eq!(seen[0].credential.expose(), "s3cret");
        assert_eq!(seen[0].data.as_ref(), b"PK\x03\x04fake");
    }

    #[tokio::test]
    async fn test_two_transient_failures_then_success() {
        let fixture = Fixture::new("version=0.4.4\n", true);
        let publisher =
            Publisher::with_uploader(fixture.config(), ScriptedUploader::failing_first(2));

        let report = publisher.publish(&key()).await.unwrap();

        assert_eq!(publisher.uploader().calls(), 3);
        assert_eq!(report.attempts, 3);
    }

    #[tokio::test]
    async fn test_all_attempts_fail() {
        let fixture = Fixture::new("version=0.4.4\n", true);
        let publisher =
            Publisher::with_uploader(fixture.config(), ScriptedUploader::always_failing());

        let err = publisher.publish(&key()).await.unwrap_err();

        assert_eq!(publisher.uploader().calls(), 3);
        match err {
            ReleaseError::Upload(ref upload) => assert_eq!(upload.attempts(), 3),
            ref other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            err,
            ReleaseError::Upload(UploadError::Exhausted { .. })
        ));
        assert_eq!(err.exit_code(), 4);
    }

    #[tokio::test]
    async fn test_missing_version_makes_no_calls() {
        let fixture = Fixture::new("[general]\nname=Lizard\n", true);
        let publisher =
            Publisher::with_uploader(fixture.config(), ScriptedUploader::failing_first(0));

        let err = publisher.publish(&key()).await.unwrap_err();

        assert_eq!(publisher.uploader().calls(), 0);
        assert!(matches!(
            err,
            ReleaseError::Manifest(ManifestError::MissingVersion { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_artifact_makes_no_calls() {
        let fixture = Fixture::new("version=0.4.4\n", false);
        let publisher =
            Publisher::with_uploader(fixture.config(), ScriptedUploader::failing_first(0));

        let err = publisher.publish(&key()).await.unwrap_err();

        assert_eq!(publisher.uploader().calls(), 0);
        assert!(matches!(
            err,
            ReleaseError::Artifact(ArtifactError::Missing { .. })
        ));
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_custom_attempt_budget() {
        let fixture = Fixture::new("version=0.4.4\n", true);
        let config = PublishConfig {
            retry: RetryPolicy::immediate(5),
            ..fixture.config()
        };
        let publisher = Publisher::with_uploader(config, ScriptedUploader::always_failing());

        let _ = publisher.publish(&key()).await.unwrap_err();
        assert_eq!(publisher.uploader().calls(), 5);
    }

    #[test]
    fn test_plan_resolves_without_upload() {
        let fixture = Fixture::new("version=0.4.4\n", false);
        let publisher =
            Publisher::with_uploader(fixture.config(), ScriptedUploader::failing_first(0));

        let plan = publisher.plan().unwrap();

        assert_eq!(plan.version, "0.4.4");
        assert_eq!(plan.artifact.file_name(), "lizard_qgis_plugin.0.4.4.zip");
        assert!(!plan.artifact_present);
        assert_eq!(
            plan.upload_url.as_str(),
            "https://artifacts.example.net/upload/threedi-api-qgis-client/"
        );
        assert_eq!(publisher.uploader().calls(), 0);
    }

    #[test]
    fn test_default_config_has_no_request_timeout() {
        let config = PublishConfig::default();
        assert!(config.timeout.is_none());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.manifest_path, PathBuf::from("metadata.txt"));
    }
}
