//! Single-attempt artifact upload over HTTP.
//!
//! [`ArtifactUploader`] performs exactly one request; retrying is the
//! caller's concern (see [`crate::retry`]).

use crate::credential::Credential;
use crate::error::{CliError, Result, UploadAttemptError};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use url::Url;

/// Form field carrying the upload key
pub const KEY_FIELD: &str = "key";

/// Form field carrying the artifact file
pub const ARTIFACT_FIELD: &str = "artifact";

/// Everything needed to send one artifact upload
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Endpoint URL
    pub url: Url,
    /// Upload key
    pub credential: Credential,
    /// File name attached to the artifact part
    pub file_name: String,
    /// Artifact contents
    pub data: Bytes,
}

/// What the server answered to a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// HTTP status code (always 2xx)
    pub status: u16,
}

/// Sends one upload attempt
#[async_trait]
pub trait ArtifactUploader: Send + Sync {
    /// Upload once; any 2xx response is success
    async fn upload(
        &self,
        request: &UploadRequest,
    ) -> std::result::Result<UploadReceipt, UploadAttemptError>;
}

/// `multipart/form-data` uploader backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: reqwest::Client,
}

impl HttpUploader {
    /// Create an uploader with an optional per-request timeout
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| CliError::InvalidArguments {
            reason: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(Self { client })
    }

    fn form(request: &UploadRequest) -> std::result::Result<Form, UploadAttemptError> {
        let artifact = Part::bytes(request.data.to_vec())
            .file_name(request.file_name.clone())
            .mime_str("application/zip")
            .map_err(|e| UploadAttemptError::InvalidRequest {
                reason: e.to_string(),
            })?;

        Ok(Form::new()
            .text(KEY_FIELD, request.credential.expose().to_string())
            .part(ARTIFACT_FIELD, artifact))
    }
}

#[async_trait]
impl ArtifactUploader for HttpUploader {
    async fn upload(
        &self,
        request: &UploadRequest,
    ) -> std::result::Result<UploadReceipt, UploadAttemptError> {
        let form = Self::form(request)?;

        log::debug!(
            "POST {} ({} bytes as '{}')",
            request.url,
            request.data.len(),
            request.file_name
        );

        let response = self
            .client
            .post(request.url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadAttemptError::Transport {
                reason: if e.is_timeout() {
                    format!("request timed out: {}", e)
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(UploadReceipt {
                status: status.as_u16(),
            });
        }

        if let Ok(body) = response.text().await {
            log::debug!("Upload rejected with {}: {}", status, body.trim());
        }

        Err(UploadAttemptError::Status {
            status: status.as_u16(),
        })
    }
}
