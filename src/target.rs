//! Artifact server upload target.

use crate::error::{CliError, Result};
use url::Url;

/// Default artifact server base URL
pub const DEFAULT_ENDPOINT: &str = "https://artifacts.example.net";

/// Default project identifier on the artifact server
pub const DEFAULT_PROJECT: &str = "threedi-api-qgis-client";

/// Where an artifact is published: `{base}/upload/{project}/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    base: Url,
    project: String,
}

impl UploadTarget {
    /// Build a target from a base URL and a project identifier
    pub fn new(base: &str, project: &str) -> Result<Self> {
        let base_url = Url::parse(base).map_err(|e| CliError::InvalidEndpoint {
            url: base.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(CliError::InvalidEndpoint {
                url: base.to_string(),
                reason: format!("unsupported scheme '{}'", base_url.scheme()),
            }
            .into());
        }

        if project.is_empty()
            || project
                .chars()
                .any(|c| c == '/' || c == '?' || c == '#' || c.is_whitespace())
        {
            return Err(CliError::InvalidArguments {
                reason: format!("invalid project identifier '{}'", project),
            }
            .into());
        }

        Ok(Self {
            base: base_url,
            project: project.to_string(),
        })
    }

    /// Project identifier
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Full upload URL
    pub fn upload_url(&self) -> Url {
        let mut url = self.base.clone();
        let prefix = self.base.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}/upload/{}/", prefix, self.project));
        url.set_query(None);
        url.set_fragment(None);
        url
    }
}

impl Default for UploadTarget {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_ENDPOINT).unwrap_or_else(|e| {
                panic!("FATAL: default endpoint {} is not a valid URL: {}", DEFAULT_ENDPOINT, e)
            }),
            project: DEFAULT_PROJECT.to_string(),
        }
    }
}
