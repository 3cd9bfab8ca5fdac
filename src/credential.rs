//! Upload key handling.

use crate::error::{CliError, Result};
use std::fmt;

/// Environment variable holding the upload key by default
pub const DEFAULT_KEY_ENV: &str = "THREEDI_API_QGIS_CLIENT_ARTIFACTS_KEY";

/// Opaque upload key. Never printed and never written to disk.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a key value
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Read the key from environment variable `var`
    pub fn from_env(var: &str) -> Result<Self> {
        Self::from_lookup(var, |name| std::env::var(name).ok())
    }

    /// Read the key through `lookup`, rejecting unset and empty values
    pub fn from_lookup<F>(var: &str, lookup: F) -> Result<Self>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match lookup(var) {
            Some(value) if !value.trim().is_empty() => Ok(Self(value)),
            _ => Err(CliError::MissingCredential {
                var: var.to_string(),
            }
            .into()),
        }
    }

    /// Raw key for the upload form
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
