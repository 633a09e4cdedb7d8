use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::CredentialProvider;
use crate::domain::DomainError;

/// Table holding the key inside the credentials file.
pub const CREDENTIALS_SECTION: &str = "gemini_ai";

/// A key handed over directly, e.g. from a flag or environment variable.
pub struct StaticCredentialProvider {
    api_key: Option<String>,
}

impl StaticCredentialProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn api_key(&self) -> Result<Option<String>, DomainError> {
        Ok(self.api_key.clone().filter(|k| !k.trim().is_empty()))
    }

    fn source(&self) -> String {
        "command line / environment".to_string()
    }
}

#[derive(Deserialize)]
struct CredentialsFile {
    gemini_ai: Option<GeminiSection>,
}

#[derive(Deserialize)]
struct GeminiSection {
    #[serde(alias = "API_KEY")]
    api_key: Option<String>,
}

/// Reads the key from a TOML file:
///
/// ```toml
/// [gemini_ai]
/// api_key = "..."
/// ```
///
/// A missing file yields `Ok(None)`; an unreadable or malformed one is a
/// [`DomainError::Configuration`].
pub struct TomlCredentialProvider {
    path: PathBuf,
}

impl TomlCredentialProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialProvider for TomlCredentialProvider {
    fn api_key(&self) -> Result<Option<String>, DomainError> {
        if !self.path.exists() {
            debug!("Credentials file {} not found", self.path.display());
            return Ok(None);
        }

        let raw = std::fs::read_to_string(&self.path)?;
        let parsed: CredentialsFile = toml::from_str(&raw).map_err(|e| {
            DomainError::configuration(format!(
                "invalid credentials file {}: {e}",
                self.path.display()
            ))
        })?;

        Ok(parsed
            .gemini_ai
            .and_then(|section| section.api_key)
            .filter(|k| !k.trim().is_empty()))
    }

    fn source(&self) -> String {
        self.path.display().to_string()
    }
}

/// Tries each provider in order and returns the first key found.
///
/// A provider that fails (unreadable or malformed file) is skipped with a
/// warning, like one that has no key.
pub struct ChainedCredentialProvider {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl ChainedCredentialProvider {
    pub fn new(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }
}

impl CredentialProvider for ChainedCredentialProvider {
    fn api_key(&self) -> Result<Option<String>, DomainError> {
        for provider in &self.providers {
            match provider.api_key() {
                Ok(Some(key)) => {
                    debug!("Using API key from {}", provider.source());
                    return Ok(Some(key));
                }
                Ok(None) => {}
                Err(e) => warn!("Ignoring credentials from {}: {e}", provider.source()),
            }
        }
        Ok(None)
    }

    fn source(&self) -> String {
        self.providers
            .iter()
            .map(|p| p.source())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
