use crate::domain::DomainError;

/// Supplies the API key from wherever the deployment keeps it.
///
/// `Ok(None)` means the source was readable but holds no key; callers turn that
/// into [`DomainError::Configuration`].
pub trait CredentialProvider: Send + Sync {
    fn api_key(&self) -> Result<Option<String>, DomainError>;

    /// Human-readable origin of the key, for diagnostics.
    fn source(&self) -> String;
}
