use sha2::{Digest, Sha256};

use crate::domain::DomainError;

/// Opaque API key for the remote service.
///
/// `Debug` never prints the secret; use [`ApiKey::fingerprint`] when a stable
/// identity is needed (e.g. as a cache key).
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Fails with [`DomainError::Configuration`] when the key is blank.
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::configuration("API key is missing"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// SHA-256 of the key, hex encoded.
    pub fn fingerprint(&self) -> String {
        format!("{:x}", Sha256::digest(self.0.as_bytes()))
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_blank_keys() {
        assert!(ApiKey::parse("").unwrap_err().is_configuration());
        assert!(ApiKey::parse("   ").unwrap_err().is_configuration());
    }

    #[test]
    fn test_parse_trims_surrounding_whitespace() {
        let key = ApiKey::parse("  abc123\n").unwrap();
        assert_eq!(key.expose(), "abc123");
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = ApiKey::parse("super-secret").unwrap();
        assert!(!format!("{key:?}").contains("super-secret"));
    }

    #[test]
    fn test_fingerprint_is_stable_and_distinct() {
        let a = ApiKey::parse("key-a").unwrap();
        let b = ApiKey::parse("key-b").unwrap();
        assert_eq!(a.fingerprint().len(), 64);
        assert_eq!(a.fingerprint(), ApiKey::parse("key-a").unwrap().fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
