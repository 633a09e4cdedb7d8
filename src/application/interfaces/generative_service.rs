use async_trait::async_trait;

use crate::domain::{ApiKey, DomainError, ModelHandle, ModelPage, Turn};

/// Default sampling temperature for chat replies.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// A single "generate content" call: the full conversation so far, ending with
/// the new user turn, plus generation parameters.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub contents: Vec<Turn>,
    /// 0.0 is deterministic; higher values give more varied output.
    pub temperature: f32,
}

impl GenerateRequest {
    pub fn new(contents: Vec<Turn>) -> Self {
        Self {
            contents,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// The remote generative-language service.
///
/// Implementors encapsulate transport, serialization, and vendor-specific API
/// details. Errors use [`DomainError::Configuration`] when the service rejects
/// the credential and [`DomainError::RemoteCall`] for everything else.
#[async_trait]
pub trait GenerativeLanguageService: Send + Sync {
    /// Fetch one page of available models, in the order the service returns them.
    async fn list_models(
        &self,
        api_key: &ApiKey,
        page_token: Option<&str>,
    ) -> Result<ModelPage, DomainError>;

    /// Generate the next model reply and return its text.
    async fn generate_content(
        &self,
        api_key: &ApiKey,
        model: &ModelHandle,
        request: &GenerateRequest,
    ) -> Result<String, DomainError>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}
