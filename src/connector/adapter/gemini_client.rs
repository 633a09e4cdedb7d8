use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::{GenerateRequest, GenerativeLanguageService};
use crate::domain::{ApiKey, DomainError, ModelDescriptor, ModelHandle, ModelPage, Turn};

/// Public Gemini endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_VERSION_PATH: &str = "/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";
const LIST_PAGE_SIZE: u32 = 50;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ApiModel>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiModel {
    name: String,
    display_name: Option<String>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}

/// HTTP client for the Gemini generative-language REST API (`v1beta`).
///
/// The key travels in the `x-goog-api-key` header so it never appears in URLs
/// or logs. Only the connect phase is bounded; a generation call waits as long
/// as the service takes.
pub struct GeminiClient {
    client: reqwest::Client,
    /// Base URL plus version prefix, e.g. `https://…/v1beta`.
    api_root: String,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DomainError> {
        let base: String = base_url.into();
        reqwest::Url::parse(&base).map_err(|e| {
            DomainError::configuration(format!("invalid base URL {base:?}: {e}"))
        })?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("GeminiClient: failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            api_root: format!("{}{API_VERSION_PATH}", base.trim_end_matches('/')),
        })
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.api_root)
    }

    fn generate_url(&self, model: &ModelHandle) -> String {
        format!("{}/{}:generateContent", self.api_root, model.resource_name())
    }

    async fn error_from_response(response: reqwest::Response) -> DomainError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!("GeminiClient: API returned {status}");
        debug!("GeminiClient: error body: {body}");
        map_http_error(status, &body)
    }
}

#[async_trait]
impl GenerativeLanguageService for GeminiClient {
    async fn list_models(
        &self,
        api_key: &ApiKey,
        page_token: Option<&str>,
    ) -> Result<ModelPage, DomainError> {
        let mut query: Vec<(&str, String)> = vec![("pageSize", LIST_PAGE_SIZE.to_string())];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let response = self
            .client
            .get(self.models_url())
            .header(API_KEY_HEADER, api_key.expose())
            .query(&query)
            .send()
            .await
            .map_err(|e| DomainError::remote_call(format!("GeminiClient: request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let listing: ListModelsResponse = response.json().await.map_err(|e| {
            DomainError::remote_call(format!("GeminiClient: failed to parse model list: {e}"))
        })?;

        debug!("GeminiClient: listed {} models", listing.models.len());

        let models = listing
            .models
            .into_iter()
            .map(|m| {
                let descriptor = ModelDescriptor::new(m.name, m.supported_generation_methods);
                match m.display_name {
                    Some(display) => descriptor.with_display_name(display),
                    None => descriptor,
                }
            })
            .collect();

        Ok(ModelPage {
            models,
            next_page_token: listing.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn generate_content(
        &self,
        api_key: &ApiKey,
        model: &ModelHandle,
        request: &GenerateRequest,
    ) -> Result<String, DomainError> {
        let body = GenerateContentRequest {
            contents: request.contents.iter().map(to_content).collect(),
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        };

        let response = self
            .client
            .post(self.generate_url(model))
            .header(API_KEY_HEADER, api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::remote_call(format!("GeminiClient: request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            DomainError::remote_call(format!("GeminiClient: failed to parse response: {e}"))
        })?;

        extract_text(parsed)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

fn to_content(turn: &Turn) -> Content<'_> {
    Content {
        role: turn.role().as_str(),
        parts: vec![Part { text: turn.text() }],
    }
}

/// Concatenates the text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String, DomainError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(DomainError::remote_call(format!(
            "GeminiClient: prompt was blocked: {reason}"
        )));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(DomainError::remote_call(format!(
            "GeminiClient: response contained no text (finish reason: {reason})"
        )));
    }

    Ok(text)
}

/// Rejected credentials become [`DomainError::Configuration`], anything else
/// [`DomainError::RemoteCall`] with the service's own status and message.
fn map_http_error(status: StatusCode, body: &str) -> DomainError {
    let parsed = serde_json::from_str::<ErrorWrapper>(body).ok();

    let key_rejected = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || parsed.as_ref().is_some_and(|w| {
            w.error
                .details
                .iter()
                .any(|d| d.reason.as_deref() == Some("API_KEY_INVALID"))
        });

    let message = parsed
        .map(|w| {
            let msg = w.error.message.unwrap_or_default();
            match w.error.status {
                Some(s) if !s.is_empty() => format!("{s}: {msg}"),
                _ => msg,
            }
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    if key_rejected {
        DomainError::configuration(format!("API key rejected ({status}): {message}"))
    } else {
        DomainError::remote_call(format!("GeminiClient: API returned {status}: {message}"))
    }
}
