use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::application::{GenerateRequest, GenerativeLanguageService};
use crate::domain::{ApiKey, DomainError, ModelDescriptor, ModelHandle, ModelPage};

const MOCK_MODEL: &str = "models/mock-chat-001";

/// Offline stand-in for the remote service.
///
/// Without scripted replies it answers every prompt with
/// `{"text": "You said: <prompt>"}`, matching the shape the default seed asks for.
/// Failure switches let tests exercise each error path.
pub struct MockGenerativeService {
    pages: Vec<Vec<ModelDescriptor>>,
    state: Mutex<MockState>,
    list_calls: AtomicUsize,
    generate_calls: AtomicUsize,
}

#[derive(Default)]
struct MockState {
    replies: VecDeque<String>,
    listing_failure: Option<String>,
    generation_failure: Option<String>,
    reject_credentials: bool,
    last_request: Option<GenerateRequest>,
}

impl MockGenerativeService {
    pub fn new() -> Self {
        Self::with_models(vec![
            ModelDescriptor::new("models/mock-embedding-001", vec!["embedContent".to_string()]),
            ModelDescriptor::new(
                MOCK_MODEL,
                vec!["generateContent".to_string(), "countTokens".to_string()],
            )
            .with_display_name("Mock Chat"),
        ])
    }

    pub fn with_models(models: Vec<ModelDescriptor>) -> Self {
        Self::with_pages(vec![models])
    }

    /// Serve the listing as several pages, linked by page tokens.
    pub fn with_pages(pages: Vec<Vec<ModelDescriptor>>) -> Self {
        Self {
            pages,
            state: Mutex::new(MockState::default()),
            list_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
        }
    }

    /// Queue replies returned in order before falling back to the echo reply.
    pub fn with_replies(self, replies: Vec<String>) -> Self {
        self.state().replies.extend(replies);
        self
    }

    pub fn fail_listing(&self, message: impl Into<String>) {
        self.state().listing_failure = Some(message.into());
    }

    pub fn restore_listing(&self) {
        self.state().listing_failure = None;
    }

    pub fn fail_generation(&self, message: impl Into<String>) {
        self.state().generation_failure = Some(message.into());
    }

    pub fn restore_generation(&self) {
        self.state().generation_failure = None;
    }

    pub fn reject_credentials(&self) {
        self.state().reject_credentials = true;
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.state().last_request.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn echo(request: &GenerateRequest) -> String {
        let prompt = request
            .contents
            .last()
            .map(|t| t.text().trim())
            .unwrap_or_default();
        serde_json::json!({ "text": format!("You said: {prompt}") }).to_string()
    }
}

impl Default for MockGenerativeService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerativeLanguageService for MockGenerativeService {
    async fn list_models(
        &self,
        _api_key: &ApiKey,
        page_token: Option<&str>,
    ) -> Result<ModelPage, DomainError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let state = self.state();
        if state.reject_credentials {
            return Err(DomainError::configuration("API key rejected by mock service"));
        }
        if let Some(message) = &state.listing_failure {
            return Err(DomainError::remote_call(message.clone()));
        }

        let index = match page_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| DomainError::remote_call(format!("invalid page token: {token}")))?,
            None => 0,
        };

        let models = self.pages.get(index).cloned().unwrap_or_default();
        let page = ModelPage::new(models);
        if index + 1 < self.pages.len() {
            Ok(page.with_next_page_token((index + 1).to_string()))
        } else {
            Ok(page)
        }
    }

    async fn generate_content(
        &self,
        _api_key: &ApiKey,
        model: &ModelHandle,
        request: &GenerateRequest,
    ) -> Result<String, DomainError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        debug!("MockGenerativeService: generating with {model}");

        let mut state = self.state();
        state.last_request = Some(request.clone());

        if state.reject_credentials {
            return Err(DomainError::configuration("API key rejected by mock service"));
        }
        if let Some(message) = &state.generation_failure {
            return Err(DomainError::remote_call(message.clone()));
        }

        Ok(state
            .replies
            .pop_front()
            .unwrap_or_else(|| Self::echo(request)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
