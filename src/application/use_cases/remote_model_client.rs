use std::sync::Arc;

use tracing::{debug, info};

use crate::application::{GenerateRequest, GenerativeLanguageService, DEFAULT_TEMPERATURE};
use crate::domain::{
    first_generating_model, ApiKey, ConversationHistory, DomainError, ModelDescriptor,
    ModelHandle, Turn,
};

/// Upper bound on listing pages followed while looking for a usable model.
const MAX_LISTING_PAGES: usize = 20;

/// Locates a capable remote model and performs single-turn exchanges against it.
///
/// Lifecycle: [`initialize`](Self::initialize) → [`select_model`](Self::select_model)
/// → [`start_conversation`](Self::start_conversation) → any number of
/// [`send_prompt`](Self::send_prompt) calls. The selected model is cached for the
/// lifetime of the client.
pub struct RemoteModelClient {
    service: Arc<dyn GenerativeLanguageService>,
    api_key: Option<ApiKey>,
    model: Option<ModelHandle>,
    conversation: Option<ConversationHistory>,
}

impl RemoteModelClient {
    pub fn new(service: Arc<dyn GenerativeLanguageService>) -> Self {
        Self {
            service,
            api_key: None,
            model: None,
            conversation: None,
        }
    }

    /// Configure the credential used for every remote call.
    pub fn initialize(&mut self, api_key: &str) -> Result<(), DomainError> {
        self.api_key = Some(ApiKey::parse(api_key)?);
        debug!("RemoteModelClient: configured for {}", self.service.name());
        Ok(())
    }

    /// Pick the first listed model advertising `generateContent`.
    ///
    /// Only the first call talks to the service; later calls return the cached handle.
    pub async fn select_model(&mut self) -> Result<ModelHandle, DomainError> {
        if let Some(model) = &self.model {
            return Ok(model.clone());
        }

        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| DomainError::configuration("API key has not been configured"))?;

        let picked = find_generating_model(self.service.as_ref(), api_key).await?;
        info!("Selected model {}", picked);
        self.model = Some(picked.clone());
        Ok(picked)
    }

    /// Open a conversation seeded with `history`, replacing any previous one.
    pub fn start_conversation(&mut self, history: Vec<Turn>) -> Result<(), DomainError> {
        if self.model.is_none() {
            return Err(DomainError::not_initialized("No valid model selected"));
        }
        debug!("Starting conversation with {} seed turns", history.len());
        self.conversation = Some(ConversationHistory::from_turns(history));
        Ok(())
    }

    /// Send `text` as the next user turn and return the model's raw reply.
    pub async fn send_prompt(&mut self, text: &str, temperature: f32) -> Result<String, DomainError> {
        let (Some(conversation), Some(model), Some(api_key)) =
            (self.conversation.as_mut(), self.model.as_ref(), self.api_key.as_ref())
        else {
            return Err(DomainError::NoActiveConversation);
        };

        if text.trim().is_empty() {
            return Err(DomainError::EmptyPrompt);
        }

        let mut contents = conversation.turns().to_vec();
        contents.push(Turn::user(text));
        let request = GenerateRequest::new(contents).with_temperature(temperature);

        let reply = self
            .service
            .generate_content(api_key, model, &request)
            .await
            .map_err(|e| match e {
                DomainError::RemoteCall(_) => e,
                other => DomainError::remote_call(other.to_string()),
            })?;

        conversation.push_exchange(text, reply.clone());
        Ok(reply)
    }

    /// [`send_prompt`](Self::send_prompt) with the default temperature.
    pub async fn send(&mut self, text: &str) -> Result<String, DomainError> {
        self.send_prompt(text, DEFAULT_TEMPERATURE).await
    }

    pub fn model(&self) -> Option<&ModelHandle> {
        self.model.as_ref()
    }

    pub fn history(&self) -> Option<&ConversationHistory> {
        self.conversation.as_ref()
    }
}

/// Walk the listing pages and return the first model able to generate content.
///
/// A rejected credential stays a [`DomainError::Configuration`]; every other
/// listing failure becomes [`DomainError::NoModelAvailable`].
pub async fn find_generating_model(
    service: &dyn GenerativeLanguageService,
    api_key: &ApiKey,
) -> Result<ModelHandle, DomainError> {
    let mut page_token: Option<String> = None;

    for _ in 0..MAX_LISTING_PAGES {
        let page = service
            .list_models(api_key, page_token.as_deref())
            .await
            .map_err(listing_error)?;

        if let Some(found) = first_generating_model(&page.models) {
            return Ok(found.handle());
        }

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    Err(DomainError::no_model_available(
        "no listed model supports generateContent",
    ))
}

/// Collect every listed model across pages.
pub async fn list_all_models(
    service: &dyn GenerativeLanguageService,
    api_key: &ApiKey,
) -> Result<Vec<ModelDescriptor>, DomainError> {
    let mut models = Vec::new();
    let mut page_token: Option<String> = None;

    for _ in 0..MAX_LISTING_PAGES {
        let page = service
            .list_models(api_key, page_token.as_deref())
            .await
            .map_err(listing_error)?;
        models.extend(page.models);

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    Ok(models)
}

fn listing_error(e: DomainError) -> DomainError {
    match e {
        DomainError::Configuration(_) => e,
        other => DomainError::no_model_available(format!("Error listing models: {other}")),
    }
}
