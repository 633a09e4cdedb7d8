use std::sync::Arc;

use tracing::debug;

use crate::application::{GenerativeLanguageService, RemoteModelClient, DEFAULT_TEMPERATURE};
use crate::domain::{ConversationHistory, DomainError, ModelHandle, Turn};

/// Instruction asking the model to wrap every reply in a `{"text": ...}` object.
pub const SEED_INSTRUCTION: &str = "From now on, return the output as a JSON object that can be loaded in Python with the key as 'text'. For example, {\"text\": \"<output goes here>\"}";

/// Synthetic acknowledgement demonstrating the expected reply shape.
pub const SEED_ACKNOWLEDGEMENT: &str = "{\"text\": \"Sure, I can return the output as a regular JSON object with the key as \\\"text\\\". Here is an example: {\\\"text\\\": \\\"Your Output\\\"}.\", \"role\": \"model\"}";

/// The two model turns every conversation starts with unless a seed is given.
///
/// Replies are still returned verbatim; nothing unwraps the JSON object.
pub fn default_seed() -> Vec<Turn> {
    vec![
        Turn::model(SEED_INSTRUCTION),
        Turn::model(SEED_ACKNOWLEDGEMENT),
    ]
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Prior turns; empty means [`default_seed`].
    pub seed: Vec<Turn>,
    pub temperature: f32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            seed: Vec::new(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl SessionOptions {
    pub fn with_seed(mut self, seed: Vec<Turn>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Owns one logical conversation and exposes a single send/receive contract.
pub struct ConversationSession {
    client: RemoteModelClient,
    temperature: f32,
}

impl ConversationSession {
    /// Initialize a client, select a model and start a conversation seeded
    /// with `seed` (or the default seed when `seed` is empty).
    pub async fn new(
        service: Arc<dyn GenerativeLanguageService>,
        api_key: &str,
        seed: Vec<Turn>,
    ) -> Result<Self, DomainError> {
        Self::with_options(service, api_key, SessionOptions::default().with_seed(seed)).await
    }

    pub async fn with_options(
        service: Arc<dyn GenerativeLanguageService>,
        api_key: &str,
        options: SessionOptions,
    ) -> Result<Self, DomainError> {
        let mut client = RemoteModelClient::new(service);
        client.initialize(api_key)?;
        client.select_model().await?;

        let seed = if options.seed.is_empty() {
            default_seed()
        } else {
            options.seed
        };
        client.start_conversation(seed)?;

        Ok(Self {
            client,
            temperature: options.temperature,
        })
    }

    /// Send `text` and return the reply trimmed of surrounding whitespace.
    pub async fn send_prompt(&mut self, text: &str) -> Result<String, DomainError> {
        let reply = self.client.send_prompt(text, self.temperature).await?;
        debug!("Received reply ({} chars)", reply.len());
        Ok(reply.trim().to_string())
    }

    pub fn history(&self) -> &[Turn] {
        self.client
            .history()
            .map(ConversationHistory::turns)
            .unwrap_or_default()
    }

    pub fn model(&self) -> Option<&ModelHandle> {
        self.client.model()
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}
