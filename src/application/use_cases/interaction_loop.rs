use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::{
    ConversationSession, GenerativeLanguageService, ResponseCache, SessionOptions,
};
use crate::domain::{ApiKey, DomainError, SessionState};

/// Everything one UI session owns: what is displayed, plus the conversation
/// behind it once the first send has created it.
#[derive(Default)]
pub struct ChatContext {
    state: SessionState,
    conversation: Option<ConversationSession>,
}

impl ChatContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn conversation(&self) -> Option<&ConversationSession> {
        self.conversation.as_ref()
    }
}

/// Banner shown when a form rendered for an older input key is submitted.
pub const STALE_SUBMISSION_BANNER: &str = "Page was out of date; please resend.";

/// Result of one send event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// Empty input; nothing happened.
    Ignored,
    /// The exchange was appended; holds the displayed (trimmed) reply.
    Replied(String),
    /// The banner now shows this message; the transcript is unchanged.
    Failed(String),
}

/// Bridges one UI interaction cycle to a [`ConversationSession`].
///
/// Idle → Sending → Idle: success appends the user/model pair and bumps the
/// input key, failure only sets the error banner. No failure is fatal; the
/// next send simply tries again.
pub struct InteractionLoop {
    service: Arc<dyn GenerativeLanguageService>,
    api_key: Option<String>,
    options: SessionOptions,
    cache: Option<Arc<ResponseCache>>,
}

impl InteractionLoop {
    pub fn new(service: Arc<dyn GenerativeLanguageService>, api_key: Option<String>) -> Self {
        Self {
            service,
            api_key,
            options: SessionOptions::default(),
            cache: None,
        }
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn handle_send(&self, ctx: &mut ChatContext, input: &str) -> InteractionOutcome {
        if input.is_empty() {
            return InteractionOutcome::Ignored;
        }

        ctx.state.begin_send();
        match self.exchange(ctx, input).await {
            Ok(reply) => {
                ctx.state.record_exchange(input, &reply);
                InteractionOutcome::Replied(reply.trim().to_string())
            }
            Err(e) => {
                warn!("Send failed: {e}");
                let message = format!("Error: {e}");
                ctx.state.record_failure(message.clone());
                InteractionOutcome::Failed(message)
            }
        }
    }

    /// A send from a page rendered for `input_key`. If the session has moved on
    /// since (double submit, second tab) nothing is sent and a banner says so.
    pub async fn handle_submission(
        &self,
        ctx: &mut ChatContext,
        input: &str,
        input_key: u64,
    ) -> InteractionOutcome {
        if ctx.state.is_stale(input_key) {
            debug!(
                "Stale submission (input key {} != {})",
                input_key,
                ctx.state.input_key()
            );
            ctx.state.record_failure(STALE_SUBMISSION_BANNER);
            return InteractionOutcome::Failed(STALE_SUBMISSION_BANNER.to_string());
        }
        self.handle_send(ctx, input).await
    }

    async fn exchange(&self, ctx: &mut ChatContext, input: &str) -> Result<String, DomainError> {
        let raw_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| DomainError::configuration("API key not found"))?;
        let api_key = ApiKey::parse(raw_key)?;

        if let Some(cache) = &self.cache {
            if let Some(reply) = cache.get(&api_key, input).await {
                return Ok(reply);
            }
        }

        if ctx.conversation.is_none() {
            debug!("Opening conversation session");
            let session = ConversationSession::with_options(
                self.service.clone(),
                api_key.expose(),
                self.options.clone(),
            )
            .await?;
            ctx.conversation = Some(session);
        }

        let Some(session) = ctx.conversation.as_mut() else {
            return Err(DomainError::not_initialized("conversation session unavailable"));
        };
        let reply = session.send_prompt(input).await?;

        if let Some(cache) = &self.cache {
            cache.insert(&api_key, input, &reply).await;
        }

        Ok(reply)
    }
}
