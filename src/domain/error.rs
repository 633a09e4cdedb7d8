use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No model available: {0}")]
    NoModelAvailable(String),

    #[error("Not initialized: {0}")]
    NotInitialized(String),

    #[error("No active conversation.")]
    NoActiveConversation,

    #[error("Prompt cannot be empty.")]
    EmptyPrompt,

    #[error("Remote call failed: {0}")]
    RemoteCall(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DomainError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn no_model_available(msg: impl Into<String>) -> Self {
        Self::NoModelAvailable(msg.into())
    }

    pub fn not_initialized(msg: impl Into<String>) -> Self {
        Self::NotInitialized(msg.into())
    }

    pub fn remote_call(msg: impl Into<String>) -> Self {
        Self::RemoteCall(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_no_model_available(&self) -> bool {
        matches!(self, Self::NoModelAvailable(_))
    }

    pub fn is_not_initialized(&self) -> bool {
        matches!(self, Self::NotInitialized(_))
    }

    pub fn is_no_active_conversation(&self) -> bool {
        matches!(self, Self::NoActiveConversation)
    }

    pub fn is_empty_prompt(&self) -> bool {
        matches!(self, Self::EmptyPrompt)
    }

    pub fn is_remote_call(&self) -> bool {
        matches!(self, Self::RemoteCall(_))
    }
}
