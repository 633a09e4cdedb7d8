pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use cli::Commands;

pub use application::{
    default_seed, ChatContext, ConversationSession, CredentialProvider, GenerateRequest,
    GenerativeLanguageService, InteractionLoop, InteractionOutcome, ListModelsUseCase,
    RemoteModelClient, ResponseCache, SessionOptions, DEFAULT_TEMPERATURE,
    STALE_SUBMISSION_BANNER,
};

pub use connector::{
    ChainedCredentialProvider, Container, ContainerConfig, GeminiClient, MockGenerativeService,
    Router, StaticCredentialProvider, TomlCredentialProvider,
};

pub use domain::{
    ApiKey, ConversationHistory, DomainError, ModelDescriptor, ModelHandle, ModelPage, Phase,
    Role, SessionState, Turn,
};
