mod credential_provider;
mod generative_service;

pub use credential_provider::*;
pub use generative_service::*;
