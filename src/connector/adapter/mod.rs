mod credentials;
mod gemini_client;
mod mock_generative_service;
pub mod web;

pub use credentials::*;
pub use gemini_client::*;
pub use mock_generative_service::*;
