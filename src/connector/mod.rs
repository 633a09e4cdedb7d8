//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Remote model access (Gemini REST client, offline mock)
//! - Credential loading (flag / environment, TOML file)
//! - User interfaces (axum web UI, terminal chat) and their wiring

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::*;
