//! # Domain Layer
//!
//! Conversation turns, model descriptors, UI session state and the error taxonomy.
//! This layer is independent of external frameworks and infrastructure.

pub mod error;
pub mod models;

pub use error::*;
pub use models::*;
