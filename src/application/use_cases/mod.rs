mod conversation_session;
mod interaction_loop;
mod list_models;
mod remote_model_client;
mod response_cache;

pub use conversation_session::*;
pub use interaction_loop::*;
pub use list_models::*;
pub use remote_model_client::*;
pub use response_cache::*;
