mod credential;
mod model;
mod session_state;
mod turn;

pub use credential::*;
pub use model::*;
pub use session_state::*;
pub use turn::*;
