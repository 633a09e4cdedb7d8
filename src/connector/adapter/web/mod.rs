mod render;
mod server;

pub use render::*;
pub use server::*;
