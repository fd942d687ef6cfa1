mod auth;
mod batch;
mod context;
mod game;
mod robot;
pub mod style;

pub use auth::*;
pub use batch::*;
pub use context::*;
pub use game::*;
pub use robot::*;
