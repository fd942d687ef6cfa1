mod api;
mod auth;
mod batch;
mod config;
mod error;
mod simulation;

pub use api::*;
pub use auth::*;
pub use batch::*;
pub use config::*;
pub use error::*;
pub use simulation::*;
