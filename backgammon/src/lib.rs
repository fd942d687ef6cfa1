pub use board::*;
pub use errors::*;
pub use lookup::*;
pub use protocol::*;
pub use status::*;
pub use visualization::*;

#[cfg(test)]
mod arbitrary;
mod board;
mod errors;
pub mod lenient;
mod lookup;
mod protocol;
mod status;
mod visualization;
