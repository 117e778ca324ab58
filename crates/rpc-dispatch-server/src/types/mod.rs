//! Server-side types shared by the transports and the CLI.

pub mod error;
pub mod info;

pub use error::*;
pub use info::*;
