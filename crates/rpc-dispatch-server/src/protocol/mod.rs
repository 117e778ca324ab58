//! Payload handling shared by every transport.

pub mod handler;

pub use handler::ProtocolHandler;
