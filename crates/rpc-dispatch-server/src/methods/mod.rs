//! Demo JSON-RPC methods.

pub mod math_add;
pub mod math_sum;
pub mod registry;
pub mod text_concat;

pub use registry::{default_registry, list_methods};
