//! rpc-dispatch-server: demo JSON-RPC 2.0 server over HTTP and stdio.

pub mod config;
pub mod demo;
pub mod methods;
pub mod protocol;
pub mod repl;
pub mod transport;
pub mod types;

pub use config::{ConfigOverrides, ServerConfig};
pub use methods::{default_registry, list_methods};
pub use protocol::ProtocolHandler;
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::StdioTransport;
