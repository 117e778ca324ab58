//! Error types for the server crate.

use rpc_dispatch::RegistryError;

/// All errors that can occur while composing or running the server.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_conversion() {
        let err = ServerError::from(RegistryError::Duplicate("math.add".into()));
        assert!(matches!(err, ServerError::Registry(_)));
        assert!(err.to_string().contains("math.add"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err = ServerError::from(io);
        assert!(err.to_string().starts_with("IO error"));
    }
}
