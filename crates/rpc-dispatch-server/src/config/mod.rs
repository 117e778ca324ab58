//! Configuration loading and resolution.
//!
//! Every setting resolves the same way: explicit CLI value, then the
//! `RPC_*` environment variable, then the built-in default.

use std::time::Duration;

use crate::types::{ServerError, ServerResult};

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_PATH: &str = "/rpc";
pub const DEFAULT_MAX_BODY_BYTES: usize = 1 << 20;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_BATCH_CONCURRENCY: usize = 1;

pub const ENV_ADDR: &str = "RPC_ADDR";
pub const ENV_PATH: &str = "RPC_PATH";
pub const ENV_MAX_BODY_BYTES: &str = "RPC_MAX_BODY_BYTES";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "RPC_REQUEST_TIMEOUT_SECS";
pub const ENV_BATCH_CONCURRENCY: &str = "RPC_BATCH_CONCURRENCY";

/// Values given on the command line; `None` falls through to env/default.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub addr: Option<String>,
    pub path: Option<String>,
    pub max_body_bytes: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub batch_concurrency: Option<usize>,
    pub cors: bool,
}

/// Effective server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: String,
    pub path: String,
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
    pub batch_concurrency: usize,
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            path: DEFAULT_PATH.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            cors: false,
        }
    }
}

impl ServerConfig {
    /// Resolve against the process environment.
    pub fn resolve(overrides: ConfigOverrides) -> ServerResult<Self> {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve against an arbitrary variable source.
    pub fn resolve_with<F>(overrides: ConfigOverrides, env: F) -> ServerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = overrides
            .addr
            .or_else(|| env(ENV_ADDR))
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());

        let path = overrides
            .path
            .or_else(|| env(ENV_PATH))
            .unwrap_or_else(|| DEFAULT_PATH.to_string());
        if !path.starts_with('/') {
            return Err(ServerError::Config(format!(
                "endpoint path must start with '/', got \"{path}\""
            )));
        }

        let max_body_bytes = match overrides.max_body_bytes {
            Some(v) => v,
            None => parse_env(&env, ENV_MAX_BODY_BYTES)?.unwrap_or(DEFAULT_MAX_BODY_BYTES),
        };

        let timeout_secs = match overrides.request_timeout_secs {
            Some(v) => v,
            None => parse_env(&env, ENV_REQUEST_TIMEOUT_SECS)?
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let batch_concurrency = match overrides.batch_concurrency {
            Some(v) => v,
            None => parse_env(&env, ENV_BATCH_CONCURRENCY)?.unwrap_or(DEFAULT_BATCH_CONCURRENCY),
        };

        Ok(Self {
            addr,
            path,
            max_body_bytes,
            request_timeout: Duration::from_secs(timeout_secs),
            batch_concurrency: batch_concurrency.max(1),
            cors: overrides.cors,
        })
    }
}

fn parse_env<F, T>(env: &F, key: &str) -> ServerResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ServerError::Config(format!("{key}={raw:?}: {e}"))),
    }
}
