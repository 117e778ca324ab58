//! Startup composition of the method registry.

use rpc_dispatch::MethodRegistry;

use crate::types::{MethodDefinition, ServerResult};

use super::{math_add, math_sum, text_concat};

/// Build the registry with every demo method. Called once at startup.
pub fn default_registry() -> ServerResult<MethodRegistry> {
    let registry = MethodRegistry::builder()
        .register(math_add::NAME, math_add::execute)?
        .register(math_sum::NAME, math_sum::execute)?
        .register(text_concat::NAME, text_concat::execute)?
        .build();

    tracing::info!(
        "Registered JSON-RPC methods: {}",
        registry.names().join(", ")
    );

    Ok(registry)
}

/// Descriptions of the demo methods, sorted by name.
pub fn list_methods() -> Vec<MethodDefinition> {
    vec![
        math_add::definition(),
        math_sum::definition(),
        text_concat::definition(),
    ]
}
