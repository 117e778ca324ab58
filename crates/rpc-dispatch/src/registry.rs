//! Method registration and lookup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::handler::MethodHandler;

/// Immutable name → handler table. Built once through
/// [`MethodRegistry::builder`]; there is no way to add or remove methods
/// afterwards, so lookups from many threads need no locking.
#[derive(Clone, Default)]
pub struct MethodRegistry {
    methods: HashMap<String, Arc<dyn MethodHandler>>,
}

impl MethodRegistry {
    pub fn builder() -> MethodRegistryBuilder {
        MethodRegistryBuilder::default()
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn MethodHandler> {
        self.methods.get(name).map(|h| h.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Registered method names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl std::fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("methods", &self.names())
            .finish()
    }
}

/// Startup-time composition of a [`MethodRegistry`].
#[derive(Default)]
pub struct MethodRegistryBuilder {
    methods: HashMap<String, Arc<dyn MethodHandler>>,
}

impl MethodRegistryBuilder {
    pub fn register(
        mut self,
        name: impl Into<String>,
        handler: impl MethodHandler + 'static,
    ) -> Result<Self, RegistryError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.methods.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.methods.insert(name, Arc::new(handler));
        Ok(self)
    }

    pub fn build(self) -> MethodRegistry {
        let registry = MethodRegistry {
            methods: self.methods,
        };
        tracing::debug!("Method registry built with {} methods", registry.len());
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{CallContext, HandlerResult, Params};
    use serde_json::json;

    fn ping(_ctx: &CallContext<'_>, _params: Params<'_>) -> HandlerResult {
        Ok(json!("pong"))
    }

    fn registry() -> MethodRegistry {
        MethodRegistry::builder()
            .register("zeta", ping)
            .unwrap()
            .register("alpha", ping)
            .unwrap()
            .build()
    }

    #[test]
    fn test_lookup_registered() {
        let reg = registry();
        let handler = reg.lookup("alpha").expect("registered");
        let ctx = CallContext { method: "alpha", id: None };
        assert_eq!(handler.call(&ctx, Params::none()).unwrap(), json!("pong"));
    }

    #[test]
    fn test_lookup_missing() {
        assert!(registry().lookup("beta").is_none());
        assert!(!registry().contains("beta"));
    }

    #[test]
    fn test_names_sorted() {
        assert_eq!(registry().names(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = MethodRegistry::builder()
            .register("ping", ping)
            .unwrap()
            .register("ping", ping)
            .err();
        assert_eq!(err, Some(RegistryError::Duplicate("ping".into())));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = MethodRegistry::builder().register("", ping).err();
        assert_eq!(err, Some(RegistryError::EmptyName));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(registry().lookup("Alpha").is_none());
    }
}
