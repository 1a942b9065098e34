use crate::plugin::{Plugin, PluginInstance};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use toolgate_core::{GateError, ProxyConfig};

/// Plugin factory registry.
///
/// Built once at startup, immutable thereafter. Discovery is config-driven:
/// a registered factory without a config entry yields no instance.
pub struct PluginRegistry {
    factories: HashMap<&'static str, (TypeId, Arc<dyn Plugin>)>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a plugin factory.
    ///
    /// Registering the same factory type twice is idempotent; two different
    /// types claiming the same name is an error.
    pub fn register<P: Plugin + 'static>(&mut self, factory: P) -> Result<(), GateError> {
        let name = factory.name();
        let type_id = TypeId::of::<P>();
        if let Some((existing, _)) = self.factories.get(name) {
            if *existing == type_id {
                return Ok(());
            }
            return Err(GateError::Plugin(format!(
                "Plugin '{name}' already registered by a different type"
            )));
        }
        tracing::info!(plugin = %name, "Registered plugin");
        self.factories.insert(name, (type_id, Arc::new(factory)));
        Ok(())
    }

    /// Instantiate registered plugins that have config entries.
    pub fn discover(
        &self,
        config: &ProxyConfig,
    ) -> anyhow::Result<HashMap<String, Arc<dyn PluginInstance>>> {
        let mut instances = HashMap::new();
        for (name, (_, factory)) in &self.factories {
            if let Some(section) = config.plugins.get(*name) {
                instances.insert(name.to_string(), factory.build(section)?);
            }
        }
        Ok(instances)
    }

    /// List all registered plugin names.
    pub fn list(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use toolgate_core::Credential;

    struct MockPlugin {
        name: &'static str,
    }

    struct MockInstance {
        name: String,
    }

    #[async_trait::async_trait]
    impl PluginInstance for MockInstance {
        fn name(&self) -> &str {
            &self.name
        }
        fn tools(&self) -> &[&str] {
            &["mock-cli"]
        }
        fn select_credential(&self, _resource: &str) -> Option<Credential> {
            None
        }
    }

    impl Plugin for MockPlugin {
        fn name(&self) -> &'static str {
            self.name
        }
        fn build(&self, _config: &Value) -> anyhow::Result<Arc<dyn PluginInstance>> {
            Ok(Arc::new(MockInstance {
                name: self.name.to_string(),
            }))
        }
    }

    struct OtherPlugin;

    impl Plugin for OtherPlugin {
        fn name(&self) -> &'static str {
            "mock"
        }
        fn build(&self, _config: &Value) -> anyhow::Result<Arc<dyn PluginInstance>> {
            Ok(Arc::new(MockInstance {
                name: "mock".to_string(),
            }))
        }
    }

    fn config_with(names: &[&str]) -> ProxyConfig {
        let mut config = ProxyConfig::default();
        for name in names {
            config.plugins.insert(name.to_string(), json!({}));
        }
        config
    }

    #[test]
    fn empty_registry() {
        let registry = PluginRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn register_and_list() {
        let mut registry = PluginRegistry::new();
        registry.register(MockPlugin { name: "mock" }).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.list().contains(&"mock"));
    }

    #[test]
    fn duplicate_registration_of_same_type_is_idempotent() {
        let mut registry = PluginRegistry::new();
        registry.register(MockPlugin { name: "mock" }).unwrap();
        registry.register(MockPlugin { name: "mock" }).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn conflicting_registration_is_an_error() {
        let mut registry = PluginRegistry::new();
        registry.register(MockPlugin { name: "mock" }).unwrap();
        let err = registry.register(OtherPlugin).unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn discover_instantiates_only_configured_plugins() {
        let mut registry = PluginRegistry::new();
        registry.register(MockPlugin { name: "mock" }).unwrap();

        let instances = registry.discover(&config_with(&["mock"])).unwrap();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances["mock"].name(), "mock");

        let none = registry.discover(&config_with(&["unrelated"])).unwrap();
        assert!(none.is_empty());

        let empty = registry.discover(&ProxyConfig::default()).unwrap();
        assert!(empty.is_empty());
    }
}
