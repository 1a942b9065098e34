pub mod github;
pub mod google;

use toolgate_core::GateError;
use toolgate_plugin::PluginRegistry;

/// Register all built-in plugins.
pub fn register_all(registry: &mut PluginRegistry) -> Result<(), GateError> {
    registry.register(github::GitHubPlugin)?;
    registry.register(google::GooglePlugin)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_github_and_google() {
        let mut registry = PluginRegistry::new();
        register_all(&mut registry).unwrap();
        let names = registry.list();
        assert!(names.contains(&"github"));
        assert!(names.contains(&"google"));
    }

    #[test]
    fn register_all_twice_is_idempotent() {
        let mut registry = PluginRegistry::new();
        register_all(&mut registry).unwrap();
        register_all(&mut registry).unwrap();
        assert_eq!(registry.len(), 2);
    }
}
