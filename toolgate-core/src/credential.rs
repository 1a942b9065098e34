use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A selected credential: the environment-variable overlay merged on top of
/// the proxy's environment when spawning a subprocess (or consulted by
/// intercepted commands for the raw secret).
///
/// The overlay never mutates the proxy's own environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub env: BTreeMap<String, String>,
}

impl Credential {
    pub fn new() -> Self {
        Self {
            env: BTreeMap::new(),
        }
    }

    /// Builder-style insert, used by plugin credential selectors.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Look up an overlay variable (e.g. the token an intercepted command
    /// needs for a direct API call).
    pub fn var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(|s| s.as_str())
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self::new()
    }
}
