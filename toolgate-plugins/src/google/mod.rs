//! Google plugin: `gog` CLI execution for Google Workspace.
//!
//! No intercepted commands and no extra routes; the plugin's job is
//! keyring-credential selection plus a health probe that shells out to the
//! wrapped CLI.

pub mod credential;

use async_trait::async_trait;
use credential::GoogleCredential;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use toolgate_core::Credential;
use toolgate_core::executor::execute_cli;
use toolgate_observability::{mask_emails_in_text, mask_value};
use toolgate_plugin::{Plugin, PluginInstance};

const PROBE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    #[serde(default)]
    pub credentials: Vec<GoogleCredential>,
}

/// Factory registered under the `google` config key.
pub struct GooglePlugin;

impl Plugin for GooglePlugin {
    fn name(&self) -> &'static str {
        "google"
    }

    fn build(&self, config: &Value) -> anyhow::Result<Arc<dyn PluginInstance>> {
        let config: GoogleConfig = serde_json::from_value(config.clone())?;
        Ok(Arc::new(GoogleInstance { config }))
    }
}

pub struct GoogleInstance {
    config: GoogleConfig,
}

#[async_trait]
impl PluginInstance for GoogleInstance {
    fn name(&self) -> &str {
        "google"
    }

    fn tools(&self) -> &[&str] {
        &["gog"]
    }

    fn select_credential(&self, resource: &str) -> Option<Credential> {
        credential::select_credential(resource, &self.config.credentials)
    }

    /// Run `gog auth list` per credential to verify the keyring is
    /// accessible and accounts are configured. Account emails are masked
    /// before they leave the probe.
    async fn health_check(&self, _http: &reqwest::Client) -> Vec<Value> {
        let mut results = Vec::new();
        for cred in &self.config.credentials {
            let keyring_password = cred.keyring_password.as_deref().unwrap_or("");
            let mut entry = json!({
                "masked_keyring_password": mask_value(keyring_password, 4),
                "resources": cred.resources,
            });
            let status = run_auth_list(keyring_password).await;
            if let (Some(entry), Some(status)) = (entry.as_object_mut(), status.as_object()) {
                entry.extend(status.clone());
            }
            results.push(entry);
        }
        results
    }
}

async fn run_auth_list(keyring_password: &str) -> Value {
    let env = BTreeMap::from([(
        "GOG_KEYRING_PASSWORD".to_string(),
        keyring_password.to_string(),
    )]);
    let args = ["auth".to_string(), "list".to_string()];
    let result = execute_cli("gog", &args, &env, PROBE_TIMEOUT_SECS, None).await;

    if result.exit_code == 0 {
        return json!({
            "valid": true,
            "accounts": mask_emails_in_text(result.stdout.trim()),
        });
    }

    // -1 covers spawn failure and timeout; the executor's stderr already
    // names the reason.
    let error = if result.stderr.trim().is_empty() {
        format!("exit code {}", result.exit_code)
    } else {
        result.stderr.trim().to_string()
    };
    json!({ "valid": false, "error": error })
}
