use serde::Deserialize;
use toolgate_core::Credential;
use toolgate_core::resource::match_resource;

/// One credential entry from the Google plugin config. The resource is an
/// account email or `default`.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleCredential {
    #[serde(default)]
    pub keyring_password: Option<String>,

    /// Pin the wrapped CLI to one account via `GOG_ACCOUNT`.
    #[serde(default)]
    pub account: Option<String>,

    #[serde(default)]
    pub resources: Vec<String>,
}

/// Select a credential for a Google resource. First-match-wins; entries
/// without a keyring password are skipped.
pub fn select_credential(resource: &str, credentials: &[GoogleCredential]) -> Option<Credential> {
    for cred in credentials {
        let Some(keyring_password) = &cred.keyring_password else {
            continue;
        };
        for pattern in &cred.resources {
            if match_resource(pattern, resource) {
                let mut credential =
                    Credential::new().with_var("GOG_KEYRING_PASSWORD", keyring_password);
                if let Some(account) = &cred.account {
                    credential = credential.with_var("GOG_ACCOUNT", account);
                }
                return Some(credential);
            }
        }
    }
    None
}
