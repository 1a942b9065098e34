use serde::Deserialize;
use toolgate_core::Credential;
use toolgate_core::resource::match_resource;

/// One credential entry from the GitHub plugin config. Order in the config
/// array is significant.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubCredential {
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub resources: Vec<String>,
}

/// Select a credential for a GitHub resource (`owner/repo`).
///
/// First-match-wins over the credentials array: entries without a token are
/// skipped; within an entry, patterns are tried in declared order. Callers
/// write specific patterns first and `*` last.
pub fn select_credential(resource: &str, credentials: &[GitHubCredential]) -> Option<Credential> {
    for cred in credentials {
        let Some(token) = &cred.token else {
            continue;
        };
        for pattern in &cred.resources {
            if match_resource(pattern, resource) {
                return Some(
                    Credential::new()
                        .with_var("GH_TOKEN", token)
                        .with_var("GH_HOST", "github.com"),
                );
            }
        }
    }
    None
}
