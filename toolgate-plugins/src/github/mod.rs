//! GitHub plugin: `gh` CLI execution, intercepted `issue`/`pr` body edits,
//! `discussion` and `sub-issue` surfaces over GraphQL, git smart-HTTP
//! reverse proxy, and a PAT health probe.

pub mod commands;
pub mod credential;
pub mod git_proxy;
pub mod graphql;
pub mod health;
pub mod rest;

use async_trait::async_trait;
use credential::GitHubCredential;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use toolgate_core::Credential;
use toolgate_plugin::{CommandOutcome, Plugin, PluginInstance};

/// Config section for the GitHub plugin.
///
/// The URL fields default to the public endpoints and exist so tests can
/// point the plugin at a fixture server.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubConfig {
    #[serde(default)]
    pub credentials: Vec<GitHubCredential>,

    /// REST API base.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// GraphQL endpoint.
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,

    /// Upstream base for the git smart-HTTP proxy.
    #[serde(default = "default_git_url")]
    pub git_url: String,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_graphql_url() -> String {
    "https://api.github.com/graphql".to_string()
}

fn default_git_url() -> String {
    "https://github.com".to_string()
}

/// Factory registered under the `github` config key.
pub struct GitHubPlugin;

impl Plugin for GitHubPlugin {
    fn name(&self) -> &'static str {
        "github"
    }

    fn build(&self, config: &Value) -> anyhow::Result<Arc<dyn PluginInstance>> {
        let config: GitHubConfig = serde_json::from_value(config.clone())?;
        Ok(Arc::new(GitHubInstance { config }))
    }
}

pub struct GitHubInstance {
    config: GitHubConfig,
}

/// Overlay token for intercepted commands and the git proxy. The selector
/// always sets it, so an empty fallback only ever reaches an upstream that
/// will reject it.
pub(crate) fn token_of(credential: &Credential) -> &str {
    credential.var("GH_TOKEN").unwrap_or_default()
}

#[async_trait]
impl PluginInstance for GitHubInstance {
    fn name(&self) -> &str {
        "github"
    }

    fn tools(&self) -> &[&str] {
        &["gh"]
    }

    fn select_credential(&self, resource: &str) -> Option<Credential> {
        credential::select_credential(resource, &self.config.credentials)
    }

    fn commands(&self) -> &[&str] {
        &["issue", "pr", "discussion", "sub-issue"]
    }

    async fn execute_command(
        &self,
        cmd: &str,
        args: &[String],
        resource: &str,
        credential: &Credential,
        http: &reqwest::Client,
    ) -> CommandOutcome {
        match cmd {
            "issue" => {
                commands::issue::execute(http, &self.config.api_url, args, resource, credential)
                    .await
            }
            "pr" => {
                commands::pr::execute(http, &self.config.api_url, args, resource, credential).await
            }
            // No native `gh` support for these; nothing falls through.
            "discussion" => CommandOutcome::Handled(
                commands::discussion::execute(
                    http,
                    &self.config.graphql_url,
                    args,
                    resource,
                    credential,
                )
                .await,
            ),
            "sub-issue" => CommandOutcome::Handled(
                commands::sub_issue::execute(
                    http,
                    &self.config.graphql_url,
                    args,
                    resource,
                    credential,
                )
                .await,
            ),
            _ => CommandOutcome::Fallthrough,
        }
    }

    fn routes(self: Arc<Self>, http: reqwest::Client) -> Option<axum::Router> {
        Some(git_proxy::router(self, http))
    }

    async fn health_check(&self, http: &reqwest::Client) -> Vec<Value> {
        health::health_check(&self.config, http).await
    }
}
