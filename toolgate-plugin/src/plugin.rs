use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use toolgate_core::{CliResult, Credential};

/// Outcome of an intercepted command.
#[derive(Debug)]
pub enum CommandOutcome {
    /// The plugin handled the command directly; reply with this result.
    Handled(CliResult),

    /// The plugin declines this invocation; the router spawns the wrapped
    /// CLI subprocess as if no interception existed.
    Fallthrough,
}

/// Plugin factory, registered once per plugin type.
///
/// Instantiation is config-driven: the registry builds an instance only for
/// factories whose name appears in the config's `plugins` map, handing each
/// its own section to deserialize.
pub trait Plugin: Send + Sync {
    /// Stable identifier, used as the config key.
    fn name(&self) -> &'static str;

    /// Build an instance bound to this plugin's config section.
    fn build(&self, config: &Value) -> anyhow::Result<Arc<dyn PluginInstance>>;
}

/// A configured plugin instance.
///
/// `commands`, `routes`, and `health_check` are optional capabilities; the
/// default bodies return "none" and the router treats every plugin
/// uniformly.
#[async_trait]
pub trait PluginInstance: Send + Sync {
    fn name(&self) -> &str;

    /// External binary names this plugin handles. One plugin may handle
    /// several tools.
    fn tools(&self) -> &[&str];

    /// First-match-wins credential selection over the configured
    /// credentials for `resource`.
    fn select_credential(&self, resource: &str) -> Option<Credential>;

    /// First-argument values this plugin intercepts.
    fn commands(&self) -> &[&str] {
        &[]
    }

    /// Run an intercepted command. Only called for `cmd` values listed by
    /// [`commands`](Self::commands). Argument and upstream errors are
    /// `Handled` results with `exit_code: 1`, never HTTP errors.
    async fn execute_command(
        &self,
        cmd: &str,
        args: &[String],
        resource: &str,
        credential: &Credential,
        http: &reqwest::Client,
    ) -> CommandOutcome {
        let _ = (cmd, args, resource, credential, http);
        CommandOutcome::Fallthrough
    }

    /// Extra HTTP routes merged into the application router.
    fn routes(self: Arc<Self>, http: reqwest::Client) -> Option<axum::Router> {
        let _ = http;
        None
    }

    /// One status record per configured credential.
    async fn health_check(&self, http: &reqwest::Client) -> Vec<Value> {
        let _ = http;
        Vec::new()
    }
}
