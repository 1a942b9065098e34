//! Request policy hook.
//!
//! Evaluated by the router on every `/cli` request after plugin lookup and
//! before credential selection. The shipped implementation allows
//! everything; deployments that need per-command or per-resource rules
//! replace this function. A `false` result becomes a 403.

use crate::config::ProxyConfig;

/// Decide whether `tool`/`cmd` may run against `resource`.
pub async fn evaluate(_tool: &str, _cmd: &str, _resource: &str, _config: &ProxyConfig) -> bool {
    true
}
