//! Outbound HTTP client construction.
//!
//! One client is built at server startup with the configured total timeout
//! and handed to every component that makes outbound calls (intercepted
//! commands, the git reverse proxy, health probes). `reqwest::Client` is a
//! cheap handle over a shared connection pool, so callers clone it freely.
//! There is no process-wide global: tests build their own client and point
//! plugins at fixture servers.

use std::time::Duration;

/// Build the shared outbound client with `timeout_secs` as the total
/// per-request deadline. Health probes tighten this further with a per-call
/// timeout.
pub fn build_client(timeout_secs: u64) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}
