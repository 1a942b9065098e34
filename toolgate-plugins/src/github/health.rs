//! PAT health probe.
//!
//! One record per configured credential: `GET /user` with the token, a 10s
//! deadline, and the scope / rate-limit headers pulled off a 200.

use super::GitHubConfig;
use serde_json::{Value, json};
use std::time::Duration;
use toolgate_observability::mask_value;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) async fn health_check(config: &GitHubConfig, http: &reqwest::Client) -> Vec<Value> {
    let mut results = Vec::new();
    for cred in &config.credentials {
        let token = cred.token.as_deref().unwrap_or("");
        let mut entry = json!({
            "masked_token": mask_value(token, 8),
            "resources": cred.resources,
        });
        let status = check_token(http, &config.api_url, token).await;
        if let (Some(entry), Some(status)) = (entry.as_object_mut(), status.as_object()) {
            entry.extend(status.clone());
        }
        results.push(entry);
    }
    results
}

async fn check_token(http: &reqwest::Client, api_url: &str, token: &str) -> Value {
    let response = http
        .get(format!("{api_url}/user"))
        .header("Authorization", format!("Bearer {token}"))
        .header("Accept", "application/vnd.github+json")
        .header("User-Agent", "toolgate")
        .timeout(PROBE_TIMEOUT)
        .send()
        .await;

    let response = match response {
        Ok(response) => response,
        Err(e) => return json!({ "valid": false, "error": e.to_string() }),
    };

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        let text = response.text().await.unwrap_or_default();
        return json!({
            "valid": false,
            "error": format!("HTTP {}: {}", status.as_u16(), text),
        });
    }

    let scopes = header_str(&response, "X-OAuth-Scopes");
    let rate_limit_remaining = header_str(&response, "X-RateLimit-Remaining");
    let data: Value = response.json().await.unwrap_or(Value::Null);
    json!({
        "valid": true,
        "user": data["login"].as_str().unwrap_or(""),
        "scopes": scopes,
        "rate_limit_remaining": rate_limit_remaining,
    })
}

fn header_str(response: &reqwest::Response, name: &str) -> String {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string()
}
