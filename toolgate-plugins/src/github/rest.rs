//! REST helper for the intercepted body-edit commands.

use anyhow::bail;
use reqwest::Method;
use serde_json::Value;

/// Issue a REST call with the standard GitHub headers.
///
/// Non-2xx responses become errors carrying the status and body text, which
/// command handlers surface verbatim in their stderr.
pub async fn github_rest(
    http: &reqwest::Client,
    method: Method,
    url: &str,
    token: &str,
    body: Option<&Value>,
) -> anyhow::Result<Value> {
    let mut request = http
        .request(method, url)
        .header("Authorization", format!("Bearer {token}"))
        .header("Accept", "application/vnd.github+json")
        .header("User-Agent", "toolgate")
        .header("X-GitHub-Api-Version", "2022-11-28");
    if let Some(body) = body {
        request = request.json(body);
    }

    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    if !status.is_success() {
        bail!("HTTP {}: {}", status.as_u16(), text);
    }
    if text.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}
