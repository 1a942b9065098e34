//! Typed GraphQL POST helper plus the two node-id lookups shared by the
//! intercepted command surfaces.

use anyhow::{anyhow, bail};
use serde_json::{Value, json};

/// Header required on every sub-issue API call.
pub const SUB_ISSUES_FEATURE: (&str, &str) = ("GraphQL-Features", "sub_issues");

/// Execute a GraphQL query or mutation.
///
/// Fails on a non-2xx response or when the response carries an `errors`
/// array; command handlers surface the message in their stderr.
pub async fn execute_graphql(
    http: &reqwest::Client,
    url: &str,
    token: &str,
    query: &str,
    variables: Value,
    extra_headers: &[(&str, &str)],
) -> anyhow::Result<Value> {
    let mut body = json!({ "query": query });
    if !variables.is_null() {
        body["variables"] = variables;
    }

    let mut request = http
        .post(url)
        .header("Authorization", format!("bearer {token}"))
        .header("User-Agent", "toolgate")
        .json(&body);
    for (name, value) in extra_headers {
        request = request.header(*name, *value);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        bail!("HTTP {}: {}", status.as_u16(), text);
    }

    let result: Value = response.json().await?;
    if let Some(errors) = result.get("errors") {
        bail!("GraphQL error: {errors}");
    }
    Ok(result)
}

/// Repository node id for `owner/repo`.
pub async fn get_repository_id(
    http: &reqwest::Client,
    url: &str,
    token: &str,
    owner: &str,
    repo: &str,
) -> anyhow::Result<String> {
    let query = "\
query($owner: String!, $repo: String!) {
    repository(owner: $owner, name: $repo) {
        id
    }
}";
    let result = execute_graphql(
        http,
        url,
        token,
        query,
        json!({ "owner": owner, "repo": repo }),
        &[],
    )
    .await?;
    result["data"]["repository"]["id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Repository {owner}/{repo} not found"))
}

/// Issue node id for `owner/repo#number`. Sent with the sub-issues feature
/// header because the sub-issue surface is its only caller.
pub async fn get_issue_node_id(
    http: &reqwest::Client,
    url: &str,
    token: &str,
    owner: &str,
    repo: &str,
    number: u64,
) -> anyhow::Result<String> {
    let query = "\
query($owner: String!, $repo: String!, $number: Int!) {
    repository(owner: $owner, name: $repo) {
        issue(number: $number) {
            id
        }
    }
}";
    let result = execute_graphql(
        http,
        url,
        token,
        query,
        json!({ "owner": owner, "repo": repo, "number": number }),
        &[SUB_ISSUES_FEATURE],
    )
    .await?;
    result["data"]["repository"]["issue"]["id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Issue #{number} not found in {owner}/{repo}"))
}
