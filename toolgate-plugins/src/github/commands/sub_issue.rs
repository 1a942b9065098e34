//! `sub-issue` interception: GitHub Sub-Issues over GraphQL.
//!
//! The `gh` CLI has no native sub-issue support, so every subcommand is
//! handled here; nothing falls through. The feature-flag header is required
//! on every call (see [`SUB_ISSUES_FEATURE`]).

use super::parse_flags;
use crate::github::graphql::{SUB_ISSUES_FEATURE, execute_graphql, get_issue_node_id};
use crate::github::token_of;
use anyhow::{anyhow, bail};
use serde_json::{Value, json};
use toolgate_core::{CliResult, Credential};

struct Ctx<'a> {
    http: &'a reqwest::Client,
    url: &'a str,
    token: &'a str,
    owner: &'a str,
    repo: &'a str,
}

impl Ctx<'_> {
    async fn call(&self, query: &str, variables: Value) -> anyhow::Result<Value> {
        execute_graphql(
            self.http,
            self.url,
            self.token,
            query,
            variables,
            &[SUB_ISSUES_FEATURE],
        )
        .await
    }

    async fn node_id(&self, number: u64) -> anyhow::Result<String> {
        get_issue_node_id(self.http, self.url, self.token, self.owner, self.repo, number).await
    }
}

pub async fn execute(
    http: &reqwest::Client,
    graphql_url: &str,
    args: &[String],
    resource: &str,
    credential: &Credential,
) -> CliResult {
    let Some((subcmd, rest)) = args.split_first() else {
        return CliResult::error("sub-issue subcommand required");
    };
    let Some((owner, repo)) = resource.split_once('/') else {
        return CliResult::error(format!("Invalid GitHub resource: {resource}"));
    };
    let ctx = Ctx {
        http,
        url: graphql_url,
        token: token_of(credential),
        owner,
        repo,
    };

    let result = match subcmd.as_str() {
        "list" => list(&ctx, rest).await,
        "parent" => parent(&ctx, rest).await,
        "add" => add(&ctx, rest).await,
        "remove" => remove(&ctx, rest).await,
        "reorder" => reorder(&ctx, rest).await,
        other => Err(anyhow!("Unknown sub-issue subcommand: {other}")),
    };
    result.unwrap_or_else(|e| CliResult::error(e.to_string()))
}

fn issue_number(rest: &[String], index: usize, what: &str) -> anyhow::Result<u64> {
    let arg = rest.get(index).ok_or_else(|| anyhow!("{what} required"))?;
    arg.parse()
        .map_err(|_| anyhow!("Invalid issue number: {arg}"))
}

async fn list(ctx: &Ctx<'_>, rest: &[String]) -> anyhow::Result<CliResult> {
    let number = issue_number(rest, 0, "issue number")?;
    let query = "\
query($owner: String!, $repo: String!, $number: Int!) {
    repository(owner: $owner, name: $repo) {
        issue(number: $number) {
            subIssues(first: 50) {
                nodes {
                    number
                    title
                    state
                }
            }
        }
    }
}";
    let result = ctx
        .call(
            query,
            json!({ "owner": ctx.owner, "repo": ctx.repo, "number": number }),
        )
        .await?;
    let issue = &result["data"]["repository"]["issue"];
    if issue.is_null() {
        bail!("Issue #{number} not found in {}/{}", ctx.owner, ctx.repo);
    }

    let nodes = issue["subIssues"]["nodes"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    let lines: Vec<String> = nodes
        .iter()
        .map(|node| {
            format!(
                "{}\t{}\t{}",
                node["number"].as_u64().unwrap_or(0),
                node["title"].as_str().unwrap_or(""),
                node["state"].as_str().unwrap_or(""),
            )
        })
        .collect();
    let stdout = if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join("\n"))
    };
    Ok(CliResult::ok(stdout, ""))
}

async fn parent(ctx: &Ctx<'_>, rest: &[String]) -> anyhow::Result<CliResult> {
    let number = issue_number(rest, 0, "issue number")?;
    let query = "\
query($owner: String!, $repo: String!, $number: Int!) {
    repository(owner: $owner, name: $repo) {
        issue(number: $number) {
            parent {
                number
                title
                state
            }
        }
    }
}";
    let result = ctx
        .call(
            query,
            json!({ "owner": ctx.owner, "repo": ctx.repo, "number": number }),
        )
        .await?;
    let issue = &result["data"]["repository"]["issue"];
    if issue.is_null() {
        bail!("Issue #{number} not found in {}/{}", ctx.owner, ctx.repo);
    }

    let parent = &issue["parent"];
    if parent.is_null() {
        return Ok(CliResult::ok("No parent issue\n", ""));
    }
    Ok(CliResult::ok(
        format!(
            "{}\t{}\t{}\n",
            parent["number"].as_u64().unwrap_or(0),
            parent["title"].as_str().unwrap_or(""),
            parent["state"].as_str().unwrap_or(""),
        ),
        "",
    ))
}

async fn add(ctx: &Ctx<'_>, rest: &[String]) -> anyhow::Result<CliResult> {
    if rest.len() < 2 {
        bail!("parent and child issue numbers required");
    }
    let parent = issue_number(rest, 0, "parent issue number")?;
    let child = issue_number(rest, 1, "child issue number")?;
    let parent_id = ctx.node_id(parent).await?;
    let child_id = ctx.node_id(child).await?;

    let mutation = "\
mutation($input: AddSubIssueInput!) {
    addSubIssue(input: $input) {
        issue {
            number
        }
    }
}";
    ctx.call(
        mutation,
        json!({ "input": { "issueId": parent_id, "subIssueId": child_id } }),
    )
    .await?;
    Ok(CliResult::ok(
        "",
        format!("Added issue #{child} as sub-issue of #{parent}"),
    ))
}

async fn remove(ctx: &Ctx<'_>, rest: &[String]) -> anyhow::Result<CliResult> {
    if rest.len() < 2 {
        bail!("parent and child issue numbers required");
    }
    let parent = issue_number(rest, 0, "parent issue number")?;
    let child = issue_number(rest, 1, "child issue number")?;
    let parent_id = ctx.node_id(parent).await?;
    let child_id = ctx.node_id(child).await?;

    let mutation = "\
mutation($input: RemoveSubIssueInput!) {
    removeSubIssue(input: $input) {
        issue {
            number
        }
    }
}";
    ctx.call(
        mutation,
        json!({ "input": { "issueId": parent_id, "subIssueId": child_id } }),
    )
    .await?;
    Ok(CliResult::ok(
        "",
        format!("Removed issue #{child} from sub-issues of #{parent}"),
    ))
}

async fn reorder(ctx: &Ctx<'_>, rest: &[String]) -> anyhow::Result<CliResult> {
    if rest.len() < 2 {
        bail!("parent and child issue numbers required");
    }
    let parent = issue_number(rest, 0, "parent issue number")?;
    let child = issue_number(rest, 1, "child issue number")?;
    let (_, flags) = parse_flags(&rest[2..], &["--before", "--after"]).map_err(anyhow::Error::msg)?;
    if flags.is_empty() {
        bail!("--before or --after required");
    }

    let parent_id = ctx.node_id(parent).await?;
    let child_id = ctx.node_id(child).await?;
    let mut input = json!({ "issueId": parent_id, "subIssueId": child_id });
    if let Some(before) = flags.get("--before") {
        let before: u64 = before
            .parse()
            .map_err(|_| anyhow!("Invalid issue number: {before}"))?;
        input["beforeId"] = json!(ctx.node_id(before).await?);
    }
    if let Some(after) = flags.get("--after") {
        let after: u64 = after
            .parse()
            .map_err(|_| anyhow!("Invalid issue number: {after}"))?;
        input["afterId"] = json!(ctx.node_id(after).await?);
    }

    let mutation = "\
mutation($input: ReprioritizeSubIssueInput!) {
    reprioritizeSubIssue(input: $input) {
        issue {
            number
        }
    }
}";
    ctx.call(mutation, json!({ "input": input })).await?;
    Ok(CliResult::ok("", format!("Reordered sub-issue #{child}")))
}
