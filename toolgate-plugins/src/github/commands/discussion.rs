//! `discussion` interception: GitHub Discussions over GraphQL.
//!
//! The `gh` CLI has no native discussion support, so every subcommand is
//! handled here; nothing falls through to a subprocess.

use super::parse_flags;
use crate::github::graphql::{execute_graphql, get_repository_id};
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
        execute_graphql(self.http, self.url, self.token, query, variables, &[]).await
    }

    fn repo_vars(&self) -> Value {
        json!({ "owner": self.owner, "repo": self.repo })
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
        return CliResult::error("discussion subcommand required");
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
        "list" => list(&ctx).await,
        "view" => view(&ctx, rest).await,
        "create" => create(&ctx, rest).await,
        "edit" => edit(&ctx, rest).await,
        "close" => close(&ctx, rest).await,
        "reopen" => reopen(&ctx, rest).await,
        "delete" => delete(&ctx, rest).await,
        "comment" => comment(&ctx, rest).await,
        "answer" => answer(&ctx, rest).await,
        "unanswer" => unanswer(&ctx, rest).await,
        "poll" => poll(&ctx, rest).await,
        other => Err(anyhow!("Unknown discussion subcommand: {other}")),
    };
    result.unwrap_or_else(|e| CliResult::error(e.to_string()))
}

fn number_arg(rest: &[String]) -> anyhow::Result<u64> {
    let first = rest
        .first()
        .ok_or_else(|| anyhow!("discussion number required"))?;
    first
        .parse()
        .map_err(|_| anyhow!("Invalid discussion number: {first}"))
}

fn join_lines(lines: &[String]) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join("\n"))
    }
}

async fn resolve_discussion_id(ctx: &Ctx<'_>, number: u64) -> anyhow::Result<String> {
    let query = "\
query($owner: String!, $repo: String!, $number: Int!) {
    repository(owner: $owner, name: $repo) {
        discussion(number: $number) {
            id
        }
    }
}";
    let result = ctx
        .call(
            query,
            json!({ "owner": ctx.owner, "repo": ctx.repo, "number": number }),
        )
        .await?;
    result["data"]["repository"]["discussion"]["id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Discussion #{number} not found"))
}

async fn list(ctx: &Ctx<'_>) -> anyhow::Result<CliResult> {
    let query = "\
query($owner: String!, $repo: String!) {
    repository(owner: $owner, name: $repo) {
        discussions(first: 30, orderBy: {field: CREATED_AT, direction: DESC}) {
            nodes {
                number
                title
                category { name }
                author { login }
                createdAt
            }
        }
    }
}";
    let result = ctx.call(query, ctx.repo_vars()).await?;
    let nodes = result["data"]["repository"]["discussions"]["nodes"]
        .as_array()
        .cloned()
        .unwrap_or_default();

    let lines: Vec<String> = nodes
        .iter()
        .map(|node| {
            format!(
                "{}\t{}\t{}\t{}\t{}",
                node["number"].as_u64().unwrap_or(0),
                node["title"].as_str().unwrap_or(""),
                node["category"]["name"].as_str().unwrap_or(""),
                node["author"]["login"].as_str().unwrap_or(""),
                node["createdAt"].as_str().unwrap_or(""),
            )
        })
        .collect();
    Ok(CliResult::ok(join_lines(&lines), ""))
}

async fn view(ctx: &Ctx<'_>, rest: &[String]) -> anyhow::Result<CliResult> {
    let number = number_arg(rest)?;
    let query = "\
query($owner: String!, $repo: String!, $number: Int!) {
    repository(owner: $owner, name: $repo) {
        discussion(number: $number) {
            number
            title
            body
            createdAt
            author { login }
            category { name }
            comments(first: 50) {
                nodes {
                    id
                    body
                    createdAt
                    isAnswer
                    author { login }
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
    let discussion = &result["data"]["repository"]["discussion"];
    if discussion.is_null() {
        bail!("Discussion #{number} not found");
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{} #{}\n",
        discussion["title"].as_str().unwrap_or(""),
        number
    ));
    out.push_str(&format!(
        "Author: {}\n",
        discussion["author"]["login"].as_str().unwrap_or("")
    ));
    out.push_str(&format!(
        "Category: {}\n",
        discussion["category"]["name"].as_str().unwrap_or("")
    ));
    out.push_str(&format!(
        "Created: {}\n",
        discussion["createdAt"].as_str().unwrap_or("")
    ));
    out.push('\n');
    out.push_str(discussion["body"].as_str().unwrap_or(""));
    out.push('\n');

    let comments = discussion["comments"]["nodes"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    if !comments.is_empty() {
        out.push_str(&format!("\nComments ({}):\n", comments.len()));
        for comment in &comments {
            let marker = if comment["isAnswer"].as_bool().unwrap_or(false) {
                " [answer]"
            } else {
                ""
            };
            out.push_str(&format!(
                "[{}] {} ({}){}:\n{}\n",
                comment["id"].as_str().unwrap_or(""),
                comment["author"]["login"].as_str().unwrap_or(""),
                comment["createdAt"].as_str().unwrap_or(""),
                marker,
                comment["body"].as_str().unwrap_or(""),
            ));
        }
    }
    Ok(CliResult::ok(out, ""))
}

async fn resolve_category_id(ctx: &Ctx<'_>, wanted: &str) -> anyhow::Result<String> {
    let query = "\
query($owner: String!, $repo: String!) {
    repository(owner: $owner, name: $repo) {
        discussionCategories(first: 25) {
            nodes {
                id
                name
                slug
            }
        }
    }
}";
    let result = ctx.call(query, ctx.repo_vars()).await?;
    let nodes = result["data"]["repository"]["discussionCategories"]["nodes"]
        .as_array()
        .cloned()
        .unwrap_or_default();

    for node in &nodes {
        let name = node["name"].as_str().unwrap_or("");
        let slug = node["slug"].as_str().unwrap_or("");
        if name.eq_ignore_ascii_case(wanted) || slug.eq_ignore_ascii_case(wanted) {
            if let Some(id) = node["id"].as_str() {
                return Ok(id.to_string());
            }
        }
    }
    let available: Vec<&str> = nodes
        .iter()
        .filter_map(|node| node["name"].as_str())
        .collect();
    bail!(
        "Unknown category '{wanted}'. Available: {}",
        available.join(", ")
    )
}

async fn create(ctx: &Ctx<'_>, rest: &[String]) -> anyhow::Result<CliResult> {
    let (_, flags) =
        parse_flags(rest, &["--title", "--body", "--category"]).map_err(anyhow::Error::msg)?;
    let title = flags
        .get("--title")
        .ok_or_else(|| anyhow!("--title is required"))?;
    let body = flags
        .get("--body")
        .ok_or_else(|| anyhow!("--body is required"))?;
    let category = flags
        .get("--category")
        .ok_or_else(|| anyhow!("--category is required"))?;

    let repository_id = get_repository_id(ctx.http, ctx.url, ctx.token, ctx.owner, ctx.repo).await?;
    let category_id = resolve_category_id(ctx, category).await?;

    let mutation = "\
mutation($input: CreateDiscussionInput!) {
    createDiscussion(input: $input) {
        discussion {
            number
            url
        }
    }
}";
    let result = ctx
        .call(
            mutation,
            json!({
                "input": {
                    "repositoryId": repository_id,
                    "categoryId": category_id,
                    "title": title,
                    "body": body,
                }
            }),
        )
        .await?;
    let discussion = &result["data"]["createDiscussion"]["discussion"];
    let number = discussion["number"].as_u64().unwrap_or(0);
    let url = discussion["url"].as_str().unwrap_or("");
    Ok(CliResult {
        exit_code: 0,
        stdout: format!("{url}\n"),
        stderr: format!("Created discussion #{number}"),
    })
}

async fn edit(ctx: &Ctx<'_>, rest: &[String]) -> anyhow::Result<CliResult> {
    let number = number_arg(rest)?;
    let (_, flags) = parse_flags(&rest[1..], &["--title", "--body"]).map_err(anyhow::Error::msg)?;
    if flags.is_empty() {
        bail!("at least one of --title or --body is required");
    }

    let id = resolve_discussion_id(ctx, number).await?;
    let mut input = json!({ "discussionId": id });
    if let Some(title) = flags.get("--title") {
        input["title"] = json!(title);
    }
    if let Some(body) = flags.get("--body") {
        input["body"] = json!(body);
    }

    let mutation = "\
mutation($input: UpdateDiscussionInput!) {
    updateDiscussion(input: $input) {
        discussion {
            number
        }
    }
}";
    ctx.call(mutation, json!({ "input": input })).await?;
    Ok(CliResult::ok("", format!("Updated discussion #{number}")))
}

async fn close(ctx: &Ctx<'_>, rest: &[String]) -> anyhow::Result<CliResult> {
    let number = number_arg(rest)?;
    let id = resolve_discussion_id(ctx, number).await?;
    let mutation = "\
mutation($input: CloseDiscussionInput!) {
    closeDiscussion(input: $input) {
        discussion {
            number
        }
    }
}";
    ctx.call(mutation, json!({ "input": { "discussionId": id } }))
        .await?;
    Ok(CliResult::ok("", format!("Closed discussion #{number}")))
}

async fn reopen(ctx: &Ctx<'_>, rest: &[String]) -> anyhow::Result<CliResult> {
    let number = number_arg(rest)?;
    let id = resolve_discussion_id(ctx, number).await?;
    let mutation = "\
mutation($input: ReopenDiscussionInput!) {
    reopenDiscussion(input: $input) {
        discussion {
            number
        }
    }
}";
    ctx.call(mutation, json!({ "input": { "discussionId": id } }))
        .await?;
    Ok(CliResult::ok("", format!("Reopened discussion #{number}")))
}

async fn delete(ctx: &Ctx<'_>, rest: &[String]) -> anyhow::Result<CliResult> {
    let number = number_arg(rest)?;
    let id = resolve_discussion_id(ctx, number).await?;
    let mutation = "\
mutation($input: DeleteDiscussionInput!) {
    deleteDiscussion(input: $input) {
        discussion {
            id
        }
    }
}";
    ctx.call(mutation, json!({ "input": { "id": id } })).await?;
    Ok(CliResult::ok("", format!("Deleted discussion #{number}")))
}

async fn comment(ctx: &Ctx<'_>, rest: &[String]) -> anyhow::Result<CliResult> {
    match rest.first().map(String::as_str) {
        None => bail!("discussion number or comment subcommand required"),
        Some("edit") => comment_edit(ctx, &rest[1..]).await,
        Some("delete") => comment_delete(ctx, &rest[1..]).await,
        Some(_) => comment_add(ctx, rest).await,
    }
}

async fn comment_add(ctx: &Ctx<'_>, rest: &[String]) -> anyhow::Result<CliResult> {
    let number = number_arg(rest)?;
    let (_, flags) =
        parse_flags(&rest[1..], &["--body", "--reply-to"]).map_err(anyhow::Error::msg)?;
    let body = flags
        .get("--body")
        .ok_or_else(|| anyhow!("--body is required"))?;

    let id = resolve_discussion_id(ctx, number).await?;
    let mut input = json!({ "discussionId": id, "body": body });
    if let Some(reply_to) = flags.get("--reply-to") {
        input["replyToId"] = json!(reply_to);
    }

    let mutation = "\
mutation($input: AddDiscussionCommentInput!) {
    addDiscussionComment(input: $input) {
        comment {
            id
        }
    }
}";
    let result = ctx.call(mutation, json!({ "input": input })).await?;
    let comment_id = result["data"]["addDiscussionComment"]["comment"]["id"]
        .as_str()
        .unwrap_or("");
    Ok(CliResult {
        exit_code: 0,
        stdout: format!("{comment_id}\n"),
        stderr: format!("Added comment to discussion #{number}"),
    })
}

async fn comment_edit(ctx: &Ctx<'_>, rest: &[String]) -> anyhow::Result<CliResult> {
    let comment_id = rest
        .first()
        .ok_or_else(|| anyhow!("comment ID required"))?;
    let (_, flags) = parse_flags(&rest[1..], &["--body"]).map_err(anyhow::Error::msg)?;
    let body = flags
        .get("--body")
        .ok_or_else(|| anyhow!("--body is required"))?;

    let mutation = "\
mutation($input: UpdateDiscussionCommentInput!) {
    updateDiscussionComment(input: $input) {
        comment {
            id
        }
    }
}";
    ctx.call(
        mutation,
        json!({ "input": { "commentId": comment_id, "body": body } }),
    )
    .await?;
    Ok(CliResult::ok("", format!("Updated comment {comment_id}")))
}

async fn comment_delete(ctx: &Ctx<'_>, rest: &[String]) -> anyhow::Result<CliResult> {
    let comment_id = rest
        .first()
        .ok_or_else(|| anyhow!("comment ID required"))?;
    let mutation = "\
mutation($input: DeleteDiscussionCommentInput!) {
    deleteDiscussionComment(input: $input) {
        comment {
            id
        }
    }
}";
    ctx.call(mutation, json!({ "input": { "id": comment_id } }))
        .await?;
    Ok(CliResult::ok("", format!("Deleted comment {comment_id}")))
}

async fn answer(ctx: &Ctx<'_>, rest: &[String]) -> anyhow::Result<CliResult> {
    let comment_id = rest
        .first()
        .ok_or_else(|| anyhow!("comment ID required"))?;
    let mutation = "\
mutation($input: MarkDiscussionCommentAsAnswerInput!) {
    markDiscussionCommentAsAnswer(input: $input) {
        discussion {
            number
        }
    }
}";
    ctx.call(mutation, json!({ "input": { "id": comment_id } }))
        .await?;
    Ok(CliResult::ok(
        "",
        format!("Marked comment {comment_id} as answer"),
    ))
}

async fn unanswer(ctx: &Ctx<'_>, rest: &[String]) -> anyhow::Result<CliResult> {
    let comment_id = rest
        .first()
        .ok_or_else(|| anyhow!("comment ID required"))?;
    let mutation = "\
mutation($input: UnmarkDiscussionCommentAsAnswerInput!) {
    unmarkDiscussionCommentAsAnswer(input: $input) {
        discussion {
            number
        }
    }
}";
    ctx.call(mutation, json!({ "input": { "id": comment_id } }))
        .await?;
    Ok(CliResult::ok(
        "",
        format!("Unmarked comment {comment_id} as answer"),
    ))
}

async fn poll(ctx: &Ctx<'_>, rest: &[String]) -> anyhow::Result<CliResult> {
    match rest.first().map(String::as_str) {
        None => bail!("poll subcommand required"),
        Some("vote") => {
            let option_id = rest
                .get(1)
                .ok_or_else(|| anyhow!("poll option ID required"))?;
            let mutation = "\
mutation($input: AddDiscussionPollVoteInput!) {
    addDiscussionPollVote(input: $input) {
        pollOption {
            option
            totalVoteCount
        }
    }
}";
            let result = ctx
                .call(mutation, json!({ "input": { "pollOptionId": option_id } }))
                .await?;
            let option = &result["data"]["addDiscussionPollVote"]["pollOption"];
            Ok(CliResult::ok(
                format!(
                    "{}\t{}\n",
                    option["option"].as_str().unwrap_or(""),
                    option["totalVoteCount"].as_u64().unwrap_or(0),
                ),
                "Recorded vote",
            ))
        }
        Some(other) => bail!("Unknown poll subcommand: {other}"),
    }
}
