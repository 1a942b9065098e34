//! `issue` interception: partial body replacement for issues and issue
//! comments via the REST API.
//!
//! Handles:
//! - `issue edit <number> --old "..." --new "..." [--replace-all]`
//! - `issue comment edit <comment-id> --old "..." --new "..." [--replace-all]`
//!
//! Everything else falls through to the `gh` CLI.

use super::edit::{self, EditArgs};
use toolgate_core::{CliResult, Credential};
use toolgate_plugin::CommandOutcome;

use crate::github::token_of;

pub async fn execute(
    http: &reqwest::Client,
    api_url: &str,
    args: &[String],
    resource: &str,
    credential: &Credential,
) -> CommandOutcome {
    let Some((subcmd, rest)) = args.split_first() else {
        return CommandOutcome::Fallthrough;
    };

    match subcmd.as_str() {
        "edit" if edit::has_old_and_new(rest) => CommandOutcome::Handled(
            handle_edit(http, api_url, rest, resource, credential).await,
        ),
        "comment" if rest.first().is_some_and(|a| a == "edit") && edit::has_old_and_new(&rest[1..]) => {
            CommandOutcome::Handled(
                handle_comment_edit(http, api_url, &rest[1..], resource, credential).await,
            )
        }
        _ => CommandOutcome::Fallthrough,
    }
}

async fn handle_edit(
    http: &reqwest::Client,
    api_url: &str,
    args: &[String],
    resource: &str,
    credential: &Credential,
) -> CliResult {
    let parsed = match edit::parse_edit_args(args, false) {
        Ok(parsed) => parsed,
        Err(e) => return CliResult::error(e),
    };
    let Some(first) = parsed.positional.first() else {
        return CliResult::error("issue number required");
    };
    let number: u64 = match first.parse() {
        Ok(n) => n,
        Err(_) => return CliResult::error(format!("Invalid issue number: {first}")),
    };
    let Some((owner, repo)) = resource.split_once('/') else {
        return CliResult::error(format!("Invalid GitHub resource: {resource}"));
    };

    let url = format!("{api_url}/repos/{owner}/{repo}/issues/{number}");
    match edit::apply_body_edit(http, &url, token_of(credential), &parsed).await {
        Ok(()) => CliResult::ok("", format!("Updated issue #{number}")),
        Err(e) => CliResult::error(e.to_string()),
    }
}

pub(crate) async fn handle_comment_edit(
    http: &reqwest::Client,
    api_url: &str,
    args: &[String],
    resource: &str,
    credential: &Credential,
) -> CliResult {
    let parsed: EditArgs = match edit::parse_edit_args(args, false) {
        Ok(parsed) => parsed,
        Err(e) => return CliResult::error(e),
    };
    let Some(comment_id) = parsed.positional.first() else {
        return CliResult::error("comment ID required");
    };
    let Some((owner, repo)) = resource.split_once('/') else {
        return CliResult::error(format!("Invalid GitHub resource: {resource}"));
    };

    let url = format!("{api_url}/repos/{owner}/{repo}/issues/comments/{comment_id}");
    match edit::apply_body_edit(http, &url, token_of(credential), &parsed).await {
        Ok(()) => CliResult::ok("", format!("Updated comment {comment_id}")),
        Err(e) => CliResult::error(e.to_string()),
    }
}
