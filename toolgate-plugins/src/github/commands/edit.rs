//! Shared machinery for the partial body-edit interceptions.
//!
//! The user's intent is exact, unambiguous text substitution: without
//! `--replace-all` the old string must occur exactly once.

use crate::github::rest::github_rest;
use reqwest::Method;
use serde_json::{Value, json};

#[derive(Debug, PartialEq)]
pub(crate) struct EditArgs {
    pub positional: Vec<String>,
    pub old: String,
    pub new: String,
    pub replace_all: bool,
    pub title: Option<String>,
}

/// Interception gate: both `--old` and `--new` must be present, otherwise
/// the invocation belongs to the external CLI.
pub(crate) fn has_old_and_new(args: &[String]) -> bool {
    args.iter().any(|a| a == "--old") && args.iter().any(|a| a == "--new")
}

/// Parse `--old`, `--new`, `--replace-all` (and `--title` when
/// `with_title`) out of `args`; everything else is positional.
pub(crate) fn parse_edit_args(args: &[String], with_title: bool) -> Result<EditArgs, String> {
    let mut positional = Vec::new();
    let mut old = None;
    let mut new = None;
    let mut replace_all = false;
    let mut title = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--old" => {
                old = Some(iter.next().ok_or("--old requires a value")?.clone());
            }
            "--new" => {
                new = Some(iter.next().ok_or("--new requires a value")?.clone());
            }
            "--replace-all" => replace_all = true,
            "--title" if with_title => {
                title = Some(iter.next().ok_or("--title requires a value")?.clone());
            }
            _ => positional.push(arg.clone()),
        }
    }

    let old = old.ok_or("--old requires a value")?;
    let new = new.ok_or("--new requires a value")?;
    Ok(EditArgs {
        positional,
        old,
        new,
        replace_all,
        title,
    })
}

/// Replace `old` with `new` in `body`.
///
/// Fails when `old` is absent, or ambiguous without `replace_all`.
pub(crate) fn partial_replace(
    body: &str,
    old: &str,
    new: &str,
    replace_all: bool,
) -> Result<String, String> {
    let count = body.matches(old).count();

    if count == 0 {
        return Err("old string not found in body".to_string());
    }
    if count > 1 && !replace_all {
        return Err(format!(
            "old string found {count} times in body \
             (use --replace-all to replace all occurrences)"
        ));
    }

    if replace_all {
        Ok(body.replace(old, new))
    } else {
        Ok(body.replacen(old, new, 1))
    }
}

/// GET the object at `url`, apply the partial replace to its `body` (null
/// is treated as empty), then PATCH it back, with the title when given.
pub(crate) async fn apply_body_edit(
    http: &reqwest::Client,
    url: &str,
    token: &str,
    edit: &EditArgs,
) -> anyhow::Result<()> {
    let current = github_rest(http, Method::GET, url, token, None).await?;
    let body = current.get("body").and_then(Value::as_str).unwrap_or("");
    let updated = partial_replace(body, &edit.old, &edit.new, edit.replace_all)
        .map_err(anyhow::Error::msg)?;

    let mut payload = json!({ "body": updated });
    if let Some(title) = &edit.title {
        payload["title"] = json!(title);
    }
    github_rest(http, Method::PATCH, url, token, Some(&payload)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    // ── has_old_and_new ──────────────────────────────────────────

    #[test]
    fn gate_requires_both_flags() {
        assert!(has_old_and_new(&args(&["--old", "a", "--new", "b"])));
        assert!(!has_old_and_new(&args(&["--old", "a"])));
        assert!(!has_old_and_new(&args(&["--new", "b"])));
        assert!(!has_old_and_new(&args(&["42", "--title", "t"])));
    }

    // ── parse_edit_args ──────────────────────────────────────────

    #[test]
    fn parses_flags_and_positionals() {
        let parsed =
            parse_edit_args(&args(&["42", "--old", "a", "--new", "b"]), false).unwrap();
        assert_eq!(parsed.positional, vec!["42"]);
        assert_eq!(parsed.old, "a");
        assert_eq!(parsed.new, "b");
        assert!(!parsed.replace_all);
        assert!(parsed.title.is_none());
    }

    #[test]
    fn parses_replace_all() {
        let parsed = parse_edit_args(
            &args(&["1", "--old", "a", "--new", "b", "--replace-all"]),
            false,
        )
        .unwrap();
        assert!(parsed.replace_all);
    }

    #[test]
    fn parses_title_when_enabled() {
        let parsed = parse_edit_args(
            &args(&["1", "--old", "a", "--new", "b", "--title", "New title"]),
            true,
        )
        .unwrap();
        assert_eq!(parsed.title.as_deref(), Some("New title"));
    }

    #[test]
    fn title_stays_positional_when_disabled() {
        let parsed = parse_edit_args(
            &args(&["--title", "t", "1", "--old", "a", "--new", "b"]),
            false,
        )
        .unwrap();
        assert_eq!(parsed.positional, vec!["--title", "t", "1"]);
    }

    #[test]
    fn flag_without_value_errors() {
        let err = parse_edit_args(&args(&["1", "--new", "b", "--old"]), false).unwrap_err();
        assert_eq!(err, "--old requires a value");

        let err = parse_edit_args(&args(&["1", "--old", "a", "--new"]), false).unwrap_err();
        assert_eq!(err, "--new requires a value");
    }

    // ── partial_replace ──────────────────────────────────────────

    #[test]
    fn replaces_a_unique_occurrence() {
        assert_eq!(
            partial_replace("before change", "before", "after", false).unwrap(),
            "after change"
        );
    }

    #[test]
    fn missing_old_string_errors() {
        let err = partial_replace("body text", "absent", "x", false).unwrap_err();
        assert_eq!(err, "old string not found in body");
    }

    #[test]
    fn ambiguous_match_errors_without_replace_all() {
        let err = partial_replace("aaa bbb aaa", "aaa", "ccc", false).unwrap_err();
        assert_eq!(
            err,
            "old string found 2 times in body (use --replace-all to replace all occurrences)"
        );
    }

    #[test]
    fn replace_all_replaces_every_occurrence() {
        let result = partial_replace("aaa bbb aaa", "aaa", "ccc", true).unwrap();
        assert_eq!(result, "ccc bbb ccc");
        assert!(!result.contains("aaa"));
    }

    #[test]
    fn replace_all_with_single_occurrence_works() {
        assert_eq!(partial_replace("one two", "one", "1", true).unwrap(), "1 two");
    }

    #[test]
    fn without_replace_all_only_first_occurrence_changes_nothing_else() {
        // Exactly one occurrence required; the swap touches only it.
        assert_eq!(
            partial_replace("keep MARK keep", "MARK", "X", false).unwrap(),
            "keep X keep"
        );
    }
}
