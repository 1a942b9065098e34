//! Intercepted `gh` subcommand trees.

pub mod discussion;
pub mod issue;
pub mod pr;
pub mod sub_issue;

mod edit;

use std::collections::HashMap;

/// Split `args` into positionals and values for the named value-taking
/// flags. A listed flag consumes the following argument; a trailing flag
/// without one is an error. Unrecognized arguments are positional.
pub(crate) fn parse_flags(
    args: &[String],
    flags: &[&str],
) -> Result<(Vec<String>, HashMap<String, String>), String> {
    let mut positional = Vec::new();
    let mut values = HashMap::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if flags.contains(&arg.as_str()) {
            let value = iter
                .next()
                .ok_or_else(|| format!("{arg} requires a value"))?;
            values.insert(arg.clone(), value.clone());
        } else {
            positional.push(arg.clone());
        }
    }
    Ok((positional, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn splits_flags_and_positionals() {
        let (positional, values) = parse_flags(
            &args(&["42", "--body", "text", "extra"]),
            &["--body", "--title"],
        )
        .unwrap();
        assert_eq!(positional, vec!["42", "extra"]);
        assert_eq!(values["--body"], "text");
        assert!(!values.contains_key("--title"));
    }

    #[test]
    fn flag_without_value_is_an_error() {
        let err = parse_flags(&args(&["--body"]), &["--body"]).unwrap_err();
        assert_eq!(err, "--body requires a value");
    }

    #[test]
    fn unknown_flags_stay_positional() {
        let (positional, values) = parse_flags(&args(&["--unknown", "x"]), &["--body"]).unwrap();
        assert_eq!(positional, vec!["--unknown", "x"]);
        assert!(values.is_empty());
    }

    #[test]
    fn later_occurrence_wins() {
        let (_, values) =
            parse_flags(&args(&["--body", "a", "--body", "b"]), &["--body"]).unwrap();
        assert_eq!(values["--body"], "b");
    }
}
