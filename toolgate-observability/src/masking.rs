//! Credential masking for log output.
//!
//! Secret values are collected from the config tree once at startup and
//! replaced with `***` wherever they appear in log text. Email local-parts
//! are masked separately for output that lists accounts.

use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use toolgate_core::config::SECRET_KEYS;

/// Recursively collect secret values from the config tree.
///
/// At each object, string values under a key in
/// [`toolgate_core::config::SECRET_KEYS`] are collected; everything else is
/// recursed into. Empty strings are excluded. The result is
/// order-independent.
pub fn collect_secrets(config: &Value) -> BTreeSet<String> {
    let mut secrets = BTreeSet::new();
    walk(config, &mut secrets);
    secrets
}

fn walk(value: &Value, secrets: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match child {
                    Value::String(s) if SECRET_KEYS.contains(&key.as_str()) && !s.is_empty() => {
                        secrets.insert(s.clone());
                    }
                    _ => walk(child, secrets),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, secrets);
            }
        }
        _ => {}
    }
}

/// Replace every occurrence of each secret in `text` with `***`.
///
/// Longer secrets are replaced first so that a secret which is a prefix of
/// another cannot undo the longer replacement.
pub fn mask_secrets(text: &str, secrets: &BTreeSet<String>) -> String {
    let mut sorted: Vec<&str> = secrets.iter().map(|s| s.as_str()).collect();
    sorted.sort_by_key(|s| std::cmp::Reverse(s.len()));
    mask_sorted(text, &sorted)
}

pub(crate) fn mask_sorted(text: &str, sorted_secrets: &[impl AsRef<str>]) -> String {
    let mut result = text.to_string();
    for secret in sorted_secrets {
        let secret = secret.as_ref();
        if !secret.is_empty() {
            result = result.replace(secret, "***");
        }
    }
    result
}

/// Mask a credential value, keeping a short prefix visible for
/// identification: `mask_value("ghp_abc123xyz", 8)` is `"ghp_abc1***"`.
/// Values no longer than the prefix are fully masked.
pub fn mask_value(value: &str, visible_prefix: usize) -> String {
    if value.chars().count() <= visible_prefix {
        return "***".to_string();
    }
    let prefix: String = value.chars().take(visible_prefix).collect();
    format!("{prefix}***")
}

/// Mask the local part of an email address, preserving the domain:
/// `mask_email("user@example.com")` is `"us***@example.com"`.
pub fn mask_email(email: &str) -> String {
    let Some(at) = email.find('@') else {
        return email.to_string();
    };
    let (local, domain) = email.split_at(at);
    if local.chars().count() <= 2 {
        format!("***{domain}")
    } else {
        let head: String = local.chars().take(2).collect();
        format!("{head}***{domain}")
    }
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+").expect("email regex compiles")
});

/// Find and mask every email-like substring in `text`.
pub fn mask_emails_in_text(text: &str) -> String {
    EMAIL_RE
        .replace_all(text, |captures: &regex::Captures<'_>| {
            mask_email(&captures[0])
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── collect_secrets ──────────────────────────────────────────

    #[test]
    fn collects_tokens_from_credentials() {
        let config = json!({
            "plugins": {
                "github": {
                    "credentials": [
                        { "token": "ghp_aaaa1111", "resources": ["*"] },
                        { "token": "ghp_bbbb2222", "resources": ["acme/*"] },
                    ]
                }
            }
        });
        let secrets = collect_secrets(&config);
        assert!(secrets.contains("ghp_aaaa1111"));
        assert!(secrets.contains("ghp_bbbb2222"));
        assert_eq!(secrets.len(), 2);
    }

    #[test]
    fn collects_every_recognised_key() {
        let config = json!({
            "a": { "token": "secret-token-1" },
            "b": { "keyring_password": "secret-keyring" },
            "c": { "client_secret": "secret-client" },
            "d": { "refresh_token": "secret-refresh" },
            "e": { "password": "secret-password" },
        });
        let secrets = collect_secrets(&config);
        assert_eq!(secrets.len(), 5);
    }

    #[test]
    fn collects_at_any_depth() {
        let config = json!({
            "outer": [ { "inner": { "deep": [ { "token": "nested-secret" } ] } } ]
        });
        assert!(collect_secrets(&config).contains("nested-secret"));
    }

    #[test]
    fn ignores_empty_strings() {
        let config = json!({ "token": "" });
        assert!(collect_secrets(&config).is_empty());
    }

    #[test]
    fn ignores_non_string_values_under_secret_keys() {
        let config = json!({ "token": 12345, "password": { "token": "real-secret" } });
        let secrets = collect_secrets(&config);
        assert_eq!(secrets.len(), 1);
        assert!(secrets.contains("real-secret"));
    }

    #[test]
    fn ignores_unrecognised_keys() {
        let config = json!({ "api_key": "not-collected", "url": "https://example.com" });
        assert!(collect_secrets(&config).is_empty());
    }

    // ── mask_secrets ─────────────────────────────────────────────

    #[test]
    fn masks_single_secret() {
        let secrets = BTreeSet::from(["ghp_abc123".to_string()]);
        assert_eq!(mask_secrets("loaded ghp_abc123", &secrets), "loaded ***");
    }

    #[test]
    fn masks_every_occurrence() {
        let secrets = BTreeSet::from(["sekret".to_string()]);
        assert_eq!(
            mask_secrets("sekret in front, sekret behind", &secrets),
            "*** in front, *** behind"
        );
    }

    #[test]
    fn masks_multiple_secrets() {
        let secrets = BTreeSet::from(["alpha-token".to_string(), "beta-token".to_string()]);
        let masked = mask_secrets("alpha-token and beta-token", &secrets);
        assert_eq!(masked, "*** and ***");
    }

    #[test]
    fn longer_secret_masked_before_its_prefix() {
        // "abc" is a prefix of "abcdef"; replacing "abc" first would leave
        // "***def" visible.
        let secrets = BTreeSet::from(["abc".to_string(), "abcdef".to_string()]);
        assert_eq!(mask_secrets("value=abcdef", &secrets), "value=***");
    }

    #[test]
    fn no_secret_substring_survives() {
        let secrets = BTreeSet::from(["tok-one-11".to_string(), "tok-two-22".to_string()]);
        let masked = mask_secrets("a tok-one-11 b tok-two-22 c", &secrets);
        for secret in &secrets {
            assert!(!masked.contains(secret.as_str()));
        }
    }

    #[test]
    fn text_without_secrets_is_unchanged() {
        let secrets = BTreeSet::from(["unrelated-secret".to_string()]);
        assert_eq!(mask_secrets("plain message", &secrets), "plain message");
    }

    #[test]
    fn empty_secret_set_is_noop() {
        assert_eq!(mask_secrets("anything", &BTreeSet::new()), "anything");
    }

    // ── mask_value ───────────────────────────────────────────────

    #[test]
    fn mask_value_keeps_prefix() {
        assert_eq!(mask_value("ghp_abc123xyz", 8), "ghp_abc1***");
    }

    #[test]
    fn mask_value_short_values_fully_masked() {
        assert_eq!(mask_value("short", 8), "***");
        assert_eq!(mask_value("12345678", 8), "***");
        assert_eq!(mask_value("", 8), "***");
    }

    #[test]
    fn mask_value_with_narrow_prefix() {
        assert_eq!(mask_value("keyring-pw-value", 4), "keyr***");
    }

    // ── mask_email ───────────────────────────────────────────────

    #[test]
    fn mask_email_keeps_domain() {
        assert_eq!(mask_email("user@example.com"), "us***@example.com");
    }

    #[test]
    fn mask_email_short_local_part() {
        assert_eq!(mask_email("ab@example.com"), "***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
    }

    #[test]
    fn mask_email_without_at_is_unchanged() {
        assert_eq!(mask_email("not-an-email"), "not-an-email");
    }

    #[test]
    fn mask_email_minimal_domain_preserved() {
        assert_eq!(mask_email("x@y"), "***@y");
    }

    // ── mask_emails_in_text ──────────────────────────────────────

    #[test]
    fn masks_emails_embedded_in_text() {
        let text = "accounts: alice@example.com (default), bob.smith@corp.io";
        let masked = mask_emails_in_text(text);
        assert_eq!(masked, "accounts: al***@example.com (default), bo***@corp.io");
    }

    #[test]
    fn text_without_emails_is_unchanged() {
        assert_eq!(mask_emails_in_text("no addresses here"), "no addresses here");
    }
}
