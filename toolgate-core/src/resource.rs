//! Resource pattern matching for credential selection.
//!
//! Patterns are matched case-insensitively against resource identifiers
//! (`owner/repo` for GitHub, an account email or `default` for Google):
//!
//! - `*` matches any resource
//! - `prefix/*` matches when the first `/`-separated segment of the
//!   resource equals `prefix`
//! - anything else uses shell-glob semantics (`?`, `[...]`, `*` elsewhere)

use glob::{MatchOptions, Pattern};

/// Check whether `pattern` matches `resource`.
///
/// Callers order patterns from specific to general; the selector stops at
/// the first match.
pub fn match_resource(pattern: &str, resource: &str) -> bool {
    let p = pattern.to_lowercase();
    let r = resource.to_lowercase();

    if p == "*" {
        return true;
    }

    if let Some(prefix) = p.strip_suffix("/*") {
        return r.split('/').next() == Some(prefix);
    }

    // `*` must cross `/` here, same as the owner-prefix form above.
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };
    Pattern::new(&p)
        .map(|pat| pat.matches_with(&r, options))
        .unwrap_or(false)
}
