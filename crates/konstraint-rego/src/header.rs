//! Header comment extraction for Rego sources.
//!
//! The header is the first contiguous block of `#` comments in the file.
//! Everything after it is opaque to this crate, except the `package` line.

use regex::Regex;
use std::sync::LazyLock;

static PACKAGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*package\s+([A-Za-z0-9_.]+)").unwrap());

/// Return the header comment lines of `source` with the `#` marker removed.
pub fn header_comments(source: &str) -> Vec<String> {
    let mut comments = Vec::new();

    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if comments.is_empty() {
                continue;
            }
            break;
        }

        let Some(body) = trimmed.strip_prefix('#') else {
            break;
        };
        let body = body.strip_prefix(' ').unwrap_or(body);
        comments.push(body.trim_end().to_string());
    }

    comments
}

/// Dotted path of the first `package` statement, e.g. `lib.kubernetes`.
pub fn package_name(source: &str) -> Option<String> {
    source
        .lines()
        .find_map(|line| PACKAGE_REGEX.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
