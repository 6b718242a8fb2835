//! Trigger-mention extraction.
//!
//! `@name?` requests a response from `@name`. A bare `@name` is a citation
//! and never triggers anyone.

use once_cell::sync::Lazy;
use regex::Regex;

static TRIGGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)\?").expect("valid regex"));

/// Extract response-triggering references from free text, in order of
/// appearance. Duplicates are preserved; callers needing set semantics must
/// deduplicate. Matching is case-sensitive and the trailing `?` is not part
/// of the returned reference.
pub fn trigger_mentions(text: &str) -> Vec<String> {
    TRIGGER
        .captures_iter(text)
        .map(|cap| format!("@{}", &cap[1]))
        .collect()
}

/// Whether `text` contains a trigger mention of `handle`.
pub fn mentions_trigger(text: &str, handle: &str) -> bool {
    trigger_mentions(text).iter().any(|m| m == handle)
}
