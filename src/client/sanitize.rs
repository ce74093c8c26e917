//! User input cleanup before it enters a conversation.
//!
//! Removes `<script>`/`<iframe>` blocks, `javascript:` schemes and inline
//! `on*=` handler attributes, all case-insensitively, then trims. A block
//! without its closing tag is left in place.

use std::sync::LazyLock;

use regex::Regex;

/// Patterns applied in order; every match is replaced with nothing.
static UNSAFE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?is)<script\b.*?</script>",
        r"(?is)<iframe\b.*?</iframe>",
        r"(?i)javascript:",
        r"(?i)on\w+\s*=",
    ]
    .into_iter()
    .filter_map(|pattern| match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "Failed to compile sanitizer pattern");
            None
        }
    })
    .collect()
});

pub fn sanitize_input(input: &str) -> String {
    let mut out = input.to_string();
    for pattern in UNSAFE_PATTERNS.iter() {
        out = pattern.replace_all(&out, "").into_owned();
    }
    out.trim().to_string()
}
