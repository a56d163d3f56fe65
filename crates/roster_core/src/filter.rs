//! Case-insensitive substring filter over the loaded page.

use std::sync::Arc;

use shared::domain::Child;

/// Joins projected fields so a needle does not match across two of them.
const FIELD_SEPARATOR: char = '\u{25EC}';

pub fn normalize_needle(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn projection(child: &Child) -> String {
    format!(
        "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
        child.id,
        child.name,
        child.birth_date.format("%Y-%m-%d")
    )
    .to_lowercase()
}

pub fn matches(child: &Child, needle: &str) -> bool {
    needle.is_empty() || projection(child).contains(needle)
}

/// `needle` is normalized here, so callers may pass raw input.
pub fn filter_children(children: &[Arc<Child>], needle: &str) -> Vec<Arc<Child>> {
    let needle = normalize_needle(needle);
    children
        .iter()
        .filter(|child| matches(child, &needle))
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "tests/filter_tests.rs"]
mod tests;
