// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Splits a `---`-delimited YAML front-matter header from the markdown body
//! that follows it. Shared by flow files and agent profiles.

/// Split `text` into `(front_matter_yaml, body)`. Returns `None` if `text`
/// does not begin with a `---` delimiter line.
pub fn split(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix("---")?;
    let rest = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n"))?;
    let end = rest.find("\n---")?;
    let yaml = &rest[..end];
    let after = &rest[end + 4..];
    let body = after.strip_prefix('\n').or_else(|| after.strip_prefix("\r\n")).unwrap_or(after);
    Some((yaml, body))
}

#[cfg(test)]
#[path = "frontmatter_tests.rs"]
mod tests;
