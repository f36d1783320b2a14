//! `@inContext(language: ...)` injection.
//!
//! This is a narrow text transform, not a GraphQL parser. The directive is
//! spliced after the head of the first `query` or `mutation` operation found
//! at brace depth 0, so fields, arguments and named fragments never match.
//! The anonymous `{ ... }` shorthand is rewritten to a `query` operation.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;

/// Operation keyword, optional name, optional variable definitions.
static OPERATION_HEAD: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\b(?:query|mutation)\b(?:\s+[_A-Za-z][_0-9A-Za-z]*)?(?:\s*\([^)]*\))?").ok()
});

/// Normalizes a language or locale code to a `LanguageCode` enum value.
///
/// `en` becomes `EN`, `pt-BR` becomes `PT_BR`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidLanguage`] unless the code is a 2-3 letter
/// language optionally followed by a 2-4 character region or script.
pub fn normalize_language(code: &str) -> Result<String, ConfigError> {
    let normalized = code.trim().replace('-', "_").to_ascii_uppercase();
    let mut parts = normalized.split('_');
    let language_ok = parts
        .next()
        .is_some_and(|p| (2..=3).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphabetic()));
    let region_ok = match parts.next() {
        None => true,
        Some(p) => (2..=4).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()),
    };

    if language_ok && region_ok && parts.next().is_none() {
        Ok(normalized)
    } else {
        Err(ConfigError::InvalidLanguage {
            code: code.to_string(),
        })
    }
}

/// Marks each byte offset that sits at brace depth 0, outside strings and
/// comments.
fn top_level_offsets(query: &str) -> Vec<bool> {
    let mut top = vec![false; query.len() + 1];
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut in_comment = false;
    let mut escaped = false;

    for (i, c) in query.char_indices() {
        if in_comment {
            if c == '\n' {
                in_comment = false;
            }
            continue;
        }
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '#' => in_comment = true,
            '"' => in_string = true,
            '{' => {
                top[i] = depth == 0;
                depth += 1;
            }
            '}' => depth = depth.saturating_sub(1),
            _ => top[i] = depth == 0,
        }
    }
    top[query.len()] = depth == 0;
    top
}

/// Adds `@inContext(language: <language>)` to the first operation.
///
/// `language` must already be normalized. Queries that already carry an
/// `@inContext` directive are returned unchanged, as are documents with no
/// recognizable operation.
pub fn inject_language(query: &str, language: &str) -> String {
    if query.contains("@inContext") {
        return query.to_string();
    }

    let directive = format!("@inContext(language: {language})");
    let top = top_level_offsets(query);

    if let Some(re) = OPERATION_HEAD.as_ref() {
        let head = re
            .find_iter(query)
            .find(|m| top[m.start()] && !query[..m.start()].ends_with('$'));
        if let Some(m) = head {
            return format!("{} {directive}{}", &query[..m.end()], &query[m.end()..]);
        }
    }

    let shorthand = query
        .char_indices()
        .find(|&(i, c)| top[i] && !c.is_whitespace() && c != ',');
    if let Some((pos, '{')) = shorthand {
        return format!("{}query {directive} {}", &query[..pos], &query[pos..]);
    }

    query.to_string()
}
