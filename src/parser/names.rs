use crate::error::{Error, Result};

/// Return the identifier without surrounding double quotes.
pub fn unquote_identifier(ident: &str) -> &str {
    ident
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(ident)
}

/// Normalize an identifier for case-insensitive matching.
///
/// Trims whitespace, removes surrounding double quotes on a single identifier,
/// and lowercases the result.
pub fn normalize_identifier(ident: &str) -> String {
    unquote_identifier(ident.trim()).to_ascii_lowercase()
}

/// Split a name on dots that are not inside double quotes.
fn split_unquoted_dots(name: &str) -> Vec<&str> {
    let mut in_quotes = false;
    let mut start = 0usize;
    let mut parts: Vec<&str> = Vec::new();

    for (idx, ch) in name.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '.' if !in_quotes => {
                parts.push(name[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(name[start..].trim());
    parts
}

/// Split a potentially schema-qualified name into `(schema, relation)`.
///
/// Handles dots inside quoted identifiers, e.g. `"my.schema"."table.name"`.
pub fn split_schema_and_relation(name: &str) -> Option<(String, String)> {
    let parts = split_unquoted_dots(name);
    if parts.len() < 2 {
        return None;
    }

    let schema = unquote_identifier(parts[parts.len() - 2]).to_string();
    let relation = unquote_identifier(parts[parts.len() - 1]).to_string();
    Some((schema, relation))
}

/// Build lookup candidates for schema-aware table resolution.
///
/// Ordered from most specific to least specific, normalized for matching.
pub fn table_lookup_candidates(name: &str) -> Vec<(Option<String>, String)> {
    let mut candidates = Vec::new();

    if let Some((schema, relation)) = split_schema_and_relation(name) {
        candidates.push((
            Some(normalize_identifier(&schema)),
            normalize_identifier(&relation),
        ));
        candidates.push((None, normalize_identifier(&relation)));
    } else {
        candidates.push((None, normalize_identifier(name)));
    }

    let mut deduped = Vec::new();
    for candidate in candidates {
        if !deduped.contains(&candidate) {
            deduped.push(candidate);
        }
    }
    deduped
}

fn is_plain_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn is_quoted_identifier(part: &str) -> bool {
    part.len() >= 3
        && part.starts_with('"')
        && part.ends_with('"')
        && !part[1..part.len() - 1].contains('"')
}

/// True when `name` is a plain or dot-qualified SQL identifier.
///
/// Each component is either `[A-Za-z_][A-Za-z0-9_]*` or a double-quoted name
/// without embedded quotes.
pub fn is_valid_identifier(name: &str) -> bool {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed != name {
        return false;
    }
    split_unquoted_dots(trimmed)
        .into_iter()
        .all(|part| is_plain_identifier(part) || is_quoted_identifier(part))
}

/// Reject names that could smuggle SQL through an identifier position.
pub fn validate_identifier(name: &str) -> Result<&str> {
    if is_valid_identifier(name) {
        Ok(name)
    } else {
        Err(Error::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_schema_and_relation_handles_quoted_dots() {
        assert_eq!(
            split_schema_and_relation(r#""my.schema"."table.name""#),
            Some(("my.schema".to_string(), "table.name".to_string()))
        );
        assert_eq!(split_schema_and_relation("orders"), None);
    }

    #[test]
    fn table_lookup_candidates_prioritize_schema_then_relation() {
        let candidates = table_lookup_candidates("Sales.Orders");
        assert_eq!(
            candidates,
            vec![
                (Some("sales".to_string()), "orders".to_string()),
                (None, "orders".to_string()),
            ]
        );
    }

    #[test]
    fn valid_identifiers() {
        for name in [
            "orders",
            "_tmp",
            "user_id2",
            "public.orders",
            r#""Order Items""#,
            r#"sales."Order Items""#,
        ] {
            assert!(is_valid_identifier(name), "{name} should be accepted");
        }
    }

    #[test]
    fn invalid_identifiers() {
        for name in [
            "",
            " orders",
            "2fast",
            "user id",
            "name; DROP TABLE users",
            "a..b",
            "orders.",
            r#""""#,
            r#""a"b""#,
            "status'--",
        ] {
            assert!(!is_valid_identifier(name), "{name} should be rejected");
        }
        assert!(matches!(
            validate_identifier("x OR 1=1"),
            Err(Error::InvalidIdentifier(_))
        ));
    }
}
