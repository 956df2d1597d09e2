//! Schema name validation.
//!
//! A thesaurus's table identifiers are qualified by its schema name, and
//! identifiers cannot be bind parameters. The name is therefore validated
//! against an allow-list pattern once, at repository construction, and
//! treated as a trusted identifier afterwards.

use geolex_core::{Error, Result};

/// Validate a PostgreSQL schema name for use as a thesaurus namespace.
///
/// A valid name is non-empty, at most 63 characters (the PostgreSQL
/// identifier limit), starts with a letter or underscore, contains only
/// ASCII alphanumerics and underscores, and is not a reserved word.
///
/// # Examples
///
/// ```
/// use geolex_db::validate_schema_name;
///
/// assert!(validate_schema_name("geo").is_ok());
/// assert!(validate_schema_name("inspire_themes").is_ok());
/// assert!(validate_schema_name("geo; drop table triple").is_err());
/// ```
pub fn validate_schema_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidInput(
            "Thesaurus schema name cannot be empty".to_string(),
        ));
    }

    if name.len() > 63 {
        return Err(Error::InvalidInput(format!(
            "Thesaurus schema name exceeds the 63 character identifier limit: {} characters",
            name.len()
        )));
    }

    let mut chars = name.chars();
    let first = chars.next().unwrap_or('_');
    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(Error::InvalidInput(format!(
            "Thesaurus schema name must start with a letter or underscore, found '{}'",
            first
        )));
    }

    if let Some(bad) = name.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
        return Err(Error::InvalidInput(format!(
            "Thesaurus schema name contains forbidden character '{}'",
            bad
        )));
    }

    const RESERVED: &[&str] = &[
        "pg_catalog",
        "pg_toast",
        "information_schema",
        "select",
        "insert",
        "update",
        "delete",
        "drop",
        "create",
        "alter",
        "grant",
        "revoke",
        "truncate",
    ];

    if RESERVED.contains(&name.to_lowercase().as_str()) {
        return Err(Error::InvalidInput(format!(
            "Thesaurus schema name '{}' is a reserved word",
            name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["geo", "inspire_themes", "_scratch", "gemet2026", "a"] {
            assert!(validate_schema_name(name).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_empty_name_rejected() {
        match validate_schema_name("") {
            Err(Error::InvalidInput(msg)) => assert!(msg.contains("empty")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_too_long_rejected() {
        let name = "s".repeat(64);
        assert!(validate_schema_name(&name).is_err());
        assert!(validate_schema_name(&"s".repeat(63)).is_ok());
    }

    #[test]
    fn test_leading_digit_rejected() {
        assert!(validate_schema_name("2026_themes").is_err());
    }

    #[test]
    fn test_forbidden_characters_rejected() {
        for name in [
            "geo-themes",
            "geo themes",
            "geo.themes",
            "geo;themes",
            "geo'themes",
            "geo\"themes",
            "geoλ",
        ] {
            assert!(validate_schema_name(name).is_err(), "{}", name);
        }
    }

    #[test]
    fn test_injection_attempts_rejected() {
        for name in [
            "geo'; DROP SCHEMA public CASCADE; --",
            "geo OR 1=1",
            "geo;--",
        ] {
            assert!(validate_schema_name(name).is_err(), "{}", name);
        }
    }

    #[test]
    fn test_reserved_words_rejected() {
        for name in ["pg_catalog", "SELECT", "Drop", "information_schema"] {
            assert!(validate_schema_name(name).is_err(), "{}", name);
        }
    }
}
