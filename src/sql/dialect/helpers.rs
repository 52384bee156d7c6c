//! Shared helper functions for SQL dialect implementations.

/// Quote string with single quotes (standard SQL).
/// Used by: All dialects
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Build a `'%needle%'` pattern literal.
///
/// The needle is inserted as-is, so `%` and `_` keep their LIKE meaning.
pub fn like_contains_pattern(needle: &str) -> String {
    quote_string_single(&format!("%{}%", needle))
}
