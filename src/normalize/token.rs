//! Comparison keys for part numbers.
//!
//! Spreadsheet cells and user queries spell the same part in many ways
//! (`6r1998002`, `6R1998002`, `6 R-1998/002`). Everything is compared on the
//! token produced here: ASCII letters and digits only, upper-cased.

use crate::constants::LEADING_MARKER;

/// Canonicalize a raw string into a comparison token.
///
/// Whitespace-only input yields the empty token, which callers must treat as
/// "nothing can match".
pub fn normalize_token(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Drop a single leading `v`/`V` marker. Only ever applied to queries.
pub fn strip_leading_marker(s: &str) -> &str {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.eq_ignore_ascii_case(&LEADING_MARKER) => chars.as_str(),
        _ => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_token("  6 r-1998/002 "), "6R1998002");
        assert_eq!(normalize_token("5e1"), "5E1");
    }

    #[test]
    fn test_normalize_empty_and_whitespace() {
        assert_eq!(normalize_token(""), "");
        assert_eq!(normalize_token("   \t"), "");
        assert_eq!(normalize_token("-/(),"), "");
    }

    #[test]
    fn test_normalize_drops_non_ascii_letters() {
        assert_eq!(normalize_token("ВАЗ-2108"), "2108");
    }

    #[test]
    fn test_strip_marker_removes_one_leading_v() {
        assert_eq!(strip_leading_marker("v6955425"), "6955425");
        assert_eq!(strip_leading_marker("V6955425"), "6955425");
        assert_eq!(strip_leading_marker("vv12"), "v12");
    }

    #[test]
    fn test_strip_marker_leaves_other_input() {
        assert_eq!(strip_leading_marker("6v6955425"), "6v6955425");
        assert_eq!(strip_leading_marker(""), "");
        assert_eq!(strip_leading_marker("Ж12"), "Ж12");
    }
}
