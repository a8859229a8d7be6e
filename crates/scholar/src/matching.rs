//! Loose title comparison used to sanity-check search results.
//!
//! Queries are often partial or reformatted titles, so the check ignores everything except ASCII
//! letters and asks whether the query is contained in the returned title.
//!
//! ```
//! use scholar::matching::is_fuzzy_match;
//!
//! assert!(is_fuzzy_match("Deep Learning", "A Survey of Deep Learning Methods"));
//! assert!(!is_fuzzy_match("Quantum", "Deep Learning Methods"));
//! ```

/// Keeps only ASCII letters and lowercases them.
pub fn normalize(text: &str) -> String {
  text.chars().filter(char::is_ascii_alphabetic).map(|c| c.to_ascii_lowercase()).collect()
}

/// Returns whether the normalized `needle` is a contiguous substring of the normalized
/// `haystack`.
///
/// An empty (after normalization) needle matches everything.
pub fn is_fuzzy_match(needle: &str, haystack: &str) -> bool {
  normalize(haystack).contains(&normalize(needle))
}
