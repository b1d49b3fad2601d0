//! Query text clean-up applied before embedding.

/// Abbreviation expansions, applied in this order.
///
/// Replacement is plain substring replacement: a key inside a longer word is
/// rewritten too ("html" -> "htmachine learning").
pub const SYNONYMS: &[(&str, &str)] = &[
    ("ml", "machine learning"),
    ("aws", "amazon web services"),
    ("docker", "docker"),
];

/// Lowercases and collapses every whitespace run to one space, trimming both ends.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn expand_synonyms(text: &str) -> String {
    SYNONYMS
        .iter()
        .fold(text.to_string(), |acc, (key, value)| acc.replace(key, value))
}

/// `normalize` followed by `expand_synonyms`.
pub fn preprocess_query(query: &str) -> String {
    expand_synonyms(&normalize(query))
}
