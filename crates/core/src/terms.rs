//! Furniture query-term normalization.
//!
//! The vector index stores canonical catalog vocabulary ("tv bench",
//! "sofa"), while segment labels arrive in whatever phrasing the detection
//! model prefers. [`normalize_terms`] folds common variants onto the
//! canonical term and drops duplicates before any embedding work happens.

/// Synonym table mapping detected phrasing to catalog vocabulary.
///
/// Lookup happens after lowercasing and trimming, so entries are stored in
/// canonical lowercase form.
const SYNONYMS: &[(&str, &str)] = &[
    ("television unit", "tv bench"),
    ("tv unit", "tv bench"),
    ("tv stand", "tv bench"),
    ("tv table", "tv bench"),
    ("couch", "sofa"),
    ("sofas", "sofa"),
    ("tables", "table"),
    ("chairs", "chair"),
    ("arm chair", "armchair"),
    ("end table", "side table"),
    ("ottomans", "ottoman"),
];

/// Normalize raw furniture terms: lowercase, trim, map through the synonym
/// table, and deduplicate while preserving first-seen order.
pub fn normalize_terms<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for item in raw {
        let term = item.as_ref().trim().to_lowercase();
        if term.is_empty() {
            continue;
        }
        let mapped = SYNONYMS
            .iter()
            .find(|(from, _)| *from == term)
            .map(|(_, to)| (*to).to_string())
            .unwrap_or(term);
        if !normalized.contains(&mapped) {
            normalized.push(mapped);
        }
    }
    normalized
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
