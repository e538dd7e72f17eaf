use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

use crate::ParsedReference;

/// Lowercase connector words dropped from organizational names.
///
/// "an", "in", "on", "to" and "al" are also surnames (An, J.) and are kept
/// in every position.
static DROPPED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["of", "the", "for", "and", "at", "a", "from", "et"]
        .into_iter()
        .collect()
});

/// Reduce an author string to an order-preserving, space-joined sequence of
/// lower-case last names.
///
/// Used on both sides of citation matching, so reference-list authors and
/// in-text citation authors land in the same key space:
/// - `"Dommeyer, C. J., Baum, P., & Hanna, R. W"` → `"dommeyer baum hanna"`
/// - `"Smith & Jones"` → `"smith jones"` (not sorted: the first author matters for et al.)
/// - `"Smith et al."` / `"Smith and colleagues"` → `"smith"`
/// - `"National Institutes of Health"` → `"national institutes health"`
///
/// The function is idempotent.
pub fn normalize_author(author_text: &str) -> String {
    static PAREN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());
    static COLLEAGUES_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)\s+(?:and|&)\s+(?:colleagues|co-workers)").unwrap());
    static ET_AL_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)\s+et\.?\s+al\b\.?").unwrap());
    static SEPARATOR_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)\s*&\s*|\s+and\s+").unwrap());

    // Fold diacritics so "Gómez" and "Gomez" compare equal
    let folded: String = author_text.nfkd().filter(|c| c.is_ascii()).collect();

    let text = PAREN_RE.replace_all(&folded, "");
    let text = COLLEAGUES_RE.replace_all(&text, "");
    let text = ET_AL_RE.replace_all(&text, "");
    let text = SEPARATOR_RE.replace_all(&text, ",");

    let mut last_names = Vec::new();
    for segment in text.split(',') {
        for token in segment.split_whitespace() {
            if is_initial(token) {
                continue;
            }
            let word: String = token
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect::<String>()
                .to_lowercase();
            if word.len() < 2 || !word.chars().any(|c| c.is_ascii_alphanumeric()) {
                continue;
            }
            if DROPPED_WORDS.contains(word.as_str()) {
                continue;
            }
            last_names.push(word);
        }
    }

    last_names.join(" ")
}

/// `J`, `J.`, `J.K.` and similar initials tokens.
fn is_initial(token: &str) -> bool {
    static INITIALS_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(?:[A-Z]\.?|(?:[A-Z]\.-?)+[A-Z]?\.?)$").unwrap());
    INITIALS_RE.is_match(token)
}

/// Strip a disambiguation letter from a year (`2015a` → `2015`).
///
/// Returns `None` for absent or blank years, which is how MLA citations are
/// represented.
pub fn normalize_year(year: Option<&str>) -> Option<String> {
    let year = year?.trim();
    if year.is_empty() {
        return None;
    }
    let stripped = year
        .strip_suffix(|c: char| c.is_ascii_lowercase())
        .unwrap_or(year);
    Some(stripped.to_string())
}

/// First author's last name from each parsed reference, in reference-list
/// order without duplicates.
///
/// In MLA the last name is the first word before the first comma:
/// - `"Ball, Lucille"` → `"Ball"`
/// - `"Pontikes, Elizabeth, et al."` → `"Pontikes"`
/// - `"Smith and Jones"` → `"Smith"`
pub fn reference_last_names(references: &[ParsedReference]) -> Vec<String> {
    static AND_TAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+and\s+.*").unwrap());

    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for reference in references {
        let Some(authors) = reference.authors.as_deref() else {
            continue;
        };
        let first_author = authors.split(',').next().unwrap_or("").trim();
        let first_author = AND_TAIL_RE.replace(first_author, "");
        if let Some(word) = first_author.split_whitespace().next() {
            if seen.insert(word.to_string()) {
                names.push(word.to_string());
            }
        }
    }
    names
}
