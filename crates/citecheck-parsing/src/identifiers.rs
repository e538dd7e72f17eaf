use once_cell::sync::Lazy;
use regex::Regex;

const TRAILING_PUNCT: [char; 4] = ['.', ',', ';', ':'];

/// Strip trailing punctuation and unbalanced closing brackets from a DOI.
///
/// `10.1016/0021-9681(87)90171-8` keeps its balanced parentheses while
/// `10.1000/xyz).` loses the stray `)` and the period.
fn clean_doi(doi: &str) -> String {
    let mut doi = doi.trim_end_matches(TRAILING_PUNCT);

    loop {
        let unbalanced = [('(', ')'), ('[', ']'), ('{', '}')]
            .into_iter()
            .find(|&(open, close)| {
                doi.ends_with(close) && doi.matches(close).count() > doi.matches(open).count()
            });
        match unbalanced {
            Some((_, close)) => {
                doi = doi
                    .strip_suffix(close)
                    .unwrap_or(doi)
                    .trim_end_matches(TRAILING_PUNCT);
            }
            None => break,
        }
    }

    doi.to_string()
}

/// Extract the first DOI from a reference entry.
///
/// Link forms are reduced to the bare DOI. Handles:
/// - `10.1234/example`
/// - `doi:10.1234/example`
/// - `https://doi.org/10.1234/example`
/// - `http://dx.doi.org/10.1234/example`
pub fn extract_doi(text: &str) -> Option<String> {
    static DOI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"10\.\d{4,}/[^\s\]>},]+").unwrap());

    DOI_RE
        .find(text)
        .map(|m| clean_doi(m.as_str()))
        .filter(|d| !d.is_empty())
}

/// Byte offset of the first link or DOI in `text`.
///
/// Used to cut the container/source field short of trailing locators.
pub fn first_locator(text: &str) -> Option<usize> {
    static LOCATOR_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)https?://|www\.|\bdoi:|\b10\.\d{4,}/|\bretrieved from\b").unwrap()
    });
    LOCATOR_RE.find(text).map(|m| m.start())
}
