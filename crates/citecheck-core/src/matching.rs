use std::collections::{HashMap, HashSet};

use crate::authors::{normalize_author, normalize_year};
use crate::{AuthorYear, InTextCitation, MatchResult};

/// Normalized (authors, year) lookup key.
type MatchKey = (String, Option<String>);

/// Reference lookup keyed by normalized author sequence and year.
///
/// Keys keep insertion order so that year-less (MLA) resolution, which scans
/// the keys, is deterministic.
struct ReferenceIndex<'a> {
    entries: Vec<(MatchKey, Vec<&'a AuthorYear>)>,
    positions: HashMap<MatchKey, usize>,
}

impl<'a> ReferenceIndex<'a> {
    fn build(references: &'a [AuthorYear]) -> Self {
        let mut index = Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        };
        for reference in references {
            let authors = normalize_author(&reference.authors);
            let year = normalize_year(reference.year.as_deref());
            let first = authors.split_whitespace().next().unwrap_or("").to_string();

            // Also index the first author alone so "et al." citations resolve
            if !first.is_empty() && first != authors {
                index.insert((first, year.clone()), reference);
            }
            index.insert((authors, year), reference);
        }
        index
    }

    fn insert(&mut self, key: MatchKey, reference: &'a AuthorYear) {
        match self.positions.get(&key) {
            Some(&pos) => self.entries[pos].1.push(reference),
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, vec![reference]));
            }
        }
    }

    fn get(&self, authors: &str, year: &Option<String>) -> Option<&[&'a AuthorYear]> {
        let key = (authors.to_string(), year.clone());
        self.positions
            .get(&key)
            .map(|&pos| self.entries[pos].1.as_slice())
    }

    /// Resolve a citation to the references it points at.
    fn resolve(&self, citation: &InTextCitation) -> Option<&[&'a AuthorYear]> {
        let authors = normalize_author(&citation.author);
        if authors.is_empty() {
            return None;
        }
        let first = authors.split_whitespace().next().unwrap_or("");

        match normalize_year(citation.year.as_deref()) {
            Some(year) => {
                let year = Some(year);
                self.get(&authors, &year).or_else(|| self.get(first, &year))
            }
            None => self
                .entries
                .iter()
                .find(|((key_authors, _), _)| {
                    key_authors == &authors
                        || key_authors.split_whitespace().next() == Some(authors.as_str())
                })
                .map(|(_, refs)| refs.as_slice()),
        }
    }
}

/// Cross-check in-text citations against the reference list.
///
/// Both sides go through [`normalize_author`]. A citation with a year must
/// match a reference on (all authors, year), falling back to (first author,
/// year) for "et al." forms. A citation without a year (MLA) matches the
/// first reference whose author sequence, or whose first author, equals it.
///
/// Both result lists are deduplicated and keep first-occurrence order. The
/// inputs are not modified.
pub fn match_citations(citations: &[InTextCitation], references: &[AuthorYear]) -> MatchResult {
    let index = ReferenceIndex::build(references);

    let mut cited: HashSet<&AuthorYear> = HashSet::new();
    let mut missing = Vec::new();
    let mut seen_missing = HashSet::new();

    for citation in citations {
        match index.resolve(citation) {
            Some(refs) => cited.extend(refs.iter().copied()),
            None => {
                tracing::debug!(author = %citation.author, year = ?citation.year, "unmatched citation");
                if seen_missing.insert(citation) {
                    missing.push(citation.clone());
                }
            }
        }
    }

    let mut seen_uncited = HashSet::new();
    let uncited = references
        .iter()
        .filter(|r| !cited.contains(r))
        .filter(|r| seen_uncited.insert(*r))
        .cloned()
        .collect::<Vec<_>>();

    tracing::debug!(
        citations = citations.len(),
        references = references.len(),
        uncited = uncited.len(),
        missing = missing.len(),
        "citation matching complete"
    );

    MatchResult {
        uncited_refs: uncited,
        missing_refs: missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cite(author: &str, year: Option<&str>) -> InTextCitation {
        InTextCitation::new(author, year)
    }

    fn reference(authors: &str, year: Option<&str>) -> AuthorYear {
        AuthorYear::new(authors, year)
    }

    #[test]
    fn test_all_authors_and_et_al_both_match() {
        let refs = vec![reference("Smith, J., & Jones, K.", Some("2020"))];
        for c in [cite("Smith & Jones", Some("2020")), cite("Smith et al.", Some("2020"))] {
            let result = match_citations(&[c], &refs);
            assert!(!result.has_issues(), "{result:?}");
        }
    }

    #[test]
    fn test_year_mismatch_is_missing() {
        let refs = vec![reference("Smith, J.", Some("2020"))];
        let result = match_citations(&[cite("Smith", Some("2019"))], &refs);
        assert_eq!(result.missing_refs, vec![cite("Smith", Some("2019"))]);
        assert_eq!(result.uncited_refs, refs);
    }

    #[test]
    fn test_year_suffix_is_ignored() {
        let refs = vec![reference("Doe, A.", Some("2015a"))];
        let result = match_citations(&[cite("Doe", Some("2015"))], &refs);
        assert!(!result.has_issues());
    }

    #[test]
    fn test_mla_citation_without_year_matches_any_year() {
        let refs = vec![reference("Berk, Laura", Some("2013"))];
        let result = match_citations(&[cite("Berk", None)], &refs);
        assert!(!result.has_issues());

        let refs = vec![reference("Berk, Laura", None)];
        let result = match_citations(&[cite("Berk", None)], &refs);
        assert!(!result.has_issues());
    }

    #[test]
    fn test_mla_first_author_of_group() {
        let refs = vec![reference("Pontikes, Elizabeth, et al.", Some("2017"))];
        let result = match_citations(&[cite("Pontikes et al.", None)], &refs);
        assert!(!result.has_issues());
    }

    #[test]
    fn test_organizational_author() {
        let refs = vec![reference("National Institutes of Health", Some("2018"))];
        let result = match_citations(&[cite("National Institutes of Health", Some("2018"))], &refs);
        assert!(!result.has_issues());
    }

    #[test]
    fn test_missing_and_uncited_are_deduplicated_in_order() {
        let refs = vec![
            reference("Adams, B.", Some("2001")),
            reference("Young, C.", Some("2010")),
            reference("Adams, B.", Some("2001")),
        ];
        let citations = vec![
            cite("Doe", Some("2019")),
            cite("Roe", Some("2018")),
            cite("Doe", Some("2019")),
        ];
        let result = match_citations(&citations, &refs);
        assert_eq!(
            result.missing_refs,
            vec![cite("Doe", Some("2019")), cite("Roe", Some("2018"))]
        );
        assert_eq!(
            result.uncited_refs,
            vec![reference("Adams, B.", Some("2001")), reference("Young, C.", Some("2010"))]
        );
    }

    #[test]
    fn test_citation_marks_every_reference_under_key() {
        let refs = vec![
            reference("Lee, H.", Some("2020")),
            reference("Lee, H., & Park, S.", Some("2020")),
        ];
        let result = match_citations(&[cite("Lee", Some("2020"))], &refs);
        assert!(result.uncited_refs.is_empty());
    }

    #[test]
    fn test_short_surname_matches() {
        let refs = vec![reference("An, J", Some("2020")), reference("To, H.", Some("2019"))];
        let citations = vec![cite("An", Some("2020")), cite("To", Some("2019"))];
        let result = match_citations(&citations, &refs);
        assert!(!result.has_issues(), "{result:?}");
    }

    #[test]
    fn test_short_surname_as_coauthor() {
        let refs = vec![reference("Smith, J., & An, K.", Some("2021"))];
        for c in [cite("Smith & An", Some("2021")), cite("Smith et al.", Some("2021"))] {
            let result = match_citations(&[c], &refs);
            assert!(!result.has_issues(), "{result:?}");
        }
    }

    #[test]
    fn test_blank_citation_is_missing() {
        let refs = vec![reference("Lee, H.", Some("2020"))];
        let result = match_citations(&[cite("et al.", Some("2020"))], &refs);
        assert_eq!(result.missing_refs.len(), 1);
    }

    #[test]
    fn test_empty_inputs() {
        let result = match_citations(&[], &[]);
        assert!(!result.has_issues());
    }
}
