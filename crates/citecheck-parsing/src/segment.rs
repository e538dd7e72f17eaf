use citecheck_core::ReferenceEntry;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ParsingConfig;
use crate::rules::{mla_boundary, mla_looks_complete, Boundary};
use crate::text_processing::{char_len, char_prefix, char_suffix};

/// Line accumulator shared by the style-specific segmenters.
///
/// Entries are numbered from 1 in the order they are emitted; entries of at
/// most `min_entry_len` chars are dropped without consuming a number.
struct Accumulator {
    entries: Vec<ReferenceEntry>,
    current: Vec<String>,
    min_entry_len: usize,
}

impl Accumulator {
    fn new(config: &ParsingConfig) -> Self {
        Self {
            entries: Vec::new(),
            current: Vec::new(),
            min_entry_len: config.min_entry_len,
        }
    }

    fn is_open(&self) -> bool {
        !self.current.is_empty()
    }

    fn last_line(&self) -> &str {
        self.current.last().map_or("", String::as_str)
    }

    fn push(&mut self, line: &str) {
        self.current.push(line.to_string());
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let text = self.current.join(" ");
        self.current.clear();
        if char_len(&text) > self.min_entry_len {
            self.entries.push(ReferenceEntry {
                ref_num: self.entries.len() + 1,
                text,
            });
        } else {
            tracing::trace!(entry = %text, "discarding short entry");
        }
    }

    /// Close the open entry with `before` and open a new one with `after`.
    fn split(&mut self, before: &str, after: &str) {
        self.push(before);
        self.flush();
        self.push(after);
    }

    fn finish(mut self) -> Vec<ReferenceEntry> {
        self.flush();
        self.entries
    }
}

/// Group APA reference-section lines into entries.
///
/// A line opens a new entry when it starts uppercase and shows a
/// parenthesized year early, or a bare year with early punctuation. Lines
/// holding the tail of one entry and the head of the next (a URL followed
/// by `Lastname, I.`) are split.
pub fn segment_apa(lines: &[String], config: &ParsingConfig) -> Vec<ReferenceEntry> {
    static SPLIT_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(/|\.(?:htm|html|pdf|asp|aspx|php|jsp))\s+([A-Z][a-zA-Z'-]+,\s+[A-Z]\.(?:\s+[A-Z]\.)?)",
        )
        .unwrap()
    });
    static PAREN_YEAR_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\((?:\d{4}[a-z]?|n\.d\.)\)").unwrap());
    static BARE_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());

    let mut acc = Accumulator::new(config);

    for raw in lines {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let split_at = SPLIT_RE.captures_iter(line).find_map(|caps| {
            let at = caps.get(2)?.start();
            let before = line[..at].trim();
            let after = line[at..].trim();
            let long_enough = char_len(before) > config.split_min_prefix_len;
            let dated = PAREN_YEAR_RE.is_match(char_prefix(after, config.apa_split_lookahead));
            (long_enough && dated).then_some(at)
        });
        if let Some(at) = split_at {
            tracing::trace!(at, "mid-line split");
            acc.split(line[..at].trim(), line[at..].trim());
            continue;
        }

        let starts_entry = acc.is_open()
            && line.starts_with(|c: char| c.is_ascii_uppercase())
            && {
                let head = char_prefix(line, config.apa_new_entry_window);
                PAREN_YEAR_RE.is_match(head)
                    || (BARE_YEAR_RE.is_match(head)
                        && char_prefix(line, config.apa_punct_window).contains([',', '.']))
            };

        if starts_entry {
            acc.flush();
        }
        acc.push(line);
    }

    let entries = acc.finish();
    tracing::debug!(entries = entries.len(), "segmented APA references");
    entries
}

/// Group MLA reference-section lines into entries.
///
/// Lines are expected untrimmed: a leading space or tab (hanging indent)
/// marks a continuation line. Page headers (`Lastname 7`) are dropped.
pub fn segment_mla(lines: &[String], config: &ParsingConfig) -> Vec<ReferenceEntry> {
    static PAGE_HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][a-z]+\s+\d+$").unwrap());
    static SPLIT_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(\.(?:com|org|edu|gov|net)/\S*\.?|\.(?:htm|html|pdf|asp|aspx|php|jsp)\s*\.?|\.)\s+([A-Z][a-zA-Z]{2,},\s+[A-Z][a-zA-Z]{2,})",
        )
        .unwrap()
    });
    static MIDDLE_INITIAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s[A-Z]\.\s*$").unwrap());

    let mut acc = Accumulator::new(config);

    for raw in lines {
        let indented = raw.starts_with([' ', '\t']);
        let line = raw.trim();
        if line.is_empty() || PAGE_HEADER_RE.is_match(line) {
            continue;
        }

        let split_at = SPLIT_RE.captures_iter(line).find_map(|caps| {
            let at = caps.get(2)?.start();
            // "Robert G. Smith, ..." is one name, not a new entry
            if MIDDLE_INITIAL_RE.is_match(char_suffix(&line[..at], 4)) {
                return None;
            }
            (char_len(line[..at].trim()) > config.split_min_prefix_len).then_some(at)
        });
        if let Some(at) = split_at {
            tracing::trace!(at, "mid-line split");
            acc.split(line[..at].trim(), line[at..].trim());
            continue;
        }

        if indented && acc.is_open() {
            acc.push(line);
            continue;
        }

        let starts_entry = acc.is_open()
            && match mla_boundary(line, config) {
                Boundary::NewEntry => true,
                Boundary::IfPreviousComplete => mla_looks_complete(acc.last_line(), config),
                Boundary::Continuation => false,
            };

        if starts_entry {
            acc.flush();
        }
        acc.push(line);
    }

    let entries = acc.finish();
    tracing::debug!(entries = entries.len(), "segmented MLA references");
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    fn texts(entries: &[ReferenceEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.text.as_str()).collect()
    }

    #[test]
    fn test_apa_wrapped_entries() {
        let config = ParsingConfig::default();
        let section = lines(&[
            "Smith, J. (2020). A study of many things that wraps",
            "onto a second line. Journal of Things, 4(2), 1-10.",
            "Jones, K. (2019). Another study. Journal of Stuff, 2(1), 5-9.",
            "World Health Organization. (n.d.). Depression fact sheet.",
        ]);
        let entries = segment_apa(&section, &config);
        assert_eq!(
            texts(&entries),
            vec![
                "Smith, J. (2020). A study of many things that wraps onto a second line. Journal of Things, 4(2), 1-10.",
                "Jones, K. (2019). Another study. Journal of Stuff, 2(1), 5-9.",
                "World Health Organization. (n.d.). Depression fact sheet.",
            ]
        );
        assert_eq!(entries.iter().map(|e| e.ref_num).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_apa_bare_year_start() {
        let config = ParsingConfig::default();
        let section = lines(&[
            "Smith, J. (2020). A study. Journal of Things, 4(2), 1-10.",
            "Brown, A. 2018. Bare year entry. Publisher.",
        ]);
        assert_eq!(segment_apa(&section, &config).len(), 2);
    }

    #[test]
    fn test_apa_mid_line_split_after_url() {
        let config = ParsingConfig::default();
        let section = lines(&[
            "Lee, H. (2021). Online stress. https://www.ncbi.nlm.nih.gov/pmc/articles/PMC7450866/ Park, S. (2020). Sleep. Journal, 1(1), 1-2.",
        ]);
        let entries = segment_apa(&section, &config);
        assert_eq!(
            texts(&entries),
            vec![
                "Lee, H. (2021). Online stress. https://www.ncbi.nlm.nih.gov/pmc/articles/PMC7450866/",
                "Park, S. (2020). Sleep. Journal, 1(1), 1-2.",
            ]
        );
    }

    #[test]
    fn test_apa_split_requires_long_prefix() {
        let config = ParsingConfig::default();
        let section = lines(&["See www.a.org/ Park, S. (2020). Sleep. Journal, 1(1), 1-2."]);
        assert_eq!(segment_apa(&section, &config).len(), 1);
    }

    #[test]
    fn test_short_entries_discarded_and_numbering_gapless() {
        let config = ParsingConfig::default();
        let section = lines(&[
            "Smith, J. (2020). A study. Journal of Things, 4(2), 1-10.",
            "Xu, L. (2001).",
            "Jones, K. (2019). Another study. Journal of Stuff, 2(1), 5-9.",
        ]);
        let entries = segment_apa(&section, &config);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].ref_num, 2);
        assert!(entries[1].text.starts_with("Jones"));
    }

    #[test]
    fn test_mla_hanging_indent_and_page_header() {
        let config = ParsingConfig::default();
        let section = lines(&[
            "Ball, Lucille. Love, Lucy. G. P. Putnam's Sons,",
            "    1996.",
            "Doe 7",
            "Arnaz, Desi. A Book. Random House, 1976.",
        ]);
        let entries = segment_mla(&section, &config);
        assert_eq!(
            texts(&entries),
            vec![
                "Ball, Lucille. Love, Lucy. G. P. Putnam's Sons, 1996.",
                "Arnaz, Desi. A Book. Random House, 1976.",
            ]
        );
    }

    #[test]
    fn test_mla_incomplete_previous_blocks_new_entry() {
        let config = ParsingConfig::default();
        let section = lines(&[
            "United States, Congress. Senate. Hearing on the matter of",
            "Television, Radio, and the Public Interest. Government Printing Office, 1954.",
            "\"Untitled.\" The Daily Show, Comedy Central, 2004.",
        ]);
        let entries = segment_mla(&section, &config);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].text.ends_with("Office, 1954."));
        assert!(entries[1].text.starts_with("\"Untitled"));
    }

    #[test]
    fn test_mla_mid_line_split_after_url() {
        let config = ParsingConfig::default();
        let section = lines(&[
            "Pontikes, Elizabeth. \"Essay.\" Law Review, scholarship.law.scu.edu/vol12/iss1/7/. McCarthy, Joseph. Speech. 1950.",
        ]);
        let entries = segment_mla(&section, &config);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].text, "McCarthy, Joseph. Speech. 1950.");
    }

    #[test]
    fn test_mla_no_split_on_middle_initial() {
        let config = ParsingConfig::default();
        let section = lines(&[
            "Editorial board of the journal, edited by Robert G. Hanson, Michael. Ideas. Norton, 1999.",
        ]);
        assert_eq!(segment_mla(&section, &config).len(), 1);
    }

    #[test]
    fn test_empty_section() {
        let config = ParsingConfig::default();
        assert!(segment_apa(&[], &config).is_empty());
        assert!(segment_mla(&lines(&["", "   "]), &config).is_empty());
    }
}
