//! Ordered first-match-wins rule lists.
//!
//! Classification cascades (reference type, MLA entry boundaries, MLA
//! entry completeness) are tables of named predicates rather than nested
//! conditionals, so each table reads top-down in priority order.

use citecheck_core::RefType;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ParsingConfig;
use crate::identifiers::extract_doi;

/// One row of a rule table: when `test` holds, the outcome is `outcome`.
pub struct Rule<O> {
    pub name: &'static str,
    pub test: fn(&str, &ParsingConfig) -> bool,
    pub outcome: O,
}

/// The first rule whose test holds.
pub fn first_match<'r, O>(
    rules: &'r [Rule<O>],
    text: &str,
    config: &ParsingConfig,
) -> Option<&'r Rule<O>> {
    rules.iter().find(|rule| (rule.test)(text, config))
}

macro_rules! regex_test {
    ($pattern:expr) => {{
        fn test(text: &str, _: &ParsingConfig) -> bool {
            static RE: Lazy<Regex> = Lazy::new(|| Regex::new($pattern).unwrap());
            RE.is_match(text)
        }
        test
    }};
}

macro_rules! contains_any {
    ($($needle:expr),+) => {{
        fn test(text: &str, _: &ParsingConfig) -> bool {
            let lower = text.to_lowercase();
            [$($needle),+].iter().any(|n| lower.contains(n))
        }
        test
    }};
}

// ── MLA completeness ──

/// Signals that the last accumulated line closes an MLA entry.
pub static MLA_COMPLETE_RULES: Lazy<Vec<Rule<()>>> = Lazy::new(|| {
    vec![
        Rule {
            name: "year",
            test: regex_test!(r"\b[12]\d{3}\s*\.?\s*$"),
            outcome: (),
        },
        Rule {
            name: "page range",
            test: regex_test!(r"pp?\.\s*\d+[\d\s–-]*\.?\s*$"),
            outcome: (),
        },
        Rule {
            name: "domain url",
            test: regex_test!(r"(?:com|org|edu|gov|net)/\S*\.?\s*$"),
            outcome: (),
        },
        Rule {
            name: "file extension",
            test: regex_test!(r"\.(?:htm|html|pdf|asp|aspx|php|jsp)\.?\s*$"),
            outcome: (),
        },
        Rule {
            name: "access date",
            test: regex_test!(r"Accessed\s+\d+\s+\w+\.?\s+\d{4}\.?\s*$"),
            outcome: (),
        },
        Rule {
            name: "volume",
            test: regex_test!(r"vol\.\s*\d+.*\d+\.?\s*$"),
            outcome: (),
        },
        Rule {
            name: "edition",
            test: regex_test!(r"\d+\s+ed\.?\s*$"),
            outcome: (),
        },
        Rule {
            name: "word and period",
            test: regex_test!(r"[a-zA-Z0-9/-]{3,}\.\s*$"),
            outcome: (),
        },
    ]
});

/// Whether an MLA entry ending in `last_line` looks finished.
pub fn mla_looks_complete(last_line: &str, config: &ParsingConfig) -> bool {
    first_match(&MLA_COMPLETE_RULES, last_line, config).is_some()
}

// ── MLA entry boundaries ──

/// What a line's shape says about starting a new MLA entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Always starts a new entry.
    NewEntry,
    /// Starts a new entry only if the open one looks complete.
    IfPreviousComplete,
    /// Continues the open entry.
    Continuation,
}

pub static MLA_BOUNDARY_RULES: Lazy<Vec<Rule<Boundary>>> = Lazy::new(|| {
    vec![
        Rule {
            name: "leading quote",
            test: regex_test!(r#"^["\u{201c}]"#),
            outcome: Boundary::NewEntry,
        },
        // Second half of "United States, Congress" wrapped onto a new line
        Rule {
            name: "states continuation",
            test: regex_test!(r"^States,"),
            outcome: Boundary::Continuation,
        },
        Rule {
            name: "author",
            test: regex_test!(r"^[A-Z][a-zA-Z'-]+,\s+[A-Z]"),
            outcome: Boundary::IfPreviousComplete,
        },
        Rule {
            name: "title phrase",
            test: regex_test!(r"^[A-Z][a-zA-Z]*\s+[A-Z]|^[A-Z][a-zA-Z]+\.\s+[A-Z]"),
            outcome: Boundary::IfPreviousComplete,
        },
    ]
});

/// Classify a trimmed line against [`MLA_BOUNDARY_RULES`].
pub fn mla_boundary(line: &str, config: &ParsingConfig) -> Boundary {
    first_match(&MLA_BOUNDARY_RULES, line, config).map_or(Boundary::Continuation, |r| r.outcome)
}

// ── Reference types ──

/// Publishers whose name closing an APA entry marks it as a book.
pub(crate) static PUBLISHERS: &[&str] = &[
    "Jossey-Bass",
    "Wiley",
    "Springer",
    "Elsevier",
    "Sage",
    "Routledge",
    "McGraw-Hill",
    "Pearson",
    "Cambridge",
    "Oxford",
    "Harvard",
    "MIT",
    "Yale",
    "Stanford",
    "Norton",
    "Penguin",
    "Random House",
    "Simon & Schuster",
    "HarperCollins",
    "Macmillan",
    "Houghton Mifflin",
    "Cengage",
    "Guilford",
    "Erlbaum",
    "Psychology Press",
    "Academic Press",
    "Shambhala",
    "New Harbinger",
    "Bantam",
    "Vintage",
    "Knopf",
];

fn apa_website(text: &str, _: &ParsingConfig) -> bool {
    let lower = text.to_lowercase();
    lower.contains("retrieved from") || (lower.contains("http") && !lower.contains("doi.org"))
}

fn has_doi(text: &str, _: &ParsingConfig) -> bool {
    extract_doi(text).is_some()
}

/// Entry ends with `. <Publisher>` for a configured publisher name.
fn ends_with_known_publisher(text: &str, config: &ParsingConfig) -> bool {
    let defaults: Vec<String> = PUBLISHERS.iter().map(|s| s.to_string()).collect();
    let lower = text.trim_end().trim_end_matches('.').trim_end().to_lowercase();
    config.publishers.resolve(&defaults).iter().any(|name| {
        lower
            .strip_suffix(&name.to_lowercase())
            .is_some_and(|before| before.trim_end().ends_with('.'))
    })
}

fn ends_with_bare_word(text: &str, _: &ParsingConfig) -> bool {
    static ISSUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\(\d+\)").unwrap());
    static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\s*[A-Z][A-Za-z-]+\.?\s*$").unwrap());
    !ISSUE_RE.is_match(text) && !text.to_lowercase().contains("http") && WORD_RE.is_match(text)
}

pub static APA_REF_TYPE_RULES: Lazy<Vec<Rule<RefType>>> = Lazy::new(|| {
    vec![
        Rule {
            name: "edited volume",
            test: regex_test!(r"\bIn\s+[A-Z].*\(Eds?\.\)"),
            outcome: RefType::Chapter,
        },
        Rule {
            name: "web address",
            test: apa_website,
            outcome: RefType::Website,
        },
        Rule {
            name: "volume or issue",
            test: regex_test!(r"\d+\(\d+\)|(?i:vol\.\s*\d+)"),
            outcome: RefType::Journal,
        },
        Rule {
            name: "doi",
            test: has_doi,
            outcome: RefType::Journal,
        },
        Rule {
            name: "publisher suffix",
            test: regex_test!(
                r"\.\s*[A-Z][A-Za-z\s&-]+\s*(?:Press|Publishers?|Publications?|Books?|Publishing|Inc\.?|LLC|Company|Co\.?)\.?\s*$"
            ),
            outcome: RefType::Book,
        },
        Rule {
            name: "known publisher",
            test: ends_with_known_publisher,
            outcome: RefType::Book,
        },
        Rule {
            name: "publisher location",
            test: regex_test!(
                r"[A-Z][a-z]+,\s*[A-Z]{2}:|:\s*[A-Z][a-z]+\s+(?:Press|Publishers?|Publications?|Books?|Publishing)"
            ),
            outcome: RefType::Book,
        },
        Rule {
            name: "edition",
            test: regex_test!(r"(?i)\(\d+(?:st|nd|rd|th)\s+ed\.\)"),
            outcome: RefType::Book,
        },
        Rule {
            name: "trailing publisher word",
            test: ends_with_bare_word,
            outcome: RefType::Book,
        },
    ]
});

pub static MLA_REF_TYPE_RULES: Lazy<Vec<Rule<RefType>>> = Lazy::new(|| {
    vec![
        Rule {
            name: "volume, number or pages",
            test: regex_test!(r"(?i)vol\.\s*\d+|,\s*no\.\s*\d+|pp\.\s*\d+"),
            outcome: RefType::Journal,
        },
        Rule {
            name: "doi link",
            test: contains_any!("doi.org"),
            outcome: RefType::Journal,
        },
        Rule {
            name: "web address",
            test: contains_any!("www.", "http"),
            outcome: RefType::Website,
        },
        Rule {
            name: "publisher word",
            test: contains_any!("press", "publisher", "publishing", "books"),
            outcome: RefType::Book,
        },
    ]
});

/// Classify an entry with a reference-type table; `other` when nothing matches.
pub fn classify(rules: &[Rule<RefType>], text: &str, config: &ParsingConfig) -> RefType {
    match first_match(rules, text, config) {
        Some(rule) => {
            tracing::trace!(rule = rule.name, ref_type = %rule.outcome, "classified reference");
            rule.outcome
        }
        None => RefType::Other,
    }
}
