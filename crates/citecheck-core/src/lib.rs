use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod authors;
pub mod config_file;
pub mod matching;

// Re-export for convenience
pub use authors::{normalize_author, normalize_year, reference_last_names};
pub use matching::match_citations;

/// Style confidence (percent) below which a paper's detected style should be
/// confirmed by a human before its match results are trusted.
pub const MANUAL_REVIEW_THRESHOLD: f64 = 70.0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown citation style: {0} (expected APA or MLA)")]
    UnknownStyle(String),
}

/// Bibliographic convention a paper's reference list is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CitationStyle {
    Apa,
    Mla,
    #[default]
    Unknown,
}

impl CitationStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apa => "APA",
            Self::Mla => "MLA",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CitationStyle {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "apa" => Ok(Self::Apa),
            "mla" => Ok(Self::Mla),
            "unknown" => Ok(Self::Unknown),
            other => Err(CoreError::UnknownStyle(other.to_string())),
        }
    }
}

/// Output of style detection: the winning style and its share of the
/// evidence, as a percentage in `0.0..=100.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleVerdict {
    pub style: CitationStyle,
    pub confidence: f64,
}

impl StyleVerdict {
    pub fn new(style: CitationStyle, confidence: f64) -> Self {
        Self {
            style,
            confidence: confidence.clamp(0.0, 100.0),
        }
    }

    /// No usable evidence at all.
    pub fn unknown() -> Self {
        Self::new(CitationStyle::Unknown, 0.0)
    }

    /// Evidence split evenly between the styles.
    pub fn tie() -> Self {
        Self::new(CitationStyle::Unknown, 50.0)
    }

    pub fn needs_manual_review(&self) -> bool {
        self.style == CitationStyle::Unknown || self.confidence < MANUAL_REVIEW_THRESHOLD
    }
}

impl Default for StyleVerdict {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Coarse kind of cited work, used to route a reference to the right
/// verification source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefType {
    Journal,
    Book,
    Chapter,
    Website,
    #[default]
    Other,
}

impl RefType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Journal => "journal",
            Self::Book => "book",
            Self::Chapter => "chapter",
            Self::Website => "website",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical entry of the reference list, before field extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// 1-based position in the reference list.
    pub ref_num: usize,
    pub text: String,
}

/// A reference entry with its extracted fields. Every derived field is
/// optional; `raw` is always the entry text verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedReference {
    pub ref_num: usize,
    pub raw: String,
    pub authors: Option<String>,
    pub year: Option<String>,
    pub title: Option<String>,
    pub source: Option<String>,
    /// DOI, when one is present in the entry.
    pub identifier: Option<String>,
    pub ref_type: RefType,
}

impl ParsedReference {
    /// A record carrying only the entry's identity and raw text.
    pub fn unparsed(entry: &ReferenceEntry) -> Self {
        Self {
            ref_num: entry.ref_num,
            raw: entry.text.clone(),
            ..Default::default()
        }
    }

    /// The (authors, year) pair used for citation matching, if the entry has
    /// authors at all.
    pub fn author_year(&self) -> Option<AuthorYear> {
        let authors = self.authors.as_deref()?.trim();
        if authors.is_empty() {
            return None;
        }
        Some(AuthorYear {
            authors: authors.to_string(),
            year: self.year.clone().filter(|y| !y.trim().is_empty()),
        })
    }
}

/// An (author, year) marker found in the body text. MLA citations carry no
/// year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InTextCitation {
    pub author: String,
    pub year: Option<String>,
}

impl InTextCitation {
    pub fn new(author: impl Into<String>, year: Option<&str>) -> Self {
        Self {
            author: author.into(),
            year: year.map(str::to_string),
        }
    }
}

impl fmt::Display for InTextCitation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.year {
            Some(year) => write!(f, "{}, {}", self.author, year),
            None => f.write_str(&self.author),
        }
    }
}

/// The reference-list side of matching: the author string and year of one
/// parsed reference, as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorYear {
    pub authors: String,
    pub year: Option<String>,
}

impl AuthorYear {
    pub fn new(authors: impl Into<String>, year: Option<&str>) -> Self {
        Self {
            authors: authors.into(),
            year: year.map(str::to_string),
        }
    }
}

impl fmt::Display for AuthorYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.year {
            Some(year) => write!(f, "{} ({})", self.authors, year),
            None => write!(f, "{} (n.d.)", self.authors),
        }
    }
}

/// Symmetric difference between the reference list and the in-text citations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchResult {
    /// References no in-text citation resolves to.
    pub uncited_refs: Vec<AuthorYear>,
    /// In-text citations with no matching reference.
    pub missing_refs: Vec<InTextCitation>,
}

impl MatchResult {
    pub fn has_issues(&self) -> bool {
        !self.uncited_refs.is_empty() || !self.missing_refs.is_empty()
    }
}

/// Everything the analysis core produces for one paper.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaperAnalysis {
    /// Style detector verdict.
    pub style: StyleVerdict,
    /// Strategy actually used for segmentation, parsing and extraction.
    pub applied_style: CitationStyle,
    pub reference_section_found: bool,
    pub references: Vec<ParsedReference>,
    pub citations: Vec<InTextCitation>,
    pub matching: MatchResult,
    /// Number of in-text citations found.
    pub total_citations: usize,
    /// Number of references with an author (the ones that take part in matching).
    pub total_references: usize,
}

impl PaperAnalysis {
    pub fn has_issues(&self) -> bool {
        self.matching.has_issues()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_from_str() {
        assert_eq!("apa".parse::<CitationStyle>().unwrap(), CitationStyle::Apa);
        assert_eq!(" MLA ".parse::<CitationStyle>().unwrap(), CitationStyle::Mla);
        assert!("chicago".parse::<CitationStyle>().is_err());
    }

    #[test]
    fn test_verdict_manual_review() {
        assert!(StyleVerdict::unknown().needs_manual_review());
        assert!(StyleVerdict::tie().needs_manual_review());
        assert!(StyleVerdict::new(CitationStyle::Apa, 69.9).needs_manual_review());
        assert!(!StyleVerdict::new(CitationStyle::Mla, 70.0).needs_manual_review());
    }

    #[test]
    fn test_verdict_clamps_confidence() {
        assert_eq!(StyleVerdict::new(CitationStyle::Apa, 140.0).confidence, 100.0);
    }

    #[test]
    fn test_author_year_requires_authors() {
        let mut r = ParsedReference::unparsed(&ReferenceEntry {
            ref_num: 1,
            text: "\"Untitled.\" Somewhere, 2001.".into(),
        });
        assert!(r.author_year().is_none());
        r.authors = Some("  ".into());
        assert!(r.author_year().is_none());
        r.authors = Some("Berk, Laura".into());
        r.year = Some(String::new());
        assert_eq!(r.author_year(), Some(AuthorYear::new("Berk, Laura", None)));
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&RefType::Website).unwrap();
        assert_eq!(json, "\"website\"");
        let json = serde_json::to_string(&CitationStyle::Mla).unwrap();
        assert_eq!(json, "\"MLA\"");
    }
}
