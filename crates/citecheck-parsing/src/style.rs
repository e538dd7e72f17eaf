use citecheck_core::{CitationStyle, StyleVerdict};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ParsingConfig;
use crate::section::{
    extract_body_with_config, find_header_with_config, find_references_section_with_config,
    SectionHeader,
};
use crate::text_processing::char_prefix;

/// Accumulated evidence for each style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleScores {
    pub apa: u32,
    pub mla: u32,
}

impl StyleScores {
    fn add(&mut self, style: CitationStyle, points: u32) {
        match style {
            CitationStyle::Apa => self.apa += points,
            CitationStyle::Mla => self.mla += points,
            CitationStyle::Unknown => {}
        }
    }

    /// Winner and its share of the total. Ties and empty scores are unknown.
    pub fn verdict(&self) -> StyleVerdict {
        let total = self.apa + self.mla;
        if total == 0 {
            return StyleVerdict::unknown();
        }
        let share = |score: u32| f64::from(score) / f64::from(total) * 100.0;
        match self.apa.cmp(&self.mla) {
            std::cmp::Ordering::Greater => StyleVerdict::new(CitationStyle::Apa, share(self.apa)),
            std::cmp::Ordering::Less => StyleVerdict::new(CitationStyle::Mla, share(self.mla)),
            std::cmp::Ordering::Equal => StyleVerdict::tie(),
        }
    }
}

/// Shape signature of a single reference line.
struct Signature {
    style: CitationStyle,
    points: u32,
    test: fn(&str) -> bool,
}

fn apa_initials_before_year(line: &str) -> bool {
    static RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[A-Z][a-z]+,\s+[A-Z]\.\s*(?:[A-Z]\.\s*)?\(").unwrap());
    RE.is_match(line)
}

fn apa_early_year(line: &str) -> bool {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^(]{10,60}\(\d{4}[a-z]?\)").unwrap());
    RE.is_match(line)
}

fn mla_full_name_then_quote(line: &str) -> bool {
    static RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"[A-Z][a-z]+,\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?\.\s+["\u{201c}]"#).unwrap()
    });
    RE.is_match(line)
}

fn mla_full_name_without_year(line: &str) -> bool {
    static NAME_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[A-Z][a-z]+,\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?\.").unwrap());
    static PAREN_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\d{4}\)").unwrap());
    NAME_RE.is_match(line) && !PAREN_YEAR_RE.is_match(char_prefix(line, 60))
}

fn mla_early_quoted_title(line: &str) -> bool {
    static RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"^[^"\u{201c}]{10,50}["\u{201c}][^"\u{201d}]{10,}["\u{201d}].{20,}\d{4}"#)
            .unwrap()
    });
    RE.is_match(line)
}

static SIGNATURES: &[Signature] = &[
    Signature {
        style: CitationStyle::Apa,
        points: 3,
        test: apa_initials_before_year,
    },
    Signature {
        style: CitationStyle::Apa,
        points: 2,
        test: apa_early_year,
    },
    Signature {
        style: CitationStyle::Mla,
        points: 3,
        test: mla_full_name_then_quote,
    },
    Signature {
        style: CitationStyle::Mla,
        points: 2,
        test: mla_full_name_without_year,
    },
    Signature {
        style: CitationStyle::Mla,
        points: 2,
        test: mla_early_quoted_title,
    },
];

/// Count APA `(Author, 2020)` and MLA `(Author 45)` shapes in body text.
fn count_body_citations(text: &str) -> (usize, usize) {
    static APA_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\([A-Z][a-z]+(?:\s+et al\.)?,\s*\d{4}\)").unwrap());
    static MLA_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\([A-Z][a-z]+\s+\d{1,4}(?:-\d{1,4})?\)").unwrap());
    (APA_RE.find_iter(text).count(), MLA_RE.find_iter(text).count())
}

/// Score the evidence for each style in a document.
///
/// Returns `None` when there is no reference section or it has fewer than
/// two lines.
pub(crate) fn score_style_with_config(
    lines: &[String],
    config: &ParsingConfig,
) -> Option<StyleScores> {
    let section = find_references_section_with_config(lines, config);
    if section.len() < 2 {
        return None;
    }

    let mut scores = StyleScores::default();

    match find_header_with_config(lines, config).map(|h| h.header) {
        Some(SectionHeader::References) => scores.apa += 2,
        Some(SectionHeader::WorksCited) => scores.mla += 3,
        _ => {}
    }

    for line in section.iter().take(config.style_sample_refs) {
        let line = line.trim();
        if line.chars().count() < config.style_min_line_len {
            continue;
        }
        for signature in SIGNATURES {
            if (signature.test)(line) {
                scores.add(signature.style, signature.points);
            }
        }
    }

    let body = extract_body_with_config(lines, config);
    let sample = body
        .iter()
        .take(config.style_sample_paragraphs)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    let (apa_cites, mla_cites) = count_body_citations(&sample);
    if apa_cites > mla_cites * 2 {
        scores.apa += 2;
    } else if mla_cites > apa_cites {
        scores.mla += 2;
    }

    Some(scores)
}

/// Detect the citation style of a document from its reference list and,
/// secondarily, its in-text citation shapes.
///
/// Confidence below [`citecheck_core::MANUAL_REVIEW_THRESHOLD`] means the
/// verdict should be confirmed by a person.
pub fn detect_style(lines: &[String]) -> StyleVerdict {
    detect_style_with_config(lines, &ParsingConfig::default())
}

/// Config-aware version of [`detect_style`].
pub(crate) fn detect_style_with_config(lines: &[String], config: &ParsingConfig) -> StyleVerdict {
    let verdict = score_style_with_config(lines, config)
        .map(|scores| {
            tracing::debug!(apa = scores.apa, mla = scores.mla, "style scores");
            scores.verdict()
        })
        .unwrap_or_else(StyleVerdict::unknown);
    tracing::debug!(style = %verdict.style, confidence = verdict.confidence, "detected citation style");
    verdict
}
