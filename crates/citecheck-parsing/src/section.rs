use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ParsingConfig;
use crate::text_processing::clean_footer;

/// Wording of the line that opens the reference list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionHeader {
    /// `References` or `Reference` (APA wording).
    References,
    /// `Works Cited` (MLA wording).
    WorksCited,
    /// Matched only by a configured header pattern.
    Custom,
}

/// Position and wording of the reference-section header, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMatch {
    pub index: usize,
    pub header: SectionHeader,
}

fn builtin_header(lowered: &str) -> Option<SectionHeader> {
    static REFERENCES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^references?\s*$").unwrap());
    static WORKS_CITED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^works\s+cited\s*$").unwrap());

    if REFERENCES_RE.is_match(lowered) {
        Some(SectionHeader::References)
    } else if WORKS_CITED_RE.is_match(lowered) {
        Some(SectionHeader::WorksCited)
    } else {
        None
    }
}

/// Find the first line that is, in its entirety, a reference-section header.
pub fn find_header(lines: &[String]) -> Option<HeaderMatch> {
    find_header_with_config(lines, &ParsingConfig::default())
}

/// Config-aware version of [`find_header`].
pub(crate) fn find_header_with_config(
    lines: &[String],
    config: &ParsingConfig,
) -> Option<HeaderMatch> {
    lines.iter().enumerate().find_map(|(index, line)| {
        let lowered = line.trim().to_lowercase();
        let header = match &config.section_header_re {
            Some(re) if re.is_match(&lowered) => {
                Some(builtin_header(&lowered).unwrap_or(SectionHeader::Custom))
            }
            Some(_) => None,
            None => builtin_header(&lowered),
        }?;
        Some(HeaderMatch { index, header })
    })
}

/// Locate the reference section: the footer-cleaned, non-empty lines after
/// the header up to the first appendix, figure or table heading.
///
/// Returns an empty list when the document has no header. Lines keep their
/// leading indentation.
pub fn find_references_section(lines: &[String]) -> Vec<String> {
    find_references_section_with_config(lines, &ParsingConfig::default())
}

/// Config-aware version of [`find_references_section`].
pub(crate) fn find_references_section_with_config(
    lines: &[String],
    config: &ParsingConfig,
) -> Vec<String> {
    static END_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^appendix|^appendices|^figure\s*\d|^table\s*\d").unwrap());

    let Some(header) = find_header_with_config(lines, config) else {
        tracing::debug!("no reference section header");
        return Vec::new();
    };

    let end_re = config.section_end_re.as_ref().unwrap_or(&*END_RE);
    let start = header.index + 1;
    let end = lines[start..]
        .iter()
        .position(|line| end_re.is_match(&line.trim().to_lowercase()))
        .map_or(lines.len(), |offset| start + offset);

    let section: Vec<String> = lines[start..end]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| clean_footer(line))
        .filter(|line| !line.trim().is_empty())
        .collect();

    tracing::debug!(
        header_line = header.index,
        header = ?header.header,
        lines = section.len(),
        "located reference section"
    );
    section
}

/// The narrative body: non-empty lines before the reference header.
///
/// A title page is skipped when an `Abstract` or `Introduction` line appears
/// early on. Without a header, every line is body.
pub fn extract_body(lines: &[String]) -> Vec<String> {
    extract_body_with_config(lines, &ParsingConfig::default())
}

/// Config-aware version of [`extract_body`].
pub(crate) fn extract_body_with_config(lines: &[String], config: &ParsingConfig) -> Vec<String> {
    let Some(header) = find_header_with_config(lines, config) else {
        return lines.to_vec();
    };

    let window = config.title_page_window.min(header.index);
    let start = lines[..window]
        .iter()
        .position(|line| matches!(line.trim().to_lowercase().as_str(), "abstract" | "introduction"))
        .unwrap_or(0);

    lines[start..header.index]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .cloned()
        .collect()
}
