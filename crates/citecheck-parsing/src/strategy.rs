use citecheck_core::{CitationStyle, InTextCitation, ParsedReference, ReferenceEntry};

use crate::citations::{extract_apa_citations, extract_mla_citations};
use crate::config::ParsingConfig;
use crate::reference::{parse_apa, parse_mla};
use crate::segment::{segment_apa, segment_mla};

/// Style-specific half of the analysis pipeline.
///
/// Implementors provide segmentation, reference parsing and in-text citation
/// extraction for one citation style; section location, style detection and
/// matching live in [`crate::extractor::PaperAnalyzer`].
pub trait CitationStrategy: Send + Sync {
    fn style(&self) -> CitationStyle;

    /// Group reference-section lines into entries.
    fn segment(&self, lines: &[String], config: &ParsingConfig) -> Vec<ReferenceEntry>;

    /// Extract fields from one entry. Never fails; missing fields stay `None`.
    fn parse(&self, entry: &ReferenceEntry, config: &ParsingConfig) -> ParsedReference;

    /// Find in-text citations in body paragraphs. `last_names` are the
    /// reference-list last names, used for narrative mentions.
    fn extract_citations(
        &self,
        body: &[String],
        last_names: &[String],
        config: &ParsingConfig,
    ) -> Vec<InTextCitation>;
}

pub struct ApaStrategy;

impl CitationStrategy for ApaStrategy {
    fn style(&self) -> CitationStyle {
        CitationStyle::Apa
    }

    fn segment(&self, lines: &[String], config: &ParsingConfig) -> Vec<ReferenceEntry> {
        segment_apa(lines, config)
    }

    fn parse(&self, entry: &ReferenceEntry, config: &ParsingConfig) -> ParsedReference {
        parse_apa(entry, config)
    }

    fn extract_citations(
        &self,
        body: &[String],
        _last_names: &[String],
        _config: &ParsingConfig,
    ) -> Vec<InTextCitation> {
        extract_apa_citations(body)
    }
}

pub struct MlaStrategy;

impl CitationStrategy for MlaStrategy {
    fn style(&self) -> CitationStyle {
        CitationStyle::Mla
    }

    fn segment(&self, lines: &[String], config: &ParsingConfig) -> Vec<ReferenceEntry> {
        segment_mla(lines, config)
    }

    fn parse(&self, entry: &ReferenceEntry, config: &ParsingConfig) -> ParsedReference {
        parse_mla(entry, config)
    }

    fn extract_citations(
        &self,
        body: &[String],
        last_names: &[String],
        config: &ParsingConfig,
    ) -> Vec<InTextCitation> {
        extract_mla_citations(body, last_names, config)
    }
}

/// Strategy for a style. Unknown falls back to APA.
pub fn strategy_for(style: CitationStyle) -> &'static dyn CitationStrategy {
    match style {
        CitationStyle::Mla => &MlaStrategy,
        CitationStyle::Apa | CitationStyle::Unknown => &ApaStrategy,
    }
}
