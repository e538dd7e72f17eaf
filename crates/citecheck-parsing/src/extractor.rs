use citecheck_core::{
    match_citations, reference_last_names, AuthorYear, CitationStyle, InTextCitation,
    PaperAnalysis, ParsedReference, ReferenceEntry, StyleVerdict,
};

use crate::config::ParsingConfig;
use crate::strategy::strategy_for;
use crate::{section, style, text_processing};

/// A configurable paper analysis pipeline.
///
/// Holds a [`ParsingConfig`] and exposes each pipeline step as a method.
/// The default constructor uses built-in defaults; use
/// [`PaperAnalyzer::with_config`] to supply custom patterns and thresholds.
/// Analyzers hold no mutable state and can be shared across worker threads.
#[derive(Debug, Clone, Default)]
pub struct PaperAnalyzer {
    config: ParsingConfig,
}

impl PaperAnalyzer {
    /// Create an analyzer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with a custom configuration.
    pub fn with_config(config: ParsingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    /// Classify the document's citation style (step 1).
    pub fn detect_style(&self, lines: &[String]) -> StyleVerdict {
        style::detect_style_with_config(lines, &self.config)
    }

    /// Locate and clean the reference section (step 2). Empty when there is
    /// no header.
    pub fn find_references_section(&self, lines: &[String]) -> Vec<String> {
        section::find_references_section_with_config(lines, &self.config)
    }

    /// Body paragraphs preceding the reference section.
    pub fn extract_body(&self, lines: &[String]) -> Vec<String> {
        section::extract_body_with_config(lines, &self.config)
    }

    /// Group reference-section lines into entries (step 3).
    pub fn segment(&self, section: &[String], style: CitationStyle) -> Vec<ReferenceEntry> {
        strategy_for(style).segment(section, &self.config)
    }

    /// Extract fields from one entry (step 4).
    pub fn parse(&self, entry: &ReferenceEntry, style: CitationStyle) -> ParsedReference {
        strategy_for(style).parse(entry, &self.config)
    }

    /// Find in-text citations in the body (step 5).
    pub fn extract_citations(
        &self,
        body: &[String],
        references: &[ParsedReference],
        style: CitationStyle,
    ) -> Vec<InTextCitation> {
        let last_names = reference_last_names(references);
        strategy_for(style).extract_citations(body, &last_names, &self.config)
    }

    /// Run the full pipeline with the detected style.
    pub fn analyze(&self, lines: &[String]) -> PaperAnalysis {
        self.analyze_with_style(lines, None)
    }

    /// Run the full pipeline. `style_override` replaces the detected style
    /// for segmentation, parsing and extraction; the detector's verdict is
    /// still reported.
    ///
    /// A paper without reference lines yields no references, no citations
    /// and no issues.
    pub fn analyze_with_style(
        &self,
        lines: &[String],
        style_override: Option<CitationStyle>,
    ) -> PaperAnalysis {
        let lines: Vec<String> = lines
            .iter()
            .map(|l| text_processing::expand_ligatures(l))
            .collect();

        let verdict = self.detect_style(&lines);
        let applied_style = strategy_for(style_override.unwrap_or(verdict.style)).style();
        if let Some(forced) = style_override {
            tracing::info!(detected = %verdict.style, forced = %forced, "style override");
        }

        let section = self.find_references_section(&lines);
        let reference_section_found = section::find_header_with_config(&lines, &self.config).is_some();
        if section.is_empty() {
            tracing::debug!(reference_section_found, "no reference entries, skipping citation check");
            return PaperAnalysis {
                style: verdict,
                applied_style,
                reference_section_found,
                ..Default::default()
            };
        }

        let references: Vec<ParsedReference> = self
            .segment(&section, applied_style)
            .iter()
            .map(|entry| self.parse(entry, applied_style))
            .collect();

        let body = self.extract_body(&lines);
        let citations = self.extract_citations(&body, &references, applied_style);

        let author_years: Vec<AuthorYear> = references
            .iter()
            .filter_map(ParsedReference::author_year)
            .collect();
        let matching = match_citations(&citations, &author_years);

        tracing::debug!(
            style = %applied_style,
            references = references.len(),
            citations = citations.len(),
            uncited = matching.uncited_refs.len(),
            missing = matching.missing_refs.len(),
            "analysis complete"
        );

        PaperAnalysis {
            style: verdict,
            applied_style,
            reference_section_found,
            total_citations: citations.len(),
            total_references: author_years.len(),
            references,
            citations,
            matching,
        }
    }
}
