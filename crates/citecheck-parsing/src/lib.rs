use citecheck_core::config_file::ParsingFileConfig;
use thiserror::Error;

pub mod citations;
pub mod config;
pub mod extractor;
pub mod identifiers;
pub mod reference;
pub mod rules;
pub mod section;
pub mod segment;
pub mod strategy;
pub mod style;
pub mod text_processing;

pub use config::{ListOverride, ParsingConfig, ParsingConfigBuilder};
pub use extractor::PaperAnalyzer;
pub use section::{find_header, find_references_section, extract_body, HeaderMatch, SectionHeader};
pub use strategy::{strategy_for, ApaStrategy, CitationStrategy, MlaStrategy};
pub use style::{detect_style, StyleScores};
pub use text_processing::{clean_footer, expand_ligatures, fix_hyphenation};
// Re-export domain types from core (canonical definitions live there)
pub use citecheck_core::{
    CitationStyle, InTextCitation, MatchResult, PaperAnalysis, ParsedReference, RefType,
    ReferenceEntry, StyleVerdict,
};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("invalid pattern in parsing config: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Analyze one paper's lines with the default configuration.
///
/// Pipeline:
/// 1. Expand ligatures
/// 2. Detect the citation style (APA strategy when unknown)
/// 3. Locate the reference section, dropping page footers
/// 4. Segment and parse the references
/// 5. Extract in-text citations from the body
/// 6. Match citations against references
pub fn analyze(lines: &[String]) -> PaperAnalysis {
    PaperAnalyzer::new().analyze(lines)
}

/// Build an analyzer from the `[parsing]` table of a config file.
pub fn analyzer_from_file_config(
    file: Option<&ParsingFileConfig>,
) -> Result<PaperAnalyzer, ParsingError> {
    let builder = match file {
        Some(file) => ParsingConfigBuilder::new().apply_file_config(file),
        None => ParsingConfigBuilder::new(),
    };
    Ok(PaperAnalyzer::with_config(builder.build()?))
}
