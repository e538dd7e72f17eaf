use citecheck_core::config_file::ParsingFileConfig;
use regex::Regex;

/// Controls how a list of values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }

    fn push(&mut self, value: T) {
        match self {
            ListOverride::Extend(v) | ListOverride::Replace(v) => v.push(value),
            ListOverride::Default => *self = ListOverride::Extend(vec![value]),
        }
    }
}

const SPLIT_MIN_PREFIX_LEN: usize = 40;
const MIN_ENTRY_LEN: usize = 20;
const MLA_YEAR_WINDOW: usize = 50;
const MLA_AUTHOR_MAX_LEN: usize = 100;
const NARRATIVE_YEAR_WINDOW: usize = 50;
const STYLE_SAMPLE_REFS: usize = 5;
const STYLE_MIN_LINE_LEN: usize = 20;
const STYLE_SAMPLE_PARAGRAPHS: usize = 100;
const APA_NEW_ENTRY_WINDOW: usize = 150;
const APA_PUNCT_WINDOW: usize = 50;
const APA_SPLIT_LOOKAHEAD: usize = 100;
const TITLE_PAGE_WINDOW: usize = 20;

/// Configuration for the paper analysis pipeline.
///
/// Every length is counted in characters. Regex fields are `Option<Regex>`:
/// `None` means "use the built-in default". Use [`ParsingConfigBuilder`] to
/// construct with string patterns.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    // ── section.rs ──
    /// Whole-line test for the reference-section header (applied to the
    /// trimmed, lowercased line).
    pub(crate) section_header_re: Option<Regex>,
    /// Test for the first line after the reference list (appendix, figure, table).
    pub(crate) section_end_re: Option<Regex>,
    /// How many leading lines may hold a title page before `Abstract` or
    /// `Introduction` (default: 20).
    pub(crate) title_page_window: usize,

    // ── segment.rs ──
    /// A mid-line split needs more than this many chars before the split point (default: 40).
    pub(crate) split_min_prefix_len: usize,
    /// Accumulated entries of at most this many chars are discarded (default: 20).
    pub(crate) min_entry_len: usize,
    /// APA: a new entry has its parenthesized year within this many leading chars (default: 150).
    pub(crate) apa_new_entry_window: usize,
    /// APA: a bare-year new entry has a comma or period within this many leading chars (default: 50).
    pub(crate) apa_punct_window: usize,
    /// APA: the part after a mid-line split must show `(YYYY)` within this many chars (default: 100).
    pub(crate) apa_split_lookahead: usize,

    // ── reference.rs ──
    /// MLA: the year is searched for in this many trailing chars (default: 50).
    pub(crate) mla_year_window: usize,
    /// MLA: text before the first period only counts as authors below this length (default: 100).
    pub(crate) mla_author_max_len: usize,
    /// Publisher names that mark an APA entry as a book when they end it.
    pub(crate) publishers: ListOverride<String>,

    // ── citations.rs ──
    /// MLA: a narrative mention picks up a year within this many chars (default: 50).
    pub(crate) narrative_year_window: usize,
    /// MLA: attribution verbs for `Name argues`-style narrative citations.
    pub(crate) narrative_verbs: ListOverride<String>,

    // ── style.rs ──
    /// Number of leading reference lines sampled for shape signatures (default: 5).
    pub(crate) style_sample_refs: usize,
    /// Sampled reference lines shorter than this are skipped (default: 20).
    pub(crate) style_min_line_len: usize,
    /// Number of body paragraphs sampled for in-text citation shapes (default: 100).
    pub(crate) style_sample_paragraphs: usize,

    // ── text_processing.rs ──
    /// Compound-word suffixes that should preserve the hyphen.
    pub(crate) compound_suffixes: ListOverride<String>,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            section_header_re: None,
            section_end_re: None,
            title_page_window: TITLE_PAGE_WINDOW,
            split_min_prefix_len: SPLIT_MIN_PREFIX_LEN,
            min_entry_len: MIN_ENTRY_LEN,
            apa_new_entry_window: APA_NEW_ENTRY_WINDOW,
            apa_punct_window: APA_PUNCT_WINDOW,
            apa_split_lookahead: APA_SPLIT_LOOKAHEAD,
            mla_year_window: MLA_YEAR_WINDOW,
            mla_author_max_len: MLA_AUTHOR_MAX_LEN,
            publishers: ListOverride::Default,
            narrative_year_window: NARRATIVE_YEAR_WINDOW,
            narrative_verbs: ListOverride::Default,
            style_sample_refs: STYLE_SAMPLE_REFS,
            style_min_line_len: STYLE_MIN_LINE_LEN,
            style_sample_paragraphs: STYLE_SAMPLE_PARAGRAPHS,
            compound_suffixes: ListOverride::Default,
        }
    }
}

impl ParsingConfig {
    pub fn split_min_prefix_len(&self) -> usize {
        self.split_min_prefix_len
    }

    pub fn min_entry_len(&self) -> usize {
        self.min_entry_len
    }

    pub fn mla_year_window(&self) -> usize {
        self.mla_year_window
    }
}

/// Builder for [`ParsingConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in [`build()`](Self::build).
/// Fails fast with `regex::Error` if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    section_header_re: Option<String>,
    section_end_re: Option<String>,
    title_page_window: Option<usize>,
    split_min_prefix_len: Option<usize>,
    min_entry_len: Option<usize>,
    apa_new_entry_window: Option<usize>,
    apa_punct_window: Option<usize>,
    apa_split_lookahead: Option<usize>,
    mla_year_window: Option<usize>,
    mla_author_max_len: Option<usize>,
    publishers: ListOverride<String>,
    narrative_year_window: Option<usize>,
    narrative_verbs: ListOverride<String>,
    style_sample_refs: Option<usize>,
    style_min_line_len: Option<usize>,
    style_sample_paragraphs: Option<usize>,
    compound_suffixes: ListOverride<String>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the builder from the `[parsing]` table of a config file.
    /// Values already set on the builder are overwritten.
    pub fn apply_file_config(mut self, file: &ParsingFileConfig) -> Self {
        if let Some(p) = &file.section_header {
            self.section_header_re = Some(p.clone());
        }
        if let Some(p) = &file.section_end {
            self.section_end_re = Some(p.clone());
        }
        self.split_min_prefix_len = file.split_min_prefix_len.or(self.split_min_prefix_len);
        self.min_entry_len = file.min_entry_len.or(self.min_entry_len);
        self.mla_year_window = file.mla_year_window.or(self.mla_year_window);
        self.mla_author_max_len = file.mla_author_max_len.or(self.mla_author_max_len);
        self.narrative_year_window = file.narrative_year_window.or(self.narrative_year_window);
        self.style_sample_refs = file.style_sample_refs.or(self.style_sample_refs);
        self.style_sample_paragraphs = file
            .style_sample_paragraphs
            .or(self.style_sample_paragraphs);
        for name in file.extra_publishers.iter().flatten() {
            self.publishers.push(name.clone());
        }
        for verb in file.extra_narrative_verbs.iter().flatten() {
            self.narrative_verbs.push(verb.clone());
        }
        self
    }

    // ── Section header / end ──

    pub fn section_header_regex(mut self, pattern: &str) -> Self {
        self.section_header_re = Some(pattern.to_string());
        self
    }

    pub fn section_end_regex(mut self, pattern: &str) -> Self {
        self.section_end_re = Some(pattern.to_string());
        self
    }

    pub fn title_page_window(mut self, n: usize) -> Self {
        self.title_page_window = Some(n);
        self
    }

    // ── Segmentation ──

    pub fn split_min_prefix_len(mut self, n: usize) -> Self {
        self.split_min_prefix_len = Some(n);
        self
    }

    pub fn min_entry_len(mut self, n: usize) -> Self {
        self.min_entry_len = Some(n);
        self
    }

    pub fn apa_new_entry_window(mut self, n: usize) -> Self {
        self.apa_new_entry_window = Some(n);
        self
    }

    pub fn apa_punct_window(mut self, n: usize) -> Self {
        self.apa_punct_window = Some(n);
        self
    }

    pub fn apa_split_lookahead(mut self, n: usize) -> Self {
        self.apa_split_lookahead = Some(n);
        self
    }

    // ── Reference parsing ──

    pub fn mla_year_window(mut self, n: usize) -> Self {
        self.mla_year_window = Some(n);
        self
    }

    pub fn mla_author_max_len(mut self, n: usize) -> Self {
        self.mla_author_max_len = Some(n);
        self
    }

    pub fn set_publishers(mut self, names: Vec<String>) -> Self {
        self.publishers = ListOverride::Replace(names);
        self
    }

    pub fn add_publisher(mut self, name: String) -> Self {
        self.publishers.push(name);
        self
    }

    // ── Citations ──

    pub fn narrative_year_window(mut self, n: usize) -> Self {
        self.narrative_year_window = Some(n);
        self
    }

    pub fn set_narrative_verbs(mut self, verbs: Vec<String>) -> Self {
        self.narrative_verbs = ListOverride::Replace(verbs);
        self
    }

    pub fn add_narrative_verb(mut self, verb: String) -> Self {
        self.narrative_verbs.push(verb);
        self
    }

    // ── Style detection ──

    pub fn style_sample_refs(mut self, n: usize) -> Self {
        self.style_sample_refs = Some(n);
        self
    }

    pub fn style_min_line_len(mut self, n: usize) -> Self {
        self.style_min_line_len = Some(n);
        self
    }

    pub fn style_sample_paragraphs(mut self, n: usize) -> Self {
        self.style_sample_paragraphs = Some(n);
        self
    }

    // ── Compound suffixes ──

    pub fn set_compound_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.compound_suffixes = ListOverride::Replace(suffixes);
        self
    }

    pub fn add_compound_suffix(mut self, suffix: String) -> Self {
        self.compound_suffixes.push(suffix);
        self
    }

    /// Compile all string patterns into regexes and produce a [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, regex::Error> {
        let compile = |opt: Option<String>| -> Result<Option<Regex>, regex::Error> {
            opt.map(|p| Regex::new(&p)).transpose()
        };

        Ok(ParsingConfig {
            section_header_re: compile(self.section_header_re)?,
            section_end_re: compile(self.section_end_re)?,
            title_page_window: self.title_page_window.unwrap_or(TITLE_PAGE_WINDOW),
            split_min_prefix_len: self.split_min_prefix_len.unwrap_or(SPLIT_MIN_PREFIX_LEN),
            min_entry_len: self.min_entry_len.unwrap_or(MIN_ENTRY_LEN),
            apa_new_entry_window: self.apa_new_entry_window.unwrap_or(APA_NEW_ENTRY_WINDOW),
            apa_punct_window: self.apa_punct_window.unwrap_or(APA_PUNCT_WINDOW),
            apa_split_lookahead: self.apa_split_lookahead.unwrap_or(APA_SPLIT_LOOKAHEAD),
            mla_year_window: self.mla_year_window.unwrap_or(MLA_YEAR_WINDOW),
            mla_author_max_len: self.mla_author_max_len.unwrap_or(MLA_AUTHOR_MAX_LEN),
            publishers: self.publishers,
            narrative_year_window: self.narrative_year_window.unwrap_or(NARRATIVE_YEAR_WINDOW),
            narrative_verbs: self.narrative_verbs,
            style_sample_refs: self.style_sample_refs.unwrap_or(STYLE_SAMPLE_REFS),
            style_min_line_len: self.style_min_line_len.unwrap_or(STYLE_MIN_LINE_LEN),
            style_sample_paragraphs: self
                .style_sample_paragraphs
                .unwrap_or(STYLE_SAMPLE_PARAGRAPHS),
            compound_suffixes: self.compound_suffixes,
        })
    }
}
