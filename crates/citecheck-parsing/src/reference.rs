use citecheck_core::{ParsedReference, ReferenceEntry};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ParsingConfig;
use crate::identifiers::{extract_doi, first_locator};
use crate::rules::{classify, APA_REF_TYPE_RULES, MLA_REF_TYPE_RULES};
use crate::text_processing::{char_suffix, fix_hyphenation_with_config};

/// A field value and the byte offset where it ends in the entry text.
struct Located {
    value: String,
    end: usize,
}

/// Trim a container/source fragment and drop it if nothing is left.
fn clean_source(fragment: &str) -> Option<String> {
    let cleaned = fragment
        .trim()
        .trim_start_matches(['.', ',', ';', ':'])
        .trim_end_matches([',', '.', ';', ':'])
        .trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

fn clean_title(title: &str, config: &ParsingConfig) -> Option<String> {
    let title = title.trim().trim_end_matches([',', '.']).trim();
    (!title.is_empty()).then(|| fix_hyphenation_with_config(title, config))
}

// ── APA ──

/// Byte offset of an APA `(n.d.)` marker.
fn apa_no_date(text: &str) -> Option<usize> {
    static ND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(n\.\s?d\.\)").unwrap());
    ND_RE.find(text).map(|m| m.start())
}

/// `(2020)`/`(2020a)` anywhere, else the first bare 19xx/20xx year ahead of
/// any `(n.d.)` marker, with the byte offset where the year marker starts.
fn apa_year(text: &str) -> Option<(String, usize)> {
    static PAREN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d{4})[a-z]?\)").unwrap());
    static BARE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());

    if let Some(caps) = PAREN_RE.captures(text) {
        let whole = caps.get(0)?;
        return Some((caps.get(1)?.as_str().to_string(), whole.start()));
    }
    // Years after "(n.d.)" belong to retrieval dates, not publication
    let dated = apa_no_date(text).map_or(text, |nd| &text[..nd]);
    BARE_RE
        .find(dated)
        .map(|m| (m.as_str().to_string(), m.start()))
}

fn apa_authors(text: &str, year_start: usize) -> Option<String> {
    static TAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[(.,\s]+$").unwrap());
    let authors = TAIL_RE.replace(&text[..year_start], "");
    let authors = authors.trim();
    (!authors.is_empty()).then(|| authors.to_string())
}

fn apa_title(text: &str) -> Option<Located> {
    static AFTER_YEAR_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\((?:\d{4}[a-z]?|n\.d\.)\)\.\s*").unwrap());
    static SENTENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^.]+").unwrap());
    static QUOTED_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#"["\u{201c}](.+?)["\u{201d}][,.]"#).unwrap());
    static LONG_QUOTED_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#"["\u{201c}]([^"\u{201c}]{10,})["\u{201d}]"#).unwrap());

    if let Some(year) = AFTER_YEAR_RE.find(text) {
        if let Some(sentence) = SENTENCE_RE.find(&text[year.end()..]) {
            return Some(Located {
                value: sentence.as_str().to_string(),
                end: year.end() + sentence.end(),
            });
        }
    }

    [&*QUOTED_RE, &*LONG_QUOTED_RE].iter().find_map(|re| {
        let caps = re.captures(text)?;
        Some(Located {
            value: caps.get(1)?.as_str().to_string(),
            end: caps.get(0)?.end(),
        })
    })
}

/// Parse one APA entry: `Author, A. A. (Year). Title. Source. DOI`.
///
/// Every field is optional; a field that cannot be found is left unset.
pub fn parse_apa(entry: &ReferenceEntry, config: &ParsingConfig) -> ParsedReference {
    let text = entry.text.as_str();
    let mut parsed = ParsedReference::unparsed(entry);

    parsed.ref_type = classify(&APA_REF_TYPE_RULES, text, config);
    parsed.identifier = extract_doi(text);

    if let Some((year, start)) = apa_year(text) {
        parsed.authors = apa_authors(text, start);
        parsed.year = Some(year);
    } else if let Some(nd) = apa_no_date(text) {
        parsed.authors = apa_authors(text, nd);
    }

    if let Some(title) = apa_title(text) {
        parsed.title = clean_title(&title.value, config);
        let rest = &text[title.end..];
        let rest = first_locator(rest).map_or(rest, |at| &rest[..at]);
        parsed.source = clean_source(rest);
    }

    parsed
}

// ── MLA ──

fn mla_authors(text: &str, config: &ParsingConfig) -> Option<String> {
    static AUTHOR_QUOTE_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#"^([^"\u{201c}]+?)\.\s+["\u{201c}]"#).unwrap());

    if text.starts_with(['"', '\u{201c}']) {
        return None;
    }

    let authors = match AUTHOR_QUOTE_RE.captures(text).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => {
            let period = text.find('.')?;
            let chars_before = text[..period].chars().count();
            if chars_before == 0 || chars_before >= config.mla_author_max_len {
                return None;
            }
            &text[..period]
        }
    };
    let authors = authors.trim();
    (!authors.is_empty()).then(|| authors.to_string())
}

fn mla_title(text: &str) -> Option<Located> {
    static QUOTED_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#"["\u{201c}]([^"\u{201d}]+)["\u{201d}]"#).unwrap());
    let caps = QUOTED_RE.captures(text)?;
    Some(Located {
        value: caps.get(1)?.as_str().to_string(),
        end: caps.get(0)?.end(),
    })
}

fn mla_year(text: &str, config: &ParsingConfig) -> Option<String> {
    static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());
    YEAR_RE
        .find(char_suffix(text, config.mla_year_window))
        .map(|m| m.as_str().to_string())
}

/// Parse one MLA entry: `Author. "Title." Container, elements, Year.`
///
/// Entries that open with a quoted title have no author.
pub fn parse_mla(entry: &ReferenceEntry, config: &ParsingConfig) -> ParsedReference {
    let text = entry.text.as_str();
    let mut parsed = ParsedReference::unparsed(entry);

    parsed.ref_type = classify(&MLA_REF_TYPE_RULES, text, config);
    parsed.identifier = extract_doi(text);
    parsed.authors = mla_authors(text, config);
    parsed.year = mla_year(text, config);

    if let Some(title) = mla_title(text) {
        parsed.title = clean_title(&title.value, config);
        let after = text[title.end..].trim();
        parsed.source = match &parsed.year {
            Some(year) => after
                .rfind(year.as_str())
                .filter(|&pos| pos > 0)
                .and_then(|pos| clean_source(&after[..pos])),
            None => clean_source(after),
        };
    }

    parsed
}
