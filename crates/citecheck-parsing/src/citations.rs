use citecheck_core::InTextCitation;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::config::ParsingConfig;
use crate::text_processing::char_window;

/// Capitalized head word, then more capitalized words or lowercase
/// connectors, so organizational authors ("National Institutes of Health")
/// are accepted.
const APA_AUTHOR: &str = r"[A-Z][A-Za-z'-]+(?:\s+(?:of|the|for|and|in|on|at|to|a|an|from)\s+[A-Z][A-Za-z'-]+|\s+[A-Z][A-Za-z'-]+)*";

/// Optional qualifier opening a parenthetical citation.
const APA_PREFIX: &str = r"(?:e\.g\.,|cf\.|see|see e\.g\.,|see for example,?|see also):?\s*";

const APA_YEAR: &str = r"(?:(?:19|20)\d{2}[a-z]?|n\.\s?d\.)";

/// `n.d.` cites an undated reference and carries no year.
fn citation_year(year: &str) -> Option<&str> {
    (!year.starts_with('n')).then_some(year)
}

/// Author with an optional multi-author tail.
fn apa_author_group() -> String {
    format!(
        r"{a}(?:\s+et al\.|\s+(?:and|&)\s+(?:colleagues|co-workers)|\s+(?:&|and)\s+{a})?",
        a = APA_AUTHOR
    )
}

/// Words that open a sentence in front of a narrative citation and are not
/// part of the author ("As Smith (2020) shows").
static SENTENCE_LEADS: &[&str] = &[
    "According to",
    "As",
    "In",
    "Per",
    "While",
    "Although",
    "Unlike",
    "Like",
    "Following",
    "Similarly",
    "Also",
    "When",
    "Since",
    "Because",
    "Thus",
    "But",
    "And",
];

fn strip_sentence_lead(author: &str) -> &str {
    let mut author = author;
    loop {
        let stripped = SENTENCE_LEADS.iter().find_map(|lead| {
            author
                .strip_prefix(lead)
                .and_then(|rest| rest.strip_prefix(' '))
                .map(str::trim_start)
                .filter(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
        });
        match stripped {
            Some(rest) => author = rest,
            None => return author,
        }
    }
}

/// Extract APA in-text citations from body paragraphs.
///
/// Recognizes parenthetical `(Smith, 2020)` with optional qualifiers such
/// as `e.g.,` or `see also`, semicolon lists `(Smith, 2020; Lee, 2019)` and
/// narrative `Smith (2020)`. Narrative pairs already found are not repeated.
pub fn extract_apa_citations(body: &[String]) -> Vec<InTextCitation> {
    static PAREN_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(&format!(
            r"\((?:{APA_PREFIX})?({}),?\s+({APA_YEAR})\)",
            apa_author_group()
        ))
        .unwrap()
    });
    static GROUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]+)\)").unwrap());
    static GROUP_PREFIX_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(&format!(r"(?i)^{APA_PREFIX}")).unwrap());
    static PART_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(&format!(r"({}),?\s+({APA_YEAR})", apa_author_group())).unwrap()
    });
    static NARRATIVE_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(&format!(r"({})\s+\(({APA_YEAR})\)", apa_author_group())).unwrap()
    });

    let text = join_body(body);
    let mut citations = Vec::new();

    for caps in PAREN_RE.captures_iter(&text) {
        citations.push(InTextCitation::new(&caps[1], citation_year(&caps[2])));
    }

    for caps in GROUP_RE.captures_iter(&text) {
        let content = &caps[1];
        if !content.contains(';') {
            continue;
        }
        let content = GROUP_PREFIX_RE.replace(content, "");
        for part in content.split(';') {
            if let Some(sub) = PART_RE.captures(part) {
                citations.push(InTextCitation::new(&sub[1], citation_year(&sub[2])));
            }
        }
    }

    for caps in NARRATIVE_RE.captures_iter(&text) {
        let citation =
            InTextCitation::new(strip_sentence_lead(caps[1].trim()), citation_year(&caps[2]));
        if !citations.contains(&citation) {
            citations.push(citation);
        }
    }

    tracing::debug!(citations = citations.len(), "extracted APA citations");
    citations
}

/// Attribution verbs for `Name argues`-style narrative mentions.
pub(crate) static NARRATIVE_VERBS: &[&str] = &[
    "argues",
    "states",
    "suggests",
    "notes",
    "writes",
    "demonstrates",
    "shows",
    "finds",
    "claims",
    "asserts",
    "observes",
    "explains",
    "contends",
    "believes",
    "maintains",
];

const POSSESSIVE_NOUNS: &str =
    "study|research|work|article|book|essay|analysis|findings|argument|theory";

fn narrative_patterns(name: &str, verbs: &str) -> Vec<Result<Regex, regex::Error>> {
    let name = regex::escape(name);
    [
        format!(r"\b{name}\s+(?:{verbs})"),
        format!(r"\b{name}'s\s+(?:{POSSESSIVE_NOUNS})"),
        format!(r"(?:according to|as)\s+{name}\b"),
    ]
    .iter()
    .map(|p| RegexBuilder::new(p).case_insensitive(true).build())
    .collect()
}

/// Extract MLA in-text citations from body paragraphs.
///
/// MLA citations carry no year: `(Ball 45)` and `(Ball)` yield `("Ball", None)`.
/// For each reference last name, the first narrative mention ("Ball argues",
/// "Ball's study", "according to Ball") is added too, with a year if one
/// appears nearby.
pub fn extract_mla_citations(
    body: &[String],
    last_names: &[String],
    config: &ParsingConfig,
) -> Vec<InTextCitation> {
    static PAGE_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\(([A-Z][A-Za-z'-]+(?:\s+et al\.)?)\s+(\d{1,4}(?:-\d{1,4})?)\)").unwrap()
    });
    static AUTHOR_ONLY_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\(([A-Z][A-Za-z'-]+(?:\s+et al\.)?)\)").unwrap());
    static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());

    let text = join_body(body);
    let mut citations: Vec<InTextCitation> = Vec::new();

    for caps in PAGE_RE.captures_iter(&text) {
        citations.push(InTextCitation::new(&caps[1], None));
    }

    for caps in AUTHOR_ONLY_RE.captures_iter(&text) {
        let author = &caps[1];
        if !citations.iter().any(|c| c.author == author) {
            citations.push(InTextCitation::new(author, None));
        }
    }

    let defaults: Vec<String> = NARRATIVE_VERBS.iter().map(|s| s.to_string()).collect();
    let verbs = config
        .narrative_verbs
        .resolve(&defaults)
        .iter()
        .map(|v| regex::escape(v))
        .collect::<Vec<_>>()
        .join("|");

    for name in last_names {
        let lowered = name.to_lowercase();
        if citations.iter().any(|c| c.author.to_lowercase() == lowered) {
            continue;
        }
        let hit = narrative_patterns(name, &verbs)
            .into_iter()
            .filter_map(|re| {
                re.map_err(|e| tracing::warn!(name = %name, error = %e, "skipping narrative pattern"))
                    .ok()
            })
            .find_map(|re| re.find(&text));
        if let Some(m) = hit {
            let context = char_window(&text, m.start(), m.end(), config.narrative_year_window);
            let year = YEAR_RE.find(context).map(|y| y.as_str());
            tracing::trace!(name = %name, year = ?year, "narrative mention");
            citations.push(InTextCitation::new(name.as_str(), year));
        }
    }

    tracing::debug!(citations = citations.len(), "extracted MLA citations");
    citations
}

fn join_body(body: &[String]) -> String {
    body.iter()
        .map(|p| p.trim())
        .collect::<Vec<_>>()
        .join(" ")
}
