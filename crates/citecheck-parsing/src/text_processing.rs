use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::config::ParsingConfig;

/// Common compound-word suffixes that should keep the hyphen.
pub(crate) static COMPOUND_SUFFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "based",
        "being",
        "centered",
        "driven",
        "aware",
        "oriented",
        "specific",
        "related",
        "dependent",
        "esteem",
        "efficacy",
        "like",
        "free",
        "friendly",
        "term",
        "scale",
        "level",
        "old",
        "year",
        "wide",
        "world",
        "income",
        "class",
        "care",
        "report",
        "reported",
        "regulation",
        "focused",
        "informed",
        "sensitive",
    ]
    .into_iter()
    .collect()
});

/// Expand typographic ligatures left behind by document text extraction.
pub fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}

/// Remove submission-system page footers from one line.
///
/// Footers look like `Page 5 of 12 - AI Writing Submission Submission ID trn:oid:::1:123`.
/// When a footer sits in the middle of a line (two references merged around
/// a page break), the text resuming at the next `Lastname,` is kept.
/// Trailing whitespace is trimmed; leading indentation is preserved.
pub fn clean_footer(line: &str) -> String {
    static MID_LINE_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)\s*Page\s+\d+\s+of\s+\d+[^\w]*(?:AI\s+Writing|Submission)").unwrap()
    });
    // Deliberately case-sensitive: the next author's surname
    static RESUME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s[A-Z][a-z]+,").unwrap());
    static TAIL_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
        [
            r"(?i)\s*Page\s+\d+\s+of\s+\d+.*$",
            r"(?i)\s*Submission\s+ID\s+\S+.*$",
            r"(?i)\s*AI\s+Writing\s+Submission.*$",
            r"(?i)\s*Page\s+\d+\s+of\s+\d+\s*-?\s*$",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    });

    let mut text = line.to_string();

    while let Some(m) = MID_LINE_RE.find(&text) {
        let tail = &text[m.end()..];
        text = match RESUME_RE.find(tail) {
            Some(resume) => format!("{}{}", &text[..m.start()], &tail[resume.start()..]),
            None => text[..m.start()].to_string(),
        };
    }

    for re in TAIL_RES.iter() {
        text = re.replace(&text, "").into_owned();
    }

    text.trim_end().to_string()
}

/// Fix hyphenation from line breaks while preserving compound words.
///
/// - `"detec- tion"` or `"detec-\ntion"` → `"detection"` (syllable break)
/// - `"self- esteem"` → `"self-esteem"` (compound word)
pub fn fix_hyphenation(text: &str) -> String {
    fix_hyphenation_with_config(text, &ParsingConfig::default())
}

/// Config-aware version of [`fix_hyphenation`].
pub(crate) fn fix_hyphenation_with_config(text: &str, config: &ParsingConfig) -> String {
    static RE: Lazy<Regex> = Lazy::new(|| {
        // word-char, hyphen, whitespace (including newlines), then word chars
        Regex::new(r"(\w)-\s+(\w)(\w*)").unwrap()
    });

    let default_suffixes: Vec<String> = COMPOUND_SUFFIXES.iter().map(|s| s.to_string()).collect();
    let suffix_set: HashSet<String> = config
        .compound_suffixes
        .resolve(&default_suffixes)
        .into_iter()
        .map(|s| s.to_lowercase())
        .collect();

    RE.replace_all(text, |caps: &regex::Captures| {
        let before = &caps[1];
        let after_word = format!("{}{}", &caps[2], &caps[3]);

        // Digits before the hyphen are ranges or codes ("2010- 2015"), keep them apart
        if before.chars().last().is_some_and(|c| c.is_ascii_digit()) {
            return format!("{}-{}", before, after_word);
        }

        if suffix_set.contains(&after_word.to_lowercase()) {
            return format!("{}-{}", before, after_word);
        }

        format!("{}{}", before, after_word)
    })
    .into_owned()
}

/// Number of chars in `s`.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The first `n` chars of `s`.
pub(crate) fn char_prefix(s: &str, n: usize) -> &str {
    s.char_indices().nth(n).map_or(s, |(i, _)| &s[..i])
}

/// The last `n` chars of `s`.
pub(crate) fn char_suffix(s: &str, n: usize) -> &str {
    let len = char_len(s);
    if len <= n {
        return s;
    }
    s.char_indices().nth(len - n).map_or(s, |(i, _)| &s[i..])
}

/// The byte range `start..end` of `s` widened by up to `n` chars on each side.
pub(crate) fn char_window(s: &str, start: usize, end: usize, n: usize) -> &str {
    let from = s[..start]
        .char_indices()
        .rev()
        .nth(n.saturating_sub(1))
        .map_or(0, |(i, _)| i);
    let from = if n == 0 { start } else { from };
    let to = s[end..]
        .char_indices()
        .nth(n)
        .map_or(s.len(), |(i, _)| end + i);
    &s[from..to]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_ligatures() {
        assert_eq!(expand_ligatures("ﬁnding ﬂow"), "finding flow");
        assert_eq!(expand_ligatures("eﬃcient oﬄine"), "efficient offline");
        assert_eq!(expand_ligatures("no ligatures here"), "no ligatures here");
    }

    #[test]
    fn test_clean_footer_end_of_line() {
        let line = "Smith, J. (2020). A study. Journal of Things, 4(2), 1-10. \
                    Page 5 of 12 - AI Writing Submission Submission ID trn:oid:::1:123";
        assert_eq!(
            clean_footer(line),
            "Smith, J. (2020). A study. Journal of Things, 4(2), 1-10."
        );
    }

    #[test]
    fn test_clean_footer_whole_line() {
        assert_eq!(clean_footer("Page 3 of 9 - AI Writing Submission"), "");
        assert_eq!(clean_footer("Submission ID trn:oid:::1:3427731680"), "");
        assert_eq!(clean_footer("Page 12 of 12 -"), "");
    }

    #[test]
    fn test_clean_footer_mid_line_keeps_next_reference() {
        let line = "Doe, A. (2019). First. Press. Page 2 of 4 - AI Writing Submission \
                    Submission ID trn:oid:::1:99 Roe, B. (2018). Second. Journal, 1(1), 2-3.";
        assert_eq!(
            clean_footer(line),
            "Doe, A. (2019). First. Press. Roe, B. (2018). Second. Journal, 1(1), 2-3."
        );
    }

    #[test]
    fn test_clean_footer_no_space_before_page() {
        assert_eq!(
            clean_footer("https://example.com/file.pdfPage 7 of 10"),
            "https://example.com/file.pdf"
        );
    }

    #[test]
    fn test_clean_footer_preserves_indent() {
        assert_eq!(clean_footer("    Vintage, 2001.   "), "    Vintage, 2001.");
    }

    #[test]
    fn test_fix_hyphenation_syllable_break() {
        assert_eq!(fix_hyphenation("detec- tion"), "detection");
        assert_eq!(fix_hyphenation("detec-\ntion"), "detection");
        assert_eq!(fix_hyphenation("develop- mental"), "developmental");
    }

    #[test]
    fn test_fix_hyphenation_compound_word() {
        assert_eq!(fix_hyphenation("self- esteem"), "self-esteem");
        assert_eq!(fix_hyphenation("evidence- based"), "evidence-based");
        assert_eq!(fix_hyphenation("2010- 2015"), "2010-2015");
    }

    #[test]
    fn test_fix_hyphenation_custom_suffix() {
        use crate::ParsingConfigBuilder;
        let config = ParsingConfigBuilder::new()
            .add_compound_suffix("powered".to_string())
            .build()
            .unwrap();
        assert_eq!(fix_hyphenation_with_config("AI- powered", &config), "AI-powered");
        assert_eq!(fix_hyphenation_with_config("self- esteem", &config), "self-esteem");
    }

    #[test]
    fn test_char_helpers_respect_boundaries() {
        let s = "Gómez “Title” 2001";
        assert_eq!(char_prefix(s, 2), "Gó");
        assert_eq!(char_suffix(s, 4), "2001");
        assert_eq!(char_suffix("ab", 10), "ab");
        let start = s.find("Title").unwrap();
        assert_eq!(char_window(s, start, start + 5, 1), "“Title”");
        assert_eq!(char_window(s, start, start + 5, 0), "Title");
    }
}
