//! Student-name heuristic over a paper's title page.

/// Display name used when no line looks like a name.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Number of non-empty leading lines searched.
const NAME_SCAN_LINES: usize = 15;

/// Lines mentioning any of these (lowercased) are institutional, dates or
/// course labels, never the author's name.
const SKIP_KEYWORDS: &[&str] = &[
    "university",
    "college",
    "department",
    "course",
    "professor",
    "instructor",
    "dr.",
    "dr ",
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
    "running head",
    "abstract",
    "introduction",
    "assignment",
    "paper",
    "final",
    "midterm",
    "psyc",
    "psych",
    "101",
    "201",
    "301",
    "401",
];

fn looks_like_name(line: &str) -> bool {
    let len = line.chars().count();
    if !(3..=50).contains(&len) {
        return false;
    }

    let lower = line.to_lowercase();
    if SKIP_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return false;
    }

    let words = line.split_whitespace().count();
    if !(2..=4).contains(&words) {
        return false;
    }

    let non_space = line.chars().filter(|c| *c != ' ').count().max(1);
    let alpha = line.chars().filter(|c| c.is_alphabetic()).count();
    alpha as f64 / non_space as f64 > 0.9
}

/// Guess the author's name from the first non-empty lines of a paper.
///
/// Returns the first line of two to four mostly-alphabetic words that is not
/// an institution, date or course label, or [`UNKNOWN_NAME`].
pub fn extract_student_name(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .take(NAME_SCAN_LINES)
        .find(|line| looks_like_name(line))
        .unwrap_or(UNKNOWN_NAME)
        .to_string()
}
