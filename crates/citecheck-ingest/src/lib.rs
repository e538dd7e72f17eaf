use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod name;

pub use name::{extract_student_name, UNKNOWN_NAME};

/// Number of leading lines searched for a submission-system cover page.
const COVER_SCAN_LINES: usize = 40;

/// Form feed, the page separator written by text extractors such as `pdftotext`.
const PAGE_BREAK: char = '\u{0c}';

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("path does not exist: {0}")]
    NotFound(PathBuf),
    #[error("unsupported file type (expected .txt or .md): {0}")]
    Unsupported(PathBuf),
}

/// One paper ready for analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
    /// Stable identifier in load order: `REF_001`, `REF_002`, ...
    pub code: String,
    /// Author name guessed from the title page, or `"Unknown"`.
    pub display_name: String,
    pub source_path: PathBuf,
    /// Right-trimmed lines; leading indentation is kept.
    pub lines: Vec<String>,
    /// The file carries submission-system cover pages and footers.
    pub submission_system: bool,
}

/// Paper code for the `n`th paper (1-based).
pub fn paper_code(n: usize) -> String {
    format!("REF_{n:03}")
}

/// Returns true if the path has a supported text extension.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "txt" | "md"))
        .unwrap_or(false)
}

/// Office lock files (`~$paper.docx` and friends) are never papers.
fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with("~$"))
        .unwrap_or(false)
}

/// True when an early line carries a submission-system `Submission ID` footer.
pub fn is_submission_system(lines: &[String]) -> bool {
    lines
        .iter()
        .take(COVER_SCAN_LINES)
        .any(|line| line.contains("Submission ID"))
}

/// Split text into right-trimmed lines, treating page breaks as line breaks.
fn split_lines(text: &str) -> Vec<String> {
    text.split(['\n', PAGE_BREAK])
        .map(|line| line.trim_end().to_string())
        .collect()
}

/// Build a paper from already-extracted text.
///
/// For submission-system files the name is looked up on the third page
/// (after the cover pages) when page breaks are present, and otherwise on
/// all lines except the footers.
pub fn paper_from_text(text: &str, code: impl Into<String>, source_path: impl Into<PathBuf>) -> Paper {
    let lines = split_lines(text);
    let submission_system = is_submission_system(&lines);

    let display_name = if submission_system {
        match text.split(PAGE_BREAK).nth(2) {
            Some(page) => extract_student_name(&split_lines(page)),
            None => {
                let body: Vec<String> = lines
                    .iter()
                    .filter(|line| !line.contains("Submission ID"))
                    .cloned()
                    .collect();
                extract_student_name(&body)
            }
        }
    } else {
        extract_student_name(&lines)
    };

    Paper {
        code: code.into(),
        display_name,
        source_path: source_path.into(),
        lines,
        submission_system,
    }
}

/// Load one text file as a paper.
pub fn load_paper(path: &Path, code: impl Into<String>) -> Result<Paper, IngestError> {
    if !path.exists() {
        return Err(IngestError::NotFound(path.to_path_buf()));
    }
    if !is_supported(path) {
        return Err(IngestError::Unsupported(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    let paper = paper_from_text(&text, code, path);
    tracing::debug!(
        path = %path.display(),
        code = %paper.code,
        name = %paper.display_name,
        lines = paper.lines.len(),
        submission_system = paper.submission_system,
        "loaded paper"
    );
    Ok(paper)
}

/// Supported files directly inside `dir`, sorted by file name.
fn folder_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let io_err = |source| IngestError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && is_supported(&path) && !is_lock_file(&path) {
            files.push(path);
        } else {
            tracing::trace!(path = %path.display(), "skipping");
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Load every supported file in a folder, in file-name order.
pub fn ingest_folder(dir: &Path) -> Result<Vec<Paper>, IngestError> {
    ingest_paths(&[dir.to_path_buf()])
}

/// Load files and folders in argument order. Paper codes run across all
/// inputs. A file given explicitly must have a supported extension.
pub fn ingest_paths(paths: &[PathBuf]) -> Result<Vec<Paper>, IngestError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(folder_files(path)?);
        } else if path.exists() {
            files.push(path.clone());
        } else {
            return Err(IngestError::NotFound(path.clone()));
        }
    }

    let papers = files
        .iter()
        .enumerate()
        .map(|(i, path)| load_paper(path, paper_code(i + 1)))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!(papers = papers.len(), "ingested papers");
    Ok(papers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_code() {
        assert_eq!(paper_code(1), "REF_001");
        assert_eq!(paper_code(42), "REF_042");
        assert_eq!(paper_code(1234), "REF_1234");
    }

    #[test]
    fn test_is_supported() {
        assert!(is_supported(Path::new("essay.txt")));
        assert!(is_supported(Path::new("ESSAY.TXT")));
        assert!(is_supported(Path::new("notes.md")));
        assert!(!is_supported(Path::new("essay.docx")));
        assert!(!is_supported(Path::new("essay")));
    }

    #[test]
    fn test_lock_files() {
        assert!(is_lock_file(Path::new("~$essay.txt")));
        assert!(!is_lock_file(Path::new("essay.txt")));
    }

    #[test]
    fn test_split_lines_keeps_indentation() {
        let lines = split_lines("Ball, Lucille. Love,\r\n    Lucy. 1996.  \n\u{0c}Next page");
        assert_eq!(lines, vec!["Ball, Lucille. Love,", "    Lucy. 1996.", "", "Next page"]);
    }

    #[test]
    fn test_paper_from_text() {
        let paper = paper_from_text("Jane Doe\nPSYC 101\nIntroduction\nText.", "REF_001", "a.txt");
        assert_eq!(paper.display_name, "Jane Doe");
        assert!(!paper.submission_system);
        assert_eq!(paper.lines.len(), 4);
        assert_eq!(paper.source_path, PathBuf::from("a.txt"));
    }

    #[test]
    fn test_submission_system_name_from_third_page() {
        let text = "Cover Sheet Owner\nSubmission ID trn:oid:::1:123\n\u{0c}\
                    Page 2 of 9 - Integrity Overview Submission ID trn:oid:::1:123\n\u{0c}\
                    Maria Lopez\nSouthern University\nIntroduction";
        let paper = paper_from_text(text, "REF_001", "t.txt");
        assert!(paper.submission_system);
        assert_eq!(paper.display_name, "Maria Lopez");
    }

    #[test]
    fn test_submission_system_without_page_breaks() {
        let text = "Submission ID trn:oid:::1:123\nSam Park\nEnglish Composition";
        let paper = paper_from_text(text, "REF_001", "t.txt");
        assert!(paper.submission_system);
        assert_eq!(paper.display_name, "Sam Park");
    }
}
