use std::io::Write;
use std::path::Path;

use citecheck_core::{CitationStyle, PaperAnalysis, ParsedReference, StyleVerdict};
use citecheck_ingest::Paper;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// One paper in the JSON export.
#[derive(Serialize)]
pub struct PaperReport<'a> {
    pub code: &'a str,
    pub display_name: &'a str,
    pub source_path: &'a Path,
    pub submission_system: bool,
    pub needs_manual_review: bool,
    pub has_issues: bool,
    #[serde(flatten)]
    pub analysis: &'a PaperAnalysis,
}

impl<'a> PaperReport<'a> {
    pub fn new(paper: &'a Paper, analysis: &'a PaperAnalysis) -> Self {
        Self {
            code: &paper.code,
            display_name: &paper.display_name,
            source_path: &paper.source_path,
            submission_system: paper.submission_system,
            needs_manual_review: analysis.style.needs_manual_review(),
            has_issues: analysis.has_issues(),
            analysis,
        }
    }
}

fn style_label(verdict: &StyleVerdict) -> String {
    format!("{} ({:.1}%)", verdict.style, verdict.confidence)
}

/// Print the heading line of one paper.
pub fn print_paper_header(w: &mut dyn Write, paper: &Paper, color: ColorMode) -> std::io::Result<()> {
    let title = format!("[{}] {}", paper.code, paper.display_name);
    if color.enabled() {
        writeln!(w, "{} {}", title.bold(), paper.source_path.display().dimmed())?;
    } else {
        writeln!(w, "{} {}", title, paper.source_path.display())?;
    }
    if paper.submission_system {
        writeln!(w, "  Submission-system file (cover pages and footers removed)")?;
    }
    Ok(())
}

/// Print the style verdict, flagging low-confidence detections.
pub fn print_style(
    w: &mut dyn Write,
    verdict: &StyleVerdict,
    applied: CitationStyle,
    color: ColorMode,
) -> std::io::Result<()> {
    write!(w, "  Style: {}", style_label(verdict))?;
    if verdict.style != applied {
        write!(w, ", analyzed as {}", applied)?;
    }
    if verdict.needs_manual_review() {
        if color.enabled() {
            write!(w, " {}", "- verify style manually".yellow())?;
        } else {
            write!(w, " - verify style manually")?;
        }
    }
    writeln!(w)
}

/// Print parsed references, one block per entry.
pub fn print_references(
    w: &mut dyn Write,
    references: &[ParsedReference],
    color: ColorMode,
) -> std::io::Result<()> {
    for reference in references {
        let label = format!("[{}]", reference.ref_num);
        if color.enabled() {
            writeln!(w, "  {} {}", label.bold().yellow(), reference.ref_type)?;
        } else {
            writeln!(w, "  {} {}", label, reference.ref_type)?;
        }
        let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "(none)".to_string());
        writeln!(w, "    Authors: {}", field(&reference.authors))?;
        writeln!(w, "    Year:    {}", field(&reference.year))?;
        writeln!(w, "    Title:   {}", field(&reference.title))?;
        writeln!(w, "    Source:  {}", field(&reference.source))?;
        if let Some(ref doi) = reference.identifier {
            writeln!(w, "    DOI:     {}", doi)?;
        }
        let raw = truncate(&reference.raw, 200);
        if color.enabled() {
            writeln!(w, "    Raw:     {}", raw.dimmed())?;
        } else {
            writeln!(w, "    Raw:     {}", raw)?;
        }
    }
    Ok(())
}

/// Print the citation/reference cross-check for one paper.
pub fn print_citation_report(
    w: &mut dyn Write,
    analysis: &PaperAnalysis,
    color: ColorMode,
) -> std::io::Result<()> {
    if !analysis.reference_section_found {
        if color.enabled() {
            writeln!(w, "  {}", "No reference section found".yellow())?;
        } else {
            writeln!(w, "  No reference section found")?;
        }
        return Ok(());
    }

    writeln!(
        w,
        "  In-text citations: {}, references: {}",
        analysis.total_citations, analysis.total_references
    )?;

    let matching = &analysis.matching;
    if !matching.has_issues() {
        if color.enabled() {
            writeln!(w, "  {}", "All citations and references match".green())?;
        } else {
            writeln!(w, "  All citations and references match")?;
        }
        return Ok(());
    }

    if !matching.uncited_refs.is_empty() {
        if color.enabled() {
            writeln!(w, "  {}", "References never cited:".red().bold())?;
        } else {
            writeln!(w, "  References never cited:")?;
        }
        for reference in &matching.uncited_refs {
            writeln!(w, "    - {}", reference)?;
        }
    }
    if !matching.missing_refs.is_empty() {
        if color.enabled() {
            writeln!(w, "  {}", "Citations without a reference:".red().bold())?;
        } else {
            writeln!(w, "  Citations without a reference:")?;
        }
        for citation in &matching.missing_refs {
            writeln!(w, "    - ({})", citation)?;
        }
    }
    Ok(())
}

/// Print the final summary across all papers.
pub fn print_summary(
    w: &mut dyn Write,
    analyses: &[PaperAnalysis],
    color: ColorMode,
) -> std::io::Result<()> {
    let with_issues = analyses.iter().filter(|a| a.has_issues()).count();
    let manual = analyses
        .iter()
        .filter(|a| a.style.needs_manual_review())
        .count();
    let no_section = analyses
        .iter()
        .filter(|a| !a.reference_section_found)
        .count();

    writeln!(w)?;
    let sep = "=".repeat(60);
    if color.enabled() {
        writeln!(w, "{}", sep.bold())?;
        writeln!(w, "{}", "SUMMARY".bold())?;
        writeln!(w, "{}", sep.bold())?;
    } else {
        writeln!(w, "{}", sep)?;
        writeln!(w, "SUMMARY")?;
        writeln!(w, "{}", sep)?;
    }

    writeln!(w, "  Papers checked: {}", analyses.len())?;
    if with_issues > 0 && color.enabled() {
        writeln!(w, "  {} {}", "Papers with citation issues:".red(), with_issues)?;
    } else {
        writeln!(w, "  Papers with citation issues: {}", with_issues)?;
    }
    if manual > 0 {
        if color.enabled() {
            writeln!(w, "  {} {}", "Style needs manual check:".yellow(), manual)?;
        } else {
            writeln!(w, "  Style needs manual check: {}", manual)?;
        }
    }
    if no_section > 0 {
        let msg = format!("Without a reference section: {}", no_section);
        if color.enabled() {
            writeln!(w, "  {}", msg.dimmed())?;
        } else {
            writeln!(w, "  {}", msg)?;
        }
    }
    writeln!(w)?;
    Ok(())
}

/// One tab-separated line per paper for the `style` command.
pub fn print_style_row(w: &mut dyn Write, paper: &Paper, verdict: &StyleVerdict) -> std::io::Result<()> {
    let review = if verdict.needs_manual_review() {
        "verify manually"
    } else {
        "ok"
    };
    writeln!(
        w,
        "{}\t{}\t{}\t{:.1}\t{}",
        paper.code, paper.display_name, verdict.style, verdict.confidence, review
    )
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((i, _)) => format!("{}...", &s[..i]),
        None => s.to_string(),
    }
}
