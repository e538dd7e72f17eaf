//! End-to-end tests over whole papers: style detection, segmentation,
//! parsing, citation extraction and matching together.

use citecheck_core::{match_citations, normalize_author, AuthorYear};
use citecheck_parsing::{
    analyze, detect_style, CitationStyle, InTextCitation, PaperAnalyzer, ParsingConfig,
};
use citecheck_parsing::segment::segment_apa;

fn lines(text: &[&str]) -> Vec<String> {
    text.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Whole-paper scenarios
// =============================================================================

#[test]
fn narrative_citation_resolves_its_reference() {
    let paper = lines(&[
        "Stress affects students, as shown by Smith (2020) in a survey.",
        "References",
        "Smith, J. (2020). A study. Journal of Things, 4(2), 1-10.",
    ]);
    let analysis = analyze(&paper);
    assert!(analysis.reference_section_found);
    assert_eq!(analysis.references.len(), 1);
    assert_eq!(analysis.citations, vec![InTextCitation::new("Smith", Some("2020"))]);
    assert!(analysis.matching.uncited_refs.is_empty());
    assert!(analysis.matching.missing_refs.is_empty());
    assert!(!analysis.has_issues());
}

#[test]
fn unmentioned_reference_is_uncited() {
    let paper = lines(&[
        "Exams raise anxiety (Smith, 2020).",
        "References",
        "Smith, J. (2020). A study. Journal of Things, 4(2), 1-10.",
        "Jones, K. (2019). Another study. Journal of Stuff, 2(1), 5-9.",
    ]);
    let analysis = analyze(&paper);
    assert_eq!(analysis.applied_style, CitationStyle::Apa);
    assert_eq!(
        analysis.matching.uncited_refs,
        vec![AuthorYear::new("Jones, K", Some("2019"))]
    );
    assert!(analysis.matching.missing_refs.is_empty());
    assert_eq!(analysis.total_references, 2);
    assert_eq!(analysis.total_citations, 1);
}

#[test]
fn citation_without_reference_is_missing() {
    let paper = lines(&[
        "Sleep matters (Smith, 2020). Others disagree (Doe, 2019).",
        "References",
        "Smith, J. (2020). A study. Journal of Things, 4(2), 1-10.",
    ]);
    let analysis = analyze(&paper);
    assert_eq!(
        analysis.matching.missing_refs,
        vec![InTextCitation::new("Doe", Some("2019"))]
    );
    assert!(analysis.matching.uncited_refs.is_empty());
}

#[test]
fn two_letter_surname_is_matched() {
    let paper = lines(&[
        "Sleep shapes memory (An, 2020). Naps help (To, 2019).",
        "References",
        "An, J. (2020). Sleep and memory. Journal of Things, 4(2), 1-10.",
        "To, H. (2019). Napping in class. Journal of Stuff, 2(1), 5-9.",
    ]);
    let analysis = analyze(&paper);
    assert_eq!(analysis.total_citations, 2);
    assert!(!analysis.has_issues(), "{:?}", analysis.matching);
}

#[test]
fn undated_reference_is_matched_by_undated_citation() {
    let paper = lines(&[
        "Depression is common (World Health Organization, n.d.).",
        "References",
        "World Health Organization. (n.d.). Depression fact sheet. Retrieved May 5, 2021, from https://www.who.int/x",
    ]);
    let analysis = analyze(&paper);
    assert_eq!(analysis.references.len(), 1);
    assert!(analysis.references[0].year.is_none());
    assert!(!analysis.has_issues(), "{:?}", analysis.matching);
}

#[test]
fn works_cited_list_is_detected_as_mla() {
    let paper = lines(&[
        "As Ball notes, comedy matters (Ball 45). Desi agreed (Arnaz 12).",
        "Works Cited",
        "Arnaz, Desi. A Book. Random House, 1976.",
        "Ball, Lucille. \"Comedy and the Home.\" Television Quarterly, vol. 3, 1998, pp. 4-9.",
    ]);
    let verdict = detect_style(&paper);
    assert_eq!(verdict.style, CitationStyle::Mla);
    assert!(verdict.confidence > 50.0);

    let analysis = analyze(&paper);
    assert_eq!(analysis.applied_style, CitationStyle::Mla);
    assert_eq!(analysis.references.len(), 2);
    assert_eq!(
        analysis.citations,
        vec![InTextCitation::new("Ball", None), InTextCitation::new("Arnaz", None)]
    );
    assert!(!analysis.has_issues());
}

#[test]
fn footer_noise_never_reaches_an_entry() {
    let paper = lines(&[
        "Work is cited (Smith, 2020) and (Jones, 2019).",
        "References",
        "Smith, J. (2020). A study of stress. Journal of Things, 4(2), 1-10. Page 5 of 12 - AI Writing Submission Submission ID trn:oid:::1:123",
        "Page 6 of 12 - AI Writing Submission Submission ID trn:oid:::1:123",
        "Jones, K. (2019). Another study. Journal of Stuff, 2(1), 5-9.",
    ]);
    let analysis = analyze(&paper);
    assert_eq!(analysis.references.len(), 2);
    for reference in &analysis.references {
        assert!(!reference.raw.contains("Page"), "{}", reference.raw);
        assert!(!reference.raw.contains("Submission"), "{}", reference.raw);
        assert!(!reference.raw.contains("trn:oid"), "{}", reference.raw);
    }
    assert_eq!(
        analysis.references[0].raw,
        "Smith, J. (2020). A study of stress. Journal of Things, 4(2), 1-10."
    );
    assert!(!analysis.has_issues());
}

#[test]
fn footer_between_merged_entries_keeps_both() {
    let paper = lines(&[
        "References",
        "Smith, J. (2020). A study. Journal of Things, 4(2), 1-10. Page 5 of 12 - AI Writing Submission Submission ID trn:oid:::1:123 Jones, K. (2019). Another study. Journal of Stuff, 2(1), 5-9.",
    ]);
    let section = PaperAnalyzer::new().find_references_section(&paper);
    assert_eq!(
        section,
        vec![
            "Smith, J. (2020). A study. Journal of Things, 4(2), 1-10. Jones, K. (2019). Another study. Journal of Stuff, 2(1), 5-9."
                .to_string()
        ]
    );
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn well_formed_apa_entries_segment_one_to_one() {
    let surnames = ["Adams", "Baker", "Carter", "Dalton", "Evans", "Fischer", "Garcia"];
    let section: Vec<String> = surnames
        .iter()
        .enumerate()
        .map(|(i, name)| {
            format!(
                "{name}, A. B. (20{:02}). Title number {i}. Journal of Tests, {i}(1), 1-9.",
                i + 10
            )
        })
        .collect();

    let config = ParsingConfig::default();
    let entries = segment_apa(&section, &config);
    assert_eq!(entries.len(), surnames.len());

    let analyzer = PaperAnalyzer::new();
    for (i, (entry, name)) in entries.iter().zip(surnames).enumerate() {
        assert_eq!(entry.ref_num, i + 1);
        assert!(entry.text.starts_with(name));
        let parsed = analyzer.parse(entry, CitationStyle::Apa);
        assert_eq!(parsed.year, Some(format!("20{:02}", i + 10)));
        assert_eq!(parsed.authors.as_deref(), Some(format!("{name}, A. B").as_str()));
    }
}

#[test]
fn normalize_author_is_idempotent() {
    for raw in [
        "Smith, J., & Jones, K.",
        "Lee et al.",
        "National Institutes of Health",
        "García-López, M. (Ed.)",
        "Berk, Laura",
        "Jones and colleagues",
        "An, J., & To, H.",
    ] {
        let once = normalize_author(raw);
        assert_eq!(normalize_author(&once), once, "{raw}");
    }
}

#[test]
fn two_author_reference_matches_both_citation_forms() {
    let paper = lines(&[
        "Pairs work well (Smith & Jones, 2020). Later work agreed (Smith et al., 2020).",
        "References",
        "Smith, J., & Jones, K. (2020). Joint work. Journal of Pairs, 1(1), 1-5.",
    ]);
    let analysis = analyze(&paper);
    assert_eq!(analysis.citations.len(), 2);
    assert!(analysis.matching.missing_refs.is_empty());
    assert!(analysis.matching.uncited_refs.is_empty());
}

#[test]
fn yearless_citation_matches_any_year() {
    let citations = vec![InTextCitation::new("Berk", None)];
    let references = vec![AuthorYear::new("Berk, Laura", Some("2013"))];
    let result = match_citations(&citations, &references);
    assert!(result.missing_refs.is_empty());
    assert!(result.uncited_refs.is_empty());
}

#[test]
fn malformed_input_still_yields_an_analysis() {
    for paper in [
        lines(&[]),
        lines(&["References"]),
        lines(&["", "Works Cited", "\"", "((((", "Page 1 of 2"]),
        lines(&["(Smith, 20", "References", "x (2020)"]),
    ] {
        let analysis = analyze(&paper);
        assert!(analysis.total_references <= analysis.references.len());
        assert!(analysis.matching.uncited_refs.len() <= analysis.total_references);
        assert_eq!(analysis.total_citations, analysis.citations.len());
        for (i, reference) in analysis.references.iter().enumerate() {
            assert_eq!(reference.ref_num, i + 1);
        }
    }
}

#[test]
fn papers_can_be_analyzed_on_parallel_workers() {
    let analyzer = PaperAnalyzer::new();
    let apa = lines(&[
        "Exams raise anxiety (Smith, 2020).",
        "References",
        "Smith, J. (2020). A study. Journal of Things, 4(2), 1-10.",
        "Jones, K. (2019). Another study. Journal of Stuff, 2(1), 5-9.",
    ]);
    let mla = lines(&[
        "Comedy matters (Ball 45).",
        "Works Cited",
        "Ball, Lucille. \"Comedy and the Home.\" Television Quarterly, vol. 3, 1998, pp. 4-9.",
        "Arnaz, Desi. A Book. Random House, 1976.",
    ]);

    let (a, m) = std::thread::scope(|scope| {
        let a = scope.spawn(|| analyzer.analyze(&apa));
        let m = scope.spawn(|| analyzer.analyze(&mla));
        (a.join().unwrap(), m.join().unwrap())
    });

    assert_eq!(a, analyzer.analyze(&apa));
    assert_eq!(m, analyzer.analyze(&mla));
    assert_eq!(m.matching.uncited_refs, vec![AuthorYear::new("Arnaz, Desi", Some("1976"))]);
}
