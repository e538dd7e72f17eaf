use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use citecheck_core::config_file::{self, ConfigFile};
use citecheck_core::{CitationStyle, PaperAnalysis};
use citecheck_ingest::{ingest_paths, load_paper, paper_code};
use citecheck_parsing::{analyzer_from_file_config, PaperAnalyzer};
use tracing_subscriber::EnvFilter;

mod output;

use output::{ColorMode, PaperReport};

/// Citation Checker - Cross-check in-text citations against reference lists in student papers
#[derive(Parser, Debug)]
#[command(name = "citecheck", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log pipeline decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check papers for uncited references and citations without a reference
    Check {
        /// Text files or folders of text files to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Path to output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Force a citation style instead of the detected one
        #[arg(long, value_enum)]
        style: Option<StyleArg>,

        /// Path to a TOML config file (default: ./.citecheck.toml over the user config)
        #[arg(long)]
        config: Option<PathBuf>,

        /// List the parsed references of each paper
        #[arg(long)]
        show_references: bool,
    },

    /// Detect the citation style of papers without checking citations
    Style {
        /// Text files or folders of text files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Dry run: segment and parse one paper's references and print them
    DryRun {
        /// Text file of the paper
        path: PathBuf,

        /// Force a citation style instead of the detected one
        #[arg(long, value_enum)]
        style: Option<StyleArg>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StyleArg {
    Apa,
    Mla,
}

impl From<StyleArg> for CitationStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Apa => CitationStyle::Apa,
            StyleArg::Mla => CitationStyle::Mla,
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("citecheck=debug,citecheck_core=debug,citecheck_parsing=debug,citecheck_ingest=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Check {
            paths,
            no_color,
            output,
            format,
            style,
            config,
            show_references,
        } => check(CheckArgs {
            paths,
            no_color,
            output,
            format,
            style: style.map(CitationStyle::from),
            config,
            show_references,
        }),
        Command::Style { paths, config } => detect(&paths, config),
        Command::DryRun {
            path,
            style,
            no_color,
            config,
        } => dry_run(&path, style.map(CitationStyle::from), no_color, config),
    }
}

/// Load the config file: an explicit path (flag, then `CITECHECK_CONFIG`)
/// must parse; otherwise the local/user cascade is used.
fn resolve_config(flag: Option<PathBuf>) -> anyhow::Result<ConfigFile> {
    let explicit = flag.or_else(|| std::env::var_os("CITECHECK_CONFIG").map(PathBuf::from));
    match explicit {
        Some(path) => Ok(config_file::read_config(&path)?),
        None => Ok(config_file::load_config()),
    }
}

fn build_analyzer(config: &ConfigFile) -> anyhow::Result<PaperAnalyzer> {
    analyzer_from_file_config(config.parsing.as_ref()).context("invalid [parsing] configuration")
}

/// Colors are on unless disabled by flag, `NO_COLOR`, the config file, or
/// output going to a file.
fn color_mode(no_color: bool, to_file: bool, config: &ConfigFile) -> ColorMode {
    let config_color = config.output.as_ref().and_then(|o| o.color).unwrap_or(true);
    let env_off = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    ColorMode(!no_color && !to_file && !env_off && config_color)
}

fn parse_format(value: &str) -> Option<OutputFormat> {
    match value.trim().to_ascii_lowercase().as_str() {
        "text" => Some(OutputFormat::Text),
        "json" => Some(OutputFormat::Json),
        other => {
            tracing::warn!(format = other, "ignoring unknown output format");
            None
        }
    }
}

struct CheckArgs {
    paths: Vec<PathBuf>,
    no_color: bool,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    style: Option<CitationStyle>,
    config: Option<PathBuf>,
    show_references: bool,
}

fn check(args: CheckArgs) -> anyhow::Result<()> {
    // Resolve configuration: CLI flags > env vars > config file > defaults
    let config = resolve_config(args.config)?;
    let output_config = config.output.clone().unwrap_or_default();
    let format = args
        .format
        .or_else(|| std::env::var("CITECHECK_FORMAT").ok().and_then(|v| parse_format(&v)))
        .or_else(|| output_config.format.as_deref().and_then(parse_format))
        .unwrap_or(OutputFormat::Text);
    let show_references = args.show_references || output_config.show_references.unwrap_or(false);
    let color = color_mode(
        args.no_color || format == OutputFormat::Json,
        args.output.is_some(),
        &config,
    );

    let analyzer = build_analyzer(&config)?;
    let papers = ingest_paths(&args.paths)?;

    let analyses: Vec<PaperAnalysis> = papers
        .iter()
        .map(|paper| analyzer.analyze_with_style(&paper.lines, args.style))
        .collect();

    let mut writer: Box<dyn Write> = if let Some(ref output_path) = args.output {
        Box::new(
            std::fs::File::create(output_path)
                .with_context(|| format!("cannot create {}", output_path.display()))?,
        )
    } else {
        Box::new(std::io::stdout())
    };

    match format {
        OutputFormat::Json => {
            let reports: Vec<PaperReport> = papers
                .iter()
                .zip(&analyses)
                .map(|(paper, analysis)| PaperReport::new(paper, analysis))
                .collect();
            serde_json::to_writer_pretty(&mut writer, &reports)?;
            writeln!(writer)?;
        }
        OutputFormat::Text => {
            for (paper, analysis) in papers.iter().zip(&analyses) {
                output::print_paper_header(&mut writer, paper, color)?;
                output::print_style(&mut writer, &analysis.style, analysis.applied_style, color)?;
                if show_references {
                    output::print_references(&mut writer, &analysis.references, color)?;
                }
                output::print_citation_report(&mut writer, analysis, color)?;
                writeln!(writer)?;
            }
            output::print_summary(&mut writer, &analyses, color)?;
        }
    }

    writer.flush()?;
    Ok(())
}

fn detect(paths: &[PathBuf], config: Option<PathBuf>) -> anyhow::Result<()> {
    let config = resolve_config(config)?;
    let analyzer = build_analyzer(&config)?;
    let papers = ingest_paths(paths)?;

    let stdout = std::io::stdout();
    let mut writer = stdout.lock();
    for paper in &papers {
        let verdict = analyzer.detect_style(&paper.lines);
        output::print_style_row(&mut writer, paper, &verdict)?;
    }
    Ok(())
}

fn dry_run(
    path: &Path,
    style: Option<CitationStyle>,
    no_color: bool,
    config: Option<PathBuf>,
) -> anyhow::Result<()> {
    use owo_colors::OwoColorize;

    let config = resolve_config(config)?;
    let analyzer = build_analyzer(&config)?;
    let color = color_mode(no_color, false, &config);
    let paper = load_paper(path, paper_code(1))?;

    let lines: Vec<String> = paper
        .lines
        .iter()
        .map(|l| citecheck_parsing::expand_ligatures(l))
        .collect();
    let verdict = analyzer.detect_style(&lines);
    let applied = citecheck_parsing::strategy_for(style.unwrap_or(verdict.style)).style();
    let section = analyzer.find_references_section(&lines);
    let references: Vec<_> = analyzer
        .segment(&section, applied)
        .iter()
        .map(|entry| analyzer.parse(entry, applied))
        .collect();

    let stdout = std::io::stdout();
    let mut writer = stdout.lock();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    if color.enabled() {
        writeln!(
            writer,
            "{} {} ({} section lines, {} entries)",
            "DRY RUN:".bold().cyan(),
            file_name.bold(),
            section.len(),
            references.len()
        )?;
    } else {
        writeln!(
            writer,
            "DRY RUN: {} ({} section lines, {} entries)",
            file_name,
            section.len(),
            references.len()
        )?;
    }
    output::print_style(&mut writer, &verdict, applied, color)?;
    writeln!(writer)?;
    output::print_references(&mut writer, &references, color)?;
    writeln!(writer)?;
    writeln!(writer, "Total: {} references", references.len())?;

    Ok(())
}
