use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the per-project config file looked up in the working directory.
pub const LOCAL_CONFIG_NAME: &str = ".citecheck.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub parsing: Option<ParsingFileConfig>,
    pub output: Option<OutputConfig>,
}

/// `[parsing]`: heuristic thresholds and pattern overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsingFileConfig {
    pub split_min_prefix_len: Option<usize>,
    pub min_entry_len: Option<usize>,
    pub mla_year_window: Option<usize>,
    pub mla_author_max_len: Option<usize>,
    pub narrative_year_window: Option<usize>,
    pub style_sample_refs: Option<usize>,
    pub style_sample_paragraphs: Option<usize>,
    /// Regex replacing the reference-section header test.
    pub section_header: Option<String>,
    /// Regex replacing the end-of-section test.
    pub section_end: Option<String>,
    /// Publisher names added to the built-in list.
    pub extra_publishers: Option<Vec<String>>,
    /// Attribution verbs added to the built-in MLA narrative list.
    pub extra_narrative_verbs: Option<Vec<String>>,
}

/// `[output]`: display preferences for the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub color: Option<bool>,
    /// `text` or `json`.
    pub format: Option<String>,
    pub show_references: Option<bool>,
}

/// Platform config directory path: `<config_dir>/citecheck/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("citecheck").join("config.toml"))
}

/// Load config by cascading CWD `.citecheck.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(LOCAL_CONFIG_NAME));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed; parse failures are logged.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    if !path.exists() {
        return None;
    }
    match read_config(path) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "loaded config file");
            Some(config)
        }
        Err(e) => {
            tracing::warn!(error = %e, "ignoring config file");
            None
        }
    }
}

/// Read and parse a config file, reporting why it could not be used.
pub fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        parsing: merge_section(base.parsing, overlay.parsing, merge_parsing),
        output: merge_section(base.output, overlay.output, merge_output),
    }
}

fn merge_section<T>(base: Option<T>, overlay: Option<T>, f: fn(T, T) -> T) -> Option<T> {
    match (base, overlay) {
        (Some(b), Some(o)) => Some(f(b, o)),
        (b, o) => o.or(b),
    }
}

fn merge_parsing(base: ParsingFileConfig, overlay: ParsingFileConfig) -> ParsingFileConfig {
    ParsingFileConfig {
        split_min_prefix_len: overlay.split_min_prefix_len.or(base.split_min_prefix_len),
        min_entry_len: overlay.min_entry_len.or(base.min_entry_len),
        mla_year_window: overlay.mla_year_window.or(base.mla_year_window),
        mla_author_max_len: overlay.mla_author_max_len.or(base.mla_author_max_len),
        narrative_year_window: overlay.narrative_year_window.or(base.narrative_year_window),
        style_sample_refs: overlay.style_sample_refs.or(base.style_sample_refs),
        style_sample_paragraphs: overlay
            .style_sample_paragraphs
            .or(base.style_sample_paragraphs),
        section_header: overlay.section_header.or(base.section_header),
        section_end: overlay.section_end.or(base.section_end),
        extra_publishers: overlay.extra_publishers.or(base.extra_publishers),
        extra_narrative_verbs: overlay.extra_narrative_verbs.or(base.extra_narrative_verbs),
    }
}

fn merge_output(base: OutputConfig, overlay: OutputConfig) -> OutputConfig {
    OutputConfig {
        color: overlay.color.or(base.color),
        format: overlay.format.or(base.format),
        show_references: overlay.show_references.or(base.show_references),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_deserializes() {
        let toml_str = "[parsing]\nmin_entry_len = 25\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        let parsing = parsed.parsing.unwrap();
        assert_eq!(parsing.min_entry_len, Some(25));
        assert!(parsing.section_header.is_none());
        assert!(parsed.output.is_none());
    }

    #[test]
    fn merge_overlay_wins_per_field() {
        let base = ConfigFile {
            parsing: Some(ParsingFileConfig {
                min_entry_len: Some(10),
                mla_year_window: Some(60),
                ..Default::default()
            }),
            output: Some(OutputConfig {
                color: Some(false),
                ..Default::default()
            }),
        };
        let overlay = ConfigFile {
            parsing: Some(ParsingFileConfig {
                min_entry_len: Some(30),
                ..Default::default()
            }),
            output: None,
        };
        let merged = merge(base, overlay);
        let parsing = merged.parsing.unwrap();
        assert_eq!(parsing.min_entry_len, Some(30));
        assert_eq!(parsing.mla_year_window, Some(60));
        assert_eq!(merged.output.unwrap().color, Some(false));
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[output]\nformat = \"json\"\n").unwrap();
        let config = load_from_path(&path).unwrap();
        assert_eq!(config.output.unwrap().format.as_deref(), Some("json"));
    }

    #[test]
    fn load_from_path_missing_or_invalid_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("absent.toml")).is_none());

        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[parsing\nmin_entry_len = ").unwrap();
        assert!(load_from_path(&path).is_none());
        assert!(matches!(read_config(&path), Err(ConfigError::Parse { .. })));
    }
}
