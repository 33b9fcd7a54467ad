//! Run configuration.
//!
//! A [`LoadConfig`] names the CSV inputs and where the database file goes. It can be built
//! directly, read from JSON, or read from a plain "paths file":
//!
//! ```text
//! data/people.csv
//! data/orders_*.csv
//! out
//! warehouse
//! ```
//!
//! In a paths file each non-empty line is classified on its own: a line ending in `.csv` is a
//! source (glob patterns allowed), an existing directory is the output directory, and anything
//! else is the database name. Later lines win for the directory and name.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{LoadError, LoadResult};
use crate::source::{RowWidthPolicy, SourceOptions};

/// Database name used when none is configured.
pub const DEFAULT_DATABASE_NAME: &str = "database";

/// File extension of accepted inputs.
pub const CSV_EXTENSION: &str = "csv";

/// Everything a run needs: inputs, output location, parsing policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    /// CSV files (or glob patterns), loaded in this order.
    pub sources: Vec<PathBuf>,
    /// Directory that receives the database file. Empty means the working directory.
    pub output_dir: PathBuf,
    /// Database file name without the `.db` extension.
    pub database_name: String,
    /// Policy for rows whose width differs from the header.
    pub row_width_policy: RowWidthPolicy,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            output_dir: PathBuf::new(),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            row_width_policy: RowWidthPolicy::default(),
        }
    }
}

impl LoadConfig {
    /// Create a config for `sources` with the default output location.
    pub fn new<P: Into<PathBuf>>(sources: impl IntoIterator<Item = P>) -> Self {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Read a config from a JSON file.
    pub fn from_json_path(path: impl AsRef<Path>) -> LoadResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| {
            LoadError::configuration(format!("invalid config {}: {e}", path.display()))
        })
    }

    /// Read a config from a paths file (see the module docs for the format).
    pub fn from_paths_file(path: impl AsRef<Path>) -> LoadResult<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Ok(Self::parse_paths(&text))
    }

    /// Parse paths-file text. Lines are classified against the file system.
    pub fn parse_paths(text: &str) -> Self {
        let mut config = Self::default();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let path = Path::new(line);
            if has_csv_extension(path) {
                config.sources.push(path.to_path_buf());
            } else if path.is_dir() {
                config.output_dir = if line == "." {
                    PathBuf::new()
                } else {
                    path.to_path_buf()
                };
            } else {
                config.database_name = line.to_string();
            }
        }
        config
    }

    /// Path of the database file: `<output_dir>/<database_name>.db`.
    pub fn database_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.db", self.database_name))
    }

    /// Options for building each [`crate::source::TableSource`].
    pub fn source_options(&self) -> SourceOptions {
        SourceOptions {
            row_width_policy: self.row_width_policy,
        }
    }

    /// Expand glob patterns and keep only existing `.csv` files, in configured order.
    ///
    /// An entry naming an existing file is taken as is, even if it contains glob metacharacters
    /// (`sales[2024].csv`), and is kept every time it is listed; loading the same file twice is a
    /// table name collision. Other entries are glob patterns: their matches are sorted and
    /// files already resolved are not added again. Entries that match nothing are logged and
    /// skipped. Fails with [`LoadError::Configuration`] when nothing usable remains or a pattern
    /// is malformed.
    pub fn resolve_sources(&self) -> LoadResult<Vec<PathBuf>> {
        let mut resolved = Vec::new();
        for entry in &self.sources {
            if entry.is_file() {
                if has_csv_extension(entry) {
                    resolved.push(entry.clone());
                } else {
                    warn!(source = %entry.display(), "not a csv file; skipping");
                }
                continue;
            }

            let pattern = entry.to_string_lossy();
            let paths = glob::glob(&pattern).map_err(|e| {
                LoadError::configuration(format!("invalid source pattern '{pattern}': {e}"))
            })?;

            let mut matched: Vec<PathBuf> = paths
                .filter_map(Result::ok)
                .filter(|p| p.is_file() && has_csv_extension(p))
                .collect();
            matched.sort();
            if matched.is_empty() {
                warn!(source = %pattern, "no csv file matches; skipping");
            }
            for path in matched {
                if !resolved.contains(&path) {
                    resolved.push(path);
                }
            }
        }

        if resolved.is_empty() {
            return Err(LoadError::configuration(
                "no valid path to a .csv file was provided",
            ));
        }
        info!(sources = resolved.len(), "resolved csv sources");
        Ok(resolved)
    }

    /// Check that the config can produce a run and return the resolved sources.
    pub fn validate(&self) -> LoadResult<Vec<PathBuf>> {
        if self.database_name.trim().is_empty() {
            return Err(LoadError::configuration("database name is empty"));
        }
        if !self.output_dir.as_os_str().is_empty() && !self.output_dir.is_dir() {
            return Err(LoadError::configuration(format!(
                "output directory does not exist: {}",
                self.output_dir.display()
            )));
        }
        self.resolve_sources()
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(CSV_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_file_classifies_each_line() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_string_lossy().to_string();
        let text = format!("a.csv\n\n  {out}  \nwarehouse\nb.CSV\n");

        let config = LoadConfig::parse_paths(&text);
        assert_eq!(config.sources, vec![PathBuf::from("a.csv"), PathBuf::from("b.CSV")]);
        assert_eq!(config.output_dir, dir.path());
        assert_eq!(config.database_name, "warehouse");
        assert_eq!(config.database_path(), dir.path().join("warehouse.db"));
    }

    #[test]
    fn defaults_to_database_in_working_directory() {
        let config = LoadConfig::parse_paths(".\nx.csv\n");
        assert_eq!(config.database_path(), PathBuf::from("database.db"));
    }

    #[test]
    fn resolve_sources_expands_globs_in_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.csv", "a.csv", "notes.txt"] {
            fs::write(dir.path().join(name), "x\n1\n").unwrap();
        }
        let config = LoadConfig::new([dir.path().join("a.csv"), dir.path().join("*.csv")]);
        let resolved = config.resolve_sources().unwrap();
        assert_eq!(resolved, vec![dir.path().join("a.csv"), dir.path().join("b.csv")]);
    }

    #[test]
    fn existing_file_with_glob_characters_is_used_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["sales[2024].csv", "b.csv"] {
            fs::write(dir.path().join(name), "x\n1\n").unwrap();
        }
        let config = LoadConfig::new([dir.path().join("sales[2024].csv"), dir.path().join("b.csv")]);
        let resolved = config.resolve_sources().unwrap();
        assert_eq!(
            resolved,
            vec![dir.path().join("sales[2024].csv"), dir.path().join("b.csv")]
        );
    }

    #[test]
    fn explicit_duplicates_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        fs::write(&a, "x\n1\n").unwrap();
        let resolved = LoadConfig::new([&a, &a]).resolve_sources().unwrap();
        assert_eq!(resolved, vec![a.clone(), a]);
    }

    #[test]
    fn no_sources_is_a_configuration_error() {
        let err = LoadConfig::new(["does/not/exist.csv"]).validate().unwrap_err();
        assert!(matches!(err, LoadError::Configuration { .. }));
        assert!(err.to_string().contains("no valid path"));
    }

    #[test]
    fn json_config_uses_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("load.json");
        fs::write(
            &path,
            r#"{"sources": ["a.csv"], "row_width_policy": "pad_or_truncate"}"#,
        )
        .unwrap();

        let config = LoadConfig::from_json_path(&path).unwrap();
        assert_eq!(config.sources, vec![PathBuf::from("a.csv")]);
        assert_eq!(config.database_name, DEFAULT_DATABASE_NAME);
        assert_eq!(config.row_width_policy, RowWidthPolicy::PadOrTruncate);
    }
}
