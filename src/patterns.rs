//! Pattern table loading and matching from patterns.toml.

use crate::runner::Operation;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

// Embed the TOML file directly in the binary at compile time
const PATTERNS_TOML: &str = include_str!("../patterns.toml");

/// Structure to deserialize the pattern tables from TOML
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableConfig {
    clean: DeletionConfig,
    cleanup: DeletionConfig,
    unixify: TextFileConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeletionConfig {
    targets: Vec<TargetConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TargetConfig {
    dir: String,
    patterns: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TextFileConfig {
    #[serde(default)]
    extensions: Vec<String>,
    #[serde(default)]
    names: Vec<String>,
}

/// One directory and the file-name globs deleted from it
#[derive(Debug, Clone)]
pub struct DeletionTarget {
    /// Directory relative to the working directory ("." for the directory itself)
    pub dir: PathBuf,
    /// Patterns as written in the table, in order
    pub patterns: Vec<String>,
    matcher: GlobSet,
}

impl DeletionTarget {
    /// Check a bare file name against this target's patterns
    pub fn matches(&self, file_name: &OsStr) -> bool {
        self.matcher.is_match(Path::new(file_name))
    }
}

/// File names whose line endings `unixify` normalizes
#[derive(Debug, Clone)]
pub struct TextFilePatterns {
    /// Suffixes such as ".py" or ".c.dev"
    pub extensions: Vec<String>,
    /// Exact file names such as "Makefile"
    pub names: Vec<String>,
    matcher: GlobSet,
}

impl TextFilePatterns {
    /// Check whether a path's final component is a text file we convert.
    /// Only the file name is considered; parent directories never matter.
    pub fn matches(&self, path: &Path) -> bool {
        match path.file_name() {
            Some(name) => self.matcher.is_match(Path::new(name)),
            None => false,
        }
    }
}

/// All pattern tables, compiled and ready to match
#[derive(Debug, Clone)]
pub struct PatternTable {
    clean: Vec<DeletionTarget>,
    cleanup: Vec<DeletionTarget>,
    unixify: TextFilePatterns,
}

impl PatternTable {
    /// Load the tables compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(PATTERNS_TOML).context("Failed to load embedded patterns.toml")
    }

    /// Parse and compile tables from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TableConfig =
            toml::from_str(content).context("Failed to parse pattern tables")?;

        Ok(PatternTable {
            clean: compile_targets(config.clean.targets).context("Invalid [clean] table")?,
            cleanup: compile_targets(config.cleanup.targets).context("Invalid [cleanup] table")?,
            unixify: compile_text_files(config.unixify).context("Invalid [unixify] table")?,
        })
    }

    /// Deletion targets for an operation, in table order. Empty for `unixify`.
    pub fn deletion_targets(&self, operation: Operation) -> &[DeletionTarget] {
        match operation {
            Operation::Clean => &self.clean,
            Operation::Cleanup => &self.cleanup,
            Operation::Unixify => &[],
        }
    }

    pub fn text_files(&self) -> &TextFilePatterns {
        &self.unixify
    }
}

fn compile_targets(targets: Vec<TargetConfig>) -> Result<Vec<DeletionTarget>> {
    targets
        .into_iter()
        .map(|target| {
            let matcher = build_globset(target.patterns.iter().map(String::as_str))
                .with_context(|| format!("Bad pattern for directory '{}'", target.dir))?;
            Ok(DeletionTarget {
                dir: PathBuf::from(target.dir),
                patterns: target.patterns,
                matcher,
            })
        })
        .collect()
}

fn compile_text_files(config: TextFileConfig) -> Result<TextFilePatterns> {
    // Extensions and names are literal text, so escape them before turning
    // them into globs
    let globs: Vec<String> = config
        .extensions
        .iter()
        .map(|ext| format!("*{}", globset::escape(ext)))
        .chain(config.names.iter().map(String::as_str).map(globset::escape))
        .collect();

    let matcher = build_globset(globs.iter().map(String::as_str))?;

    Ok(TextFilePatterns {
        extensions: config.extensions,
        names: config.names,
        matcher,
    })
}

fn build_globset<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        // Patterns only ever see a bare file name, so `*` must not cross a separator
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .with_context(|| format!("Invalid glob pattern '{}'", pattern))?;
        builder.add(glob);
    }

    builder.build().context("Failed to compile glob set")
}
