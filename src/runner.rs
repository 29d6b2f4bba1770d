//! The housekeeping runner: pattern-driven deletion and line-ending cleanup.

use crate::convert::{Conversion, InPlaceConverter, LineEndingConverter};
use crate::error::{is_missing_target, HousekeepingError};
use crate::patterns::{DeletionTarget, PatternTable};
use crate::report::{RemovedFile, RunReport};

use ignore::WalkBuilder;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The named housekeeping operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Remove compiled objects, bytecode and editor backups from the top directory
    Clean,
    /// Remove bytecode, editor backups, integrator scratch files under tests/ and .DS_Store
    Cleanup,
    /// Convert text and source files to LF line endings
    Unixify,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Clean => "clean",
            Operation::Cleanup => "cleanup",
            Operation::Unixify => "unixify",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options controlling run behavior (runtime flags)
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub dry_run: bool,
}

/// Runs operations against one root directory
pub struct Housekeeper {
    root: PathBuf,
    patterns: PatternTable,
    options: RunOptions,
}

impl Housekeeper {
    pub fn new(root: impl Into<PathBuf>, patterns: PatternTable, options: RunOptions) -> Self {
        Housekeeper {
            root: root.into(),
            patterns,
            options,
        }
    }

    /// Run an operation to completion. Per-file problems end up in the
    /// report; they never stop the pass.
    pub fn run(&self, operation: Operation, converter: &dyn LineEndingConverter) -> RunReport {
        info!(
            "Running {} in {}{}",
            operation,
            self.root.display(),
            if self.options.dry_run { " (dry run)" } else { "" }
        );

        let mut report = RunReport::new(operation, self.options.dry_run);
        match operation {
            Operation::Clean | Operation::Cleanup => {
                for target in self.patterns.deletion_targets(operation) {
                    self.delete_matching(target, &mut report);
                }
            }
            Operation::Unixify => self.unixify(converter, &mut report),
        }
        report
    }

    /// Delete non-directory entries of one target directory whose names match
    /// its patterns. Does not recurse.
    fn delete_matching(&self, target: &DeletionTarget, report: &mut RunReport) {
        let dir = if target.dir == Path::new(".") {
            self.root.clone()
        } else {
            self.root.join(&target.dir)
        };

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if is_missing_target(&err) => {
                debug!("Skipping missing directory {}", dir.display());
                return;
            }
            Err(err) => {
                self.record(report, HousekeepingError::filesystem(&dir, "read directory", err));
                return;
            }
        };

        let mut matched = Vec::new();
        for entry_result in entries {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(err) => {
                    self.record(report, HousekeepingError::filesystem(&dir, "read entry in", err));
                    continue;
                }
            };

            if target.matches(&entry.file_name()) {
                matched.push(entry.path());
            }
        }
        matched.sort();

        for path in matched {
            // symlink_metadata so a matching symlink is removed itself, not its target
            let metadata = match fs::symlink_metadata(&path) {
                Ok(meta) => meta,
                Err(err) if is_missing_target(&err) => continue,
                Err(err) => {
                    self.record(report, HousekeepingError::filesystem(&path, "stat", err));
                    continue;
                }
            };

            if metadata.is_dir() {
                debug!("Skipping directory {} (only files are removed)", path.display());
                continue;
            }

            if self.options.dry_run {
                debug!("Would remove {}", path.display());
            } else {
                match fs::remove_file(&path) {
                    Ok(()) => info!("Removed {}", path.display()),
                    Err(err) if is_missing_target(&err) => {
                        debug!("Already gone: {}", path.display());
                        continue;
                    }
                    Err(err) => {
                        self.record(report, HousekeepingError::filesystem(&path, "remove", err));
                        continue;
                    }
                }
            }

            report.removed.push(RemovedFile {
                path: self.relative(&path),
                size: metadata.len(),
            });
        }
    }

    /// Walk the whole tree and normalize line endings of every matching regular file
    fn unixify(&self, converter: &dyn LineEndingConverter, report: &mut RunReport) {
        let text_files = self.patterns.text_files();

        // Every directory is entered; only the file-name patterns decide
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .parents(false)
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    self.record(
                        report,
                        HousekeepingError::filesystem(&self.root, "walk", io::Error::other(err)),
                    );
                    continue;
                }
            };

            // Symlinks are not followed, so they report as neither file nor dir here
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            if !text_files.matches(path) {
                continue;
            }

            debug!("Matched text file {}", path.display());

            let outcome = if self.options.dry_run {
                InPlaceConverter.inspect(path)
            } else {
                converter.convert(path)
            };

            match outcome {
                Ok(Conversion::Converted) => {
                    info!("Converted {} ({})", path.display(), converter.name());
                    report.converted.push(self.relative(path));
                }
                Ok(Conversion::Unchanged) => {
                    report.unchanged.push(self.relative(path));
                }
                Err(err) => {
                    self.record(report, HousekeepingError::conversion(path, err));
                }
            }
        }
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }

    fn record(&self, report: &mut RunReport, failure: HousekeepingError) {
        warn!("{}", failure);
        report.failures.push(failure);
    }
}
