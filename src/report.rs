//! What a housekeeping run did, and how it is printed.

use crate::error::HousekeepingError;
use crate::runner::Operation;

use colored::Colorize;
use humansize::{format_size, BINARY};
use std::path::PathBuf;

/// A file that was (or in a dry run, would be) deleted
#[derive(Debug, Clone)]
pub struct RemovedFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Everything one invocation touched or failed on
#[derive(Debug)]
pub struct RunReport {
    pub operation: Operation,
    pub dry_run: bool,
    pub removed: Vec<RemovedFile>,
    pub converted: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub failures: Vec<HousekeepingError>,
}

impl RunReport {
    pub fn new(operation: Operation, dry_run: bool) -> Self {
        RunReport {
            operation,
            dry_run,
            removed: Vec::new(),
            converted: Vec::new(),
            unchanged: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn removed_bytes(&self) -> u64 {
        self.removed.iter().map(|r| r.size).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Print the summary: actions on stdout, failures on stderr
    pub fn print_summary(&self, list_files: bool) {
        match self.operation {
            Operation::Clean | Operation::Cleanup => self.print_removals(list_files),
            Operation::Unixify => self.print_conversions(list_files),
        }

        if self.has_failures() {
            eprintln!(
                "{}",
                format!("{} problem(s) reported:", self.failures.len())
                    .red()
                    .bold()
            );
            for failure in &self.failures {
                eprintln!("  - {}", failure.to_string().red());
            }
        }

        if self.dry_run {
            println!("Dry run mode: no files were changed.");
        }
    }

    fn print_removals(&self, list_files: bool) {
        let verb = if self.dry_run { "Would remove" } else { "Removed" };

        if list_files {
            for file in &self.removed {
                println!(
                    "{}: {} ({})",
                    verb,
                    file.path.display(),
                    format_size(file.size, BINARY)
                );
            }
        }

        if self.removed.is_empty() {
            println!("Nothing to clean.");
        } else {
            println!(
                "{} {} file(s), {}",
                verb,
                self.removed.len(),
                format_size(self.removed_bytes(), BINARY).bold().green()
            );
        }
    }

    fn print_conversions(&self, list_files: bool) {
        let verb = if self.dry_run { "Would convert" } else { "Converted" };

        if list_files {
            for path in &self.converted {
                println!("{}: {}", verb, path.display());
            }
        }

        println!(
            "{} {} file(s) to LF line endings ({} already normalized)",
            verb,
            self.converted.len().to_string().bold().green(),
            self.unchanged.len()
        );
    }
}
