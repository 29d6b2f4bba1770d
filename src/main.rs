use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tidyup::{ExternalConverter, Housekeeper, InPlaceConverter, LineEndingConverter, Operation};
use tidyup::{PatternTable, RunOptions};
use tracing::{debug, trace};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Remove build droppings and normalize line endings in a source tree",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory to operate on (defaults to current directory)
    #[arg(long, short = 'C', global = true, default_value = ".")]
    directory: PathBuf,

    /// Show what would be removed or converted, but don't touch anything
    #[arg(long, global = true)]
    dry_run: bool,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress the summary
    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Delete *.so, *.o, *.pyc and *~ from the top directory
    Clean,
    /// Delete bytecode and backups, integrator scratch files in tests/, and .DS_Store
    Cleanup,
    /// Convert text and source files anywhere in the tree to LF line endings
    Unixify {
        /// External line-ending utility to run on each file (e.g. dos2unix)
        #[arg(long, value_name = "PROGRAM")]
        converter: Option<String>,
    },
}

fn init_tracing(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_line_number(verbose >= 3)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    debug!("tidyup started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if !cli.directory.is_dir() {
        bail!("Not a directory: {}", cli.directory.display());
    }

    let patterns = PatternTable::embedded()?;
    let options = RunOptions {
        dry_run: cli.dry_run,
    };
    let housekeeper = Housekeeper::new(&cli.directory, patterns, options);

    let (operation, converter): (Operation, Box<dyn LineEndingConverter>) = match cli.command {
        Command::Clean => (Operation::Clean, Box::new(InPlaceConverter)),
        Command::Cleanup => (Operation::Cleanup, Box::new(InPlaceConverter)),
        Command::Unixify { converter } => (
            Operation::Unixify,
            match converter {
                Some(program) => Box::new(ExternalConverter::new(program)),
                None => Box::new(InPlaceConverter),
            },
        ),
    };

    let report = housekeeper.run(operation, converter.as_ref());

    if !cli.quiet {
        report.print_summary(cli.verbose > 0 || cli.dry_run);
    }

    // Per-file failures are already reported; housekeeping always finishes with success
    debug!(
        "{} finished with {} failure(s)",
        operation,
        report.failures.len()
    );

    Ok(())
}
