//! Tidyup - build housekeeping for a source tree
//!
//! Three fixed operations, each driven by the pattern tables in `patterns.toml`:
//!
//! - `clean` removes compiled objects, bytecode and editor backups from the top directory
//! - `cleanup` also clears integrator scratch files out of `tests/`
//! - `unixify` walks the whole tree and rewrites text files to LF line endings
//!
//! Every operation is best-effort: missing files are skipped, and a failure on
//! one file is reported without stopping the rest.

pub mod convert;
pub mod error;
pub mod patterns;
pub mod report;
pub mod runner;

// Re-export commonly used items
pub use convert::{
    normalize_line_endings, Conversion, ExternalConverter, InPlaceConverter, LineEndingConverter,
};
pub use error::{ConversionError, HousekeepingError};
pub use patterns::{DeletionTarget, PatternTable, TextFilePatterns};
pub use report::{RemovedFile, RunReport};
pub use runner::{Housekeeper, Operation, RunOptions};
