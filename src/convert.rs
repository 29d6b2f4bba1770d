//! Line-ending conversion: a pure byte transform plus the converters that
//! apply it to files on disk.

use crate::error::ConversionError;

use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;

/// Outcome of converting one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// The file had CR or CRLF terminators and was rewritten
    Converted,
    /// The file already used LF only and was left alone
    Unchanged,
}

/// Rewrite CRLF and lone CR terminators to LF. Every other byte is kept.
///
/// Borrows the input when there is nothing to change, so callers can tell
/// an already-normalized file apart without comparing buffers.
pub fn normalize_line_endings(input: &[u8]) -> Cow<'_, [u8]> {
    let Some(first_cr) = input.iter().position(|&b| b == b'\r') else {
        return Cow::Borrowed(input);
    };

    let mut out = Vec::with_capacity(input.len());
    out.extend_from_slice(&input[..first_cr]);

    let mut bytes = input[first_cr..].iter().peekable();
    while let Some(&b) = bytes.next() {
        if b == b'\r' {
            // CRLF collapses to one LF
            if bytes.peek() == Some(&&b'\n') {
                bytes.next();
            }
            out.push(b'\n');
        } else {
            out.push(b);
        }
    }

    Cow::Owned(out)
}

/// Something that can normalize a file's line endings in place
pub trait LineEndingConverter {
    fn convert(&self, path: &Path) -> Result<Conversion, ConversionError>;

    /// Short name used in log lines
    fn name(&self) -> &str;
}

/// Built-in converter: rewrites the file through a sibling temp file
#[derive(Debug, Default, Clone, Copy)]
pub struct InPlaceConverter;

impl InPlaceConverter {
    /// Check what a conversion would do without writing anything
    pub fn inspect(&self, path: &Path) -> Result<Conversion, ConversionError> {
        let content = fs::read(path).map_err(ConversionError::Read)?;
        check_text(&content)?;
        Ok(match normalize_line_endings(&content) {
            Cow::Borrowed(_) => Conversion::Unchanged,
            Cow::Owned(_) => Conversion::Converted,
        })
    }
}

impl LineEndingConverter for InPlaceConverter {
    fn convert(&self, path: &Path) -> Result<Conversion, ConversionError> {
        let content = fs::read(path).map_err(ConversionError::Read)?;
        check_text(&content)?;

        let normalized = match normalize_line_endings(&content) {
            Cow::Borrowed(_) => return Ok(Conversion::Unchanged),
            Cow::Owned(bytes) => bytes,
        };

        rewrite_preserving_permissions(path, &normalized).map_err(ConversionError::Write)?;
        Ok(Conversion::Converted)
    }

    fn name(&self) -> &str {
        "builtin"
    }
}

fn check_text(content: &[u8]) -> Result<(), ConversionError> {
    if content.contains(&0) {
        return Err(ConversionError::Binary);
    }
    Ok(())
}

/// Replace `path` with `content` atomically, keeping its permission bits
fn rewrite_preserving_permissions(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let permissions = fs::metadata(path)?.permissions();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    fs::set_permissions(temp.path(), permissions)?;
    temp.persist(path).map_err(|err| err.error)?;

    Ok(())
}

/// Converter that shells out to a line-ending utility such as `dos2unix`,
/// passing the file path as the only argument.
#[derive(Debug, Clone)]
pub struct ExternalConverter {
    program: String,
}

impl ExternalConverter {
    pub fn new(program: impl Into<String>) -> Self {
        ExternalConverter {
            program: program.into(),
        }
    }
}

impl LineEndingConverter for ExternalConverter {
    fn convert(&self, path: &Path) -> Result<Conversion, ConversionError> {
        let output = Command::new(&self.program)
            .arg(path)
            .output()
            .map_err(|source| ConversionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ConversionError::ExternalFailed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        // The utility does not tell us whether anything changed
        Ok(Conversion::Converted)
    }

    fn name(&self) -> &str {
        &self.program
    }
}
