//! Span-addressed source patching.
//!
//! A patch replaces the bytes a [`SourceSpan`] addresses with arbitrary
//! replacement text and persists the result in place. The replacement is not
//! validated syntactically: producing a file that no longer parses is an
//! expected use (exploratory patch candidates are built to be compiled and
//! tested by the caller).

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::span::SourceSpan;

/// Applies one textual replacement per call, addressed by line/column span.
///
/// On any failure the target file is left byte-identical to its pre-call
/// state: the patched buffer is fully assembled in memory and written to a
/// temporary file before the destination is replaced.
pub struct SourcePatcher {
    dialect: Dialect,
}

impl SourcePatcher {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Replace the bytes addressed by `span` with `replacement` and persist
    /// the result to `path`.
    ///
    /// Fails with [`Error::Parse`] if the file does not parse under the
    /// patcher's dialect, [`Error::InvalidLocation`] if either endpoint lies
    /// outside the file or the resolved offsets are inverted, and
    /// [`Error::Io`] if the file cannot be read or the result cannot be
    /// persisted.
    pub fn transform(&self, path: &Path, span: SourceSpan, replacement: &str) -> Result<()> {
        let original = fs::read(path)?;

        // The parse anchors the span resolution contract: a file that does
        // not parse under the requested dialect is refused before any
        // offsets are computed.
        self.dialect.parse_checked(&original)?;

        let index = LineIndex::new(&original);
        let start = index.offset(span.start_line, span.start_col)?;
        let end = index.offset(span.end_line, span.end_col)?;
        if start > end {
            return Err(Error::InvalidLocation {
                line: span.end_line,
                col: span.end_col,
                reason: "span end resolves before span start",
            });
        }

        let mut patched =
            Vec::with_capacity(original.len() - (end - start) + replacement.len());
        patched.extend_from_slice(&original[..start]);
        patched.extend_from_slice(replacement.as_bytes());
        patched.extend_from_slice(&original[end..]);

        atomic_write(path, &patched)
    }
}

/// Byte offsets of every line start, for span→offset resolution.
struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    fn new(source: &[u8]) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in source.iter().enumerate() {
            if *byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            len: source.len(),
        }
    }

    /// Resolve a 1-indexed line/column position to a byte offset.
    ///
    /// A column may point one past the last character of its line (that is
    /// how a span covers the line's full text).
    fn offset(&self, line: usize, col: usize) -> Result<usize> {
        if line == 0 || col == 0 {
            return Err(Error::InvalidLocation {
                line,
                col,
                reason: "lines and columns are 1-indexed",
            });
        }
        if line > self.line_starts.len() {
            return Err(Error::InvalidLocation {
                line,
                col,
                reason: "line is past the end of the file",
            });
        }
        let line_start = self.line_starts[line - 1];
        let line_end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.len);
        let offset = line_start + (col - 1);
        if offset > line_end {
            return Err(Error::InvalidLocation {
                line,
                col,
                reason: "column is past the end of the line",
            });
        }
        Ok(offset)
    }
}

/// Write `content` to `path` atomically: tempfile in the same directory,
/// flush, then rename over the destination. A failure at any step leaves the
/// original file untouched.
fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut temp = match parent {
        Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
        None => tempfile::NamedTempFile::new_in(".")?,
    };
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
