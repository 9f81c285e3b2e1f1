//! Error taxonomy for extraction and patching.

use serde::Serialize;
use thiserror::Error;

use crate::span::SourceSpan;

/// A single parser diagnostic: what went wrong and where.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub span: SourceSpan,
}

/// Failures surfaced by the engine.
///
/// Every failure is returned to the caller as a value; nothing is retried
/// internally and no global error state exists. Unresolvable call targets are
/// not errors (see [`crate::UnresolvedCallPolicy`]), and skipped
/// extern/prototype declarations are silent, documented behavior.
#[derive(Debug, Error)]
pub enum Error {
    /// The source did not parse under the requested dialect. Extraction
    /// returns no facts; patching leaves the file untouched.
    #[error("source failed to parse: {} syntax error(s)", .diagnostics.len())]
    Parse { diagnostics: Vec<Diagnostic> },

    /// A patch span lies outside the file or is inverted. The file is left
    /// byte-identical to its pre-call state.
    #[error("invalid location {line}:{col}: {reason}")]
    InvalidLocation {
        line: usize,
        col: usize,
        reason: &'static str,
    },

    /// The file could not be read, or the patched content could not be
    /// persisted. On a write failure the original file is unchanged: the new
    /// content is fully assembled and written to a temporary file before the
    /// destination is touched.
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The dialect's grammar was rejected by the tree-sitter runtime
    /// (ABI/version mismatch).
    #[error("grammar error: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_reports_diagnostic_count() {
        let err = Error::Parse {
            diagnostics: vec![
                Diagnostic {
                    message: "syntax error".to_string(),
                    span: SourceSpan::new(1, 1, 1, 2).unwrap(),
                },
                Diagnostic {
                    message: "missing ;".to_string(),
                    span: SourceSpan::new(2, 1, 2, 1).unwrap(),
                },
            ],
        };
        assert_eq!(err.to_string(), "source failed to parse: 2 syntax error(s)");
    }

    #[test]
    fn invalid_location_formats_position() {
        let err = Error::InvalidLocation {
            line: 99,
            col: 1,
            reason: "line is past the end of the file",
        };
        assert!(err.to_string().contains("99:1"));
    }
}
