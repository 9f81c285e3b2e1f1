//! Source span value type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A contiguous region of source text, addressed by 1-indexed line/column
/// positions.
///
/// `(start_line, start_col)` names the first character of the region;
/// `(end_line, end_col)` names the position one past its last character, so a
/// span addresses the half-open byte region `[start, end)`. Replacing a
/// fact's span through [`crate::SourcePatcher`] therefore replaces exactly
/// the fact's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed, one past the last character).
    pub end_col: usize,
}

impl SourceSpan {
    /// Create a span, rejecting inverted ranges.
    pub fn new(
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Result<Self, Error> {
        if start_line == 0 || start_col == 0 || end_line == 0 || end_col == 0 {
            return Err(Error::InvalidLocation {
                line: start_line.min(end_line),
                col: start_col.min(end_col),
                reason: "lines and columns are 1-indexed",
            });
        }
        if start_line > end_line || (start_line == end_line && start_col > end_col) {
            return Err(Error::InvalidLocation {
                line: end_line,
                col: end_col,
                reason: "span end precedes span start",
            });
        }
        Ok(Self {
            start_line,
            start_col,
            end_line,
            end_col,
        })
    }

    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_col, self.end_line, self.end_col
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_span_is_accepted() {
        let span = SourceSpan::new(3, 1, 3, 10).unwrap();
        assert_eq!(span.to_string(), "3:1-3:10");
    }

    #[test]
    fn single_point_span_is_accepted() {
        assert!(SourceSpan::new(5, 7, 5, 7).is_ok());
    }

    #[test]
    fn inverted_span_is_rejected() {
        assert!(matches!(
            SourceSpan::new(4, 1, 3, 1),
            Err(Error::InvalidLocation { .. })
        ));
        assert!(matches!(
            SourceSpan::new(4, 9, 4, 2),
            Err(Error::InvalidLocation { .. })
        ));
    }

    #[test]
    fn zero_index_is_rejected() {
        assert!(SourceSpan::new(0, 1, 1, 1).is_err());
        assert!(SourceSpan::new(1, 0, 1, 1).is_err());
    }
}
