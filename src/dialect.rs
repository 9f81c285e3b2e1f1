//! Grammar dialect selection.
//!
//! A dialect names the grammar variant a translation unit is parsed under.
//! Dialect choice affects how declarators and dialect-sensitive constructs
//! tokenize, and therefore how spans resolve.

use std::fmt;
use std::str::FromStr;

use tree_sitter::{Language, Parser, Tree};

use crate::error::{Diagnostic, Error, Result};
use crate::span::SourceSpan;

/// Supported grammar dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// C, parsed with the tree-sitter C grammar.
    #[default]
    C,
    /// C++, parsed with the tree-sitter C++ grammar.
    Cxx,
}

impl Dialect {
    /// The tree-sitter language for this dialect.
    pub fn language(&self) -> Language {
        match self {
            Dialect::C => tree_sitter_c::LANGUAGE.into(),
            Dialect::Cxx => tree_sitter_cpp::LANGUAGE.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::C => "c",
            Dialect::Cxx => "cpp",
        }
    }

    /// Parse source under this dialect.
    ///
    /// The returned tree may still contain error nodes; callers that require
    /// a clean parse should use [`Dialect::parse_checked`].
    pub fn parse(&self, source: &[u8]) -> Result<Tree> {
        let mut parser = Parser::new();
        parser.set_language(&self.language())?;
        parser.parse(source, None).ok_or_else(|| Error::Parse {
            diagnostics: vec![Diagnostic {
                message: format!("the {} parser produced no tree", self.name()),
                span: SourceSpan {
                    start_line: 1,
                    start_col: 1,
                    end_line: 1,
                    end_col: 1,
                },
            }],
        })
    }

    /// Parse source and fail with [`Error::Parse`] if the tree contains any
    /// syntax errors.
    pub fn parse_checked(&self, source: &[u8]) -> Result<Tree> {
        let tree = self.parse(source)?;
        let diagnostics = collect_diagnostics(&tree, source);
        if diagnostics.is_empty() {
            Ok(tree)
        } else {
            Err(Error::Parse { diagnostics })
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "c" | "c99" | "c11" | "c17" => Ok(Dialect::C),
            "cpp" | "c++" | "cxx" => Ok(Dialect::Cxx),
            _ => Err(format!("unknown dialect: {} (expected 'c' or 'cpp')", s)),
        }
    }
}

/// Collect diagnostics for every error or missing node in the tree.
pub fn collect_diagnostics(tree: &Tree, source: &[u8]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let root = tree.root_node();
    if root.has_error() {
        visit_errors(root, source, &mut diagnostics);
    }
    diagnostics
}

fn visit_errors(node: tree_sitter::Node, source: &[u8], out: &mut Vec<Diagnostic>) {
    if node.is_error() {
        let snippet: String = node
            .utf8_text(source)
            .unwrap_or("")
            .chars()
            .take(40)
            .collect();
        out.push(Diagnostic {
            message: format!("syntax error near `{}`", snippet.trim()),
            span: SourceSpan::from_node(node),
        });
        return;
    }
    if node.is_missing() {
        out.push(Diagnostic {
            message: format!("missing `{}`", node.kind()),
            span: SourceSpan::from_node(node),
        });
        return;
    }
    // Only subtrees flagged with errors need descending into.
    if !node.has_error() {
        return;
    }
    for child in node.children(&mut node.walk()) {
        visit_errors(child, source, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_c_source() {
        let tree = Dialect::C.parse_checked(b"int main(void) { return 0; }").unwrap();
        assert_eq!(tree.root_node().kind(), "translation_unit");
    }

    #[test]
    fn parses_cpp_source() {
        let src = b"namespace demo { int run() { return 1; } }";
        assert!(Dialect::Cxx.parse_checked(src).is_ok());
    }

    #[test]
    fn reports_syntax_errors() {
        let err = Dialect::C.parse_checked(b"int main( { return 0 }").unwrap_err();
        match err {
            Error::Parse { diagnostics } => assert!(!diagnostics.is_empty()),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn dialect_names_round_trip() {
        assert_eq!("c".parse::<Dialect>().unwrap(), Dialect::C);
        assert_eq!("C++".parse::<Dialect>().unwrap(), Dialect::Cxx);
        assert_eq!("cpp".parse::<Dialect>().unwrap(), Dialect::Cxx);
        assert!("fortran".parse::<Dialect>().is_err());
    }
}
