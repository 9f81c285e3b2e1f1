//! Suture - fact extraction and source patching for automated program repair.
//!
//! Suture parses a single C or C++ translation unit with tree-sitter and
//! produces a scope-attributed, ordered list of facts (function definitions,
//! variable declarations, declaration-statements, call sites) for a
//! downstream repair/search algorithm. Separately, it applies exact,
//! span-addressed text replacements to source files to materialize candidate
//! patches.
//!
//! # Architecture
//!
//! - `dialect`: grammar selection and checked parsing (the front-end seam)
//! - `span` / `facts`: value types for spans and the four fact kinds
//! - `scope`: the explicit scope stack maintained during traversal
//! - `typing`: declarator shapes, data-layout widths, argument typing
//! - `collect`: the pre-order walk that emits facts
//! - `store`: ordered per-scope accumulation and the JSON export shape
//! - `patch`: span→offset resolution and atomic in-place replacement
//!
//! Both entry points are synchronous and self-contained: each call owns its
//! parse, its result, and nothing else. Callers that operate on the same
//! file concurrently must serialize those calls themselves.

pub mod cli;
pub mod collect;
pub mod dialect;
pub mod error;
pub mod facts;
pub mod layout;
pub mod patch;
pub mod scope;
pub mod span;
pub mod store;
pub mod typing;

pub use collect::{CollectorConfig, FactCollector, UnresolvedCallPolicy};
pub use dialect::Dialect;
pub use error::{Diagnostic, Error, Result};
pub use facts::{CallArg, Fact, ScopeId};
pub use patch::SourcePatcher;
pub use scope::ScopeTracker;
pub use span::SourceSpan;
pub use store::FactStore;

use std::path::Path;

/// Extract all facts from the file at `path`, parsed under `dialect`.
///
/// The store's `module_name` is the path as given.
pub fn extract_ast(path: &Path, dialect: Dialect) -> Result<FactStore> {
    let source = std::fs::read_to_string(path)?;
    FactCollector::new(dialect).collect(&source, &path.to_string_lossy())
}

/// Replace the text addressed by `span` in the file at `path`, parsed under
/// `dialect`. On failure the file is unchanged.
pub fn transform(
    path: &Path,
    dialect: Dialect,
    span: SourceSpan,
    replacement: &str,
) -> Result<()> {
    SourcePatcher::new(dialect).transform(path, span, replacement)
}
