//! Fact structures extracted from a translation unit.
//!
//! Each fact is a tagged record (the `kind` tag is serialized first) so
//! consumers decode by tag rather than by positional index.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::span::SourceSpan;

/// The lexical attribution unit for a fact: the global namespace or a
/// specific function body.
///
/// Scope identity is the textual function name only. Dialects with overloads
/// or redeclarations can map several declarations onto one scope; downstream
/// consumers that care must disambiguate by span.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScopeId {
    Global,
    Function(String),
}

impl ScopeId {
    pub fn is_global(&self) -> bool {
        matches!(self, ScopeId::Global)
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeId::Global => f.write_str("<global>"),
            ScopeId::Function(name) => f.write_str(name),
        }
    }
}

/// One argument at a call site, in call-site order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallArg {
    /// Verbatim source text of the argument expression.
    pub text: String,
    /// Static type of the argument, after array-to-pointer decay.
    pub type_name: String,
}

/// One structured observation extracted from the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fact {
    /// A function definition (has a body and is not `extern`). Forward
    /// declarations and `extern` functions produce no fact.
    Function { name: String, span: SourceSpan },

    /// A variable declaration. For arrays, `type_name` is the element type
    /// and `extent` the element count (0 when the count is not a compile-time
    /// constant); otherwise `extent` is the byte width of the type on the
    /// target data layout.
    VariableDecl {
        name: String,
        type_name: String,
        is_array: bool,
        extent: u64,
        span: SourceSpan,
    },

    /// A declaration-statement inside a function body, captured verbatim.
    Statement { text: String, span: SourceSpan },

    /// A call expression inside a function body. `callee_name` is `None` for
    /// call targets that cannot be statically resolved (function-pointer
    /// values, member expressions), when the collector is configured to keep
    /// them at all.
    Call {
        text: String,
        callee_name: Option<String>,
        args: Vec<CallArg>,
        span: SourceSpan,
    },
}

impl Fact {
    /// The span this fact was extracted from.
    pub fn span(&self) -> &SourceSpan {
        match self {
            Fact::Function { span, .. }
            | Fact::VariableDecl { span, .. }
            | Fact::Statement { span, .. }
            | Fact::Call { span, .. } => span,
        }
    }

    /// The serialized kind tag.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Fact::Function { .. } => "function",
            Fact::VariableDecl { .. } => "variable_decl",
            Fact::Statement { .. } => "statement",
            Fact::Call { .. } => "call",
        }
    }

    /// The declared or defined name, where the fact kind has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Fact::Function { name, .. } | Fact::VariableDecl { name, .. } => Some(name),
            Fact::Call { callee_name, .. } => callee_name.as_deref(),
            Fact::Statement { .. } => None,
        }
    }
}
