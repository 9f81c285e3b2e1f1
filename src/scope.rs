//! Lexical scope context maintained during traversal.

use crate::facts::ScopeId;

/// Tracks which function, if any, the traversal is lexically inside.
///
/// Statement and call nodes carry no parent pointer back to their enclosing
/// declaration, so enclosing-function attribution cannot be recovered after
/// the fact; it is tracked with an explicit stack during the single top-down
/// walk. A stack (rather than one mutable "current function" field) keeps
/// attribution correct for dialects that permit nested function-like scopes.
#[derive(Debug, Default)]
pub struct ScopeTracker {
    stack: Vec<String>,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a function body. The caller is responsible for only entering
    /// real definitions (body present, not `extern`); skipped declarations
    /// must not alter the scope.
    pub fn enter(&mut self, name: impl Into<String>) {
        self.stack.push(name.into());
    }

    /// Leave the most recently entered function. Callers pair this with
    /// [`ScopeTracker::enter`] on every exit path out of a body walk so a
    /// failed emission can never strand a frame.
    pub fn leave(&mut self) -> Option<String> {
        self.stack.pop()
    }

    /// The innermost scope: `Global` when outside any function body.
    pub fn current(&self) -> ScopeId {
        match self.stack.last() {
            Some(name) => ScopeId::Function(name.clone()),
            None => ScopeId::Global,
        }
    }

    pub fn is_global(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
