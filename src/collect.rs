//! Depth-first fact collection.
//!
//! One pre-order walk over the translation unit drives scope tracking,
//! symbol recording, and fact emission. Traversal order is the sole ordering
//! authority: facts land in the store in visit order and are never sorted
//! afterwards.

use tree_sitter::Node;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::facts::{CallArg, Fact, ScopeId};
use crate::scope::ScopeTracker;
use crate::span::SourceSpan;
use crate::store::FactStore;
use crate::typing::{self, SymbolTable, VarInfo};

/// Policy for call sites whose target cannot be statically resolved (calls
/// through function-pointer values, member expressions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedCallPolicy {
    /// Drop the call fact.
    #[default]
    Omit,
    /// Record the call with `callee_name: None`.
    EmitAnonymous,
}

/// Collector configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectorConfig {
    pub unresolved_calls: UnresolvedCallPolicy,
}

/// Extracts facts from one translation unit per call.
///
/// Each call parses, walks, and returns a fresh [`FactStore`]; no state
/// survives between calls.
pub struct FactCollector {
    dialect: Dialect,
    config: CollectorConfig,
}

impl FactCollector {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            config: CollectorConfig::default(),
        }
    }

    pub fn with_config(dialect: Dialect, config: CollectorConfig) -> Self {
        Self { dialect, config }
    }

    /// Parse `source` under the collector's dialect and extract all facts.
    ///
    /// Fails with [`crate::Error::Parse`] if the source does not parse; no
    /// partial store is returned.
    pub fn collect(&self, source: &str, module_name: &str) -> Result<FactStore> {
        let tree = self.dialect.parse_checked(source.as_bytes())?;
        let mut walker = Walker {
            source: source.as_bytes(),
            config: self.config,
            store: FactStore::new(module_name),
            scopes: ScopeTracker::new(),
            symbols: SymbolTable::new(),
        };
        walker.visit(tree.root_node(), false);
        Ok(walker.store)
    }
}

struct Walker<'s> {
    source: &'s [u8],
    config: CollectorConfig,
    store: FactStore,
    scopes: ScopeTracker,
    symbols: SymbolTable,
}

impl Walker<'_> {
    fn visit(&mut self, node: Node, suppressed: bool) {
        match node.kind() {
            "function_definition" => self.visit_function(node, suppressed),
            "declaration" => self.visit_declaration(node, suppressed),
            "type_definition" => self.visit_type_definition(node, suppressed),
            "call_expression" => self.visit_call(node, suppressed),
            _ => self.visit_children(node, suppressed),
        }
    }

    fn visit_children(&mut self, node: Node, suppressed: bool) {
        for child in node.named_children(&mut node.walk()) {
            self.visit(child, suppressed);
        }
    }

    /// A function definition opens a new scope; its fact is the first entry
    /// of that scope, followed by its parameters, then whatever the body
    /// walk emits.
    fn visit_function(&mut self, node: Node, suppressed: bool) {
        let shape = node
            .child_by_field_name("declarator")
            .and_then(|d| typing::unwrap_declarator(d, self.source));
        let Some(shape) = shape else {
            self.visit_children(node, suppressed);
            return;
        };

        if suppressed || has_extern_storage(node, self.source) {
            // Skipped definitions do not alter the scope, and nothing inside
            // them is recorded; the subtree is still traversed.
            if let Some(body) = node.child_by_field_name("body") {
                self.visit_children(body, true);
            }
            return;
        }

        if let Some(base) = typing::base_type_of(node, self.source) {
            self.symbols
                .declare_function(&shape.name, shape.return_type(&base));
        }

        let scope = ScopeId::Function(shape.name.clone());
        self.scopes.enter(shape.name.clone());
        self.symbols.push_frame();

        self.store.record(
            &scope,
            Fact::Function {
                name: shape.name.clone(),
                span: SourceSpan::from_node(node),
            },
        );
        self.record_parameters(node, &scope);

        if let Some(body) = node.child_by_field_name("body") {
            self.visit_children(body, false);
        }

        // Paired with the enter above on every path out of the body walk.
        self.symbols.pop_frame();
        self.scopes.leave();
    }

    fn record_parameters(&mut self, function: Node, scope: &ScopeId) {
        let Some(params) = find_function_declarator(function.child_by_field_name("declarator"))
            .and_then(|d| d.child_by_field_name("parameters"))
        else {
            return;
        };
        for param in params.named_children(&mut params.walk()) {
            if param.kind() != "parameter_declaration" {
                continue;
            }
            let Some(base) = typing::base_type_of(param, self.source) else {
                continue;
            };
            // Unnamed parameters (`void`, abstract declarators) have no
            // declarator to record.
            let Some(shape) = param
                .child_by_field_name("declarator")
                .and_then(|d| typing::unwrap_declarator(d, self.source))
            else {
                continue;
            };
            let (type_name, width) = typing::resolve_parameter(&base, &shape);
            self.store.record(
                scope,
                Fact::VariableDecl {
                    name: shape.name.clone(),
                    type_name: type_name.clone(),
                    is_array: false,
                    extent: width,
                    span: SourceSpan::from_node(param),
                },
            );
            self.symbols.declare(
                &shape.name,
                VarInfo {
                    type_name,
                    is_array: false,
                },
            );
        }
    }

    /// A declaration inside a function yields one statement fact (the
    /// verbatim declaration-statement) followed by one variable fact per
    /// declarator; at global scope only the variable facts are emitted.
    /// `extern` declarators and function prototypes yield no variable fact.
    fn visit_declaration(&mut self, node: Node, suppressed: bool) {
        if suppressed {
            self.visit_children(node, true);
            return;
        }

        let scope = self.scopes.current();
        if !scope.is_global() {
            self.store.record(
                &scope,
                Fact::Statement {
                    text: self.text(node).to_string(),
                    span: SourceSpan::from_node(node),
                },
            );
        }

        let is_extern = has_extern_storage(node, self.source);
        let base = typing::base_type_of(node, self.source);
        let mut cursor = node.walk();
        for declarator in node.children_by_field_name("declarator", &mut cursor) {
            let Some(shape) = typing::unwrap_declarator(declarator, self.source) else {
                continue;
            };
            if shape.is_plain_function() {
                // A prototype defines no scope and no fact, but its return
                // type still feeds call-site typing.
                if let Some(base) = &base {
                    self.symbols
                        .declare_function(&shape.name, shape.return_type(base));
                }
                continue;
            }
            if is_extern {
                continue;
            }
            let Some(base) = &base else { continue };
            let (type_name, is_array, extent) = typing::resolve_variable(base, &shape);
            self.store.record(
                &scope,
                Fact::VariableDecl {
                    name: shape.name.clone(),
                    type_name: type_name.clone(),
                    is_array,
                    extent,
                    span: SourceSpan::from_node(node),
                },
            );
            self.symbols.declare(
                &shape.name,
                VarInfo {
                    type_name,
                    is_array,
                },
            );
        }

        // Initializer subtrees may contain calls; they follow the statement
        // and variable facts above, preserving pre-order.
        self.visit_children(node, false);
    }

    fn visit_type_definition(&mut self, node: Node, suppressed: bool) {
        if suppressed {
            return;
        }
        let scope = self.scopes.current();
        if !scope.is_global() {
            self.store.record(
                &scope,
                Fact::Statement {
                    text: self.text(node).to_string(),
                    span: SourceSpan::from_node(node),
                },
            );
        }
    }

    /// Calls outside function bodies are not modeled. An unresolvable callee
    /// is handled per policy and never aborts the walk. Nested calls in the
    /// argument list are visited after their enclosing call.
    fn visit_call(&mut self, node: Node, suppressed: bool) {
        if suppressed || self.scopes.is_global() {
            self.visit_children(node, suppressed);
            return;
        }

        let callee_name = node.child_by_field_name("function").and_then(|callee| {
            match callee.kind() {
                "identifier" | "qualified_identifier" => {
                    Some(self.text(callee).to_string())
                }
                _ => None,
            }
        });

        let emit = callee_name.is_some()
            || self.config.unresolved_calls == UnresolvedCallPolicy::EmitAnonymous;
        if emit {
            let args = match node.child_by_field_name("arguments") {
                Some(list) => list
                    .named_children(&mut list.walk())
                    .filter(|arg| arg.kind() != "comment")
                    .map(|arg| CallArg {
                        text: self.text(arg).to_string(),
                        type_name: typing::type_of_expr(arg, self.source, &self.symbols),
                    })
                    .collect(),
                None => Vec::new(),
            };
            self.store.record(
                &self.scopes.current(),
                Fact::Call {
                    text: self.text(node).to_string(),
                    callee_name,
                    args,
                    span: SourceSpan::from_node(node),
                },
            );
        }

        self.visit_children(node, suppressed);
    }

    fn text(&self, node: Node) -> &str {
        node.utf8_text(self.source).unwrap_or("")
    }
}

fn has_extern_storage(node: Node, source: &[u8]) -> bool {
    node.children(&mut node.walk()).any(|child| {
        child.kind() == "storage_class_specifier"
            && child.utf8_text(source).unwrap_or("") == "extern"
    })
}

/// Descend a declarator chain to its function declarator, if any.
fn find_function_declarator(node: Option<Node>) -> Option<Node> {
    let mut current = node?;
    loop {
        match current.kind() {
            "function_declarator" => return Some(current),
            "init_declarator" | "pointer_declarator" => {
                current = current.child_by_field_name("declarator")?;
            }
            // Reference declarators carry no field name in the C++ grammar.
            "reference_declarator" | "parenthesized_declarator" => {
                let mut cursor = current.walk();
                let inner = current
                    .child_by_field_name("declarator")
                    .or_else(|| current.named_children(&mut cursor).next())?;
                current = inner;
            }
            _ => return None,
        }
    }
}
