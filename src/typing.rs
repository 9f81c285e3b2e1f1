//! Syntactic type resolution.
//!
//! Tree-sitter exposes structure, not semantics, so the type/array/size
//! information the fact model carries is reconstructed from declarator
//! syntax plus the [`crate::layout`] data-layout table, and call-argument
//! types are approximated by a small static typer over the declarations
//! recorded earlier in the same traversal. Locals shadow globals; array
//! arguments decay to pointers, matching what a compiler front end reports
//! for a call site.

use std::collections::HashMap;

use tree_sitter::Node;

use crate::layout::{byte_width, POINTER_WIDTH};

/// Fallback type for expressions the typer cannot resolve (unknown
/// identifiers, member accesses, calls to undeclared functions).
const UNKNOWN_TYPE: &str = "int";

/// One step of a declarator, recorded while descending toward the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclStep {
    Pointer,
    /// Array with a constant extent, or `None` when the extent is absent or
    /// not a compile-time integer literal.
    Array(Option<u64>),
}

/// The shape of a single declarator: the declared name plus the
/// pointer/array/function structure around it.
#[derive(Debug, Clone)]
pub struct DeclShape {
    pub name: String,
    /// Pointer/array steps in descent order (outermost syntax first).
    steps: Vec<DeclStep>,
    /// Parameter-list text when a function declarator was crossed.
    params_text: Option<String>,
    /// Pointer steps seen before the function declarator; these belong to
    /// the return type.
    pointers_before_fn: usize,
    /// Whether a parenthesized declarator was crossed (the function-pointer
    /// shape).
    through_parens: bool,
}

impl DeclShape {
    /// True for a plain function declarator: a definition or prototype, not
    /// a function-pointer variable.
    pub fn is_plain_function(&self) -> bool {
        self.params_text.is_some() && !self.through_parens
    }

    /// Return type of a plain function declarator, given the declared base
    /// type.
    pub fn return_type(&self, base: &str) -> String {
        append_pointers(base, self.pointers_before_fn)
    }
}

/// Unwrap a declarator node down to its name, collecting shape along the way.
///
/// Returns `None` for abstract or unnamed declarators.
pub fn unwrap_declarator(node: Node, source: &[u8]) -> Option<DeclShape> {
    let mut steps = Vec::new();
    let mut params_text = None;
    let mut pointers_before_fn = 0;
    let mut through_parens = false;
    let mut current = node;

    loop {
        match current.kind() {
            "init_declarator" => {
                current = current.child_by_field_name("declarator")?;
            }
            "pointer_declarator" => {
                steps.push(DeclStep::Pointer);
                if params_text.is_none() {
                    pointers_before_fn += 1;
                }
                current = current.child_by_field_name("declarator")?;
            }
            // The C++ grammar gives reference declarators no field name.
            "reference_declarator" => {
                steps.push(DeclStep::Pointer);
                if params_text.is_none() {
                    pointers_before_fn += 1;
                }
                current = current
                    .child_by_field_name("declarator")
                    .or_else(|| first_named_child(current))?;
            }
            "array_declarator" => {
                let extent = current
                    .child_by_field_name("size")
                    .and_then(|size| parse_int_literal(node_text(size, source)));
                steps.push(DeclStep::Array(extent));
                current = current.child_by_field_name("declarator")?;
            }
            "function_declarator" => {
                if params_text.is_none() {
                    params_text = Some(
                        current
                            .child_by_field_name("parameters")
                            .map(|p| node_text(p, source).to_string())
                            .unwrap_or_else(|| "()".to_string()),
                    );
                }
                current = current.child_by_field_name("declarator")?;
            }
            "parenthesized_declarator" => {
                through_parens = true;
                current = first_named_child(current)?;
            }
            "identifier" | "field_identifier" | "type_identifier" | "qualified_identifier"
            | "operator_name" | "destructor_name" => {
                return Some(DeclShape {
                    name: node_text(current, source).to_string(),
                    steps,
                    params_text,
                    pointers_before_fn,
                    through_parens,
                });
            }
            _ => return None,
        }
    }
}

/// Resolve a variable declarator into `(type_name, is_array, extent)`.
///
/// Arrays report their element type and element count (0 when the count is
/// not constant); everything else reports its full type spelling and the
/// byte width under the target data layout.
pub fn resolve_variable(base: &str, shape: &DeclShape) -> (String, bool, u64) {
    if let Some(params) = &shape.params_text {
        // Function-pointer shape: `ret (*name)(params)`.
        let fnptr = function_pointer_type(base, shape.pointers_before_fn, params);
        return match shape.steps.last() {
            Some(DeclStep::Array(extent)) => (fnptr, true, extent.unwrap_or(0)),
            _ => (fnptr, false, POINTER_WIDTH),
        };
    }

    // Interpret steps inside-out: the step closest to the name applies first.
    let outward: Vec<DeclStep> = shape.steps.iter().rev().copied().collect();
    match outward.split_first() {
        Some((DeclStep::Array(extent), rest)) => {
            let element = compose(base, rest);
            (element, true, extent.unwrap_or(0))
        }
        _ => {
            let type_name = compose(base, &outward);
            let width = byte_width(&type_name);
            (type_name, false, width)
        }
    }
}

/// Resolve a parameter declarator into `(type_name, byte_width)`.
///
/// Parameter arrays and functions decay to pointers, so parameters are never
/// arrays in the extracted model.
pub fn resolve_parameter(base: &str, shape: &DeclShape) -> (String, u64) {
    if let Some(params) = &shape.params_text {
        let fnptr = function_pointer_type(base, shape.pointers_before_fn, params);
        return (fnptr, POINTER_WIDTH);
    }

    let outward: Vec<DeclStep> = shape.steps.iter().rev().copied().collect();
    match outward.split_first() {
        Some((DeclStep::Array(_), rest)) => {
            let decayed = pointer_to(&compose(base, rest));
            (decayed, POINTER_WIDTH)
        }
        _ => {
            let type_name = compose(base, &outward);
            let width = byte_width(&type_name);
            (type_name, width)
        }
    }
}

fn function_pointer_type(base: &str, ret_pointers: usize, params: &str) -> String {
    let ret = append_pointers(base, ret_pointers);
    if ret.ends_with('*') {
        format!("{}(*){}", ret, params)
    } else {
        format!("{} (*){}", ret, params)
    }
}

fn compose(base: &str, steps: &[DeclStep]) -> String {
    let mut out = base.to_string();
    for step in steps {
        match step {
            DeclStep::Pointer => out = pointer_to(&out),
            DeclStep::Array(Some(n)) => out.push_str(&format!("[{}]", n)),
            DeclStep::Array(None) => out.push_str("[]"),
        }
    }
    out
}

fn append_pointers(base: &str, count: usize) -> String {
    let mut out = base.to_string();
    for _ in 0..count {
        out = pointer_to(&out);
    }
    out
}

/// `T` → `T *`, `T *` → `T **`.
fn pointer_to(type_name: &str) -> String {
    if type_name.ends_with('*') {
        format!("{}*", type_name)
    } else {
        format!("{} *", type_name)
    }
}

/// `T *` → `T`; non-pointers fall back to the unknown type.
fn strip_pointer(type_name: &str) -> String {
    match type_name.strip_suffix('*') {
        Some(inner) => inner.trim_end().to_string(),
        None => UNKNOWN_TYPE.to_string(),
    }
}

/// The declared base type of a declaration-like node, qualifiers included.
pub fn base_type_of(node: Node, source: &[u8]) -> Option<String> {
    let type_node = node.child_by_field_name("type")?;
    let mut base = match type_node.kind() {
        "struct_specifier" | "union_specifier" | "enum_specifier" => {
            let keyword = type_node.kind().trim_end_matches("_specifier");
            match type_node.child_by_field_name("name") {
                Some(name) => format!("{} {}", keyword, node_text(name, source)),
                None => format!("{} <anonymous>", keyword),
            }
        }
        _ => collapse_whitespace(node_text(type_node, source)),
    };

    // Qualifiers (`const`, `volatile`) are siblings of the type node.
    let mut qualifiers = Vec::new();
    for child in node.children(&mut node.walk()) {
        if child.kind() == "type_qualifier" {
            qualifiers.push(node_text(child, source).to_string());
        }
    }
    for qualifier in qualifiers.into_iter().rev() {
        base = format!("{} {}", qualifier, base);
    }
    Some(base)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn first_named_child(node: Node) -> Option<Node> {
    let mut cursor = node.walk();
    let child = node.named_children(&mut cursor).next();
    child
}

fn parse_int_literal(text: &str) -> Option<u64> {
    let trimmed = text
        .trim()
        .trim_end_matches(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).ok();
    }
    if let Some(bin) = trimmed.strip_prefix("0b").or_else(|| trimmed.strip_prefix("0B")) {
        return u64::from_str_radix(bin, 2).ok();
    }
    if trimmed.len() > 1 && trimmed.starts_with('0') {
        return u64::from_str_radix(&trimmed[1..], 8).ok();
    }
    trimmed.parse().ok()
}

/// A variable visible to the expression typer.
#[derive(Debug, Clone)]
pub struct VarInfo {
    pub type_name: String,
    pub is_array: bool,
}

impl VarInfo {
    /// The type this variable has when used as a value: arrays decay to a
    /// pointer to their element type.
    fn value_type(&self) -> String {
        if self.is_array {
            pointer_to(&self.type_name)
        } else {
            self.type_name.clone()
        }
    }
}

/// Declarations visible at the current traversal point, with locals
/// shadowing globals. One frame is pushed per entered function body.
#[derive(Debug, Default)]
pub struct SymbolTable {
    globals: HashMap<String, VarInfo>,
    frames: Vec<HashMap<String, VarInfo>>,
    fn_returns: HashMap<String, String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Declare a variable in the innermost open frame, or globally when no
    /// frame is open.
    pub fn declare(&mut self, name: &str, info: VarInfo) {
        match self.frames.last_mut() {
            Some(frame) => frame.insert(name.to_string(), info),
            None => self.globals.insert(name.to_string(), info),
        };
    }

    pub fn lookup(&self, name: &str) -> Option<&VarInfo> {
        for frame in self.frames.iter().rev() {
            if let Some(info) = frame.get(name) {
                return Some(info);
            }
        }
        self.globals.get(name)
    }

    /// Remember a function's return type (definitions and prototypes both
    /// feed this, so calls to forward-declared functions still type).
    pub fn declare_function(&mut self, name: &str, return_type: String) {
        self.fn_returns.insert(name.to_string(), return_type);
    }

    pub fn function_return(&self, name: &str) -> Option<&str> {
        self.fn_returns.get(name).map(String::as_str)
    }
}

/// Static type of an expression, as a call site would see it.
pub fn type_of_expr(node: Node, source: &[u8], symbols: &SymbolTable) -> String {
    match node.kind() {
        "identifier" => match symbols.lookup(node_text(node, source)) {
            Some(info) => info.value_type(),
            None => UNKNOWN_TYPE.to_string(),
        },
        "string_literal" | "concatenated_string" => "char *".to_string(),
        "char_literal" | "character_literal" => "int".to_string(),
        "number_literal" => number_literal_type(node_text(node, source)),
        "true" | "false" => "bool".to_string(),
        "parenthesized_expression" => match first_named_child(node) {
            Some(inner) => type_of_expr(inner, source, symbols),
            None => UNKNOWN_TYPE.to_string(),
        },
        "pointer_expression" => {
            let arg_type = node
                .child_by_field_name("argument")
                .map(|arg| type_of_expr(arg, source, symbols))
                .unwrap_or_else(|| UNKNOWN_TYPE.to_string());
            match node.child(0).map(|op| node_text(op, source)) {
                Some("&") => pointer_to(&arg_type),
                Some("*") => strip_pointer(&arg_type),
                _ => UNKNOWN_TYPE.to_string(),
            }
        }
        "unary_expression" => {
            let operator = node.child(0).map(|op| node_text(op, source));
            if operator == Some("!") {
                return "int".to_string();
            }
            node.child_by_field_name("argument")
                .map(|arg| type_of_expr(arg, source, symbols))
                .unwrap_or_else(|| UNKNOWN_TYPE.to_string())
        }
        "binary_expression" => node
            .child_by_field_name("left")
            .map(|left| type_of_expr(left, source, symbols))
            .unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
        "conditional_expression" => node
            .child_by_field_name("consequence")
            .map(|arm| type_of_expr(arm, source, symbols))
            .unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
        "assignment_expression" => node
            .child_by_field_name("left")
            .map(|left| type_of_expr(left, source, symbols))
            .unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
        "cast_expression" => node
            .child_by_field_name("type")
            .map(|ty| collapse_whitespace(node_text(ty, source)))
            .unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
        "subscript_expression" => {
            let arg_type = node
                .child_by_field_name("argument")
                .map(|arg| type_of_expr(arg, source, symbols))
                .unwrap_or_else(|| UNKNOWN_TYPE.to_string());
            strip_pointer(&arg_type)
        }
        "call_expression" => {
            let callee = node.child_by_field_name("function");
            match callee {
                Some(callee) if callee.kind() == "identifier" => symbols
                    .function_return(node_text(callee, source))
                    .map(str::to_string)
                    .unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
                _ => UNKNOWN_TYPE.to_string(),
            }
        }
        "sizeof_expression" => "unsigned long".to_string(),
        _ => UNKNOWN_TYPE.to_string(),
    }
}

fn number_literal_type(text: &str) -> String {
    let lower = text.to_lowercase();
    let is_hex = lower.starts_with("0x");
    let is_float = !is_hex && (lower.contains('.') || lower.contains('e'));
    if is_float {
        if lower.ends_with('f') {
            "float".to_string()
        } else {
            "double".to_string()
        }
    } else {
        "int".to_string()
    }
}
