//! Ordered, per-scope accumulation of extracted facts.

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::facts::{Fact, ScopeId};

/// The result of one extraction call.
///
/// Facts are grouped by scope; within a scope they appear in the exact order
/// the traversal visited their nodes. Downstream template filling correlates
/// facts positionally with source layout, so the store never reorders
/// entries. The store owns all of its data and outlives the parse tree it
/// was collected from.
///
/// Serializes to:
///
/// ```json
/// {
///   "module_name": "...",
///   "globals": [ ... ],
///   "functions": { "<name>": [ ... ], ... }
/// }
/// ```
///
/// with functions in first-visit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactStore {
    module_name: String,
    globals: Vec<Fact>,
    functions: Vec<(String, Vec<Fact>)>,
}

impl FactStore {
    pub(crate) fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            globals: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Append `fact` to the ordered list for `scope`, creating the list on
    /// first use. Existing entries are never reordered.
    pub(crate) fn record(&mut self, scope: &ScopeId, fact: Fact) {
        match scope {
            ScopeId::Global => self.globals.push(fact),
            ScopeId::Function(name) => {
                if let Some((_, facts)) = self.functions.iter_mut().find(|(n, _)| n == name) {
                    facts.push(fact);
                } else {
                    self.functions.push((name.clone(), vec![fact]));
                }
            }
        }
    }

    /// The name of the extracted module (the source file path).
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Facts attributed to the global namespace, in visit order.
    pub fn globals(&self) -> &[Fact] {
        &self.globals
    }

    /// Function scope names, in first-visit order.
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(|(name, _)| name.as_str())
    }

    /// Facts attributed to the named function scope, in visit order.
    pub fn function(&self, name: &str) -> Option<&[Fact]> {
        self.functions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, facts)| facts.as_slice())
    }

    /// Total fact count across all scopes.
    pub fn len(&self) -> usize {
        self.globals.len() + self.functions.iter().map(|(_, f)| f.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize the store to its external JSON form.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize the store to indented JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for FactStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FactStore", 3)?;
        state.serialize_field("module_name", &self.module_name)?;
        state.serialize_field("globals", &self.globals)?;
        state.serialize_field("functions", &OrderedFunctions(&self.functions))?;
        state.end()
    }
}

/// Serializes the function list as a JSON object while keeping first-visit
/// order (a plain map type would sort keys).
struct OrderedFunctions<'a>(&'a [(String, Vec<Fact>)]);

impl Serialize for OrderedFunctions<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, facts) in self.0 {
            map.serialize_entry(name, facts)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::SourceSpan;

    fn fact(name: &str) -> Fact {
        Fact::Function {
            name: name.to_string(),
            span: SourceSpan::new(1, 1, 2, 1).unwrap(),
        }
    }

    fn var(name: &str) -> Fact {
        Fact::VariableDecl {
            name: name.to_string(),
            type_name: "int".to_string(),
            is_array: false,
            extent: 4,
            span: SourceSpan::new(1, 1, 1, 8).unwrap(),
        }
    }

    #[test]
    fn record_preserves_per_scope_order() {
        let mut store = FactStore::new("test.c");
        let scope = ScopeId::Function("main".to_string());
        store.record(&scope, fact("main"));
        store.record(&scope, var("a"));
        store.record(&scope, var("b"));

        let facts = store.function("main").unwrap();
        assert_eq!(facts.len(), 3);
        assert_eq!(facts[1].name(), Some("a"));
        assert_eq!(facts[2].name(), Some("b"));
    }

    #[test]
    fn globals_and_functions_are_separate() {
        let mut store = FactStore::new("test.c");
        store.record(&ScopeId::Global, var("g"));
        store.record(&ScopeId::Function("f".to_string()), fact("f"));

        assert_eq!(store.globals().len(), 1);
        assert_eq!(store.function("f").unwrap().len(), 1);
        assert!(store.function("g").is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn serialization_keeps_function_insertion_order() {
        let mut store = FactStore::new("test.c");
        store.record(&ScopeId::Function("zebra".to_string()), fact("zebra"));
        store.record(&ScopeId::Function("apple".to_string()), fact("apple"));

        let json = store.to_json().unwrap();
        let zebra = json.find("\"zebra\"").unwrap();
        let apple = json.find("\"apple\"").unwrap();
        assert!(zebra < apple, "insertion order must survive serialization");
    }

    #[test]
    fn export_shape_has_three_top_level_keys() {
        let mut store = FactStore::new("demo.c");
        store.record(&ScopeId::Global, var("g"));
        let value: serde_json::Value = serde_json::from_str(&store.to_json().unwrap()).unwrap();
        assert_eq!(value["module_name"], "demo.c");
        assert!(value["globals"].is_array());
        assert!(value["functions"].is_object());
    }
}
