//! Integration tests for fact extraction.
//!
//! These validate scope attribution, ordering, and type shapes against the
//! testdata fixture and inline sources.

use std::path::Path;

use suture::{extract_ast, Dialect, Fact, FactCollector, FactStore, SourceSpan};

const FIXTURE: &str = "testdata/overflow.c";

fn extract_fixture() -> FactStore {
    extract_ast(Path::new(FIXTURE), Dialect::C).expect("fixture should extract")
}

/// Byte offset of a 1-indexed position within `source`.
fn offset_of(source: &str, line: usize, col: usize) -> usize {
    let mut offset = 0;
    for (i, l) in source.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            return offset + col - 1;
        }
        offset += l.len();
    }
    offset + col - 1
}

#[test]
fn module_name_is_the_source_path() {
    let store = extract_fixture();
    assert_eq!(store.module_name(), FIXTURE);
}

#[test]
fn globals_have_scalar_and_pointer_shapes() {
    let store = extract_fixture();

    let pass = store
        .globals()
        .iter()
        .find(|f| f.name() == Some("pass"))
        .expect("global `pass` should be recorded");
    match pass {
        Fact::VariableDecl {
            type_name,
            is_array,
            extent,
            ..
        } => {
            assert_eq!(type_name, "char *");
            assert!(!is_array);
            assert_eq!(*extent, 8, "pointer width on the target layout");
        }
        other => panic!("expected variable decl, got {:?}", other),
    }

    let attempts = store
        .globals()
        .iter()
        .find(|f| f.name() == Some("attempts"))
        .expect("global `attempts` should be recorded");
    match attempts {
        Fact::VariableDecl {
            type_name, extent, ..
        } => {
            assert_eq!(type_name, "int");
            assert_eq!(*extent, 4);
        }
        other => panic!("expected variable decl, got {:?}", other),
    }
}

#[test]
fn array_shape_preserves_element_type_and_extent() {
    let store = extract_fixture();
    let buff = store
        .function("main")
        .unwrap()
        .iter()
        .find(|f| f.name() == Some("buff"))
        .expect("local `buff` should be recorded");
    match buff {
        Fact::VariableDecl {
            type_name,
            is_array,
            extent,
            ..
        } => {
            assert_eq!(type_name, "char");
            assert!(*is_array);
            assert_eq!(*extent, 10);
        }
        other => panic!("expected variable decl, got {:?}", other),
    }
}

#[test]
fn every_function_scope_starts_with_its_own_fact() {
    let store = extract_fixture();
    let names: Vec<&str> = store.function_names().collect();
    assert_eq!(names, vec!["log_failure", "main"]);

    for name in names {
        let facts = store.function(name).unwrap();
        match &facts[0] {
            Fact::Function {
                name: fact_name, ..
            } => assert_eq!(fact_name, name),
            other => panic!("first fact of {} is {:?}", name, other),
        }
    }
}

#[test]
fn main_records_parameters_and_locals() {
    let store = extract_fixture();
    let vars: Vec<&str> = store
        .function("main")
        .unwrap()
        .iter()
        .filter_map(|f| match f {
            Fact::VariableDecl { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(vars, vec!["argc", "argv", "buff", "buff_len", "pov", "len"]);
}

#[test]
fn argv_decays_to_a_pointer_to_pointer() {
    let store = extract_fixture();
    let argv = store
        .function("main")
        .unwrap()
        .iter()
        .find(|f| f.name() == Some("argv"))
        .unwrap();
    match argv {
        Fact::VariableDecl {
            type_name,
            is_array,
            extent,
            ..
        } => {
            assert_eq!(type_name, "char **");
            assert!(!is_array);
            assert_eq!(*extent, 8);
        }
        other => panic!("expected variable decl, got {:?}", other),
    }
}

#[test]
fn strcpy_call_is_captured_with_decayed_argument_types() {
    let store = extract_fixture();
    let facts = store.function("main").unwrap();

    let call_index = facts
        .iter()
        .position(|f| matches!(f, Fact::Call { callee_name, .. } if callee_name.as_deref() == Some("strcpy")))
        .expect("strcpy call should be recorded");
    // The call follows main's own fact and its declarations.
    assert!(call_index > 0);
    let buff_index = facts.iter().position(|f| f.name() == Some("buff")).unwrap();
    assert!(buff_index < call_index);

    match &facts[call_index] {
        Fact::Call { text, args, .. } => {
            assert_eq!(text, "strcpy(buff, pov)");
            let rendered: Vec<(&str, &str)> = args
                .iter()
                .map(|a| (a.text.as_str(), a.type_name.as_str()))
                .collect();
            assert_eq!(rendered, vec![("buff", "char *"), ("pov", "char *")]);
        }
        _ => unreachable!(),
    }
}

#[test]
fn calls_appear_in_source_order() {
    let store = extract_fixture();
    let callees: Vec<String> = store
        .function("main")
        .unwrap()
        .iter()
        .filter_map(|f| match f {
            Fact::Call { callee_name, .. } => callee_name.clone(),
            _ => None,
        })
        .collect();
    assert_eq!(
        callees,
        vec!["strlen", "printf", "strcpy", "strcmp", "log_failure"]
    );
}

#[test]
fn scope_closure_holds() {
    let store = extract_fixture();
    for name in store.function_names() {
        let facts = store.function(name).unwrap();
        let defined = facts.iter().any(
            |f| matches!(f, Fact::Function { name: fact_name, .. } if fact_name == name),
        );
        assert!(defined, "scope {} has no matching function fact", name);
    }
}

#[test]
fn extraction_is_deterministic_across_calls() {
    let first = extract_fixture();
    let second = extract_fixture();
    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn statement_spans_address_their_exact_text() {
    let source = std::fs::read_to_string(FIXTURE).unwrap();
    let store = extract_fixture();
    for fact in store.function("main").unwrap() {
        if let Fact::Statement { text, span } = fact {
            let start = offset_of(&source, span.start_line, span.start_col);
            let end = offset_of(&source, span.end_line, span.end_col);
            assert_eq!(&source[start..end], text);
        }
    }
}

#[test]
fn export_shape_matches_the_contract() {
    let store = extract_fixture();
    let value: serde_json::Value = serde_json::from_str(&store.to_json().unwrap()).unwrap();

    assert_eq!(value["module_name"], FIXTURE);
    assert!(value["globals"]
        .as_array()
        .unwrap()
        .iter()
        .all(|g| g["kind"] == "variable_decl"));
    let main = value["functions"]["main"].as_array().unwrap();
    assert_eq!(main[0]["kind"], "function");
    assert_eq!(main[0]["name"], "main");
    assert!(main[0]["span"]["start_line"].is_u64());
}

#[test]
fn unresolved_calls_do_not_break_surrounding_extraction() {
    let source = r#"
int ready = 1;

void dispatch(void (*handler)(int)) {
  int code = 7;
  (*handler)(code);
  finish();
}

void finish(void);
"#;
    let store = FactCollector::new(Dialect::C)
        .collect(source, "dispatch.c")
        .expect("indirect calls must not abort extraction");

    let facts = store.function("dispatch").unwrap();
    assert!(facts.iter().any(|f| f.name() == Some("code")));
    let callees: Vec<String> = facts
        .iter()
        .filter_map(|f| match f {
            Fact::Call { callee_name, .. } => callee_name.clone(),
            _ => None,
        })
        .collect();
    assert_eq!(callees, vec!["finish"]);
}

#[test]
fn parse_failure_returns_diagnostics() {
    let err = FactCollector::new(Dialect::C)
        .collect("int main( {\n", "broken.c")
        .unwrap_err();
    match err {
        suture::Error::Parse { diagnostics } => {
            assert!(!diagnostics.is_empty());
            assert!(diagnostics[0].span.start_line >= 1);
        }
        other => panic!("expected parse error, got {}", other),
    }
}

#[test]
fn spans_are_well_formed() {
    let store = extract_fixture();
    let check = |span: &SourceSpan| {
        assert!(
            span.start_line < span.end_line
                || (span.start_line == span.end_line && span.start_col <= span.end_col),
            "inverted span {}",
            span
        );
    };
    for fact in store.globals() {
        check(fact.span());
    }
    for name in store.function_names() {
        for fact in store.function(name).unwrap() {
            check(fact.span());
        }
    }
}
