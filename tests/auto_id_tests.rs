// tests/auto_id_tests.rs

use jsonpath_lang::{Evaluator, Value, compile, compile_core};
use serde_json::json;

fn labels(expression: &str, data: serde_json::Value) -> Vec<String> {
    let data = Value::from(data);
    let evaluator = Evaluator::with_auto_id("id");

    let core: Vec<String> = evaluator
        .find(&compile_core(expression).unwrap(), &data)
        .iter()
        .map(|m| m.value().to_string())
        .collect();
    let extended: Vec<String> = evaluator
        .find(&compile(expression).unwrap(), &data)
        .iter()
        .map(|m| m.value().to_string())
        .collect();

    assert_eq!(core, extended, "Profiles disagree for input: {}", expression);
    core
}

// ============================================================================
// Labels
// ============================================================================

#[test]
fn test_auto_id_labels() {
    let test_cases = vec![
        // Fields
        ("foo.id", json!({"foo": "baz"}), vec!["foo"]),
        ("foo.id", json!({"foo": {"id": "baz"}}), vec!["baz"]),
        ("foo,baz.id", json!({"foo": 1, "baz": 2}), vec!["foo", "baz"]),
        ("*.id", json!({"foo": {"id": 1}, "baz": 2}), vec!["1", "baz"]),
        // Roots
        ("$.id", json!({"foo": "baz"}), vec!["$"]),
        ("foo.$.id", json!({"foo": "baz", "id": "bizzle"}), vec!["bizzle"]),
        ("foo.$.baz.id", json!({"foo": 4, "baz": 3}), vec!["baz"]),
        // This
        ("id", json!({"foo": "baz"}), vec!["`this`"]),
        ("foo.`this`.id", json!({"foo": "baz"}), vec!["foo"]),
        ("foo.`this`.baz.id", json!({"foo": {"baz": 3}}), vec!["foo.baz"]),
        // Indexes and slices
        ("[0].id", json!([42]), vec!["[0]"]),
        ("[2].id", json!([34, 65, 29, 59]), vec!["[2]"]),
        ("[*].id", json!([1, 2, 3]), vec!["[0]", "[1]", "[2]"]),
        ("[1:].id", json!([1, 2, 3, 4]), vec!["[1]", "[2]", "[3]"]),
        // Children
        ("foo.baz.id", json!({"foo": {"baz": 3}}), vec!["foo.baz"]),
        ("foo.baz.id", json!({"foo": {"baz": [3]}}), vec!["foo.baz"]),
        ("foo.baz.id", json!({"foo": {"id": "bizzle", "baz": 3}}), vec!["bizzle.baz"]),
        ("foo.baz.id", json!({"foo": {"baz": {"id": "hi"}}}), vec!["foo.hi"]),
        (
            "foo.baz.bizzle.id",
            json!({"foo": {"baz": {"bizzle": 5}}}),
            vec!["foo.baz.bizzle"],
        ),
        // Descendants
        (
            "foo..baz.id",
            json!({"foo": {"baz": 1, "bing": {"baz": 2}}}),
            vec!["foo.baz", "foo.bing.baz"],
        ),
    ];

    for (input, data, expected) in test_cases {
        assert_eq!(labels(input, data), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_nested_index_labels() {
    let data = json!({
        "id": 1,
        "b": {"id": "bid", "name": "bob"},
        "m": [{"a": "a1"}, {"a": "a2", "id": "a2id"}],
    });

    let test_cases = vec![
        ("m.[1].id", vec!["1.m.a2id"]),
        ("m.[1].$.b.id", vec!["1.bid"]),
        ("m.[0].id", vec!["1.m.[0]"]),
    ];

    for (input, expected) in test_cases {
        assert_eq!(labels(input, data.clone()), expected, "Failed for input: {}", input);
    }
}

// ============================================================================
// Wildcards
// ============================================================================

#[test]
fn test_wildcard_includes_auto_id() {
    let data = Value::from(json!({"foo": 1, "baz": 2}));
    let matches = Evaluator::with_auto_id("id").find(&compile("*").unwrap(), &data);

    let values: Vec<Value> = matches.iter().map(|m| m.value().clone()).collect();
    assert_eq!(
        values,
        vec![
            Value::Integer(1),
            Value::Integer(2),
            Value::String("`this`".to_string())
        ]
    );

    let paths: Vec<String> = matches.iter().map(|m| m.full_path().to_string()).collect();
    assert_eq!(paths, vec!["foo", "baz", "id"]);
    assert!(matches[2].is_auto_id());
}

#[test]
fn test_wildcard_does_not_duplicate_real_id() {
    let data = Value::from(json!({"id": "x", "foo": 1}));
    let matches = Evaluator::with_auto_id("id").find(&compile("*").unwrap(), &data);
    assert_eq!(matches.len(), 2);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_evaluators_are_independent() {
    let data = Value::from(json!({"foo": {"baz": 3}}));
    let path = compile("foo.id").unwrap();

    let with_id = Evaluator::with_auto_id("id");
    let plain = Evaluator::new();

    assert_eq!(with_id.find(&path, &data).len(), 1);
    assert!(plain.find(&path, &data).is_empty());
    assert_eq!(with_id.auto_id_field(), Some("id"));
    assert_eq!(plain.auto_id_field(), None);
}

#[test]
fn test_custom_auto_id_field() {
    let data = Value::from(json!({"items": [{"key": "alpha"}, {"name": "beta"}]}));
    let matches = Evaluator::with_auto_id("key").find(&compile("items[*].key").unwrap(), &data);

    let values: Vec<String> = matches.iter().map(|m| m.value().to_string()).collect();
    assert_eq!(values, vec!["items.alpha", "items.[1]"]);
}

#[test]
fn test_auto_id_labels_are_not_updated() {
    let mut data = Value::from(json!({"foo": {"baz": 1}}));
    Evaluator::with_auto_id("id").update(&compile("foo.id").unwrap(), &mut data, Value::Integer(9));
    assert_eq!(data, Value::from(json!({"foo": {"baz": 1}})));
}
