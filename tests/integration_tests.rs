// tests/integration_tests.rs

use jsonpath_lang::{
    Evaluator, Value, compile,
    convert::{json_to_value, value_to_json},
    to_json,
};
use serde_json::json;

/// Routes the library's `log` output to the test harness; set `RUST_LOG` to see it.
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Building documents and reading them back
// ============================================================================

#[test]
fn test_build_then_query() {
    init_logging();
    let steps = vec![
        ("a.b.c", json!(1)),
        ("list[2].name", json!("n")),
        ("a.d", json!([1, 2])),
        ("a.d[0]", json!(10)),
    ];

    let mut data = Value::Null;
    for (input, value) in &steps {
        compile(input)
            .unwrap()
            .update_or_create(&mut data, Value::from(value.clone()))
            .unwrap_or_else(|e| panic!("Failed for input: {} ({})", input, e));
    }

    assert_eq!(
        data,
        Value::from(json!({
            "a": {"b": {"c": 1}, "d": [10, 2]},
            "list": [{}, {}, {"name": "n"}],
        }))
    );

    let reads = vec![
        ("a.b.c", json!(1)),
        ("list[2].name", json!("n")),
        ("a.d[0]", json!(10)),
        ("a.d[-1]", json!(2)),
    ];
    for (input, expected) in reads {
        let values: Vec<Value> = compile(input)
            .unwrap()
            .find(&data)
            .into_iter()
            .map(|m| m.into_value())
            .collect();
        assert_eq!(values, vec![Value::from(expected)], "Failed for input: {}", input);
    }
}

#[test]
fn test_updates_are_visible_to_later_queries() {
    init_logging();
    let mut data = Value::from(json!({"book": [{"price": 8}, {"price": 12.5}]}));
    let path = compile("book[*].price").unwrap();

    path.update_with(&mut data, |value, _, _| match value {
        Value::Integer(i) => Value::Integer(i * 2),
        Value::Float(f) => Value::Float(f * 2.0),
        other => other.clone(),
    });

    let prices: Vec<Value> = path.find(&data).into_iter().map(|m| m.into_value()).collect();
    assert_eq!(prices, vec![Value::Integer(16), Value::Float(25.0)]);
}

// ============================================================================
// JSON text in, JSON text out
// ============================================================================

#[test]
fn test_query_json_text() {
    init_logging();
    let document: serde_json::Value =
        serde_json::from_str(r#"{"name": "x", "tags": ["a", "b"], "n": 1.5}"#).unwrap();
    let data = json_to_value(document.clone());

    let tags = compile("tags").unwrap().find(&data);
    assert_eq!(to_json(tags[0].value()), r#"["a","b"]"#);

    let names = compile("`this`.name").unwrap().find(&data);
    assert_eq!(to_json(names[0].value()), r#""x""#);

    assert_eq!(value_to_json(data.clone()), document);
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_results_are_deterministic() {
    init_logging();
    let data = Value::from(json!({
        "z": {"y": [1, {"x": 2}]},
        "a": [{"b": 3}, {"b": 4}],
        "m": {"id": "mid", "k": true},
    }));

    for input in ["$..*", "*.`len`", "a[?b > 3]", "m.*", "$..b"] {
        let path = compile(input).unwrap();
        let render = || -> Vec<String> {
            Evaluator::with_auto_id("id")
                .find(&path, &data)
                .iter()
                .map(|m| format!("{}={}", m.full_path(), m.value()))
                .collect()
        };
        assert_eq!(render(), render(), "Failed for input: {}", input);
    }
}
