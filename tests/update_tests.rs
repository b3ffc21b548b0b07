// tests/update_tests.rs

use jsonpath_lang::transform::{PathSegment, locate, resolve};
use jsonpath_lang::{EvalError, Evaluator, Path, Value, compile, compile_core};
use serde_json::json;

fn v(data: serde_json::Value) -> Value {
    Value::from(data)
}

// ============================================================================
// update
// ============================================================================

#[test]
fn test_update() {
    let test_cases = vec![
        // Fields
        ("foo", json!({"foo": 1}), json!(5), json!({"foo": 5})),
        ("$.*", json!({"foo": 1, "bar": 2}), json!(3), json!({"foo": 3, "bar": 3})),
        // Indexes and slices
        ("[0]", json!(["foo", "bar", "baz"]), json!("test"), json!(["test", "bar", "baz"])),
        ("[-1]", json!(["foo", "bar", "baz"]), json!("test"), json!(["foo", "bar", "test"])),
        ("[0:2]", json!(["foo", "bar", "baz"]), json!("test"), json!(["test", "test", "baz"])),
        // Root and this
        ("$", json!("foo"), json!("bar"), json!("bar")),
        ("`this`", json!("foo"), json!("bar"), json!("bar")),
        // Children
        ("$.foo", json!({"foo": "bar"}), json!("baz"), json!({"foo": "baz"})),
        ("foo.bar", json!({"foo": {"bar": 1}}), json!("baz"), json!({"foo": {"bar": "baz"}})),
        // Descendants
        ("$..somefield", json!({"somefield": 1}), json!(42), json!({"somefield": 42})),
        (
            "$..nestedfield",
            json!({"outer": {"nestedfield": 1}}),
            json!(42),
            json!({"outer": {"nestedfield": 42}}),
        ),
        (
            "$..bar",
            json!({"outs": {"bar": 1, "ins": {"bar": 9}}, "outs2": {"bar": 2}}),
            json!(42),
            json!({"outs": {"bar": 42, "ins": {"bar": 42}}, "outs2": {"bar": 42}}),
        ),
        // Where
        (
            "*.bar where baz",
            json!({"foo": {"bar": {"baz": 1}}, "bar": {"baz": 2}}),
            json!(5),
            json!({"foo": {"bar": 5}, "bar": {"baz": 2}}),
        ),
        (
            "(* where flag) .. bar",
            json!({"foo": {"bar": 1, "flag": 1}, "baz": {"bar": 2}}),
            json!(3),
            json!({"foo": {"bar": 3, "flag": 1}, "baz": {"bar": 2}}),
        ),
        // Booleans elsewhere in the data
        (
            "$.*.number",
            json!({"foo": ["abc", "def"], "bar": {"number": 123456}, "boolean": true}),
            json!("98765"),
            json!({"foo": ["abc", "def"], "bar": {"number": "98765"}, "boolean": true}),
        ),
        // Nothing matches
        ("missing", json!({"foo": 1}), json!(2), json!({"foo": 1})),
    ];

    for (input, data, value, expected) in test_cases {
        for path in [compile_core(input).unwrap(), compile(input).unwrap()] {
            let mut data = v(data.clone());
            path.update(&mut data, v(value.clone()));
            assert_eq!(data, v(expected.clone()), "Failed for input: {}", input);

            // A second identical update leaves the tree as it is.
            path.update(&mut data, v(value.clone()));
            assert_eq!(data, v(expected.clone()), "Not idempotent for input: {}", input);
        }
    }
}

#[test]
fn test_update_with_function() {
    let mut data = v(json!({"foo": [{"baz": 1}, {"baz": 2}]}));
    compile("foo[*].baz").unwrap().update_with(&mut data, |current, _, _| {
        Value::Integer(current.as_int().unwrap_or(0) + 1)
    });
    assert_eq!(data, v(json!({"foo": [{"baz": 2}, {"baz": 3}]})));
}

#[test]
fn test_update_with_sees_tree_and_full_path() {
    let mut data = v(json!({"total": 10, "items": [{"n": 1}, {"n": 2}]}));
    let mut seen = Vec::new();

    compile("items[*].n").unwrap().update_with(&mut data, |current, tree, path| {
        seen.push(path.to_string());
        let total = tree.get("total").and_then(Value::as_int).unwrap_or(0);
        Value::Integer(total + current.as_int().unwrap_or(0))
    });

    assert_eq!(data, v(json!({"total": 10, "items": [{"n": 11}, {"n": 12}]})));
    assert_eq!(seen, vec!["items.[0].n", "items.[1].n"]);
}

#[test]
fn test_update_writes_deeper_matches_first() {
    let mut data = v(json!({"a": {"a": 1}}));
    let mut order = Vec::new();

    compile("$..a").unwrap().update_with(&mut data, |current, _, path| {
        order.push(path.to_string());
        match current {
            Value::Integer(n) => Value::Integer(n * 10),
            other => {
                let mut wrapped = indexmap::IndexMap::new();
                wrapped.insert("was".to_string(), other.clone());
                Value::Object(wrapped)
            }
        }
    });

    assert_eq!(order, vec!["a.a", "a"]);
    assert_eq!(data, v(json!({"a": {"was": {"a": 10}}})));
}

#[test]
fn test_update_visits_each_location_once() {
    let mut data = v(json!({"foo": 1}));
    let mut calls = 0;
    compile("foo|foo").unwrap().update_with(&mut data, |current, _, _| {
        calls += 1;
        Value::Integer(current.as_int().unwrap_or(0) + 1)
    });
    assert_eq!(calls, 1);
    assert_eq!(data, v(json!({"foo": 2})));
}

#[test]
fn test_update_skips_computed_matches() {
    let test_cases = vec![
        ("foo.`len`", json!({"foo": "abc"})),
        ("foo.`sorted`", json!({"foo": [3, 1, 2]})),
        ("$.foo * 2", json!({"foo": 3})),
        ("foo[/bar]", json!({"foo": [{"bar": 2}, {"bar": 1}]})),
        ("foo.`str()`", json!({"foo": 1})),
    ];

    for (input, data) in test_cases {
        let mut updated = v(data.clone());
        compile(input).unwrap().update(&mut updated, Value::Integer(0));
        assert_eq!(updated, v(data), "Failed for input: {}", input);
    }
}

#[test]
fn test_update_through_filter() {
    let mut data = v(json!({"foo": [{"bar": "baz", "n": 1}, {"bar": "other", "n": 2}]}));
    compile("foo[?bar = \"baz\"].n").unwrap().update(&mut data, Value::Integer(7));
    assert_eq!(
        data,
        v(json!({"foo": [{"bar": "baz", "n": 7}, {"bar": "other", "n": 2}]}))
    );
}

#[test]
fn test_singleton_matches_write_the_wrapped_value() {
    let mut data = v(json!({"foo": {"bar": 1}}));
    compile("foo[*].bar").unwrap().update(&mut data, Value::Integer(5));
    assert_eq!(data, v(json!({"foo": {"bar": 5}})));

    compile("foo[0]").unwrap().update(&mut data, Value::Integer(0));
    assert_eq!(data, v(json!({"foo": 0})));

    let mut scalar = v(json!("text"));
    compile("[*]").unwrap().update(&mut scalar, v(json!("new")));
    assert_eq!(scalar, v(json!("new")));
}

// ============================================================================
// update_or_create
// ============================================================================

#[test]
fn test_update_or_create() {
    let test_cases = vec![
        ("$.foo", json!({}), json!({"foo": 42})),
        ("$.foo.bar", json!({}), json!({"foo": {"bar": 42}})),
        ("$.foo[0]", json!({}), json!({"foo": [42]})),
        ("$.foo[1]", json!({}), json!({"foo": [{}, 42]})),
        ("$.foo[0].bar", json!({}), json!({"foo": [{"bar": 42}]})),
        ("$.foo[1].bar", json!({}), json!({"foo": [{}, {"bar": 42}]})),
        ("$.foo[0][0]", json!({}), json!({"foo": [[42]]})),
        ("$.foo[1][1]", json!({}), json!({"foo": [{}, [{}, 42]]})),
        ("foo[0]", json!({}), json!({"foo": [42]})),
        ("foo[1]", json!({}), json!({"foo": [{}, 42]})),
        ("foo", json!({}), json!({"foo": 42})),
        // Sequences stay sequences
        ("[0]", json!([]), json!([42])),
        ("[1]", json!([]), json!([{}, 42])),
        // Empty mappings become sequences when indexed
        ("[0]", json!({}), json!([42])),
        ("[1]", json!({}), json!([{}, 42])),
        // Absent values become containers
        ("foo.bar", json!(null), json!({"foo": {"bar": 42}})),
        (
            "foo[?bar=\"baz\"].qux",
            json!({"foo": [{"bar": "baz"}, {"bar": "bizzle"}]}),
            json!({"foo": [{"bar": "baz", "qux": 42}, {"bar": "bizzle"}]}),
        ),
        (
            "[1].foo",
            json!([{"foo": 1}, {"bar": 2}]),
            json!([{"foo": 1}, {"foo": 42, "bar": 2}]),
        ),
    ];

    for (input, data, expected) in test_cases {
        let mut data = v(data);
        compile(input)
            .unwrap()
            .update_or_create(&mut data, Value::Integer(42))
            .unwrap_or_else(|e| panic!("Failed for input {}: {}", input, e));
        assert_eq!(data, v(expected), "Failed for input: {}", input);
    }
}

#[test]
fn test_update_or_create_does_not_invent_matches() {
    let test_cases = vec![
        ("foo[0:1]", json!({}), json!({"foo": {}})),
        ("foo[?bar=\"baz\"].qux", json!({}), json!({"foo": {}})),
    ];

    for (input, data, expected) in test_cases {
        let mut data = v(data);
        let result = compile(input)
            .unwrap()
            .update_or_create(&mut data, Value::Integer(42));
        assert!(result.is_ok(), "Failed for input: {}", input);
        assert_eq!(data, v(expected), "Failed for input: {}", input);
    }
}

#[test]
fn test_update_or_create_type_errors() {
    let test_cases = vec![
        ("foo", json!([])),
        ("foo.bar", json!({"foo": 3})),
        ("[0]", json!("text")),
        ("foo[0]", json!({"foo": {"bar": 1}})),
    ];

    for (input, data) in test_cases {
        let mut data = v(data);
        let result = compile(input)
            .unwrap()
            .update_or_create(&mut data, Value::Integer(42));
        assert!(
            matches!(result, Err(EvalError::TypeError(_))),
            "Expected type error for input: {}",
            input
        );
    }
}

#[test]
fn test_build_document_step_by_step() {
    let steps = vec![
        ("$.name[0].text", json!("Sir Michael")),
        ("$.name[0].given[0]", json!("Michael")),
        ("$.name[0].prefix[0]", json!("Sir")),
        ("$.birthDate", json!("1943-05-05")),
    ];

    let mut data = v(json!({}));
    for (input, value) in steps {
        compile(input)
            .unwrap()
            .update_or_create(&mut data, v(value))
            .unwrap();
    }

    assert_eq!(
        data,
        v(json!({
            "name": [{"text": "Sir Michael", "given": ["Michael"], "prefix": ["Sir"]}],
            "birthDate": "1943-05-05"
        }))
    );
}

#[test]
fn test_update_or_create_replaces_existing_values() {
    let mut data = v(json!({"foo": {"bar": 1, "keep": true}}));
    Evaluator::new()
        .update_or_create(&compile("foo.bar").unwrap(), &mut data, Value::Integer(2))
        .unwrap();
    assert_eq!(data, v(json!({"foo": {"bar": 2, "keep": true}})));
}

// ============================================================================
// Locations
// ============================================================================

#[test]
fn test_locate_matches() {
    let data = v(json!({"foo": [{"bar": 1}, {"bar": 2}]}));
    let matches = compile("$.foo[-1].bar").unwrap().find(&data);

    let location = locate(&matches[0]).unwrap();
    assert_eq!(
        location,
        vec![
            PathSegment::Field("foo".to_string()),
            PathSegment::Index(1),
            PathSegment::Field("bar".to_string()),
        ]
    );
    assert_eq!(resolve(&data, &location), Some(&Value::Integer(2)));
}

#[test]
fn test_locate_computed_and_singleton_matches() {
    let data = v(json!({"foo": {"bar": "abc"}}));

    let computed = compile("foo.bar.`len`").unwrap().find(&data);
    assert_eq!(computed.len(), 1);
    assert_eq!(locate(&computed[0]), None);

    let singleton = compile("foo[0]").unwrap().find(&data);
    assert_eq!(singleton.len(), 1);
    assert_eq!(
        locate(&singleton[0]),
        Some(vec![PathSegment::Field("foo".to_string())])
    );

    let root = Path::Root.find(&data);
    assert_eq!(locate(&root[0]), Some(vec![]));
}
