//! Evaluation of the extended grammar's computed results: sorting,
//! arithmetic, and the backtick-quoted named operators.
//!
//! Everything here produces new values instead of selecting existing ones.
//! Each result is a datum whose segment is the node that computed it and
//! whose context is the datum it was computed from, so full paths stay
//! meaningful even though the value does not live in the tree.

use std::{borrow::Cow, cmp::Ordering, rc::Rc};

use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};

use crate::{
    ast::{ArithOp, NamedOperator, Operand, Path, Pattern, SortDirection, SortKey, SplitIndex},
    datum::Datum,
    evaluator::{Evaluator, normalize_index, slice_indices},
    value::Value,
};

fn computed<'a>(node: &Path, datum: &Rc<Datum<'a>>, value: Value) -> Rc<Datum<'a>> {
    Rc::new(Datum::with_context(
        Cow::Owned(value),
        node.clone(),
        Some(Rc::clone(datum)),
    ))
}

// ========================================
// Sorting
// ========================================

/// Sorts the incoming sequence into a single list-valued match.
///
/// Without keys, mappings sort into their key names. Scalars, and mappings
/// under keyed sorts, pass through unchanged.
pub(crate) fn sort<'a>(
    evaluator: &Evaluator,
    node: &Path,
    keys: &[SortKey],
    datum: &Rc<Datum<'a>>,
) -> Vec<Rc<Datum<'a>>> {
    let sorted = match datum.value() {
        Value::Array(items) if keys.is_empty() => {
            let mut items = items.clone();
            items.sort_by(compare_values);
            Value::Array(items)
        }
        Value::Array(items) => Value::Array(sort_by_keys(evaluator, keys, items)),
        Value::Object(map) if keys.is_empty() => {
            let mut names: Vec<&String> = map.keys().collect();
            names.sort();
            Value::Array(names.into_iter().map(|k| Value::String(k.clone())).collect())
        }
        _ => return vec![Rc::clone(datum)],
    };

    vec![computed(node, datum, sorted)]
}

fn sort_by_keys(evaluator: &Evaluator, keys: &[SortKey], items: &[Value]) -> Vec<Value> {
    // Each key resolves to the first value its path finds in the element.
    let mut keyed: Vec<(Vec<Option<Value>>, &Value)> = items
        .iter()
        .map(|item| {
            let resolved = keys
                .iter()
                .map(|key| {
                    evaluator
                        .find(&key.path, item)
                        .into_iter()
                        .next()
                        .map(Datum::into_value)
                })
                .collect();
            (resolved, item)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        for ((key, x), y) in keys.iter().zip(a).zip(b) {
            // Elements missing a key keep their relative order for it.
            let (Some(x), Some(y)) = (x, y) else {
                continue;
            };
            let ordering = match key.direction {
                SortDirection::Ascending => compare_values(x, y),
                SortDirection::Descending => compare_values(y, x),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });

    keyed.into_iter().map(|(_, item)| item.clone()).collect()
}

/// Compare two values for sorting
pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal),
        (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

// ========================================
// Named Operators
// ========================================

pub(crate) fn apply_named<'a>(
    evaluator: &Evaluator,
    node: &Path,
    operator: &NamedOperator,
    datum: &Rc<Datum<'a>>,
) -> Vec<Rc<Datum<'a>>> {
    let value = datum.value();
    let produced: Vec<Value> = match operator {
        NamedOperator::Len => value
            .len()
            .map(|n| Value::Integer(n as i64))
            .into_iter()
            .collect(),
        NamedOperator::Keys => match value {
            Value::Object(map) => map.keys().map(|k| Value::String(k.clone())).collect(),
            _ => Vec::new(),
        },
        NamedOperator::Sorted => return sort(evaluator, node, &[], datum),
        NamedOperator::Str => vec![Value::String(value.to_string())],
        NamedOperator::Sub {
            pattern,
            replacement,
        } => value
            .as_str()
            .and_then(|text| substitute(pattern, replacement, text))
            .map(Value::String)
            .into_iter()
            .collect(),
        NamedOperator::Split {
            separator,
            index,
            max_split,
        } => value
            .as_str()
            .and_then(|text| split(text, separator, *index, *max_split))
            .map(Value::String)
            .into_iter()
            .collect(),
    };

    produced
        .into_iter()
        .map(|value| computed(node, datum, value))
        .collect()
}

/// `None` when the pattern changes nothing.
fn substitute(pattern: &Pattern, replacement: &str, text: &str) -> Option<String> {
    let replaced = pattern.regex().replace_all(text, replacement);
    (replaced != text).then(|| replaced.into_owned())
}

fn split(text: &str, separator: &str, index: SplitIndex, max_split: i64) -> Option<String> {
    let parts: Vec<&str> = match usize::try_from(max_split) {
        Ok(max) => text.splitn(max.saturating_add(1), separator).collect(),
        Err(_) => text.split(separator).collect(),
    };

    match index {
        SplitIndex::At(i) => normalize_index(i, parts.len())
            .and_then(|i| parts.get(i))
            .map(|part| part.to_string()),
        SplitIndex::Range { start, end } => {
            let selected: Vec<&str> = slice_indices(parts.len(), start, end, None)
                .into_iter()
                .filter_map(|i| parts.get(i).copied())
                .collect();
            Some(selected.join(separator))
        }
    }
}

// ========================================
// Arithmetic
// ========================================

/// Combines the operands' values.
///
/// Two sub-paths combine pairwise and must match the same, non-zero number
/// of values. A sub-path against a literal combines every match with the
/// literal. Any failure empties the whole result.
pub(crate) fn arithmetic<'a>(
    evaluator: &Evaluator,
    node: &Path,
    op: ArithOp,
    left: &Operand,
    right: &Operand,
    datum: &Rc<Datum<'a>>,
) -> Vec<Rc<Datum<'a>>> {
    let values: Option<Vec<Value>> = match (left, right) {
        (Operand::Literal(a), Operand::Literal(b)) => apply_arithmetic(op, a, b).map(|v| vec![v]),
        (Operand::Path(path), Operand::Literal(b)) => evaluator
            .eval(path, datum)
            .iter()
            .map(|a| apply_arithmetic(op, a.value(), b))
            .collect(),
        (Operand::Literal(a), Operand::Path(path)) => evaluator
            .eval(path, datum)
            .iter()
            .map(|b| apply_arithmetic(op, a, b.value()))
            .collect(),
        (Operand::Path(left), Operand::Path(right)) => {
            let lefts = evaluator.eval(left, datum);
            let rights = evaluator.eval(right, datum);
            if lefts.is_empty() || lefts.len() != rights.len() {
                None
            } else {
                lefts
                    .iter()
                    .zip(&rights)
                    .map(|(a, b)| apply_arithmetic(op, a.value(), b.value()))
                    .collect()
            }
        }
    };

    values
        .unwrap_or_default()
        .into_iter()
        .map(|value| computed(node, datum, value))
        .collect()
}

/// Applies one arithmetic operator, `None` when the operands do not support it.
pub fn apply_arithmetic(op: ArithOp, left: &Value, right: &Value) -> Option<Value> {
    match (op, left, right) {
        (_, Value::Integer(a), Value::Integer(b)) => integer_arithmetic(op, *a, *b),
        (_, Value::Float(a), Value::Float(b)) => float_arithmetic(op, *a, *b),
        (_, Value::Integer(a), Value::Float(b)) => match (Decimal::from_i64(*a), Decimal::from_f64(*b)) {
            (Some(ad), Some(bd)) => decimal_arithmetic(op, ad, bd),
            _ => float_arithmetic(op, *a as f64, *b),
        },
        (_, Value::Float(a), Value::Integer(b)) => match (Decimal::from_f64(*a), Decimal::from_i64(*b)) {
            (Some(ad), Some(bd)) => decimal_arithmetic(op, ad, bd),
            _ => float_arithmetic(op, *a, *b as f64),
        },
        (ArithOp::Add, Value::String(a), Value::String(b)) => Some(Value::String(format!("{}{}", a, b))),
        (ArithOp::Multiply, Value::String(s), Value::Integer(n))
        | (ArithOp::Multiply, Value::Integer(n), Value::String(s)) => {
            Some(Value::String(s.repeat(usize::try_from(*n).unwrap_or(0))))
        }
        (ArithOp::Add, Value::Array(a), Value::Array(b)) => {
            Some(Value::Array(a.iter().chain(b).cloned().collect()))
        }
        (ArithOp::Multiply, Value::Array(items), Value::Integer(n))
        | (ArithOp::Multiply, Value::Integer(n), Value::Array(items)) => {
            let times = usize::try_from(*n).unwrap_or(0);
            Some(Value::Array(
                (0..times).flat_map(|_| items.iter().cloned()).collect(),
            ))
        }
        _ => None,
    }
}

fn integer_arithmetic(op: ArithOp, a: i64, b: i64) -> Option<Value> {
    match op {
        ArithOp::Add => a.checked_add(b).map(Value::Integer),
        ArithOp::Multiply => a.checked_mul(b).map(Value::Integer),
        ArithOp::Divide => {
            if b == 0 {
                None
            } else if a.checked_rem(b)? == 0 {
                a.checked_div(b).map(Value::Integer)
            } else {
                Some(Value::Float(a as f64 / b as f64))
            }
        }
    }
}

fn float_arithmetic(op: ArithOp, a: f64, b: f64) -> Option<Value> {
    let result = match op {
        ArithOp::Add => a + b,
        ArithOp::Multiply => a * b,
        ArithOp::Divide => a / b,
    };
    result.is_finite().then_some(Value::Float(result))
}

/// Mixed integer and float operands. Whole results stay integers.
fn decimal_arithmetic(op: ArithOp, a: Decimal, b: Decimal) -> Option<Value> {
    let result = match op {
        ArithOp::Add => a.checked_add(b),
        ArithOp::Multiply => a.checked_mul(b),
        ArithOp::Divide => a.checked_div(b),
    }?;

    if result.is_integer()
        && let Some(n) = result.to_i64()
    {
        return Some(Value::Integer(n));
    }
    result.to_f64().map(Value::Float)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_arithmetic() {
        let test_cases = vec![
            (ArithOp::Add, Value::Integer(2), Value::Integer(3), Some(Value::Integer(5))),
            (ArithOp::Multiply, Value::Integer(4), Value::Integer(10), Some(Value::Integer(40))),
            (ArithOp::Divide, Value::Integer(9), Value::Integer(3), Some(Value::Integer(3))),
            (ArithOp::Divide, Value::Integer(1), Value::Integer(2), Some(Value::Float(0.5))),
            (ArithOp::Divide, Value::Integer(1), Value::Integer(0), None),
            (ArithOp::Add, Value::Integer(1), Value::Float(0.5), Some(Value::Float(1.5))),
            (ArithOp::Multiply, Value::Float(1.5), Value::Integer(2), Some(Value::Integer(3))),
            (ArithOp::Add, Value::Integer(i64::MAX), Value::Integer(1), None),
            (ArithOp::Multiply, Value::from("f"), Value::Integer(3), Some(Value::from("fff"))),
            (ArithOp::Add, Value::from("foo"), Value::from("bar"), Some(Value::from("foobar"))),
            (ArithOp::Multiply, Value::from("bar"), Value::from("foo"), None),
            (ArithOp::Add, Value::from("a"), Value::Integer(1), None),
            (
                ArithOp::Add,
                Value::Array(vec![Value::Integer(1)]),
                Value::Array(vec![Value::Integer(2)]),
                Some(Value::Array(vec![Value::Integer(1), Value::Integer(2)])),
            ),
        ];

        for (op, left, right, expected) in test_cases {
            assert_eq!(
                apply_arithmetic(op, &left, &right),
                expected,
                "Failed for: {:?} {} {:?}",
                left,
                op.symbol(),
                right
            );
        }
    }

    #[test]
    fn test_split() {
        assert_eq!(
            split("foo-bar-cat-bow", "-", SplitIndex::At(2), -1),
            Some("cat".to_string())
        );
        assert_eq!(
            split("foo-bar-cat-bow", "-", SplitIndex::At(2), 2),
            Some("cat-bow".to_string())
        );
        assert_eq!(
            split(
                "foo-bar-cat-bow",
                "-",
                SplitIndex::Range {
                    start: Some(1),
                    end: None
                },
                -1
            ),
            Some("bar-cat-bow".to_string())
        );
        assert_eq!(split("foo", "-", SplitIndex::At(3), -1), None);
    }

    #[test]
    fn test_substitute_unchanged_is_none() {
        let pattern = Pattern::new("x+").unwrap();
        assert_eq!(substitute(&pattern, "y", "abc"), None);
        assert_eq!(substitute(&pattern, "y", "axxb"), Some("ayb".to_string()));
    }
}
