use std::{borrow::Cow, cmp::Reverse, collections::HashSet, rc::Rc};

use crate::{
    ast::{Comparison, Expression, Literal, Path},
    datum::Datum,
    methods,
    transform::{self, Location},
    value::Value,
};

/// Evaluates compiled paths against tree values.
///
/// The evaluator holds the evaluation configuration. It is immutable once
/// built, so one evaluator can serve any number of queries, and evaluators
/// with different settings never interfere with each other.
///
/// # Examples
///
/// ```
/// use jsonpath_lang::{compile, Evaluator, Value};
/// use serde_json::json;
///
/// let data = Value::from(json!({"foo": {"id": "bizzle", "baz": 3}}));
/// let path = compile("foo.baz.id").unwrap();
///
/// let labels: Vec<String> = Evaluator::with_auto_id("id")
///     .find(&path, &data)
///     .iter()
///     .map(|m| m.value().to_string())
///     .collect();
///
/// assert_eq!(labels, ["bizzle.baz"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    /// Member name that labels matches by identity instead of by position
    auto_id_field: Option<String>,
}

/// Errors raised while writing through a path.
///
/// Reading never fails: a segment that does not apply simply matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Existing data cannot host the container a path needs
    TypeError(String),
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::TypeError(msg) => write!(f, "Type error: {}", msg),
        }
    }
}

impl std::error::Error for EvalError {}

impl Evaluator {
    /// Creates an evaluator without an auto-id field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an evaluator that treats `field` as the auto-id field.
    pub fn with_auto_id(field: impl Into<String>) -> Self {
        Evaluator {
            auto_id_field: Some(field.into()),
        }
    }

    pub fn auto_id_field(&self) -> Option<&str> {
        self.auto_id_field.as_deref()
    }

    /// Every match of `path` in `data`, in document order.
    pub fn find<'a>(&self, path: &Path, data: &'a Value) -> Vec<Datum<'a>> {
        self.find_from(path, Datum::new(data))
    }

    /// Continues a query from an existing match, keeping its context chain.
    pub fn find_from<'a>(&self, path: &Path, datum: Datum<'a>) -> Vec<Datum<'a>> {
        let matches: Vec<Datum<'a>> = self
            .eval(path, &Rc::new(datum))
            .into_iter()
            .map(Rc::unwrap_or_clone)
            .collect();
        log::trace!("{} matched {} value(s)", path, matches.len());
        matches
    }

    /// Replaces every match of `path` in `data` with `value`.
    pub fn update(&self, path: &Path, data: &mut Value, value: Value) {
        self.update_with(path, data, |_, _, _| value.clone());
    }

    /// Replaces every match of `path` in `data` with the result of `f`.
    ///
    /// `f` receives the current value, the whole tree, and the match's full
    /// path. All matches are resolved before the first write, and deeper
    /// matches are written before the values that contain them. Matches the
    /// evaluator computed rather than found (arithmetic, sorting, named
    /// operators, auto-id labels) are skipped.
    pub fn update_with<F>(&self, path: &Path, data: &mut Value, mut f: F)
    where
        F: FnMut(&Value, &Value, &Path) -> Value,
    {
        let targets = self.write_targets(path, data);
        log::debug!("updating {} location(s) matched by {}", targets.len(), path);

        for (location, full_path) in targets {
            let Some(current) = transform::resolve(data, &location).cloned() else {
                continue;
            };
            let replacement = f(&current, data, &full_path);
            if let Some(slot) = transform::resolve_mut(data, &location) {
                *slot = replacement;
            }
        }
    }

    /// Like [`Evaluator::update`], but builds missing mappings and sequences
    /// along field and index segments first.
    ///
    /// # Errors
    ///
    /// [`EvalError::TypeError`] when existing data is the wrong kind of
    /// container for a segment, e.g. a field on a sequence.
    pub fn update_or_create(
        &self,
        path: &Path,
        data: &mut Value,
        value: Value,
    ) -> Result<(), EvalError> {
        log::debug!("update_or_create through {}", path);
        self.create_at(path, data, &value)
    }

    fn write_targets(&self, path: &Path, data: &Value) -> Vec<(Location, Path)> {
        let mut seen = HashSet::new();
        let mut targets: Vec<(Location, Path)> = self
            .find(path, data)
            .iter()
            .filter_map(|datum| {
                let location = transform::locate(datum)?;
                seen.insert(location.clone())
                    .then(|| (location, datum.full_path()))
            })
            .collect();
        targets.sort_by_key(|(location, _)| Reverse(location.len()));
        targets
    }

    fn create_at(&self, path: &Path, target: &mut Value, value: &Value) -> Result<(), EvalError> {
        match path {
            Path::Root | Path::This => {
                *target = value.clone();
                Ok(())
            }
            Path::Fields {
                names,
                wildcard: false,
            } => {
                let map = transform::ensure_object(target)?;
                for name in names {
                    map.insert(name.clone(), value.clone());
                }
                Ok(())
            }
            Path::Index(index) => {
                let items = transform::ensure_array(target)?;
                if let Some(position) = transform::pad_to(items, *index)
                    && let Some(slot) = items.get_mut(position)
                {
                    *slot = value.clone();
                }
                Ok(())
            }
            Path::Child(left, right) => {
                for location in self.locate_or_create(left, target)? {
                    if let Some(next) = transform::resolve_mut(target, &location) {
                        self.create_at(right, next, value)?;
                    }
                }
                Ok(())
            }
            Path::Slice { .. } => Ok(()),
            // Filters and the rest only ever rewrite what already exists.
            other => {
                self.update(other, target, value.clone());
                Ok(())
            }
        }
    }

    /// Locations of `path` within `target`, creating any missing field or
    /// index segment on the way.
    fn locate_or_create(&self, path: &Path, target: &mut Value) -> Result<Vec<Location>, EvalError> {
        match path {
            Path::Root | Path::This => Ok(vec![Location::new()]),
            Path::Fields {
                names,
                wildcard: false,
            } => {
                let map = transform::ensure_object(target)?;
                Ok(names
                    .iter()
                    .map(|name| {
                        map.entry(name.clone()).or_insert_with(Value::empty_object);
                        vec![transform::PathSegment::Field(name.clone())]
                    })
                    .collect())
            }
            Path::Index(index) => {
                let items = transform::ensure_array(target)?;
                Ok(transform::pad_to(items, *index)
                    .map(|position| vec![transform::PathSegment::Index(position)])
                    .into_iter()
                    .collect())
            }
            Path::Child(left, right) => {
                let mut locations = Vec::new();
                for prefix in self.locate_or_create(left, target)? {
                    let Some(next) = transform::resolve_mut(target, &prefix) else {
                        continue;
                    };
                    for suffix in self.locate_or_create(right, next)? {
                        let mut location = prefix.clone();
                        location.extend(suffix);
                        locations.push(location);
                    }
                }
                Ok(locations)
            }
            other => Ok(self
                .find(other, target)
                .iter()
                .filter_map(transform::locate)
                .collect()),
        }
    }

    pub(crate) fn eval<'a>(&self, path: &Path, datum: &Rc<Datum<'a>>) -> Vec<Rc<Datum<'a>>> {
        match path {
            Path::Root => {
                let root = datum.ancestry().last().unwrap_or(datum.as_ref());
                vec![Rc::new(Datum::with_context(
                    root.cow().clone(),
                    Path::Root,
                    None,
                ))]
            }

            Path::This => vec![Rc::clone(datum)],

            Path::Fields { names, wildcard } => self.fields(datum, names, *wildcard),

            Path::Index(index) => {
                let index = *index;
                descend(
                    datum,
                    datum.project(|value| match value {
                        Value::Null => Vec::new(),
                        Value::Array(items) => normalize_index(index, items.len())
                            .and_then(|i| items.get(i).map(|item| (item, Path::Index(i as i64))))
                            .into_iter()
                            .collect(),
                        // Anything else is a one-element sequence.
                        other if index == 0 || index == -1 => vec![(other, Path::Index(0))],
                        _ => Vec::new(),
                    }),
                )
            }

            Path::Slice { start, end, step } => descend(
                datum,
                datum.project(|value| {
                    let items: Vec<&Value> = match value {
                        Value::Null => return Vec::new(),
                        Value::Array(items) => items.iter().collect(),
                        other => vec![other],
                    };
                    slice_indices(items.len(), *start, *end, *step)
                        .into_iter()
                        .map(|i| (items[i], Path::Index(i as i64)))
                        .collect()
                }),
            ),

            Path::Child(left, right) => self
                .eval(left, datum)
                .iter()
                .filter(|matched| !matched.is_auto_id())
                .flat_map(|matched| self.eval(right, matched))
                .collect(),

            Path::Where(left, right) => self
                .eval(left, datum)
                .into_iter()
                .filter(|matched| !self.eval(right, matched).is_empty())
                .collect(),

            Path::WhereNot(left, right) => self
                .eval(left, datum)
                .into_iter()
                .filter(|matched| self.eval(right, matched).is_empty())
                .collect(),

            Path::Descendants(left, right) => self.descendants(left, right, datum),

            Path::Union(alternatives) => alternatives
                .iter()
                .flat_map(|alternative| self.eval(alternative, datum))
                .collect(),

            Path::Parent => datum.context_rc().cloned().into_iter().collect(),

            Path::Filter(conditions) => self.filter(conditions, datum),

            Path::Sort(keys) => methods::sort(self, path, keys, datum),

            Path::Arithmetic { op, left, right } => {
                methods::arithmetic(self, path, *op, left, right, datum)
            }

            Path::Operator(operator) => methods::apply_named(self, path, operator, datum),
        }
    }

    fn fields<'a>(
        &self,
        datum: &Rc<Datum<'a>>,
        names: &[String],
        wildcard: bool,
    ) -> Vec<Rc<Datum<'a>>> {
        let names: Vec<String> = if wildcard {
            let Value::Object(map) = datum.value() else {
                return Vec::new();
            };
            let mut keys: Vec<String> = map.keys().cloned().collect();
            if let Some(id) = &self.auto_id_field
                && !map.contains_key(id)
            {
                keys.push(id.clone());
            }
            keys
        } else {
            names.to_vec()
        };

        names
            .iter()
            .filter_map(|name| self.field(datum, name))
            .collect()
    }

    fn field<'a>(&self, datum: &Rc<Datum<'a>>, name: &str) -> Option<Rc<Datum<'a>>> {
        if self.auto_id_field.as_deref() == Some(name) {
            return Some(Rc::new(Datum::auto_id(name, Rc::clone(datum))));
        }

        let selected = datum.project(|value| {
            value
                .get(name)
                .map(|member| (member, Path::field(name)))
                .into_iter()
                .collect()
        });
        descend(datum, selected).pop()
    }

    /// Applies `right` to every left match and to everything below it,
    /// depth first, each node before its children.
    fn descendants<'a>(
        &self,
        left: &Path,
        right: &Path,
        datum: &Rc<Datum<'a>>,
    ) -> Vec<Rc<Datum<'a>>> {
        let mut results = Vec::new();
        let mut stack: Vec<Rc<Datum<'a>>> = self.eval(left, datum);
        stack.reverse();

        while let Some(node) = stack.pop() {
            results.extend(self.eval(right, &node));
            let children = descend(&node, node.project(members));
            stack.extend(children.into_iter().rev());
        }

        results
    }

    /// Members of the incoming value that satisfy every condition.
    fn filter<'a>(&self, conditions: &[Expression], datum: &Rc<Datum<'a>>) -> Vec<Rc<Datum<'a>>> {
        if conditions.is_empty() {
            return vec![Rc::clone(datum)];
        }

        descend(datum, datum.project(members))
            .into_iter()
            .filter(|member| {
                conditions
                    .iter()
                    .all(|condition| self.satisfies(condition, member))
            })
            .collect()
    }

    fn satisfies(&self, condition: &Expression, datum: &Rc<Datum<'_>>) -> bool {
        let found = self.eval(&condition.target, datum);
        match &condition.comparison {
            None => !found.is_empty(),
            Some(comparison) => found
                .iter()
                .any(|matched| compare(matched.value(), comparison)),
        }
    }
}

/// Compares a found value with a filter literal. Kinds that cannot be
/// compared never match.
fn compare(value: &Value, comparison: &Comparison) -> bool {
    let op = comparison.op;
    match &comparison.literal {
        Literal::Pattern(pattern) => value
            .as_str()
            .is_some_and(|text| pattern.regex().is_match(text)),
        Literal::Integer(n) => value.as_int().is_some_and(|v| op.accepts(v.cmp(n))),
        Literal::Float(n) => value
            .as_float()
            .and_then(|v| v.partial_cmp(n))
            .is_some_and(|ordering| op.accepts(ordering)),
        Literal::String(s) => value
            .as_str()
            .is_some_and(|v| op.accepts(v.cmp(s.as_str()))),
        Literal::Boolean(b) => matches!(value, Value::Boolean(v) if op.accepts(v.cmp(b))),
    }
}

/// Sequence elements and mapping values with the segments that reach them.
fn members(value: &Value) -> Vec<(&Value, Path)> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| (item, Path::Index(i as i64)))
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(key, member)| (member, Path::field(key.as_str())))
            .collect(),
        _ => Vec::new(),
    }
}

/// Wraps selected values as children of `datum`.
fn descend<'a>(
    datum: &Rc<Datum<'a>>,
    selected: Vec<(Cow<'a, Value>, Path)>,
) -> Vec<Rc<Datum<'a>>> {
    selected
        .into_iter()
        .map(|(value, path)| {
            Rc::new(Datum::with_context(value, path, Some(Rc::clone(datum))))
        })
        .collect()
}

/// Resolves a possibly negative index against `len`.
pub(crate) fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { index + len } else { index };
    (0..len).contains(&resolved).then_some(resolved as usize)
}

/// Positions selected by a Python-style `start:end:step` slice of a
/// sequence of length `len`.
pub(crate) fn slice_indices(
    len: usize,
    start: Option<i64>,
    end: Option<i64>,
    step: Option<i64>,
) -> Vec<usize> {
    let Ok(len) = i64::try_from(len) else {
        return Vec::new();
    };
    let step = step.unwrap_or(1);
    let clamp = |bound: i64, low: i64, high: i64| {
        let bound = if bound < 0 { bound + len } else { bound };
        bound.clamp(low, high)
    };

    if step > 0 {
        let start = start.map_or(0, |s| clamp(s, 0, len));
        let end = end.map_or(len, |e| clamp(e, 0, len));
        (start..end)
            .step_by(step as usize)
            .map(|i| i as usize)
            .collect()
    } else if step < 0 {
        let start = start.map_or(len - 1, |s| clamp(s, -1, len - 1));
        let end = end.map_or(-1, |e| clamp(e, -1, len - 1));
        let mut indices = Vec::new();
        let mut i = start;
        while i > end {
            indices.push(i as usize);
            i += step;
        }
        indices
    } else {
        Vec::new()
    }
}

/// Shorthands that evaluate with a default [`Evaluator`].
impl Path {
    pub fn find<'a>(&self, data: &'a Value) -> Vec<Datum<'a>> {
        Evaluator::new().find(self, data)
    }

    pub fn update(&self, data: &mut Value, value: Value) {
        Evaluator::new().update(self, data, value)
    }

    pub fn update_with<F>(&self, data: &mut Value, f: F)
    where
        F: FnMut(&Value, &Value, &Path) -> Value,
    {
        Evaluator::new().update_with(self, data, f)
    }

    pub fn update_or_create(&self, data: &mut Value, value: Value) -> Result<(), EvalError> {
        Evaluator::new().update_or_create(self, data, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_indices() {
        let test_cases = vec![
            ((4, Some(1), None, None), vec![1, 2, 3]),
            ((4, None, Some(2), None), vec![0, 1]),
            ((4, None, Some(3), Some(2)), vec![0, 2]),
            ((5, None, None, Some(-2)), vec![4, 2, 0]),
            ((9, Some(1), Some(6), Some(3)), vec![1, 4]),
            ((3, Some(-10), Some(10), None), vec![0, 1, 2]),
            ((0, None, None, Some(-1)), vec![]),
        ];

        for ((len, start, end, step), expected) in test_cases {
            assert_eq!(
                slice_indices(len, start, end, step),
                expected,
                "Failed for slice {:?}:{:?}:{:?} of {}",
                start,
                end,
                step,
                len
            );
        }
    }

    #[test]
    fn test_normalize_index() {
        assert_eq!(normalize_index(-1, 3), Some(2));
        assert_eq!(normalize_index(3, 3), None);
        assert_eq!(normalize_index(-4, 3), None);
    }
}
