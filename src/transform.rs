use indexmap::IndexMap;

use crate::{ast::Path, datum::Datum, evaluator::EvalError, value::Value};

/// One step of a concrete location inside a tree.
///
/// Write operations turn matches into locations before touching the tree,
/// so every match is addressed by plain member names and absolute positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Mapping member by name
    Field(String),

    /// Sequence element by absolute position
    Index(usize),
}

/// Segments from the root of a tree down to one value.
///
/// # Examples
///
/// For the match reported as `foo.[1].bar`:
/// - `PathSegment::Field("foo")`
/// - `PathSegment::Index(1)`
/// - `PathSegment::Field("bar")`
pub type Location = Vec<PathSegment>;

/// Extracts the location a match was found at.
///
/// Returns `None` for values the evaluator computed rather than found. A
/// scalar or mapping matched as a one-element sequence is located at the
/// value itself.
pub fn locate(datum: &Datum<'_>) -> Option<Location> {
    let mut chain: Vec<&Datum<'_>> = datum.ancestry().collect();
    chain.reverse();

    let mut location = Location::new();
    let mut parent: Option<&Datum<'_>> = None;

    for link in chain {
        if link.is_auto_id() {
            return None;
        }

        match link.path() {
            // `$` restarts at the top of the tree
            Path::Root => location.clear(),
            Path::This => {}
            Path::Fields {
                names,
                wildcard: false,
            } if names.len() == 1 => location.push(PathSegment::Field(names[0].clone())),
            Path::Index(index) => {
                if parent.is_some_and(|p| matches!(p.value(), Value::Array(_))) {
                    location.push(PathSegment::Index(usize::try_from(*index).ok()?));
                }
            }
            _ => return None,
        }

        parent = Some(link);
    }

    Some(location)
}

pub fn resolve<'v>(root: &'v Value, location: &[PathSegment]) -> Option<&'v Value> {
    location
        .iter()
        .try_fold(root, |current, segment| match (current, segment) {
            (Value::Object(map), PathSegment::Field(key)) => map.get(key),
            (Value::Array(items), PathSegment::Index(index)) => items.get(*index),
            _ => None,
        })
}

pub fn resolve_mut<'v>(root: &'v mut Value, location: &[PathSegment]) -> Option<&'v mut Value> {
    location
        .iter()
        .try_fold(root, |current, segment| match (current, segment) {
            (Value::Object(map), PathSegment::Field(key)) => map.get_mut(key),
            (Value::Array(items), PathSegment::Index(index)) => items.get_mut(*index),
            _ => None,
        })
}

/// Makes `target` a mapping if it is absent.
pub(crate) fn ensure_object(target: &mut Value) -> Result<&mut IndexMap<String, Value>, EvalError> {
    if target.is_null() {
        *target = Value::empty_object();
    }
    match target {
        Value::Object(map) => Ok(map),
        other => Err(EvalError::TypeError(format!(
            "Cannot create a field on {}",
            other.type_name()
        ))),
    }
}

/// Makes `target` a sequence if it is absent or an empty mapping.
pub(crate) fn ensure_array(target: &mut Value) -> Result<&mut Vec<Value>, EvalError> {
    let convertible = match target {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if convertible {
        *target = Value::Array(Vec::new());
    }
    match target {
        Value::Array(items) => Ok(items),
        other => Err(EvalError::TypeError(format!(
            "Cannot create an index on {}",
            other.type_name()
        ))),
    }
}

/// Grows `items` with empty mappings until `index` exists, returning its
/// absolute position. Negative indices never grow the sequence.
pub(crate) fn pad_to(items: &mut Vec<Value>, index: i64) -> Option<usize> {
    if index < 0 {
        let position = i64::try_from(items.len()).ok()? + index;
        return usize::try_from(position).ok();
    }

    let position = usize::try_from(index).ok()?;
    while items.len() <= position {
        items.push(Value::empty_object());
    }
    Some(position)
}
