//! Matched values and the context chain behind their full paths.
//!
//! Every match is a [`Datum`]: the value, the path segment that selected it,
//! and a shared link to the datum it was selected from. The chain mirrors the
//! tree walk, so it is finite and acyclic, and the absolute path is only
//! assembled when [`Datum::full_path`] asks for it.

use std::borrow::Cow;
use std::mem;
use std::rc::Rc;

use crate::ast::Path;
use crate::value::Value;

/// A matched value with the segment that produced it.
///
/// Values borrow from the queried tree; values the evaluator computes
/// (arithmetic results, sorted lists, auto-id labels) are owned.
///
/// # Examples
///
/// ```
/// use jsonpath_lang::{compile, Value};
/// use serde_json::json;
///
/// let data = Value::from(json!({"foo": {"baz": 1, "bing": {"baz": 2}}}));
/// let paths: Vec<String> = compile("foo..baz")
///     .unwrap()
///     .find(&data)
///     .iter()
///     .map(|m| m.full_path().to_string())
///     .collect();
///
/// assert_eq!(paths, ["foo.baz", "foo.bing.baz"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Datum<'a> {
    value: Cow<'a, Value>,
    path: Path,
    context: Option<Rc<Datum<'a>>>,
    auto_id: bool,
}

impl<'a> Datum<'a> {
    /// The starting point of a query: `value` at `` `this` `` with no context.
    pub fn new(value: &'a Value) -> Self {
        Datum {
            value: Cow::Borrowed(value),
            path: Path::This,
            context: None,
            auto_id: false,
        }
    }

    /// A context-free datum holding its own value.
    pub fn owned(value: Value) -> Self {
        Datum {
            value: Cow::Owned(value),
            path: Path::This,
            context: None,
            auto_id: false,
        }
    }

    pub(crate) fn with_context(
        value: Cow<'a, Value>,
        path: Path,
        context: Option<Rc<Datum<'a>>>,
    ) -> Self {
        Datum {
            value,
            path,
            context,
            auto_id: false,
        }
    }

    /// The label datum produced when the auto-id field is selected on `context`.
    pub(crate) fn auto_id(field: &str, context: Rc<Datum<'a>>) -> Self {
        let label = context.id_pseudopath(field).to_string();
        Datum {
            value: Cow::Owned(Value::String(label)),
            path: Path::field(field),
            context: Some(context),
            auto_id: true,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(mut self) -> Value {
        mem::replace(&mut self.value, Cow::Owned(Value::Null)).into_owned()
    }

    pub(crate) fn cow(&self) -> &Cow<'a, Value> {
        &self.value
    }

    /// The segment that selected this value from its context.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The datum this one was selected from, if any.
    pub fn context(&self) -> Option<&Datum<'a>> {
        self.context.as_deref()
    }

    pub(crate) fn context_rc(&self) -> Option<&Rc<Datum<'a>>> {
        self.context.as_ref()
    }

    /// Whether this is a synthesized auto-id label rather than tree data.
    pub fn is_auto_id(&self) -> bool {
        self.auto_id
    }

    /// Iterates from this datum up to the root of its chain.
    pub fn ancestry(&self) -> impl Iterator<Item = &Datum<'a>> {
        std::iter::successors(Some(self), |datum| datum.context())
    }

    /// Absolute path from the root of the chain, rebuilt on every call.
    pub fn full_path(&self) -> Path {
        let segments: Vec<&Path> = self.ancestry().map(|datum| &datum.path).collect();
        segments
            .into_iter()
            .rev()
            .fold(Path::This, |path, segment| path.child(segment.clone()))
    }

    /// Like [`Datum::full_path`], but every mapping on the way that carries
    /// `field` is labelled by that member's value instead of its own segment.
    pub fn id_pseudopath(&self, field: &str) -> Path {
        let segments: Vec<Path> = self
            .ancestry()
            .map(|datum| match datum.value.get(field) {
                Some(id) => Path::field(id.to_string()),
                None => datum.path.clone(),
            })
            .collect();
        segments
            .into_iter()
            .rev()
            .fold(Path::This, |path, segment| path.child(segment))
    }

    /// Re-roots this datum under `path` within `context`.
    ///
    /// When this datum already has a chain, its own segment is kept and the
    /// new context is spliced in directly above it, so nesting `in_context`
    /// calls and applying them one after another agree.
    pub fn in_context(mut self, path: Path, context: Datum<'a>) -> Datum<'a> {
        let value = mem::replace(&mut self.value, Cow::Owned(Value::Null));
        match self.context.take() {
            Some(own) => {
                let spliced = context.in_context(path, Rc::unwrap_or_clone(own));
                Datum {
                    value,
                    path: mem::replace(&mut self.path, Path::This),
                    context: Some(Rc::new(spliced)),
                    auto_id: self.auto_id,
                }
            }
            None => Datum {
                value,
                path,
                context: Some(Rc::new(context)),
                auto_id: self.auto_id,
            },
        }
    }

    /// Selects parts of this datum's value, borrowing from the source tree
    /// when the value is borrowed and cloning when it is owned.
    pub(crate) fn project<F>(&self, select: F) -> Vec<(Cow<'a, Value>, Path)>
    where
        F: for<'v> Fn(&'v Value) -> Vec<(&'v Value, Path)>,
    {
        match &self.value {
            Cow::Borrowed(value) => select(*value)
                .into_iter()
                .map(|(child, path)| (Cow::Borrowed(child), path))
                .collect(),
            Cow::Owned(value) => select(value)
                .into_iter()
                .map(|(child, path)| (Cow::Owned(child.clone()), path))
                .collect(),
        }
    }
}

/// Unlinks the context chain one datum at a time, so dropping a match from
/// a very deep tree does not recurse once per level.
impl Drop for Datum<'_> {
    fn drop(&mut self) {
        let mut next = self.context.take();
        while let Some(link) = next {
            next = Rc::into_inner(link).and_then(|mut parent| parent.context.take());
        }
    }
}
