use crate::ast::{ArithOp, Expression, NamedOperator, SortDirection};
use crate::value::Value;

/// A compiled path expression.
///
/// Nodes are immutable once parsed and compare structurally, so two spellings
/// of the same query produce equal trees.
#[derive(Debug, Clone, PartialEq)]
pub enum Path {
    /// The document root (`$`)
    Root,

    /// The current value (`` `this` ``, or `@` in the extended grammar)
    This,

    /// One or more mapping members, or every member with `wildcard`
    ///
    /// # Examples
    /// ```text
    /// foo
    /// baz,bizzle
    /// 'a.c'
    /// *
    /// ```
    Fields { names: Vec<String>, wildcard: bool },

    /// A sequence element; negative positions count from the end
    ///
    /// # Examples
    /// ```text
    /// [0]
    /// [-1]
    /// ```
    Index(i64),

    /// A Python-style slice; `[*]` is the full slice
    ///
    /// # Examples
    /// ```text
    /// [1:]
    /// [:3:2]
    /// [::-1]
    /// [*]
    /// ```
    Slice {
        start: Option<i64>,
        end: Option<i64>,
        step: Option<i64>,
    },

    /// Right side applied to every match of the left side (`left.right`)
    Child(Box<Path>, Box<Path>),

    /// Left matches for which the right side matches something (`left where right`)
    Where(Box<Path>, Box<Path>),

    /// Left matches for which the right side matches nothing (`left wherenot right`)
    WhereNot(Box<Path>, Box<Path>),

    /// Right side applied at every depth below the left matches (`left..right`)
    Descendants(Box<Path>, Box<Path>),

    /// Alternatives evaluated independently and concatenated (`a|b`)
    Union(Vec<Path>),

    /// The value one level up (`` `parent` ``)
    Parent,

    /// Members whose every condition holds (`[?cond & cond]`)
    ///
    /// # Examples
    /// ```text
    /// [?price < 10]
    /// [?(@.isbn)]
    /// [?name =~ "^a"]
    /// ```
    Filter(Vec<Expression>),

    /// The incoming sequence sorted by the listed keys (`[/a,\b]`)
    Sort(Vec<SortKey>),

    /// Infix arithmetic over literals and sub-path results
    ///
    /// # Examples
    /// ```text
    /// $.foo * 10
    /// foo + "_" + bar
    /// ```
    Arithmetic {
        op: ArithOp,
        left: Operand,
        right: Operand,
    },

    /// A backtick-quoted extension such as `` `len` ``
    Operator(NamedOperator),
}

/// One key of a sort selector.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub path: Path,
    pub direction: SortDirection,
}

/// One side of an arithmetic node.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    Path(Box<Path>),
}

impl Operand {
    /// A lone field name in operand position is literal text, so `foo + bar`
    /// concatenates the strings rather than the members.
    pub(crate) fn literalized(self) -> Operand {
        match self {
            Operand::Path(path) => match *path {
                Path::Fields {
                    mut names,
                    wildcard: false,
                } if names.len() == 1 => Operand::Literal(Value::String(names.remove(0))),
                other => Operand::Path(Box::new(other)),
            },
            literal => literal,
        }
    }
}

impl Path {
    /// A single named field.
    pub fn field(name: impl Into<String>) -> Path {
        Path::Fields {
            names: vec![name.into()],
            wildcard: false,
        }
    }

    /// A union of named fields, matched in the given order.
    pub fn fields<I, S>(names: I) -> Path
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Path::Fields {
            names: names.into_iter().map(Into::into).collect(),
            wildcard: false,
        }
    }

    /// Every member of a mapping (`*`).
    pub fn wildcard() -> Path {
        Path::Fields {
            names: Vec::new(),
            wildcard: true,
        }
    }

    /// The full slice, as written `[*]` or `[:]`.
    pub fn full_slice() -> Path {
        Path::Slice {
            start: None,
            end: None,
            step: None,
        }
    }

    /// Composes `self` with a following segment, folding away identities:
    /// `this` and `$` on the left are absorbed, `this` on the right is
    /// dropped, and `$` on the right restarts the path.
    pub fn child(self, child: Path) -> Path {
        match (self, child) {
            (Path::This | Path::Root, child) => child,
            (parent, Path::This) => parent,
            (_, Path::Root) => Path::Root,
            (parent, child) => Path::Child(Box::new(parent), Box::new(child)),
        }
    }
}
