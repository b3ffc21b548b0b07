//! Textual rendering of path nodes.
//!
//! The rendering is the `path_string` reported for every match, and it
//! re-parses to an equivalent expression: sub-expressions are parenthesized
//! only where operator binding would otherwise change their grouping.

use std::fmt;

use crate::ast::{Expression, Literal, NamedOperator, Operand, Path, SortKey, SplitIndex};
use crate::output::to_json;
use crate::value::Value;

/// Characters that cannot appear in a bare field name.
const RESERVED: &[char] = &[
    '*', '.', '[', ']', '(', ')', '$', ',', ':', '|', '&', '~', '?', '\'', '"', '`', '\\', '/',
    '=', '<', '>', '!', '+', '#',
];

impl Path {
    /// Binding strength, loosest first. Mirrors the parser's precedence.
    fn binding(&self) -> u8 {
        match self {
            Path::Arithmetic { .. } => 1,
            Path::Descendants(..) => 3,
            Path::Child(..) => 4,
            Path::Union(_) => 5,
            Path::Where(..) | Path::WhereNot(..) => 6,
            _ => 9,
        }
    }
}

/// Writes `path`, parenthesized when it binds looser than `min`.
fn write_operand(f: &mut fmt::Formatter<'_>, path: &Path, min: u8) -> fmt::Result {
    if path.binding() < min {
        write!(f, "({})", path)
    } else {
        write!(f, "{}", path)
    }
}

fn write_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    let needs_quotes = name.is_empty()
        || name == "where"
        || name == "wherenot"
        || name.chars().any(|c| c.is_whitespace() || RESERVED.contains(&c));

    if !needs_quotes {
        return f.write_str(name);
    }

    f.write_str("'")?;
    for c in name.chars() {
        if c == '\'' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{}", c)?;
    }
    f.write_str("'")
}

fn write_bound(f: &mut fmt::Formatter<'_>, bound: Option<i64>) -> fmt::Result {
    match bound {
        Some(n) => write!(f, "{}", n),
        None => Ok(()),
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Root => f.write_str("$"),
            Path::This => f.write_str("`this`"),
            Path::Parent => f.write_str("`parent`"),
            Path::Fields { wildcard: true, .. } => f.write_str("*"),
            Path::Fields { names, .. } => {
                for (i, name) in names.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write_name(f, name)?;
                }
                Ok(())
            }
            Path::Index(i) => write!(f, "[{}]", i),
            Path::Slice {
                start: None,
                end: None,
                step: None,
            } => f.write_str("[*]"),
            Path::Slice { start, end, step } => {
                f.write_str("[")?;
                write_bound(f, *start)?;
                f.write_str(":")?;
                write_bound(f, *end)?;
                if let Some(step) = step {
                    write!(f, ":{}", step)?;
                }
                f.write_str("]")
            }
            Path::Child(left, right) => {
                write_operand(f, left, 4)?;
                f.write_str(".")?;
                write_operand(f, right, 5)
            }
            Path::Descendants(left, right) => {
                write_operand(f, left, 3)?;
                f.write_str("..")?;
                write_operand(f, right, 4)
            }
            Path::Where(left, right) | Path::WhereNot(left, right) => {
                let keyword = if matches!(self, Path::Where(..)) {
                    "where"
                } else {
                    "wherenot"
                };
                write_operand(f, left, 6)?;
                write!(f, " {} ", keyword)?;
                write_operand(f, right, 7)
            }
            Path::Union(alternatives) => {
                for (i, alternative) in alternatives.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write_operand(f, alternative, 6)?;
                }
                Ok(())
            }
            Path::Filter(conditions) => {
                f.write_str("[?")?;
                for (i, condition) in conditions.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" & ")?;
                    }
                    write!(f, "{}", condition)?;
                }
                f.write_str("]")
            }
            Path::Sort(keys) => {
                f.write_str("[")?;
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", key)?;
                }
                f.write_str("]")
            }
            Path::Arithmetic { op, left, right } => {
                write_arith_operand(f, left, 2)?;
                write!(f, " {} ", op.symbol())?;
                write_arith_operand(f, right, 1)
            }
            Path::Operator(operator) => write!(f, "`{}`", operator),
        }
    }
}

fn write_arith_operand(f: &mut fmt::Formatter<'_>, operand: &Operand, min: u8) -> fmt::Result {
    match operand {
        Operand::Literal(value) => f.write_str(&to_json(value)),
        Operand::Path(path) => write_operand(f, path, min),
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.direction.symbol())?;
        write_operand(f, &self.path, 2)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target)?;
        if let Some(comparison) = &self.comparison {
            write!(f, " {} {}", comparison.op.symbol(), comparison.literal)?;
        }
        Ok(())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => f.write_str(&to_json(&Value::String(s.clone()))),
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Float(n) => write!(f, "{:?}", n),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Pattern(pattern) => {
                f.write_str(&to_json(&Value::String(pattern.as_str().to_string())))
            }
        }
    }
}

impl fmt::Display for NamedOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamedOperator::Len => f.write_str("len"),
            NamedOperator::Keys => f.write_str("keys"),
            NamedOperator::Sorted => f.write_str("sorted"),
            NamedOperator::Str => f.write_str("str()"),
            NamedOperator::Sub {
                pattern,
                replacement,
            } => write!(f, "sub(/{}/, {})", pattern.as_str(), replacement),
            NamedOperator::Split {
                separator,
                index,
                max_split,
            } => write!(f, "split({}, {}, {})", separator, index, max_split),
        }
    }
}

impl fmt::Display for SplitIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitIndex::At(i) => write!(f, "{}", i),
            SplitIndex::Range { start, end } => {
                write_bound(f, *start)?;
                f.write_str(":")?;
                write_bound(f, *end)
            }
        }
    }
}
