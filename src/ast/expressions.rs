use regex::Regex;

use crate::ast::{CompareOp, Path};

/// One condition of a filter.
///
/// Without a comparison the condition is an existence test: it holds when
/// `target` matches anything.
///
/// # Examples
/// ```text
/// @.isbn
/// cow > 5
/// @ =~ "a.+"
/// flag = true
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub target: Path,
    pub comparison: Option<Comparison>,
}

impl Expression {
    pub fn exists(target: Path) -> Self {
        Expression {
            target,
            comparison: None,
        }
    }

    pub fn compare(target: Path, op: CompareOp, literal: Literal) -> Self {
        Expression {
            target,
            comparison: Some(Comparison { op, literal }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub op: CompareOp,
    pub literal: Literal,
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Quoted or bare text
    String(String),
    Integer(i64),
    Float(f64),
    /// `true` / `false`, distinct from the strings `"true"` / `"false"`
    Boolean(bool),
    /// Compiled right-hand side of `=~`
    Pattern(Pattern),
}

/// A compiled regular expression that compares by its source text.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Pattern)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn regex(&self) -> &Regex {
        &self.0
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}
