use std::cmp::Ordering;

/// Comparison operators usable inside `[?...]` filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal (`=` or `==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Regex search (`=~`)
    Matches,
}

impl CompareOp {
    /// Whether an ordering between a value and a literal satisfies the operator.
    ///
    /// `Matches` is not order based and never accepts an ordering.
    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Equal => ordering == Ordering::Equal,
            CompareOp::NotEqual => ordering != Ordering::Equal,
            CompareOp::LessThan => ordering == Ordering::Less,
            CompareOp::GreaterThan => ordering == Ordering::Greater,
            CompareOp::LessEqual => ordering != Ordering::Greater,
            CompareOp::GreaterEqual => ordering != Ordering::Less,
            CompareOp::Matches => false,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Equal => "=",
            CompareOp::NotEqual => "!=",
            CompareOp::LessThan => "<",
            CompareOp::GreaterThan => ">",
            CompareOp::LessEqual => "<=",
            CompareOp::GreaterEqual => ">=",
            CompareOp::Matches => "=~",
        }
    }
}

/// Infix arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    /// Addition, string or list concatenation (`+`)
    Add,
    /// Multiplication, string or list repetition (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Multiply => "*",
            ArithOp::Divide => "/",
        }
    }
}

/// Direction of one sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// `/key`
    Ascending,
    /// `\key`
    Descending,
}

impl SortDirection {
    pub fn symbol(self) -> char {
        match self {
            SortDirection::Ascending => '/',
            SortDirection::Descending => '\\',
        }
    }
}
