use std::fmt;

/// Lexical tokens of path expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Optionally signed integer
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -1
    /// ```
    Number(i64),

    /// Optionally signed decimal number (extended profile only)
    ///
    /// # Examples
    /// ```text
    /// 0.5
    /// -2.25
    /// ```
    Float(f64),

    /// Boolean literal (extended profile only)
    ///
    /// The quoted forms `"true"` and `"false"` lex as identifiers instead.
    Boolean(bool),

    // Identifiers
    /// Field name, bare or quoted
    ///
    /// Bare names may contain letters, digits, `_`, `@` and `-`, but cannot
    /// start with a digit or `-`. Quoted names may contain anything; a
    /// backslash makes the following character literal.
    ///
    /// # Examples
    /// ```text
    /// foo
    /// bar-baz
    /// @foo
    /// 'a.c'
    /// "doublequote\""
    /// ```
    Identifier(String),

    /// Backtick-quoted named operator, carrying its inner text
    ///
    /// # Examples
    /// ```text
    /// `this`
    /// `len`
    /// `sub(/foo\\+bar/, repl)`
    /// ```
    NamedOperator(String),

    // Keywords
    /// `where`
    Where,
    /// `wherenot`
    WhereNot,

    // Structural punctuation
    /// Root reference `$`
    Dollar,
    /// Child separator `.`
    Dot,
    /// Descendant separator `..`
    DoubleDot,
    /// Wildcard or multiplication `*`
    Star,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `|`
    Pipe,
    /// `&`
    Ampersand,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `(`
    LParen,
    /// `)`
    RParen,

    // Extended profile operators
    /// Filter introducer `?`
    Question,
    /// Addition `+`
    Plus,
    /// Ascending sort or division `/`
    Slash,
    /// Descending sort `\`
    Backslash,
    /// `=`
    Eq,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// Regex search `=~`
    Matches,

    /// End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", n),
            Token::Float(n) => write!(f, "number {}", n),
            Token::Boolean(b) => write!(f, "'{}'", b),
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
            Token::NamedOperator(name) => write!(f, "named operator `{}`", name),
            Token::Where => f.write_str("'where'"),
            Token::WhereNot => f.write_str("'wherenot'"),
            Token::Dollar => f.write_str("'$'"),
            Token::Dot => f.write_str("'.'"),
            Token::DoubleDot => f.write_str("'..'"),
            Token::Star => f.write_str("'*'"),
            Token::Comma => f.write_str("','"),
            Token::Colon => f.write_str("':'"),
            Token::Pipe => f.write_str("'|'"),
            Token::Ampersand => f.write_str("'&'"),
            Token::LBracket => f.write_str("'['"),
            Token::RBracket => f.write_str("']'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Question => f.write_str("'?'"),
            Token::Plus => f.write_str("'+'"),
            Token::Slash => f.write_str("'/'"),
            Token::Backslash => f.write_str("'\\'"),
            Token::Eq => f.write_str("'='"),
            Token::EqEq => f.write_str("'=='"),
            Token::NotEq => f.write_str("'!='"),
            Token::Lt => f.write_str("'<'"),
            Token::LtEq => f.write_str("'<='"),
            Token::Gt => f.write_str("'>'"),
            Token::GtEq => f.write_str("'>='"),
            Token::Matches => f.write_str("'=~'"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}
