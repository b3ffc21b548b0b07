use std::fmt;
use std::mem;

use crate::{
    ast::{
        ArithOp, CompareOp, Expression, Literal, NamedOperator, Operand, Path, Pattern,
        SortDirection, SortKey, Token,
    },
    lexer::{LexError, Lexer, Position, Profile},
    value::Value,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The text could not be tokenized
    Lex(LexError),
    /// A token that does not fit the grammar at this point
    UnexpectedToken {
        found: Token,
        expected: &'static str,
        position: Position,
    },
    /// The expression stopped mid-construct
    UnexpectedEnd {
        expected: &'static str,
        position: Position,
    },
    /// A backtick operator the active profile does not define
    UnknownOperator { name: String, position: Position },
    /// A construct that is well-formed token-wise but has an invalid value
    Invalid { message: String, position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(e) => e.position(),
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEnd { position, .. }
            | ParseError::UnknownOperator { position, .. }
            | ParseError::Invalid { position, .. } => *position,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex(e) => write!(f, "{}", e),
            ParseError::UnexpectedToken {
                found,
                expected,
                position,
            } => write!(
                f,
                "Parse error at {}: expected {}, found {}",
                position, expected, found
            ),
            ParseError::UnexpectedEnd { expected, position } => write!(
                f,
                "Parse error at {}: expression ended, expected {}",
                position, expected
            ),
            ParseError::UnknownOperator { name, position } => {
                write!(f, "Parse error at {}: unknown named operator `{}`", position, name)
            }
            ParseError::Invalid { message, position } => {
                write!(f, "Parse error at {}: {}", position, message)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Lex(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lex(e)
    }
}

/// Binding strength of trailing `[...]`: looser than every path operator.
const BRACKET_BINDING: u8 = 20;

/// Deepest nesting of parentheses, brackets and arithmetic the parser accepts.
pub const MAX_NESTING: usize = 128;

/// Infix path operators with their left/right binding power.
#[derive(Clone, Copy)]
enum Infix {
    Descendants,
    Child,
    Union,
    Where,
    WhereNot,
}

impl Infix {
    fn from_token(token: &Token) -> Option<Infix> {
        match token {
            Token::DoubleDot => Some(Infix::Descendants),
            Token::Dot => Some(Infix::Child),
            Token::Pipe => Some(Infix::Union),
            Token::Where => Some(Infix::Where),
            Token::WhereNot => Some(Infix::WhereNot),
            _ => None,
        }
    }

    /// All path operators are left-associative.
    fn binding(self) -> (u8, u8) {
        match self {
            Infix::Descendants => (30, 31),
            Infix::Child => (40, 41),
            Infix::Union => (50, 51),
            Infix::Where | Infix::WhereNot => (60, 61),
        }
    }

    fn combine(self, left: Path, right: Path) -> Path {
        match self {
            Infix::Descendants => Path::Descendants(Box::new(left), Box::new(right)),
            Infix::Child => Path::Child(Box::new(left), Box::new(right)),
            Infix::Where => Path::Where(Box::new(left), Box::new(right)),
            Infix::WhereNot => Path::WhereNot(Box::new(left), Box::new(right)),
            Infix::Union => match left {
                Path::Union(mut alternatives) => {
                    alternatives.push(right);
                    Path::Union(alternatives)
                }
                left => Path::Union(vec![left, right]),
            },
        }
    }
}

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    position: Position,
    peeked: Option<(Token, Position)>,
    profile: Profile,
    depth: usize,
}

impl Parser {
    /// Creates a parser for the lexer's profile, reading the first token.
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        let position = lexer.token_position();
        let profile = lexer.profile();
        Ok(Parser {
            lexer,
            current_token,
            position,
            peeked: None,
            profile,
            depth: 0,
        })
    }

    fn extended(&self) -> bool {
        self.profile == Profile::Extended
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        let (token, position) = match self.peeked.take() {
            Some(next) => next,
            None => (self.lexer.next_token()?, self.lexer.token_position()),
        };
        self.current_token = token;
        self.position = position;
        Ok(())
    }

    /// Tests the token after the current one without consuming anything.
    fn peek_matches(&mut self, predicate: impl Fn(&Token) -> bool) -> Result<bool, ParseError> {
        if self.peeked.is_none() {
            let token = self.lexer.next_token()?;
            self.peeked = Some((token, self.lexer.token_position()));
        }
        Ok(self
            .peeked
            .as_ref()
            .is_some_and(|(token, _)| predicate(token)))
    }

    /// Runs a nested production, refusing to go deeper than [`MAX_NESTING`].
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::Invalid {
                message: format!("expression nests deeper than {} levels", MAX_NESTING),
                position: self.position,
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn expect(&mut self, expected: Token, description: &'static str) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(self.unexpected(description));
        }
        self.advance()
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match &self.current_token {
            Token::Eof => ParseError::UnexpectedEnd {
                expected,
                position: self.position,
            },
            found => ParseError::UnexpectedToken {
                found: found.clone(),
                expected,
                position: self.position,
            },
        }
    }

    /// Parses the whole token stream into one path.
    pub fn parse(&mut self) -> Result<Path, ParseError> {
        let path = self.parse_expression()?;
        if !self.check(&Token::Eof) {
            return Err(self.unexpected("end of expression"));
        }
        Ok(path)
    }

    /// Parses an expression, which must denote a path rather than a bare number.
    fn parse_expression(&mut self) -> Result<Path, ParseError> {
        let position = self.position;
        match self.parse_arithmetic()? {
            Operand::Path(path) => Ok(*path),
            Operand::Literal(_) => Err(ParseError::Invalid {
                message: "a number must be combined with an arithmetic operator".to_string(),
                position,
            }),
        }
    }

    /// Arithmetic binds loosest and associates to the right; all operators
    /// share one precedence.
    fn parse_arithmetic(&mut self) -> Result<Operand, ParseError> {
        let left = self.parse_operand()?;
        let Some(op) = self.arithmetic_operator() else {
            return Ok(left);
        };
        self.advance()?;
        let right = self.nested(Self::parse_arithmetic)?;

        Ok(Operand::Path(Box::new(Path::Arithmetic {
            op,
            left: left.literalized(),
            right: right.literalized(),
        })))
    }

    fn arithmetic_operator(&self) -> Option<ArithOp> {
        if !self.extended() {
            return None;
        }
        match self.current_token {
            Token::Plus => Some(ArithOp::Add),
            Token::Star => Some(ArithOp::Multiply),
            Token::Slash => Some(ArithOp::Divide),
            _ => None,
        }
    }

    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        match self.current_token {
            Token::Number(n) if self.extended() => {
                self.advance()?;
                Ok(Operand::Literal(Value::Integer(n)))
            }
            Token::Float(n) => {
                self.advance()?;
                Ok(Operand::Literal(Value::Float(n)))
            }
            _ => Ok(Operand::Path(Box::new(self.parse_path(0)?))),
        }
    }

    /// Precedence climbing over the path operators.
    fn parse_path(&mut self, min_binding: u8) -> Result<Path, ParseError> {
        let mut left = self.parse_atom()?;

        loop {
            if self.check(&Token::LBracket) {
                if BRACKET_BINDING < min_binding {
                    break;
                }
                self.advance()?;
                let segment = self.nested(Self::parse_bracket_body)?;
                left = Path::Child(Box::new(left), Box::new(segment));
                continue;
            }

            let Some(infix) = Infix::from_token(&self.current_token) else {
                break;
            };
            let (left_binding, right_binding) = infix.binding();
            if left_binding < min_binding {
                break;
            }
            self.advance()?;
            let right = self.parse_path(right_binding)?;
            left = infix.combine(left, right);
        }

        Ok(left)
    }

    /// Parse atoms: field names, `*`, `$`, named operators, leading brackets, parentheses
    fn parse_atom(&mut self) -> Result<Path, ParseError> {
        let position = self.position;

        if let Some(name) = self.take_field_name()? {
            if name == "@" && self.extended() {
                return Ok(Path::This);
            }
            return self.parse_field_union(name);
        }

        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Star => {
                self.advance()?;
                Ok(Path::wildcard())
            }
            Token::Dollar => {
                self.advance()?;
                Ok(Path::Root)
            }
            Token::NamedOperator(name) => {
                self.advance()?;
                self.resolve_operator(name, position)
            }
            Token::LBracket => {
                self.advance()?;
                self.nested(Self::parse_bracket_body)
            }
            Token::LParen => {
                self.advance()?;
                let inner = self.nested(Self::parse_expression)?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Token::Eof => Err(ParseError::UnexpectedEnd {
                expected: "a path",
                position,
            }),
            found => Err(ParseError::UnexpectedToken {
                found,
                expected: "a path",
                position,
            }),
        }
    }

    /// Consumes the current token when it can name a field.
    fn take_field_name(&mut self) -> Result<Option<String>, ParseError> {
        let name = match &self.current_token {
            Token::Identifier(name) => name.clone(),
            Token::Boolean(b) => b.to_string(),
            _ => return Ok(None),
        };
        self.advance()?;
        Ok(Some(name))
    }

    /// `foo,bar,baz`. A comma only continues the union when a name follows,
    /// which leaves `,\key` to the sort-key parser.
    fn parse_field_union(&mut self, first: String) -> Result<Path, ParseError> {
        let mut names = vec![first];
        while self.check(&Token::Comma)
            && self.peek_matches(|t| matches!(t, Token::Identifier(_) | Token::Boolean(_)))?
        {
            self.advance()?;
            if let Some(name) = self.take_field_name()? {
                names.push(name);
            }
        }
        Ok(Path::fields(names))
    }

    fn resolve_operator(&self, name: String, position: Position) -> Result<Path, ParseError> {
        match name.as_str() {
            "this" => return Ok(Path::This),
            "parent" => return Ok(Path::Parent),
            _ => {}
        }

        if !self.extended() {
            return Err(ParseError::UnknownOperator { name, position });
        }

        match NamedOperator::parse(&name) {
            Some(Ok(operator)) => Ok(Path::Operator(operator)),
            Some(Err(message)) => Err(ParseError::Invalid { message, position }),
            None => Err(ParseError::UnknownOperator { name, position }),
        }
    }

    /// Contents of `[...]` after the opening bracket, through the closing one.
    fn parse_bracket_body(&mut self) -> Result<Path, ParseError> {
        let position = self.position;

        let segment = match self.current_token {
            Token::Star => {
                self.advance()?;
                Path::full_slice()
            }
            Token::Question => {
                self.advance()?;
                Path::Filter(self.parse_conditions()?)
            }
            Token::Slash | Token::Backslash => Path::Sort(self.parse_sort_keys()?),
            Token::Number(_) | Token::Colon => self.parse_index_or_slice(position)?,
            Token::Identifier(_) | Token::Boolean(_) => match self.take_field_name()? {
                Some(name) => self.parse_field_union(name)?,
                None => return Err(self.unexpected("a field name")),
            },
            _ => return Err(self.unexpected("an index, slice, field name, filter, or sort")),
        };

        self.expect(Token::RBracket, "']'")?;
        Ok(segment)
    }

    fn take_number(&mut self) -> Result<Option<i64>, ParseError> {
        if let Token::Number(n) = self.current_token {
            self.advance()?;
            Ok(Some(n))
        } else {
            Ok(None)
        }
    }

    fn parse_index_or_slice(&mut self, position: Position) -> Result<Path, ParseError> {
        let start = self.take_number()?;
        if !self.check(&Token::Colon) {
            return match start {
                Some(index) => Ok(Path::Index(index)),
                None => Err(self.unexpected("an index or ':'")),
            };
        }
        self.advance()?;

        let end = self.take_number()?;
        let step = if self.check(&Token::Colon) {
            self.advance()?;
            self.take_number()?
        } else {
            None
        };

        if step == Some(0) {
            return Err(ParseError::Invalid {
                message: "slice step cannot be zero".to_string(),
                position,
            });
        }

        Ok(Path::Slice { start, end, step })
    }

    /// `cond & cond & (cond & cond)`
    fn parse_conditions(&mut self) -> Result<Vec<Expression>, ParseError> {
        let mut conditions = self.parse_condition_group()?;
        while self.check(&Token::Ampersand) {
            self.advance()?;
            conditions.extend(self.parse_condition_group()?);
        }
        Ok(conditions)
    }

    fn parse_condition_group(&mut self) -> Result<Vec<Expression>, ParseError> {
        if self.check(&Token::LParen) {
            self.advance()?;
            let conditions = self.nested(Self::parse_conditions)?;
            self.expect(Token::RParen, "')'")?;
            Ok(conditions)
        } else {
            Ok(vec![self.parse_condition()?])
        }
    }

    fn parse_condition(&mut self) -> Result<Expression, ParseError> {
        let target = self.parse_expression()?;
        let Some(op) = compare_operator(&self.current_token) else {
            return Ok(Expression::exists(target));
        };
        self.advance()?;
        let literal = self.parse_literal(op)?;
        Ok(Expression::compare(target, op, literal))
    }

    fn parse_literal(&mut self, op: CompareOp) -> Result<Literal, ParseError> {
        let position = self.position;
        let literal = match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Identifier(s) => Literal::String(s),
            Token::Number(n) => Literal::Integer(n),
            Token::Float(n) => Literal::Float(n),
            Token::Boolean(b) => Literal::Boolean(b),
            Token::Eof => {
                return Err(ParseError::UnexpectedEnd {
                    expected: "a literal",
                    position,
                });
            }
            found => {
                return Err(ParseError::UnexpectedToken {
                    found,
                    expected: "a literal",
                    position,
                });
            }
        };
        self.advance()?;

        if op != CompareOp::Matches {
            return Ok(literal);
        }

        let Literal::String(source) = literal else {
            return Err(ParseError::Invalid {
                message: "=~ expects a quoted regular expression".to_string(),
                position,
            });
        };
        Pattern::new(&source)
            .map(Literal::Pattern)
            .map_err(|e| ParseError::Invalid {
                message: format!("invalid regular expression '{}': {}", source, e),
                position,
            })
    }

    /// `/key`, `\key`, optionally comma-separated: `[/cow,\cat]`
    fn parse_sort_keys(&mut self) -> Result<Vec<SortKey>, ParseError> {
        let mut keys = Vec::new();
        loop {
            let direction = match self.current_token {
                Token::Slash => SortDirection::Ascending,
                Token::Backslash => SortDirection::Descending,
                _ => return Err(self.unexpected("'/' or '\\' before a sort key")),
            };
            self.advance()?;
            let path = self.parse_path(0)?;
            keys.push(SortKey { path, direction });

            if self.check(&Token::Comma) {
                self.advance()?;
            } else if !matches!(self.current_token, Token::Slash | Token::Backslash) {
                return Ok(keys);
            }
        }
    }
}

fn compare_operator(token: &Token) -> Option<CompareOp> {
    match token {
        Token::Eq | Token::EqEq => Some(CompareOp::Equal),
        Token::NotEq => Some(CompareOp::NotEqual),
        Token::Lt => Some(CompareOp::LessThan),
        Token::LtEq => Some(CompareOp::LessEqual),
        Token::Gt => Some(CompareOp::GreaterThan),
        Token::GtEq => Some(CompareOp::GreaterEqual),
        Token::Matches => Some(CompareOp::Matches),
        _ => None,
    }
}

/// Compiles an expression with the given grammar profile.
pub fn compile_with(text: &str, profile: Profile) -> Result<Path, ParseError> {
    let path = Parser::new(Lexer::with_profile(text, profile))?.parse()?;
    log::debug!("compiled {:?} ({:?} profile) to {:?}", text, profile, path);
    Ok(path)
}

/// Compiles an expression with the extended grammar.
///
/// # Examples
///
/// ```
/// use jsonpath_lang::{compile, Value};
/// use serde_json::json;
///
/// let path = compile("$.objects[?cow > 1].cow").unwrap();
/// let data = Value::from(json!({"objects": [{"cow": 1}, {"cow": 2}]}));
///
/// let matches = path.find(&data);
/// assert_eq!(matches.len(), 1);
/// assert_eq!(matches[0].value(), &Value::Integer(2));
/// assert_eq!(matches[0].full_path().to_string(), "objects.[1].cow");
/// ```
pub fn compile(text: &str) -> Result<Path, ParseError> {
    compile_with(text, Profile::Extended)
}

/// Compiles an expression with the core grammar only.
pub fn compile_core(text: &str) -> Result<Path, ParseError> {
    compile_with(text, Profile::Core)
}
