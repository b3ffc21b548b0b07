use std::fmt;

use crate::ast::Token;

/// Grammar profile shared by the lexer and the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Fields, indices, slices, `.`, `..`, `where`, `` `this` `` and `` `parent` ``
    Core,
    /// The core grammar plus filters, sorting, arithmetic, alternation, and
    /// extension operators
    #[default]
    Extended,
}

/// 1-based location in the expression text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new(1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    /// A character that cannot start any token in the active profile
    UnexpectedCharacter { character: char, position: Position },
    /// A quote or backtick without its closing partner
    UnterminatedQuote { quote: char, position: Position },
    /// Digits that do not fit a 64-bit number
    InvalidNumber { literal: String, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnexpectedCharacter { position, .. }
            | LexError::UnterminatedQuote { position, .. }
            | LexError::InvalidNumber { position, .. } => *position,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnexpectedCharacter {
                character,
                position,
            } => write!(f, "Unexpected character '{}' at {}", character, position),
            LexError::UnterminatedQuote { quote, position } => {
                let what = match quote {
                    '`' => "named operator",
                    '\'' => "single-quoted string",
                    _ => "double-quoted string",
                };
                write!(f, "Unterminated {} starting at {}", what, position)
            }
            LexError::InvalidNumber { literal, position } => {
                write!(f, "Invalid number '{}' at {}", literal, position)
            }
        }
    }
}

impl std::error::Error for LexError {}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    token_start: Position,
    profile: Profile,
    finished: bool,
}

impl Lexer {
    /// Creates a lexer for the extended profile.
    pub fn new(input: &str) -> Self {
        Lexer::with_profile(input, Profile::Extended)
    }

    pub fn with_profile(input: &str, profile: Profile) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            token_start: Position::default(),
            profile,
            finished: false,
        }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Where the most recently returned token started.
    pub fn token_position(&self) -> Position {
        self.token_start
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn advance(&mut self) {
        if self.current_char() == Some('\n') {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn is_identifier_start(ch: char) -> bool {
        ch.is_alphabetic() || ch == '_' || ch == '@'
    }

    fn is_identifier_char(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '@' || ch == '-'
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if Self::is_identifier_char(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Reads a quoted run. A backslash makes the next character literal, so
    /// `"doublequote\""` reads as `doublequote"`.
    fn read_quoted(&mut self, quote: char) -> Result<String, LexError> {
        let mut result = String::new();
        self.advance(); // Consume opening quote

        let unterminated = LexError::UnterminatedQuote {
            quote,
            position: self.token_start,
        };

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance();
                    let escaped = self.current_char().ok_or_else(|| unterminated.clone())?;
                    result.push(escaped);
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(unterminated)
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let mut number = String::new();
        let mut is_float = false;

        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();
        }

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.profile == Profile::Extended
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let invalid = || LexError::InvalidNumber {
            literal: number.clone(),
            position: self.token_start,
        };

        if is_float {
            number.parse::<f64>().map(Token::Float).map_err(|_| invalid())
        } else {
            number.parse::<i64>().map(Token::Number).map_err(|_| invalid())
        }
    }

    /// Operators that only exist in the extended profile.
    fn read_operator(&mut self, ch: char) -> Result<Token, LexError> {
        let next = self.peek_char(1);
        let (token, width) = match (ch, next) {
            ('?', _) => (Token::Question, 1),
            ('+', _) => (Token::Plus, 1),
            ('/', _) => (Token::Slash, 1),
            ('\\', _) => (Token::Backslash, 1),
            ('=', Some('=')) => (Token::EqEq, 2),
            ('=', Some('~')) => (Token::Matches, 2),
            ('=', _) => (Token::Eq, 1),
            ('!', Some('=')) => (Token::NotEq, 2),
            ('<', Some('=')) => (Token::LtEq, 2),
            ('<', _) => (Token::Lt, 1),
            ('>', Some('=')) => (Token::GtEq, 2),
            ('>', _) => (Token::Gt, 1),
            _ => return Err(self.unexpected(ch)),
        };
        for _ in 0..width {
            self.advance();
        }
        Ok(token)
    }

    fn unexpected(&self, character: char) -> LexError {
        LexError::UnexpectedCharacter {
            character,
            position: self.here(),
        }
    }

    fn single(&mut self, token: Token) -> Result<Token, LexError> {
        self.advance();
        Ok(token)
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        self.token_start = self.here();

        match self.current_char() {
            None => Ok(Token::Eof),
            Some('$') => self.single(Token::Dollar),
            Some('.') => {
                if self.peek_char(1) == Some('.') {
                    self.advance();
                    self.single(Token::DoubleDot)
                } else {
                    self.single(Token::Dot)
                }
            }
            Some('*') => self.single(Token::Star),
            Some(',') => self.single(Token::Comma),
            Some(':') => self.single(Token::Colon),
            Some('|') => self.single(Token::Pipe),
            Some('&') => self.single(Token::Ampersand),
            Some('[') => self.single(Token::LBracket),
            Some(']') => self.single(Token::RBracket),
            Some('(') => self.single(Token::LParen),
            Some(')') => self.single(Token::RParen),
            Some(quote @ ('"' | '\'')) => self.read_quoted(quote).map(Token::Identifier),
            Some('`') => self.read_quoted('`').map(Token::NamedOperator),
            Some('-') => {
                // A hyphen only ever signs a number.
                if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
                    self.read_number()
                } else {
                    Err(self.unexpected('-'))
                }
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some(ch) if Self::is_identifier_start(ch) => {
                let ident = self.read_identifier();
                let extended = self.profile == Profile::Extended;

                Ok(match ident.as_str() {
                    "where" => Token::Where,
                    "wherenot" => Token::WhereNot,
                    "true" if extended => Token::Boolean(true),
                    "false" if extended => Token::Boolean(false),
                    _ => Token::Identifier(ident),
                })
            }
            Some(ch @ ('?' | '+' | '/' | '\\' | '=' | '!' | '<' | '>'))
                if self.profile == Profile::Extended =>
            {
                self.read_operator(ch)
            }
            Some(ch) => Err(self.unexpected(ch)),
        }
    }
}

/// Yields tokens up to, not including, [`Token::Eof`]. Stops after the first error.
impl Iterator for Lexer {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok(Token::Eof) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
            token => Some(token),
        }
    }
}

/// Lexes a whole expression.
pub fn tokenize(input: &str, profile: Profile) -> Result<Vec<Token>, LexError> {
    Lexer::with_profile(input, profile).collect()
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("where wherenot true false");
    assert_eq!(lexer.next_token().unwrap(), Token::Where);
    assert_eq!(lexer.next_token().unwrap(), Token::WhereNot);
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(true));
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(false));
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_core_profile_keeps_booleans_as_fields() {
    let mut lexer = Lexer::with_profile("true", Profile::Core);
    assert_eq!(
        lexer.next_token().unwrap(),
        Token::Identifier("true".to_string())
    );
}

#[test]
fn test_filter_tokens() {
    let mut lexer = Lexer::new("[?(@.price<=10)]");
    assert_eq!(lexer.next_token().unwrap(), Token::LBracket);
    assert_eq!(lexer.next_token().unwrap(), Token::Question);
    assert_eq!(lexer.next_token().unwrap(), Token::LParen);
    assert_eq!(
        lexer.next_token().unwrap(),
        Token::Identifier("@".to_string())
    );
    assert_eq!(lexer.next_token().unwrap(), Token::Dot);
    assert_eq!(
        lexer.next_token().unwrap(),
        Token::Identifier("price".to_string())
    );
    assert_eq!(lexer.next_token().unwrap(), Token::LtEq);
    assert_eq!(lexer.next_token().unwrap(), Token::Number(10));
    assert_eq!(lexer.next_token().unwrap(), Token::RParen);
    assert_eq!(lexer.next_token().unwrap(), Token::RBracket);
}

#[test]
fn test_error_position() {
    let mut lexer = Lexer::new("$.foo\n  .#");
    let err = tokenize_all(&mut lexer).unwrap_err();
    assert_eq!(err.position(), Position::new(2, 4));
}

#[cfg(test)]
fn tokenize_all(lexer: &mut Lexer) -> Result<Vec<Token>, LexError> {
    lexer.collect()
}
