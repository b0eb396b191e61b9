use std::fmt;
use std::str::Chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// 1-based line and column of a token in the source text
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Max,
    Min,
    SubjectTo,
    With,
    End,
    Free,

    // Literals
    Variable,
    Ident,
    Number,

    // Operators
    Plus,
    Minus,
    Le,
    Ge,
    Eq,
    Colon,

    // Special
    Newline,
    Eof,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub at: Position,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, at: Position, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            at,
            text: text.into(),
        }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    pos: usize,
    line: usize,
    column: usize,
    current: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            source,
            chars,
            pos: 0,
            line: 1,
            column: 1,
            current,
        }
    }

    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current?;
        self.current = self.chars.next();
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c != '\n' && c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn token(&self, kind: TokenKind, start: usize, at: Position) -> Token {
        Token::new(
            kind,
            Span::new(start, self.pos),
            at,
            &self.source[start..self.pos],
        )
    }

    fn consume_digits(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self, at: Position) -> Token {
        let start = self.pos;

        self.consume_digits();

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.consume_digits();
        }

        // Exponent, only when digits actually follow
        if matches!(self.peek(), Some('e' | 'E')) {
            let mut chars = self.chars.clone();
            let digit_follows = match chars.next() {
                Some('+' | '-') => chars.next().is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if digit_follows {
                self.advance();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.advance();
                }
                self.consume_digits();
            }
        }

        self.token(TokenKind::Number, start, at)
    }

    fn read_variable(&mut self, at: Position) -> Token {
        let start = self.pos;
        self.advance(); // x
        self.consume_digits();
        Token::new(
            TokenKind::Variable,
            Span::new(start, self.pos),
            at,
            self.source[start..self.pos].to_ascii_lowercase(),
        )
    }

    fn at_variable(&self) -> bool {
        matches!(self.peek(), Some('x' | 'X')) && self.peek_next().is_some_and(|c| c.is_ascii_digit())
    }

    /// Consume `word` if it follows after any whitespace, line breaks
    /// included, as a whole word.
    fn eat_following_word(&mut self, word: &str) -> bool {
        let mut chars = self.chars.clone();
        let mut skipped = 0;
        let mut c = self.current;
        while c.is_some_and(char::is_whitespace) {
            c = chars.next();
            skipped += 1;
        }
        for expected in word.chars() {
            match c {
                Some(found) if found.eq_ignore_ascii_case(&expected) => c = chars.next(),
                _ => return false,
            }
        }
        if c.is_some_and(|c| c.is_alphanumeric() || c == '_') {
            return false;
        }
        for _ in 0..skipped + word.len() {
            self.advance();
        }
        true
    }

    fn read_word(&mut self, at: Position) -> Token {
        let start = self.pos;

        // Letters up to the next variable, so `max2x1` and `minx1` split
        // into keyword and expression.
        while let Some(c) = self.peek() {
            if (c.is_alphabetic() || c == '_') && !self.at_variable() {
                self.advance();
            } else {
                break;
            }
        }

        let word = self.source[start..self.pos].to_ascii_lowercase();
        let kind = match word.as_str() {
            "max" | "maximize" | "maximise" => Some(TokenKind::Max),
            "min" | "minimize" | "minimise" => Some(TokenKind::Min),
            "st" => {
                if self.peek() == Some('.') {
                    self.advance();
                }
                Some(TokenKind::SubjectTo)
            }
            "s" if self.peek() == Some('.')
                && self.peek_next().is_some_and(|c| c.eq_ignore_ascii_case(&'t')) =>
            {
                self.advance(); // .
                self.advance(); // t
                if self.peek() == Some('.') {
                    self.advance();
                }
                Some(TokenKind::SubjectTo)
            }
            "subject" if self.eat_following_word("to") => Some(TokenKind::SubjectTo),
            "with" => Some(TokenKind::With),
            "end" => Some(TokenKind::End),
            "free" => Some(TokenKind::Free),
            _ => None,
        };

        if let Some(kind) = kind {
            return self.token(kind, start, at);
        }

        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        self.token(TokenKind::Ident, start, at)
    }

    fn single(&mut self, kind: TokenKind, at: Position) -> Token {
        let start = self.pos;
        self.advance();
        self.token(kind, start, at)
    }

    /// `<=`/`>=`, or an error token when the `=` is missing
    fn comparison(&mut self, kind: TokenKind, at: Position) -> Token {
        let start = self.pos;
        self.advance();
        if self.peek() == Some('=') {
            self.advance();
            self.token(kind, start, at)
        } else {
            self.token(TokenKind::Error, start, at)
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;
        let at = Position::new(self.line, self.column);

        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, Span::new(start, start), at, "");
        };

        match c {
            '\n' => self.single(TokenKind::Newline, at),
            '+' => self.single(TokenKind::Plus, at),
            '-' => self.single(TokenKind::Minus, at),
            '=' => self.single(TokenKind::Eq, at),
            ':' => self.single(TokenKind::Colon, at),
            '<' => self.comparison(TokenKind::Le, at),
            '>' => self.comparison(TokenKind::Ge, at),
            '.' if self.peek_next().is_some_and(|c| c.is_ascii_digit()) => self.read_number(at),
            c if c.is_ascii_digit() => self.read_number(at),
            _ if self.at_variable() => self.read_variable(at),
            c if c.is_alphabetic() || c == '_' => self.read_word(at),
            _ => self.single(TokenKind::Error, at),
        }
    }
}
