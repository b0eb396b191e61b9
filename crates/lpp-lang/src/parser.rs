use lpp_model::ModelError;
use thiserror::Error;
use tracing::debug;

use crate::ast::{Sign, Term, Variables};
use crate::lexer::{Position, Token, TokenKind};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Keyword \"max\" or \"min\" not found, include it at the beginning of the problem description")]
    MissingDirectionKeyword,
    #[error("Keyword \"{section}\" not found")]
    MissingSectionKeyword { section: &'static str },
    #[error(
        "Constraint {line} at {at} is malformed, expected exactly one of <=, =, >= in \"{text}\""
    )]
    MalformedConstraint {
        line: usize,
        text: String,
        at: Position,
    },
    #[error("Constraint {line} at {at} has no left side")]
    EmptyLeftSide { line: usize, at: Position },
    #[error("Constraint {line} at {at} has no right side")]
    EmptyRightSide { line: usize, at: Position },
    #[error("Constraint {line} at {at} has a non-numeric right side \"{text}\"")]
    InvalidRightSide {
        line: usize,
        text: String,
        at: Position,
    },
    #[error("Expression \"{expression}\" is non-linear, fix term \"{term}\" at {at}")]
    NonLinearTerm {
        expression: String,
        term: String,
        at: Position,
    },
    #[error("Natural constraint {line} at {at} is malformed: \"{text}\"")]
    MalformedNaturalConstraint {
        line: usize,
        text: String,
        at: Position,
    },
    #[error("Unexpected token: expected {expected}, found {found} at {at}")]
    UnexpectedToken {
        expected: String,
        found: String,
        at: Position,
    },
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("No variables found in the objective or the constraints")]
    NoVariables,
    #[error(transparent)]
    Model(#[from] ModelError),
}

pub(crate) fn parse_number(token: &Token) -> Result<f64, ParseError> {
    token
        .text
        .parse()
        .map_err(|_| ParseError::InvalidNumber(token.text.clone()))
}

/// Whitespace-free rendering of a token run, as used in error messages
pub(crate) fn joined_text(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

/// Parser for the term grammar of a single linear expression:
/// `(sign? coefficient? variable)*`, where only the first term may omit
/// its sign.
pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse every token of `tokens` as terms, failing on anything that does
    /// not fit the grammar.
    pub fn parse_terms(tokens: &'t [Token]) -> Result<Vec<Term>, ParseError> {
        let mut parser = Parser::new(tokens);
        let mut terms = Vec::new();
        while parser.current().is_some() {
            terms.push(parser.parse_term()?);
        }
        check_linear(tokens, &terms)?;
        Ok(terms)
    }

    /// Pick out every term in `tokens`, skipping tokens that cannot start or
    /// complete one. Used for variable discovery over raw lines.
    pub fn scan_terms(tokens: &'t [Token]) -> Result<Vec<Term>, ParseError> {
        let mut parser = Parser::new(tokens);
        let mut terms = Vec::new();
        while parser.current().is_some() {
            let start = parser.pos;
            match parser.parse_term() {
                Ok(term) => terms.push(term),
                Err(_) => parser.pos = start + 1,
            }
        }
        check_linear(tokens, &terms)?;
        Ok(terms)
    }

    /// Dense coefficient vector of an expression over the canonical variable
    /// order. A variable written more than once keeps its last coefficient.
    pub fn coefficients(
        tokens: &'t [Token],
        variables: &Variables,
    ) -> Result<Vec<f64>, ParseError> {
        let terms = Parser::parse_terms(tokens)?;
        let mut values = vec![0.0; variables.len()];
        let mut seen = vec![false; variables.len()];

        for term in &terms {
            let Some(index) = variables.index_of(&term.variable) else {
                return Err(ParseError::UnexpectedToken {
                    expected: "a known variable".to_string(),
                    found: format!("\"{}\"", term.variable),
                    at: term.at,
                });
            };
            if seen[index] {
                debug!(
                    variable = %term.variable,
                    previous = values[index],
                    value = term.value(),
                    "repeated variable overwrites its coefficient"
                );
            }
            seen[index] = true;
            values[index] = term.value();
        }

        Ok(values)
    }

    fn current(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let (found, at) = match self.current() {
            Some(token) if token.kind == TokenKind::Newline => {
                ("end of line".to_string(), token.at)
            }
            Some(token) => (format!("\"{}\"", token.text), token.at),
            None => (
                "end of expression".to_string(),
                self.tokens.last().map(|t| t.at).unwrap_or_default(),
            ),
        };
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found,
            at,
        }
    }

    fn parse_term(&mut self) -> Result<Term, ParseError> {
        let start = self.pos;
        let first = self.current().ok_or_else(|| self.unexpected("a term"))?;

        let sign = match self.peek_kind() {
            TokenKind::Plus => {
                self.advance();
                Some(Sign::Plus)
            }
            TokenKind::Minus => {
                self.advance();
                Some(Sign::Minus)
            }
            _ => None,
        };

        let coefficient = match self.current() {
            Some(token) if token.kind == TokenKind::Number => {
                self.advance();
                Some(parse_number(token)?)
            }
            _ => None,
        };

        let variable = match self.current() {
            Some(token) if token.kind == TokenKind::Variable => {
                self.advance();
                token
            }
            _ => return Err(self.unexpected("a variable")),
        };

        let tokens = &self.tokens[start..self.pos];
        Ok(Term {
            span: first.span.merge(variable.span),
            at: first.at,
            sign,
            coefficient,
            variable: variable.text.clone(),
            text: joined_text(tokens),
        })
    }
}

/// Only the first term may omit its sign; an unsigned term further on means
/// two factors were written next to each other.
fn check_linear(tokens: &[Token], terms: &[Term]) -> Result<(), ParseError> {
    match terms.iter().skip(1).find(|t| t.sign.is_none()) {
        Some(term) => Err(ParseError::NonLinearTerm {
            expression: joined_text(tokens),
            term: term.text.clone(),
            at: term.at,
        }),
        None => Ok(()),
    }
}
