use std::fmt;

use lpp_model::{Bound, Relation};
use tracing::warn;

use crate::ast::Variables;
use crate::lexer::{Position, Token, TokenKind};
use crate::parser::{joined_text, parse_number, ParseError, Parser};
use crate::sections::Line;

/// A condition that is reported but does not stop the parse
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A natural constraint named something outside the variable set and was
    /// skipped. `name` is `None` when the line had no name at all.
    UnknownVariableReferenceIgnored {
        line: usize,
        name: Option<String>,
        at: Position,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownVariableReferenceIgnored { line, name: Some(name), at } => write!(
                f,
                "natural constraint {} at {} refers to unknown variable \"{}\", ignored",
                line, at, name
            ),
            Diagnostic::UnknownVariableReferenceIgnored { line, name: None, at } => write!(
                f,
                "natural constraint {} at {} names no variable, ignored",
                line, at
            ),
        }
    }
}

/// Strip an objective label such as `z =` or `z:` in `max z = 2x1 + x2`,
/// or the bare colon of `max: 2x1 + x2`.
fn objective_expression(tokens: &[Token]) -> &[Token] {
    match tokens {
        [label, sep, rest @ ..]
            if label.kind == TokenKind::Ident
                && matches!(sep.kind, TokenKind::Eq | TokenKind::Colon) =>
        {
            rest
        }
        [sep, rest @ ..] if sep.kind == TokenKind::Colon => rest,
        _ => tokens,
    }
}

/// Objective coefficient vector `c`
pub fn extract_objective(tokens: &[Token], variables: &Variables) -> Result<Vec<f64>, ParseError> {
    Parser::coefficients(objective_expression(tokens), variables)
}

/// One parsed constraint row
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintRow {
    pub coefficients: Vec<f64>,
    pub relation: Relation,
    pub rhs: f64,
}

fn relation_of(kind: TokenKind) -> Option<Relation> {
    match kind {
        TokenKind::Le => Some(Relation::Le),
        TokenKind::Eq => Some(Relation::Eq),
        TokenKind::Ge => Some(Relation::Ge),
        _ => None,
    }
}

/// Constraint matrix `A`, relations `Eqin` and right-hand sides `b`, one row
/// per line in source order.
pub fn extract_constraints(
    lines: &[Line],
    variables: &Variables,
) -> Result<(Vec<Vec<f64>>, Vec<Relation>, Vec<f64>), ParseError> {
    let mut a = Vec::with_capacity(lines.len());
    let mut eqin = Vec::with_capacity(lines.len());
    let mut b = Vec::with_capacity(lines.len());

    for line in lines {
        let row = extract_constraint(line, variables)?;
        a.push(row.coefficients);
        eqin.push(row.relation);
        b.push(row.rhs);
    }

    Ok((a, eqin, b))
}

pub fn extract_constraint(line: &Line, variables: &Variables) -> Result<ConstraintRow, ParseError> {
    let operators: Vec<(usize, Relation)> = line
        .tokens
        .iter()
        .enumerate()
        .filter_map(|(i, t)| relation_of(t.kind).map(|r| (i, r)))
        .collect();

    let &[(split, relation)] = operators.as_slice() else {
        return Err(ParseError::MalformedConstraint {
            line: line.number,
            text: line.text.clone(),
            at: line.at,
        });
    };

    let left = &line.tokens[..split];
    let right = &line.tokens[split + 1..];

    // Checked on values, so cancelling terms like `x1 - x1` count as empty
    let coefficients = Parser::coefficients(left, variables)?;
    if coefficients.iter().all(|&v| v == 0.0) {
        return Err(ParseError::EmptyLeftSide {
            line: line.number,
            at: line.at,
        });
    }

    let rhs = right_side(line, right, line.tokens[split].at)?;

    Ok(ConstraintRow {
        coefficients,
        relation,
        rhs,
    })
}

/// An optionally signed numeric literal
fn right_side(line: &Line, tokens: &[Token], operator_at: Position) -> Result<f64, ParseError> {
    match tokens {
        [] => Err(ParseError::EmptyRightSide {
            line: line.number,
            at: operator_at,
        }),
        [number] if number.kind == TokenKind::Number => parse_number(number),
        [sign, number] if number.kind == TokenKind::Number => match sign.kind {
            TokenKind::Plus => parse_number(number),
            TokenKind::Minus => Ok(-parse_number(number)?),
            _ => Err(invalid_right_side(line, tokens)),
        },
        _ => Err(invalid_right_side(line, tokens)),
    }
}

fn invalid_right_side(line: &Line, tokens: &[Token]) -> ParseError {
    ParseError::InvalidRightSide {
        line: line.number,
        text: joined_text(tokens),
        at: tokens.first().map(|t| t.at).unwrap_or(line.at),
    }
}

fn bound_of(kind: TokenKind) -> Option<Bound> {
    match kind {
        TokenKind::Le => Some(Bound::NonPositive),
        TokenKind::Ge => Some(Bound::NonNegative),
        TokenKind::Free => Some(Bound::Free),
        _ => None,
    }
}

/// Per-variable sign restrictions.
///
/// Without a `with` block every variable is non-negative. Declarations for
/// names outside the variable set are accepted and skipped, each producing a
/// [`Diagnostic`].
pub fn extract_natural_constraints(
    lines: Option<&[Line]>,
    variables: &Variables,
) -> Result<(Vec<Bound>, Vec<Diagnostic>), ParseError> {
    let mut bounds = vec![Bound::NonNegative; variables.len()];
    let mut diagnostics = Vec::new();

    let Some(lines) = lines else {
        return Ok((bounds, diagnostics));
    };

    for line in lines {
        let (name, bound) = natural_constraint(line)?;

        let index = name
            .filter(|t| t.kind == TokenKind::Variable)
            .and_then(|t| variables.index_of(&t.text));

        match index {
            Some(index) => bounds[index] = bound,
            None => {
                let diagnostic = Diagnostic::UnknownVariableReferenceIgnored {
                    line: line.number,
                    name: name.map(|t| t.text.to_ascii_lowercase()),
                    at: line.at,
                };
                warn!("{}", diagnostic);
                diagnostics.push(diagnostic);
            }
        }
    }

    Ok((bounds, diagnostics))
}

/// `name? (<= | >= | free)`, taken from the first declaration on the line.
/// Tokens before the name and anything after the declaration are ignored.
fn natural_constraint(line: &Line) -> Result<(Option<&Token>, Bound), ParseError> {
    let Some((split, bound)) = line
        .tokens
        .iter()
        .enumerate()
        .find_map(|(i, t)| bound_of(t.kind).map(|bound| (i, bound)))
    else {
        return Err(ParseError::MalformedNaturalConstraint {
            line: line.number,
            text: line.text.clone(),
            at: line.at,
        });
    };

    let name = split
        .checked_sub(1)
        .map(|i| &line.tokens[i])
        .filter(|t| matches!(t.kind, TokenKind::Variable | TokenKind::Ident));

    Ok((name, bound))
}
