use lpp_model::Direction;

use crate::lexer::{Position, Token, TokenKind};
use crate::parser::ParseError;

/// A non-empty run of tokens between two newlines
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// 1-based ordinal within its section, blank lines not counted
    pub number: usize,
    pub at: Position,
    /// Source text of the line, trimmed
    pub text: String,
    pub tokens: Vec<Token>,
}

/// The keyword-delimited parts of a problem description:
///
/// ```text
/// max|min <objective>
/// s.t.
/// <constraint lines>
/// [with
/// <natural constraint lines>]
/// end
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Sections {
    pub direction: Direction,
    pub direction_at: Position,
    /// Objective tokens following the direction keyword, newlines removed
    pub objective: Vec<Token>,
    pub constraints: Vec<Line>,
    /// `None` when there is no `with` block
    pub natural_constraints: Option<Vec<Line>>,
}

fn is_section_keyword(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::SubjectTo | TokenKind::With | TokenKind::End)
}

impl Sections {
    /// Segment `tokens` (lexed from `source`) by keywords. Anything before
    /// the direction keyword or after `end` is ignored.
    pub fn split(source: &str, tokens: &[Token]) -> Result<Self, ParseError> {
        let start = tokens
            .iter()
            .position(|t| matches!(t.kind, TokenKind::Max | TokenKind::Min))
            .ok_or(ParseError::MissingDirectionKeyword)?;
        let keyword = &tokens[start];
        let direction = match keyword.kind {
            TokenKind::Max => Direction::Maximize,
            _ => Direction::Minimize,
        };

        let rest = &tokens[start + 1..];
        let subject_to = rest
            .iter()
            .position(|t| is_section_keyword(t.kind))
            .filter(|&i| rest[i].kind == TokenKind::SubjectTo)
            .ok_or(ParseError::MissingSectionKeyword { section: "s.t." })?;
        let objective = rest[..subject_to]
            .iter()
            .filter(|t| t.kind != TokenKind::Newline)
            .cloned()
            .collect();

        let rest = &rest[subject_to + 1..];
        let missing_end = ParseError::MissingSectionKeyword { section: "end" };
        let close = rest
            .iter()
            .position(|t| matches!(t.kind, TokenKind::With | TokenKind::End))
            .ok_or_else(|| missing_end.clone())?;
        let constraints = split_lines(source, &rest[..close]);

        let natural_constraints = if rest[close].kind == TokenKind::With {
            let rest = &rest[close + 1..];
            let end = rest
                .iter()
                .position(|t| t.kind == TokenKind::End)
                .ok_or(missing_end)?;
            Some(split_lines(source, &rest[..end]))
        } else {
            None
        };

        Ok(Self {
            direction,
            direction_at: keyword.at,
            objective,
            constraints,
            natural_constraints,
        })
    }
}

/// Break a section into lines, collapsing blank lines.
pub fn split_lines(source: &str, tokens: &[Token]) -> Vec<Line> {
    tokens
        .split(|t| t.kind == TokenKind::Newline)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| {
            let first = &line[0];
            let last = &line[line.len() - 1];
            let span = first.span.merge(last.span);
            Line {
                number: i + 1,
                at: first.at,
                text: source[span.start..span.end].trim().to_string(),
                tokens: line.to_vec(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn split(source: &str) -> Result<Sections, ParseError> {
        Sections::split(source, &Lexer::tokenize(source))
    }

    #[test]
    fn test_split_basic() {
        let sections = split("max 2x1+3x2\ns.t.\nx1+x2<=4\nx1-x2>=1\nend").unwrap();
        assert_eq!(sections.direction, Direction::Maximize);
        assert_eq!(sections.objective.len(), 5);
        assert_eq!(sections.constraints.len(), 2);
        assert_eq!(sections.constraints[0].text, "x1+x2<=4");
        assert_eq!(sections.constraints[1].number, 2);
        assert_eq!(sections.constraints[1].at, Position::new(4, 1));
        assert!(sections.natural_constraints.is_none());
    }

    #[test]
    fn test_blank_lines_collapse() {
        let sections = split("min x1\n\nst\n\n\n  x1 >= 2  \n\n x1 <= 9\n\nend\n").unwrap();
        let texts: Vec<_> = sections.constraints.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["x1 >= 2", "x1 <= 9"]);
        assert_eq!(sections.constraints[1].number, 2);
    }

    #[test]
    fn test_constraint_on_keyword_lines() {
        let sections = split("max x1 subject to x1 <= 3 end").unwrap();
        assert_eq!(sections.constraints.len(), 1);
        assert_eq!(sections.constraints[0].text, "x1 <= 3");
    }

    #[test]
    fn test_objective_across_lines() {
        let sections = split("max 2x1\n + 3x2\ns.t.\nx1 <= 1\nend").unwrap();
        let kinds: Vec<_> = sections.objective.iter().map(|t| t.kind).collect();
        assert!(!kinds.contains(&TokenKind::Newline));
        assert_eq!(sections.objective.len(), 5);
    }

    #[test]
    fn test_natural_section() {
        let sections = split("max x1\ns.t.\nx1 <= 3\nwith\nx1 free\n\nx2 <= 0\nend").unwrap();
        let natural = sections.natural_constraints.unwrap();
        assert_eq!(natural.len(), 2);
        assert_eq!(natural[1].text, "x2 <= 0");
    }

    #[test]
    fn test_text_around_sections_is_ignored() {
        let sections = split("problem one\nmax x1\ns.t.\nx1 <= 3\nend\ntrailing * notes").unwrap();
        assert_eq!(sections.direction_at, Position::new(2, 1));
        assert_eq!(sections.constraints.len(), 1);
    }

    #[test]
    fn test_missing_direction() {
        assert_eq!(
            split("2x1 + x2\ns.t.\nx1 <= 3\nend"),
            Err(ParseError::MissingDirectionKeyword)
        );
    }

    #[test]
    fn test_missing_subject_to() {
        assert_eq!(
            split("max x1\nx1 <= 3\nend"),
            Err(ParseError::MissingSectionKeyword { section: "s.t." })
        );
    }

    #[test]
    fn test_end_before_subject_to() {
        assert_eq!(
            split("max x1\nend\ns.t.\nx1 <= 3"),
            Err(ParseError::MissingSectionKeyword { section: "s.t." })
        );
    }

    #[test]
    fn test_missing_end() {
        assert_eq!(
            split("max x1\ns.t.\nx1 <= 3\n"),
            Err(ParseError::MissingSectionKeyword { section: "end" })
        );
        assert_eq!(
            split("max x1\ns.t.\nx1 <= 3\nwith\nx1 free\n"),
            Err(ParseError::MissingSectionKeyword { section: "end" })
        );
    }
}
