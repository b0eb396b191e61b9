pub mod ast;
pub mod compiler;
pub mod discovery;
pub mod extract;
pub mod lexer;
pub mod parser;
pub mod sections;

pub use ast::*;
pub use compiler::{CompiledProblem, Compiler, Stage};
pub use discovery::discover_variables;
pub use extract::{
    extract_constraint, extract_constraints, extract_natural_constraints, extract_objective,
    ConstraintRow, Diagnostic,
};
pub use lexer::{Lexer, Position, Span, Token, TokenKind};
pub use parser::{ParseError, Parser};
pub use sections::{Line, Sections};

/// Parse a problem description into its canonical model.
pub fn parse(source: &str) -> Result<CompiledProblem, ParseError> {
    Compiler::compile(source)
}
