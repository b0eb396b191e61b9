use lpp_model::ProblemModel;
use tracing::debug;

use crate::ast::Variables;
use crate::discovery::discover_variables;
use crate::extract::{
    extract_constraints, extract_natural_constraints, extract_objective, Diagnostic,
};
use crate::lexer::Lexer;
use crate::parser::ParseError;
use crate::sections::Sections;

/// Progress of a single parse. Failures abort from whichever stage was
/// reached; no partial model is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    DirectionFound,
    ObjectiveParsed,
    ConstraintsParsed,
    NaturalConstraintsParsed,
    Done,
}

/// A parsed problem, ready for conversion or output
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledProblem {
    /// Column order of the model
    pub variables: Variables,
    pub model: ProblemModel,
    /// Non-fatal findings, in source order
    pub diagnostics: Vec<Diagnostic>,
}

/// Turns the text of a problem description into a [`ProblemModel`]
pub struct Compiler<'a> {
    source: &'a str,
    stage: Stage,
}

impl<'a> Compiler<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            stage: Stage::Start,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Parse `source` in one go.
    pub fn compile(source: &str) -> Result<CompiledProblem, ParseError> {
        Compiler::new(source).run()
    }

    pub fn run(&mut self) -> Result<CompiledProblem, ParseError> {
        let result = self.run_stages();
        if let Err(ref error) = result {
            debug!(stage = ?self.stage, %error, "parse failed");
        }
        result
    }

    fn advance(&mut self, stage: Stage) {
        debug!(from = ?self.stage, to = ?stage, "parse stage");
        self.stage = stage;
    }

    fn run_stages(&mut self) -> Result<CompiledProblem, ParseError> {
        let tokens = Lexer::tokenize(self.source);
        let sections = Sections::split(self.source, &tokens)?;
        self.advance(Stage::DirectionFound);

        let variables = discover_variables(&sections)?;

        let c = extract_objective(&sections.objective, &variables)?;
        self.advance(Stage::ObjectiveParsed);

        let (a, eqin, b) = extract_constraints(&sections.constraints, &variables)?;
        self.advance(Stage::ConstraintsParsed);

        let (natural_constraints, diagnostics) =
            extract_natural_constraints(sections.natural_constraints.as_deref(), &variables)?;
        if sections.natural_constraints.is_some() {
            self.advance(Stage::NaturalConstraintsParsed);
        }

        let model = ProblemModel::new(sections.direction, c, a, eqin, b, natural_constraints)?;
        self.advance(Stage::Done);

        Ok(CompiledProblem {
            variables,
            model,
            diagnostics,
        })
    }
}
