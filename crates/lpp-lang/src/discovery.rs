use std::collections::BTreeSet;

use tracing::debug;

use crate::ast::Variables;
use crate::lexer::Token;
use crate::parser::{ParseError, Parser};
use crate::sections::Sections;

/// Collect the canonical variable list from the objective and the raw
/// constraint lines.
///
/// Each line is scanned whole, so a term right after a relational operator
/// needs a sign like any other non-first term (`x1 <= x2` is non-linear).
/// Natural constraints are not scanned: they can only restrict variables
/// that appear elsewhere.
pub fn discover_variables(sections: &Sections) -> Result<Variables, ParseError> {
    let mut names = BTreeSet::new();

    collect(&sections.objective, &mut names)?;
    for line in &sections.constraints {
        collect(&line.tokens, &mut names)?;
    }

    if names.is_empty() {
        return Err(ParseError::NoVariables);
    }

    let variables = Variables::new(names);
    debug!(count = variables.len(), variables = ?variables.names(), "discovered variables");
    Ok(variables)
}

fn collect(tokens: &[Token], names: &mut BTreeSet<String>) -> Result<(), ParseError> {
    let terms = Parser::scan_terms(tokens)?;
    names.extend(terms.into_iter().map(|t| t.variable));
    Ok(())
}
