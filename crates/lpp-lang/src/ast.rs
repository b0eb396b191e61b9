use crate::lexer::{Position, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    pub fn factor(self) -> f64 {
        match self {
            Sign::Plus => 1.0,
            Sign::Minus => -1.0,
        }
    }
}

/// One `sign? coefficient? variable` term of a linear expression
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub span: Span,
    pub at: Position,
    /// `None` when the term was written without an operator in front
    pub sign: Option<Sign>,
    /// `None` when the coefficient was omitted, meaning 1
    pub coefficient: Option<f64>,
    pub variable: String,
    /// The term as written, whitespace removed
    pub text: String,
}

impl Term {
    pub fn value(&self) -> f64 {
        let sign = self.sign.unwrap_or(Sign::Plus);
        sign.factor() * self.coefficient.unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variable<'a> {
    pub name: &'a str,
    pub index: usize,
}

/// The canonical variable universe: unique names in lexicographic order.
///
/// The position of a name in this list is its column in `c`, in every row of
/// `A` and in the natural-constraint vector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    names: Vec<String>,
}

impl Variables {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.binary_search_by(|n| n.as_str().cmp(name)).ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = Variable<'_>> {
        self.names
            .iter()
            .enumerate()
            .map(|(index, name)| Variable { name, index })
    }
}
