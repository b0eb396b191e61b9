use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid {kind} code: {code}")]
    InvalidCode { kind: &'static str, code: i8 },
    #[error("Model has no variables")]
    NoVariables,
    #[error("Length mismatch: {field} has {found} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Row {row} of A has {found} columns, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Optimization direction, coded 1 for max and -1 for min
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "i8", try_from = "i8")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Maximize,
    Minimize,
}

impl Direction {
    pub fn code(self) -> i8 {
        match self {
            Direction::Maximize => 1,
            Direction::Minimize => -1,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Maximize => Direction::Minimize,
            Direction::Minimize => Direction::Maximize,
        }
    }
}

/// Comparator of a constraint row
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "i8", try_from = "i8")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Less than or equal (<=), code -1
    Le,
    /// Equal (=), code 0
    Eq,
    /// Greater than or equal (>=), code 1
    Ge,
}

impl Relation {
    pub fn code(self) -> i8 {
        match self {
            Relation::Le => -1,
            Relation::Eq => 0,
            Relation::Ge => 1,
        }
    }

    pub fn negate(self) -> Self {
        match self {
            Relation::Le => Relation::Ge,
            Relation::Eq => Relation::Eq,
            Relation::Ge => Relation::Le,
        }
    }
}

/// Sign restriction on a single variable (a "natural constraint")
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "i8", try_from = "i8")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bound {
    /// x <= 0, code -1
    NonPositive,
    /// Unrestricted, code 0
    Free,
    /// x >= 0, code 1
    #[default]
    NonNegative,
}

impl Bound {
    pub fn code(self) -> i8 {
        match self {
            Bound::NonPositive => -1,
            Bound::Free => 0,
            Bound::NonNegative => 1,
        }
    }

    pub fn negate(self) -> Self {
        match self {
            Bound::NonPositive => Bound::NonNegative,
            Bound::Free => Bound::Free,
            Bound::NonNegative => Bound::NonPositive,
        }
    }
}

// Relations and bounds share the -1/0/1 coding, which is what the dual
// transform swaps between.
impl From<Bound> for Relation {
    fn from(bound: Bound) -> Self {
        match bound {
            Bound::NonPositive => Relation::Le,
            Bound::Free => Relation::Eq,
            Bound::NonNegative => Relation::Ge,
        }
    }
}

impl From<Relation> for Bound {
    fn from(relation: Relation) -> Self {
        match relation {
            Relation::Le => Bound::NonPositive,
            Relation::Eq => Bound::Free,
            Relation::Ge => Bound::NonNegative,
        }
    }
}

macro_rules! impl_code_conversions {
    ($ty:ident, $kind:literal, { $($code:literal => $variant:ident),+ $(,)? }) => {
        impl From<$ty> for i8 {
            fn from(value: $ty) -> Self {
                value.code()
            }
        }

        impl TryFrom<i8> for $ty {
            type Error = ModelError;

            fn try_from(code: i8) -> Result<Self, Self::Error> {
                match code {
                    $($code => Ok($ty::$variant),)+
                    _ => Err(ModelError::InvalidCode { kind: $kind, code }),
                }
            }
        }
    };
}

impl_code_conversions!(Direction, "direction", { 1 => Maximize, -1 => Minimize });
impl_code_conversions!(Relation, "relation", { -1 => Le, 0 => Eq, 1 => Ge });
impl_code_conversions!(Bound, "natural constraint", { -1 => NonPositive, 0 => Free, 1 => NonNegative });

/// Canonical matrix form of a linear program.
///
/// Column `j` of `c`, of every row of `a` and of `natural_constraints` refers
/// to the same variable; row `i` of `a`, `eqin` and `b` refers to the same
/// constraint. The JSON field names follow the exchange format
/// (`MinMax`, `c`, `A`, `Eqin`, `b`, `naturalConstraints`).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemModel {
    #[cfg_attr(feature = "serde", serde(rename = "MinMax"))]
    pub direction: Direction,
    /// Objective coefficients, length n
    pub c: Vec<f64>,
    /// Constraint coefficients, m rows of length n
    #[cfg_attr(feature = "serde", serde(rename = "A"))]
    pub a: Vec<Vec<f64>>,
    /// Constraint relations, length m
    #[cfg_attr(
        feature = "serde",
        serde(rename = "Eqin", deserialize_with = "column::deserialize")
    )]
    pub eqin: Vec<Relation>,
    /// Right-hand sides, length m
    #[cfg_attr(feature = "serde", serde(deserialize_with = "column::deserialize"))]
    pub b: Vec<f64>,
    /// Per-variable sign restrictions, length n (empty when absent)
    #[cfg_attr(feature = "serde", serde(rename = "naturalConstraints", default))]
    pub natural_constraints: Vec<Bound>,
}

/// `Eqin` and `b` are read either flat (`[-1, 1]`) or as m x 1 columns
/// (`[[-1], [1]]`); they are always written flat.
#[cfg(feature = "serde")]
mod column {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry<T> {
        Flat(T),
        Column([T; 1]),
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        let entries = Vec::<Entry<T>>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|entry| match entry {
                Entry::Flat(value) | Entry::Column([value]) => value,
            })
            .collect())
    }
}

impl ProblemModel {
    /// Assemble a model, checking the shape invariants.
    pub fn new(
        direction: Direction,
        c: Vec<f64>,
        a: Vec<Vec<f64>>,
        eqin: Vec<Relation>,
        b: Vec<f64>,
        natural_constraints: Vec<Bound>,
    ) -> Result<Self, ModelError> {
        let model = Self {
            direction,
            c,
            a,
            eqin,
            b,
            natural_constraints,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn num_variables(&self) -> usize {
        self.c.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.eqin.len()
    }

    /// Check that `a` is m x n, that `b` matches `eqin`, and that the natural
    /// constraints are either absent or one per variable.
    pub fn validate(&self) -> Result<(), ModelError> {
        let n = self.num_variables();
        let m = self.num_constraints();

        if n == 0 {
            return Err(ModelError::NoVariables);
        }
        if self.a.len() != m {
            return Err(ModelError::LengthMismatch {
                field: "A",
                expected: m,
                found: self.a.len(),
            });
        }
        if self.b.len() != m {
            return Err(ModelError::LengthMismatch {
                field: "b",
                expected: m,
                found: self.b.len(),
            });
        }
        if let Some((row, found)) = self
            .a
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != n)
        {
            return Err(ModelError::RowLength {
                row: row + 1,
                expected: n,
                found,
            });
        }
        if !self.natural_constraints.is_empty() && self.natural_constraints.len() != n {
            return Err(ModelError::LengthMismatch {
                field: "naturalConstraints",
                expected: n,
                found: self.natural_constraints.len(),
            });
        }

        Ok(())
    }
}

fn write_vector<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
    write!(f, "[")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", value)?;
    }
    write!(f, "]")
}

fn write_column<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
    if values.is_empty() {
        return write!(f, "[]");
    }
    write!(f, "[")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(f, "\n ")?;
        }
        write!(f, "[{}]", value)?;
    }
    write!(f, "]")
}

/// Human-readable report, not meant for parsing back.
impl fmt::Display for ProblemModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MinMax = {}", self.direction.code())?;
        writeln!(f)?;

        writeln!(f, "c =")?;
        write_vector(f, &self.c)?;
        writeln!(f)?;
        writeln!(f)?;

        writeln!(f, "A =")?;
        write!(f, "[")?;
        for (i, row) in self.a.iter().enumerate() {
            if i > 0 {
                write!(f, "\n ")?;
            }
            write_vector(f, row)?;
        }
        writeln!(f, "]")?;
        writeln!(f)?;

        let eqin: Vec<i8> = self.eqin.iter().map(|r| r.code()).collect();
        writeln!(f, "Eqin =")?;
        write_column(f, &eqin)?;
        writeln!(f)?;
        writeln!(f)?;

        writeln!(f, "b =")?;
        write_column(f, &self.b)?;
        writeln!(f)?;
        writeln!(f)?;

        let natural: Vec<i8> = self.natural_constraints.iter().map(|b| b.code()).collect();
        writeln!(f, "naturalConstraints =")?;
        write_vector(f, &natural)?;
        writeln!(f)
    }
}
