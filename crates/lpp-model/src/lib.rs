mod dual;
mod problem;

pub use dual::transpose;
pub use problem::{Bound, Direction, ModelError, ProblemModel, Relation};
