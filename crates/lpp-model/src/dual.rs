use crate::problem::{Bound, Direction, ProblemModel, Relation};

/// Transpose an m x n matrix given as rows into its n x m form.
pub fn transpose(rows: &[Vec<f64>], columns: usize) -> Vec<Vec<f64>> {
    (0..columns)
        .map(|j| rows.iter().map(|row| row[j]).collect())
        .collect()
}

impl ProblemModel {
    /// Build the algebraic dual of this model.
    ///
    /// The objective and right-hand sides swap places, `A` is transposed and
    /// the direction flips. Relations and natural constraints trade places,
    /// with the side that comes from a `>=`-style primal negated:
    ///
    /// | dual direction | dual `Eqin`             | dual natural constraints |
    /// |----------------|-------------------------|--------------------------|
    /// | max (1)        | -(primal natural)       | primal `Eqin`            |
    /// | min (-1)       | primal natural          | -(primal `Eqin`)         |
    ///
    /// A model without natural constraints is treated as having one
    /// non-negative entry per constraint. Applying `dual` twice returns the
    /// original model.
    pub fn dual(&self) -> ProblemModel {
        let direction = self.direction.opposite();

        let natural = if self.natural_constraints.is_empty() {
            vec![Bound::NonNegative; self.num_constraints()]
        } else {
            self.natural_constraints.clone()
        };

        let (eqin, natural_constraints): (Vec<Relation>, Vec<Bound>) = match direction {
            Direction::Maximize => (
                natural.iter().map(|&n| Relation::from(n).negate()).collect(),
                self.eqin.iter().map(|&r| Bound::from(r)).collect(),
            ),
            Direction::Minimize => (
                natural.iter().map(|&n| Relation::from(n)).collect(),
                self.eqin.iter().map(|&r| Bound::from(r.negate())).collect(),
            ),
        };

        ProblemModel {
            direction,
            c: self.b.clone(),
            a: transpose(&self.a, self.num_variables()),
            eqin,
            b: self.c.clone(),
            natural_constraints,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ModelError;

    fn primal() -> ProblemModel {
        ProblemModel::new(
            Direction::Maximize,
            vec![2.0, 3.0],
            vec![vec![1.0, 1.0], vec![1.0, -1.0]],
            vec![Relation::Le, Relation::Ge],
            vec![4.0, 1.0],
            vec![Bound::NonNegative, Bound::NonNegative],
        )
        .unwrap()
    }

    #[test]
    fn test_transpose_rectangular() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        assert_eq!(
            transpose(&rows, 3),
            vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]
        );
    }

    #[test]
    fn test_transpose_without_rows() {
        assert_eq!(transpose(&[], 2), vec![Vec::<f64>::new(), Vec::new()]);
    }

    #[test]
    fn test_dual_of_max_problem() {
        let dual = primal().dual();
        assert_eq!(dual.direction, Direction::Minimize);
        assert_eq!(dual.c, vec![4.0, 1.0]);
        assert_eq!(dual.a, vec![vec![1.0, 1.0], vec![1.0, -1.0]]);
        assert_eq!(dual.eqin, vec![Relation::Ge, Relation::Ge]);
        assert_eq!(dual.b, vec![2.0, 3.0]);
        assert_eq!(
            dual.natural_constraints,
            vec![Bound::NonNegative, Bound::NonPositive]
        );
        assert_eq!(dual.validate(), Ok(()));
    }

    #[test]
    fn test_dual_of_min_problem() {
        let model = ProblemModel::new(
            Direction::Minimize,
            vec![1.0, 1.0, 2.0],
            vec![vec![1.0, 0.0, 2.0], vec![0.0, 3.0, 1.0]],
            vec![Relation::Ge, Relation::Eq],
            vec![5.0, 6.0],
            vec![Bound::NonNegative, Bound::Free, Bound::NonPositive],
        )
        .unwrap();

        let dual = model.dual();
        assert_eq!(dual.direction, Direction::Maximize);
        assert_eq!(dual.c, vec![5.0, 6.0]);
        assert_eq!(
            dual.a,
            vec![vec![1.0, 0.0], vec![0.0, 3.0], vec![2.0, 1.0]]
        );
        assert_eq!(dual.eqin, vec![Relation::Le, Relation::Eq, Relation::Ge]);
        assert_eq!(dual.b, vec![1.0, 1.0, 2.0]);
        assert_eq!(dual.natural_constraints, vec![Bound::NonNegative, Bound::Free]);
    }

    #[test]
    fn test_dual_is_an_involution() {
        let model = primal();
        assert_eq!(model.dual().dual(), model);
    }

    #[test]
    fn test_dual_does_not_touch_input() {
        let model = primal();
        let before = model.clone();
        let _ = model.dual();
        assert_eq!(model, before);
    }

    #[test]
    fn test_dual_defaults_absent_natural_constraints() {
        let mut model = primal();
        model.natural_constraints.clear();
        let dual = model.dual();
        assert_eq!(dual.eqin, vec![Relation::Ge, Relation::Ge]);
    }

    #[test]
    fn test_dual_of_non_square_model_without_natural_constraints() {
        let model = ProblemModel {
            direction: Direction::Minimize,
            c: vec![1.0, 2.0],
            a: vec![vec![1.0, 0.0]],
            eqin: vec![Relation::Ge],
            b: vec![3.0],
            natural_constraints: Vec::new(),
        };
        assert_eq!(model.validate(), Ok(()));

        // One default entry per constraint, but the dual has two rows
        let dual = model.dual();
        assert_eq!(dual.eqin.len(), 1);
        assert_eq!(
            dual.validate(),
            Err(ModelError::LengthMismatch {
                field: "A",
                expected: 1,
                found: 2,
            })
        );
    }
}
