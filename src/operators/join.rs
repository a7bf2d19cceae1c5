/*!
`Join` (§4.7): tuple-nested-loop join exploiting both the implicit equi-join induced by shared
variable names and any explicit join predicates the planner has assigned to the right relation.

 */

use crate::atom::{ComparisonAtom, RelationalAtom};
use crate::error::Error;
use crate::operator::{resolve_term, Operator, Schema, Tuple};
use crate::value::Constant;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// Joins `left` (the accumulated left-deep plan so far) with `right` (one more base relation),
/// advancing `left` once per full scan of `right`.
#[derive(Debug)]
pub struct Join {
    left: Box<dyn Operator>,
    right: Box<dyn Operator>,
    schema: Schema,
    right_atom: RelationalAtom,
    join_predicates: Vec<ComparisonAtom>,
    left_current: Option<Tuple>,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl Join {
    pub fn new(
        left: Box<dyn Operator>,
        right: Box<dyn Operator>,
        right_atom: RelationalAtom,
        join_predicates: Vec<ComparisonAtom>,
    ) -> Self {
        let schema = left.schema().concat(right.schema());
        Self {
            left,
            right,
            schema,
            right_atom,
            join_predicates,
            left_current: None,
        }
    }

    /// Whether `combined` (the concatenation of the current left and right tuple) satisfies both
    /// the implicit equi-join on shared variables and every explicit join predicate.
    fn matches(&self, combined: &[Constant]) -> Result<bool, Error> {
        for variable in self.right_atom.variables() {
            let mut positions = self.schema.positions_of(&variable).into_iter();
            let Some(first) = positions.next() else {
                continue;
            };
            if positions.any(|position| combined[position] != combined[first]) {
                return Ok(false);
            }
        }
        for predicate in &self.join_predicates {
            let left = resolve_term(predicate.left(), &self.schema, combined)?;
            let right = resolve_term(predicate.right(), &self.schema, combined)?;
            if !left.compare(predicate.op(), &right)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Operator for Join {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn open(&mut self) -> Result<(), Error> {
        self.left.open()?;
        self.right.open()?;
        self.left_current = self.left.next()?;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>, Error> {
        loop {
            let Some(left_tuple) = self.left_current.clone() else {
                return Ok(None);
            };
            match self.right.next()? {
                Some(right_tuple) => {
                    let mut combined = left_tuple;
                    combined.extend(right_tuple);
                    if self.matches(&combined)? {
                        return Ok(Some(combined));
                    }
                }
                None => {
                    self.left_current = self.left.next()?;
                    if self.left_current.is_some() {
                        self.right.reset()?;
                    }
                }
            }
        }
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.left.reset()?;
        self.right.reset()?;
        self.left_current = self.left.next()?;
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{ComparisonOperator, Term};
    use crate::Name;

    #[derive(Debug)]
    struct VecOperator {
        schema: Schema,
        tuples: Vec<Tuple>,
        cursor: usize,
    }

    impl VecOperator {
        fn new(atom: RelationalAtom, tuples: Vec<Tuple>) -> Self {
            Self {
                schema: Schema::new(vec![atom]),
                tuples,
                cursor: 0,
            }
        }
    }

    impl Operator for VecOperator {
        fn schema(&self) -> &Schema {
            &self.schema
        }

        fn open(&mut self) -> Result<(), Error> {
            Ok(())
        }

        fn next(&mut self) -> Result<Option<Tuple>, Error> {
            let tuple = self.tuples.get(self.cursor).cloned();
            if tuple.is_some() {
                self.cursor += 1;
            }
            Ok(tuple)
        }

        fn reset(&mut self) -> Result<(), Error> {
            self.cursor = 0;
            Ok(())
        }
    }

    fn name(s: &str) -> Name {
        Name::new_unchecked(s)
    }

    /// R(a,b) = {(1,2),(3,2),(5,6)}, S(b,c) = {(2,10),(6,20)} joined on shared variable b.
    #[test]
    fn implicit_equi_join_on_shared_variable() {
        let r_atom = RelationalAtom::new(name("R"), vec![Term::variable("a"), Term::variable("b")]);
        let s_atom = RelationalAtom::new(name("S"), vec![Term::variable("b"), Term::variable("c")]);
        let left = VecOperator::new(
            r_atom,
            vec![
                vec![Constant::Int(1), Constant::Int(2)],
                vec![Constant::Int(3), Constant::Int(2)],
                vec![Constant::Int(5), Constant::Int(6)],
            ],
        );
        let right = VecOperator::new(
            s_atom.clone(),
            vec![
                vec![Constant::Int(2), Constant::Int(10)],
                vec![Constant::Int(6), Constant::Int(20)],
            ],
        );
        let mut join = Join::new(Box::new(left), Box::new(right), s_atom, vec![]);
        join.open().unwrap();

        let mut results = Vec::new();
        while let Some(tuple) = join.next().unwrap() {
            results.push(tuple);
        }
        assert_eq!(
            results,
            vec![
                vec![Constant::Int(1), Constant::Int(2), Constant::Int(2), Constant::Int(10)],
                vec![Constant::Int(3), Constant::Int(2), Constant::Int(2), Constant::Int(10)],
                vec![Constant::Int(5), Constant::Int(6), Constant::Int(6), Constant::Int(20)],
            ]
        );
    }

    #[test]
    fn explicit_join_predicate_is_applied() {
        let r_atom = RelationalAtom::new(name("R"), vec![Term::variable("a")]);
        let s_atom = RelationalAtom::new(name("S"), vec![Term::variable("c")]);
        let left = VecOperator::new(r_atom, vec![vec![Constant::Int(1)], vec![Constant::Int(2)]]);
        let right = VecOperator::new(s_atom.clone(), vec![vec![Constant::Int(1)], vec![Constant::Int(2)]]);
        let predicate = ComparisonAtom::new(
            Term::variable("a"),
            ComparisonOperator::LessThan,
            Term::variable("c"),
        );
        let mut join = Join::new(Box::new(left), Box::new(right), s_atom, vec![predicate]);
        join.open().unwrap();

        let mut results = Vec::new();
        while let Some(tuple) = join.next().unwrap() {
            results.push(tuple);
        }
        assert_eq!(results, vec![vec![Constant::Int(1), Constant::Int(2)]]);
    }

    #[test]
    fn empty_left_yields_nothing() {
        let r_atom = RelationalAtom::new(name("R"), vec![Term::variable("a")]);
        let s_atom = RelationalAtom::new(name("S"), vec![Term::variable("a")]);
        let left = VecOperator::new(r_atom, vec![]);
        let right = VecOperator::new(s_atom.clone(), vec![vec![Constant::Int(1)]]);
        let mut join = Join::new(Box::new(left), Box::new(right), s_atom, vec![]);
        join.open().unwrap();
        assert_eq!(join.next().unwrap(), None);
    }
}
