/*!
`Select` (§4.6): filters a child's tuples against a non-empty list of comparison atoms, forwarding
matching tuples unchanged.

 */

use crate::atom::ComparisonAtom;
use crate::error::Error;
use crate::operator::{resolve_term, Operator, Schema, Tuple};

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// Wraps `child`, passing through only tuples satisfying every criterion.
#[derive(Debug)]
pub struct Select {
    child: Box<dyn Operator>,
    schema: Schema,
    criteria: Vec<ComparisonAtom>,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl Select {
    pub fn new(child: Box<dyn Operator>, criteria: Vec<ComparisonAtom>) -> Self {
        let schema = child.schema().clone();
        Self {
            child,
            schema,
            criteria,
        }
    }
}

impl Operator for Select {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn open(&mut self) -> Result<(), Error> {
        self.child.open()
    }

    fn next(&mut self) -> Result<Option<Tuple>, Error> {
        while let Some(tuple) = self.child.next()? {
            let mut satisfied = true;
            for criterion in &self.criteria {
                let left = resolve_term(criterion.left(), &self.schema, &tuple)?;
                let right = resolve_term(criterion.right(), &self.schema, &tuple)?;
                if !left.compare(criterion.op(), &right)? {
                    satisfied = false;
                    break;
                }
            }
            if satisfied {
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.child.reset()
    }
}

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::RelationalAtom;
    use crate::term::{ComparisonOperator, Term};
    use crate::value::Constant;
    use crate::Name;

    /// A child operator fed from a fixed list of tuples, for testing operators above it in
    /// isolation without standing up a `Scan`.
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

    #[test]
    fn forwards_only_satisfying_tuples() {
        let atom = RelationalAtom::new(name("R"), vec![Term::variable("a"), Term::variable("b")]);
        let child = VecOperator::new(
            atom,
            vec![
                vec![Constant::Int(1), Constant::Int(2)],
                vec![Constant::Int(5), Constant::Int(6)],
            ],
        );
        let criteria = vec![ComparisonAtom::new(
            Term::variable("a"),
            ComparisonOperator::GreaterThan,
            Term::IntConst(1),
        )];
        let mut select = Select::new(Box::new(child), criteria);
        select.open().unwrap();
        assert_eq!(
            select.next().unwrap(),
            Some(vec![Constant::Int(5), Constant::Int(6)])
        );
        assert_eq!(select.next().unwrap(), None);
    }

    #[test]
    fn all_criteria_must_hold() {
        let atom = RelationalAtom::new(name("R"), vec![Term::variable("a")]);
        let child = VecOperator::new(
            atom,
            vec![vec![Constant::Int(3)], vec![Constant::Int(4)]],
        );
        let criteria = vec![
            ComparisonAtom::new(Term::variable("a"), ComparisonOperator::GreaterThan, Term::IntConst(2)),
            ComparisonAtom::new(Term::variable("a"), ComparisonOperator::LessThan, Term::IntConst(4)),
        ];
        let mut select = Select::new(Box::new(child), criteria);
        select.open().unwrap();
        assert_eq!(select.next().unwrap(), Some(vec![Constant::Int(3)]));
        assert_eq!(select.next().unwrap(), None);
    }

    #[test]
    fn reset_rewinds_child() {
        let atom = RelationalAtom::new(name("R"), vec![Term::variable("a")]);
        let child = VecOperator::new(atom, vec![vec![Constant::Int(9)]]);
        let mut select = Select::new(
            Box::new(child),
            vec![ComparisonAtom::new(
                Term::variable("a"),
                ComparisonOperator::Equal,
                Term::IntConst(9),
            )],
        );
        select.open().unwrap();
        select.next().unwrap();
        select.reset().unwrap();
        assert_eq!(select.next().unwrap(), Some(vec![Constant::Int(9)]));
    }
}
