/*!
`Project` (§4.8): a blocking, deduplicating operator that resolves the query head's terms against
each child tuple and emits each distinct result tuple once, in first-occurrence order.

 */

use crate::error::Error;
use crate::operator::{resolve_term, Operator, Schema, Tuple};
use crate::term::Term;
use std::collections::HashSet;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// Projects `head_terms` over `child`'s accumulated schema, deduplicating as it goes.
#[derive(Debug)]
pub struct Project {
    child: Box<dyn Operator>,
    /// The child's accumulated schema, used to resolve `head_terms` against each child tuple.
    /// `Project` sits at the root of every plan it appears in, so this operator's own output
    /// tuples are never themselves resolved against this schema.
    schema: Schema,
    head_terms: Vec<Term>,
    seen: HashSet<Tuple>,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl Project {
    pub fn new(child: Box<dyn Operator>, head_terms: Vec<Term>) -> Self {
        let schema = child.schema().clone();
        Self {
            child,
            schema,
            head_terms,
            seen: HashSet::new(),
        }
    }
}

impl Operator for Project {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn open(&mut self) -> Result<(), Error> {
        self.child.open()
    }

    fn next(&mut self) -> Result<Option<Tuple>, Error> {
        while let Some(tuple) = self.child.next()? {
            let projected: Tuple = self
                .head_terms
                .iter()
                .map(|term| resolve_term(term, &self.schema, &tuple))
                .collect::<Result<_, _>>()?;
            if self.seen.insert(projected.clone()) {
                return Ok(Some(projected));
            }
        }
        Ok(None)
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.child.reset()?;
        self.seen.clear();
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::RelationalAtom;
    use crate::value::Constant;
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

    #[test]
    fn deduplicates_in_first_occurrence_order() {
        let atom = RelationalAtom::new(name("R"), vec![Term::variable("a")]);
        let child = VecOperator::new(
            atom,
            vec![
                vec![Constant::Str("x".into())],
                vec![Constant::Str("x".into())],
                vec![Constant::Str("y".into())],
            ],
        );
        let mut project = Project::new(Box::new(child), vec![Term::variable("a")]);
        project.open().unwrap();
        assert_eq!(project.next().unwrap(), Some(vec![Constant::Str("x".into())]));
        assert_eq!(project.next().unwrap(), Some(vec![Constant::Str("y".into())]));
        assert_eq!(project.next().unwrap(), None);
    }

    #[test]
    fn reset_clears_dedup_state() {
        let atom = RelationalAtom::new(name("R"), vec![Term::variable("a")]);
        let child = VecOperator::new(atom, vec![vec![Constant::Int(1)]]);
        let mut project = Project::new(Box::new(child), vec![Term::variable("a")]);
        project.open().unwrap();
        assert_eq!(project.next().unwrap(), Some(vec![Constant::Int(1)]));
        assert_eq!(project.next().unwrap(), None);
        project.reset().unwrap();
        assert_eq!(project.next().unwrap(), Some(vec![Constant::Int(1)]));
    }
}
