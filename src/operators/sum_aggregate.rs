/*!
`SumAggregate` (§4.9): a fully-blocking group-sum, computed on the first `next` call and then
drained entry by entry. Emission order is unspecified (a map-keyed enumeration).

 */

use crate::error::{incompatible_types, planner_invariant, Error};
use crate::operator::{resolve_term, Operator, Schema, Tuple};
use crate::term::Term;
use crate::value::{Constant, DataType};
use std::collections::HashMap;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// Groups `child`'s tuples by `group_by_terms` and sums the product of `product_terms` within
/// each group.
#[derive(Debug)]
pub struct SumAggregate {
    child: Box<dyn Operator>,
    schema: Schema,
    group_by_terms: Vec<Term>,
    product_terms: Vec<Term>,
    results: Option<Vec<Tuple>>,
    cursor: usize,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl SumAggregate {
    pub fn new(child: Box<dyn Operator>, group_by_terms: Vec<Term>, product_terms: Vec<Term>) -> Self {
        let schema = child.schema().clone();
        Self {
            child,
            schema,
            group_by_terms,
            product_terms,
            results: None,
            cursor: 0,
        }
    }

    /// Drain `child` to end-of-stream, accumulating one sum per distinct group key. With no
    /// group-by terms, a single sentinel group is always present, so an empty input still
    /// produces one row holding `0`.
    fn compute(&mut self) -> Result<Vec<Tuple>, Error> {
        let mut acc: HashMap<Tuple, i64> = HashMap::new();
        if self.group_by_terms.is_empty() {
            acc.insert(Vec::new(), 0);
        }

        while let Some(tuple) = self.child.next()? {
            let key: Tuple = self
                .group_by_terms
                .iter()
                .map(|term| resolve_term(term, &self.schema, &tuple))
                .collect::<Result<_, _>>()?;

            let mut delta: i64 = 1;
            for term in &self.product_terms {
                let value = resolve_term(term, &self.schema, &tuple)?;
                let factor = value
                    .as_int()
                    .ok_or_else(|| incompatible_types(value.data_type(), DataType::Int))?;
                delta = delta
                    .checked_mul(factor)
                    .ok_or_else(|| planner_invariant("sum aggregate product overflowed i64"))?;
            }

            let sum = acc.entry(key).or_insert(0);
            *sum = sum
                .checked_add(delta)
                .ok_or_else(|| planner_invariant("sum aggregate total overflowed i64"))?;
        }

        Ok(acc
            .into_iter()
            .map(|(mut key, sum)| {
                key.push(Constant::Int(sum));
                key
            })
            .collect())
    }
}

impl Operator for SumAggregate {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn open(&mut self) -> Result<(), Error> {
        self.child.open()
    }

    fn next(&mut self) -> Result<Option<Tuple>, Error> {
        if self.results.is_none() {
            self.results = Some(self.compute()?);
        }
        let results = self.results.as_ref().unwrap();
        let tuple = results.get(self.cursor).cloned();
        if tuple.is_some() {
            self.cursor += 1;
        }
        Ok(tuple)
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.child.reset()?;
        self.results = None;
        self.cursor = 0;
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------
