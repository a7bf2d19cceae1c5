/*!
The operator protocol (§4.3) and the shared pieces every concrete operator builds on: the
`Tuple` representation, the accumulated-schema bookkeeping used to resolve a variable to a tuple
position, and the pure term-resolution function shared by `Select`, `Join`, `Project`, and
`SumAggregate`.

 */

use crate::error::{planner_invariant, Error};
use crate::atom::RelationalAtom;
use crate::term::Term;
use crate::value::Constant;
use crate::Name;
use std::fmt::Debug;
use std::io::Write;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// A tuple flowing through the pipeline: one resolved constant per column.
pub type Tuple = Vec<Constant>;

/// The ordered list of relational atoms a pipeline stage is "labeled" with (§3): the positions
/// of the concatenation of these atoms' terms are exactly the positions of tuples this stage
/// produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema(Vec<RelationalAtom>);

/// The operator capability set: `open`, `next`, `reset`, `dump`.
pub trait Operator: Debug {
    /// The accumulated relational atoms this operator's output tuples are labeled with.
    fn schema(&self) -> &Schema;

    /// Establish any resources needed before the first `next`/`reset` (§4.3). Idempotent state
    /// beyond this point is the operator's own responsibility.
    fn open(&mut self) -> Result<(), Error>;

    /// Return the next tuple, or `None` at end-of-stream. Once `None` is returned, subsequent
    /// calls continue returning `None` until `reset`.
    fn next(&mut self) -> Result<Option<Tuple>, Error>;

    /// Restore this operator (and its children) to its pre-`next` state.
    fn reset(&mut self) -> Result<(), Error>;

    /// Drain `next` to end-of-stream, writing one formatted tuple per line. `SumAggregate`
    /// accumulates its groups inside `next` on first call rather than overriding this default;
    /// by the time `dump` starts pulling, the blocking work is already behind a cursor.
    fn dump(&mut self, sink: &mut dyn Write) -> Result<(), Error> {
        while let Some(tuple) = self.next()? {
            writeln!(sink, "{}", format_tuple(&tuple))
                .map_err(|e| crate::error::io_error("<output>", e))?;
        }
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

/// Render a tuple the way non-aggregate results are written (§6): comma-separated, no quoting.
pub fn format_tuple(tuple: &[Constant]) -> String {
    tuple
        .iter()
        .map(Constant::to_string)
        .collect::<Vec<String>>()
        .join(", ")
}

/// Resolve a term to a constant against a tuple labeled by `schema`: a variable is looked up at
/// its position, a constant passes through unchanged. Shared, pure, and used by every operator
/// that needs to evaluate a term against a tuple in hand.
pub fn resolve_term(term: &Term, schema: &Schema, tuple: &[Constant]) -> Result<Constant, Error> {
    match term {
        Term::Variable(name) => {
            let position = schema.position_of(name).ok_or_else(|| {
                planner_invariant(format!("variable '{name}' is not bound by this operator's schema"))
            })?;
            tuple.get(position).cloned().ok_or_else(|| {
                planner_invariant(format!(
                    "tuple arity {} too small for position {position}",
                    tuple.len()
                ))
            })
        }
        Term::IntConst(value) => Ok(Constant::Int(*value)),
        Term::StrConst(value) => Ok(Constant::Str(value.clone())),
    }
}

// ------------------------------------------------------------------------------------------------
// Implementations — Schema
// ------------------------------------------------------------------------------------------------

impl Schema {
    pub fn new(atoms: Vec<RelationalAtom>) -> Self {
        Self(atoms)
    }

    pub fn atoms(&self) -> &[RelationalAtom] {
        &self.0
    }

    pub fn arity(&self) -> usize {
        self.0.iter().map(RelationalAtom::arity).sum()
    }

    /// Every position where `name` is bound, in atom order then term order.
    pub fn positions_of(&self, name: &Name) -> Vec<usize> {
        let mut positions = Vec::new();
        let mut offset = 0;
        for atom in &self.0 {
            for (index, term) in atom.terms().iter().enumerate() {
                if term.as_variable() == Some(name) {
                    positions.push(offset + index);
                }
            }
            offset += atom.arity();
        }
        positions
    }

    /// The position of `name`'s first occurrence, if bound by this schema.
    pub fn position_of(&self, name: &Name) -> Option<usize> {
        self.positions_of(name).into_iter().next()
    }

    /// A schema labeling the concatenation of this schema's atoms followed by `other`'s.
    pub fn concat(&self, other: &Schema) -> Schema {
        let mut atoms = self.0.clone();
        atoms.extend(other.0.iter().cloned());
        Schema(atoms)
    }
}

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------
