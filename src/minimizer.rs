/*!
The core driver (§4.2): repeatedly removes a body relational atom whenever homomorphism search
proves the removal preserves equivalence, until a full pass removes nothing.

 */

use crate::atom::Query;
use crate::homomorphism::exists_homomorphism;

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

/// Compute the core of `query`: an equivalent query with as few body atoms as possible.
///
/// Comparison atoms, if any, are carried through unchanged — this driver only removes relational
/// atoms, consistent with the minimizer's input scope of comparison-free conjunctive queries.
pub fn minimize(query: Query) -> Query {
    let mut current = query;
    loop {
        let relational_indices: Vec<usize> = current
            .body()
            .iter()
            .enumerate()
            .filter(|(_, atom)| atom.is_relational())
            .map(|(index, _)| index)
            .collect();

        let mut removed = false;
        for index in relational_indices {
            let atom = current.body()[index].as_relational().unwrap().clone();
            let reduced = current.without_relational_atom_at(index);
            if exists_homomorphism(&current, &reduced, &atom) {
                current = reduced;
                removed = true;
                break;
            }
        }
        if !removed {
            return current;
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------
