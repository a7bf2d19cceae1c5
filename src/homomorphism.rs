/*!
Homomorphism search (§4.1): given a query and a candidate reduction with one relational atom
removed, decide whether a homomorphism from the query's body into the reduced body exists,
fixing the head variables.

 */

use crate::atom::{Query, RelationalAtom};
use crate::term::Term;
use crate::Name;
use std::collections::BTreeSet;
use std::collections::HashMap;

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

/// Decide whether a homomorphism `h : query -> reduced` exists with `h` fixing `query`'s head
/// variables, where `reduced` is `query` with `removed` taken out of its body.
pub fn exists_homomorphism(query: &Query, reduced: &Query, removed: &RelationalAtom) -> bool {
    let head_vars: Vec<Name> = query
        .head()
        .terms()
        .iter()
        .filter_map(Term::as_variable)
        .cloned()
        .collect();

    let rebind_vars: Vec<Name> = {
        let mut vars = Vec::new();
        for v in removed.variables() {
            if !head_vars.contains(&v) && !vars.contains(&v) {
                vars.push(v);
            }
        }
        vars
    };

    let candidates = candidate_terms(reduced, removed, &rebind_vars);

    if rebind_vars.is_empty() {
        return matches(query, reduced, &HashMap::new());
    }
    if candidates.is_empty() {
        return false;
    }

    let mut assignment = HashMap::new();
    search(query, reduced, &rebind_vars, &candidates, 0, &mut assignment)
}

// ------------------------------------------------------------------------------------------------
// Private Functions
// ------------------------------------------------------------------------------------------------

/// The over-approximated candidate set: distinct terms occurring anywhere in atoms of `reduced`
/// that share `removed`'s relation name, excluding the variables we are trying to rebind
/// (trivial self-mapping is excluded per §4.1 step 2).
fn candidate_terms(reduced: &Query, removed: &RelationalAtom, rebind_vars: &[Name]) -> Vec<Term> {
    let mut candidates = Vec::new();
    for atom in reduced.relational_atoms() {
        if atom.name() != removed.name() {
            continue;
        }
        for term in atom.terms() {
            if let Term::Variable(v) = term {
                if rebind_vars.contains(v) {
                    continue;
                }
            }
            if !candidates.contains(term) {
                candidates.push(term.clone());
            }
        }
    }
    candidates
}

/// DFS with an explicit worklist over the remaining variables to assign: at each call, `idx` is
/// the position in `rebind_vars` still to be bound.
fn search(
    query: &Query,
    reduced: &Query,
    rebind_vars: &[Name],
    candidates: &[Term],
    idx: usize,
    assignment: &mut HashMap<Name, Term>,
) -> bool {
    if idx == rebind_vars.len() {
        return matches(query, reduced, assignment);
    }
    for candidate in candidates {
        assignment.insert(rebind_vars[idx].clone(), candidate.clone());
        if search(query, reduced, rebind_vars, candidates, idx + 1, assignment) {
            return true;
        }
    }
    false
}

/// Apply `assignment` to every relational atom of `query`'s body (identity off the assignment's
/// domain) and check the resulting atom set equals `reduced`'s atom set.
fn matches(query: &Query, reduced: &Query, assignment: &HashMap<Name, Term>) -> bool {
    let substituted = query
        .relational_atoms()
        .map(|atom| substitute(atom, assignment))
        .collect::<Vec<_>>();
    atom_sets_equal(&substituted, reduced.relational_atoms())
}

fn substitute(atom: &RelationalAtom, assignment: &HashMap<Name, Term>) -> RelationalAtom {
    let terms = atom
        .terms()
        .iter()
        .map(|term| match term {
            Term::Variable(v) => assignment.get(v).cloned().unwrap_or_else(|| term.clone()),
            _ => term.clone(),
        })
        .collect();
    RelationalAtom::new(atom.name().clone(), terms)
}

fn atom_sets_equal<'a>(
    lhs: &[RelationalAtom],
    rhs: impl Iterator<Item = &'a RelationalAtom>,
) -> bool {
    let lhs_set: BTreeSet<(String, String)> = lhs.iter().map(RelationalAtom::canonical_key).collect();
    let rhs_set: BTreeSet<(String, String)> = rhs.map(RelationalAtom::canonical_key).collect();
    lhs_set == rhs_set
}

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::RelationalAtom;

    fn name(s: &str) -> Name {
        Name::new_unchecked(s)
    }

    fn r(terms: Vec<Term>) -> RelationalAtom {
        RelationalAtom::new(name("R"), terms)
    }

    #[test]
    fn duplicate_atom_collapses() {
        // Q(x) :- R(x,y), R(x,z)
        let query = Query::new(
            RelationalAtom::new(name("Q"), vec![Term::variable("x")]),
            vec![
                r(vec![Term::variable("x"), Term::variable("y")]).into(),
                r(vec![Term::variable("x"), Term::variable("z")]).into(),
            ],
        )
        .unwrap();
        let removed = r(vec![Term::variable("x"), Term::variable("z")]);
        let reduced = query.without_relational_atom_at(1);
        assert!(exists_homomorphism(&query, &reduced, &removed));
    }

    #[test]
    fn chain_atom_is_not_removable() {
        // Q(x,y) :- R(x,y), R(y,z)
        let query = Query::new(
            RelationalAtom::new(
                name("Q"),
                vec![Term::variable("x"), Term::variable("y")],
            ),
            vec![
                r(vec![Term::variable("x"), Term::variable("y")]).into(),
                r(vec![Term::variable("y"), Term::variable("z")]).into(),
            ],
        )
        .unwrap();
        let removed = r(vec![Term::variable("y"), Term::variable("z")]);
        let reduced = query.without_relational_atom_at(1);
        assert!(!exists_homomorphism(&query, &reduced, &removed));

        let removed_first = r(vec![Term::variable("x"), Term::variable("y")]);
        let reduced_first = query.without_relational_atom_at(0);
        assert!(!exists_homomorphism(&query, &reduced_first, &removed_first));
    }

    #[test]
    fn empty_candidate_set_fails() {
        // Q(x) :- R(x,y), S(y,z) -- removing S(y,z) needs a same-named atom to map into, but
        // there isn't one.
        let query = Query::new(
            RelationalAtom::new(name("Q"), vec![Term::variable("x")]),
            vec![
                r(vec![Term::variable("x"), Term::variable("y")]).into(),
                RelationalAtom::new(name("S"), vec![Term::variable("y"), Term::variable("z")])
                    .into(),
            ],
        )
        .unwrap();
        let removed =
            RelationalAtom::new(name("S"), vec![Term::variable("y"), Term::variable("z")]);
        let reduced = query.without_relational_atom_at(1);
        assert!(!exists_homomorphism(&query, &reduced, &removed));
    }
}
