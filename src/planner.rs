/*!
The planner (§4.4): normalizes a parsed query so every relational atom carries only distinct
variables, classifies comparison atoms as standalone selections or join predicates, pushes
selections to scan leaves, builds a left-deep join tree avoiding Cartesian products, and tops the
tree with `Project` or `SumAggregate` depending on the head.

 */

use crate::atom::{BodyAtom, ComparisonAtom, Query, RelationalAtom};
use crate::catalog::Catalog;
use crate::error::{malformed_input, planner_invariant, Error};
use crate::operator::Operator;
use crate::operators::{Join, Project, Scan, Select, SumAggregate};
use crate::term::{ComparisonOperator, Term};
use crate::Name;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// Builds an operator tree from a parsed `Query` against a fixed `Catalog`.
#[derive(Debug)]
pub struct Planner<'a> {
    catalog: &'a Catalog,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl<'a> Planner<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Plan `query` into a left-deep pipeline rooted at a `Project` or `SumAggregate`.
    #[tracing::instrument(skip(self, query), fields(head = %query.head()))]
    pub fn plan(&self, query: &Query) -> Result<Box<dyn Operator>, Error> {
        let normalized = normalize(query);
        let (standalone, join_predicates) = classify(&normalized);
        let atoms: Vec<RelationalAtom> = normalized.relational_atoms().cloned().collect();
        if atoms.is_empty() {
            return Err(malformed_input("query body contains no relational atoms"));
        }

        let mut leaves = self.build_leaves(&atoms, &standalone)?;
        let mut assigned = assign_join_predicates(&atoms, &join_predicates)?;

        let mut leaves_iter = leaves.drain(..);
        let mut cur = leaves_iter.next().unwrap();
        for (offset, leaf) in leaves_iter.enumerate() {
            let index = offset + 1;
            let right_atom = atoms[index].clone();
            let predicates = std::mem::take(&mut assigned[index]);
            cur = Box::new(Join::new(cur, leaf, right_atom, predicates));
        }

        build_output(&normalized, cur)
    }

    /// One `Scan` (optionally wrapped in `Select`) per relational atom, in body order, with each
    /// standalone comparison atom attached to the first leaf whose variables cover it.
    fn build_leaves(
        &self,
        atoms: &[RelationalAtom],
        standalone: &[ComparisonAtom],
    ) -> Result<Vec<Box<dyn Operator>>, Error> {
        let mut claimed = vec![false; standalone.len()];
        let mut leaves = Vec::with_capacity(atoms.len());

        for (index, atom) in atoms.iter().enumerate() {
            let relation_schema = self.catalog.schema(atom.name())?.clone();
            let scan: Box<dyn Operator> = Box::new(Scan::new(relation_schema, atom.clone()));

            let atom_vars = atom.variables();
            let mut criteria = Vec::new();
            for (i, comparison) in standalone.iter().enumerate() {
                if claimed[i] {
                    continue;
                }
                let vars = comparison.variables();
                let eligible = if vars.is_empty() {
                    index == 0
                } else {
                    vars.iter().all(|v| atom_vars.contains(v))
                };
                if eligible {
                    criteria.push(comparison.clone());
                    claimed[i] = true;
                }
            }

            leaves.push(if criteria.is_empty() {
                scan
            } else {
                Box::new(Select::new(scan, criteria)) as Box<dyn Operator>
            });
        }

        Ok(leaves)
    }
}

/// Rewrite `query`'s body so every relational atom's terms are pairwise-distinct variables:
/// repeated variable occurrences and embedded constants are each replaced by a fresh variable,
/// with the equality relationship preserved as a new standalone `ComparisonAtom`.
fn normalize(query: &Query) -> Query {
    let mut counter = 0usize;
    let mut body = Vec::new();

    for atom in query.body() {
        match atom {
            BodyAtom::Relational(relational) => {
                let mut seen = Vec::new();
                let mut new_terms = Vec::with_capacity(relational.arity());
                let mut equalities = Vec::new();

                for term in relational.terms() {
                    match term {
                        Term::Variable(v) if !seen.contains(v) => {
                            seen.push(v.clone());
                            new_terms.push(term.clone());
                        }
                        _ => {
                            let fresh = fresh_variable(&mut counter);
                            equalities.push(
                                ComparisonAtom::new(fresh.clone(), ComparisonOperator::Equal, term.clone())
                                    .into(),
                            );
                            new_terms.push(fresh);
                        }
                    }
                }

                let new_atom = match relational.sum_aggregate() {
                    Some(agg) => {
                        RelationalAtom::with_sum_aggregate(relational.name().clone(), new_terms, agg.clone())
                    }
                    None => RelationalAtom::new(relational.name().clone(), new_terms),
                };
                body.push(new_atom.into());
                body.extend(equalities);
            }
            BodyAtom::Comparison(comparison) => body.push(comparison.clone().into()),
        }
    }

    Query::new_unchecked(query.head().clone(), body)
}

fn fresh_variable(counter: &mut usize) -> Term {
    let name = format!("__v{counter}");
    *counter += 1;
    Term::variable(name)
}

/// Split the normalized body's comparison atoms into standalone selections (evaluable against a
/// single relational atom's tuple) and join predicates (spanning two distinct relational atoms).
fn classify(query: &Query) -> (Vec<ComparisonAtom>, Vec<ComparisonAtom>) {
    let atoms: Vec<RelationalAtom> = query.relational_atoms().cloned().collect();
    let mut standalone = Vec::new();
    let mut join = Vec::new();

    for comparison in query.comparison_atoms() {
        let vars = comparison.variables();
        let is_standalone = vars.len() <= 1
            || atoms
                .iter()
                .any(|atom| vars.iter().all(|v| atom.variables().contains(v)));
        if is_standalone {
            standalone.push(comparison.clone());
        } else {
            join.push(comparison.clone());
        }
    }

    (standalone, join)
}

/// Assign each join predicate to the rightmost (highest-index) relation owning one of its terms:
/// this guarantees the predicate's other term belongs to a relation already accumulated to the
/// left in the left-deep plan (§4.4).
fn assign_join_predicates(
    atoms: &[RelationalAtom],
    join_predicates: &[ComparisonAtom],
) -> Result<Vec<Vec<ComparisonAtom>>, Error> {
    let mut assigned = vec![Vec::new(); atoms.len()];
    for predicate in join_predicates {
        let owning_indices: Vec<usize> = predicate
            .variables()
            .iter()
            .filter_map(|v| atoms.iter().position(|atom| atom.variables().contains(v)))
            .collect();
        let rightmost = owning_indices.into_iter().max().ok_or_else(|| {
            planner_invariant(format!(
                "join predicate '{predicate}' has no term belonging to any known relation"
            ))
        })?;
        assigned[rightmost].push(predicate.clone());
    }
    Ok(assigned)
}

/// Wrap the accumulated plan in `Project` (no aggregate) or `SumAggregate` (head carries one),
/// per the head atom.
fn build_output(query: &Query, root: Box<dyn Operator>) -> Result<Box<dyn Operator>, Error> {
    let head = query.head();
    match head.sum_aggregate() {
        Some(agg) => Ok(Box::new(SumAggregate::new(
            root,
            head.terms().to_vec(),
            agg.product_terms().to_vec(),
        ))),
        None => {
            for term in head.terms() {
                if let Term::Variable(v) = term {
                    ensure_projected_variable_is_bound(v, query)?;
                }
            }
            Ok(Box::new(Project::new(root, head.terms().to_vec())))
        }
    }
}

fn ensure_projected_variable_is_bound(variable: &Name, query: &Query) -> Result<(), Error> {
    let bound = query
        .relational_atoms()
        .any(|atom| atom.variables().contains(variable));
    if bound {
        Ok(())
    } else {
        Err(malformed_input(format!(
            "projected variable '{variable}' does not appear in any relational atom"
        )))
    }
}

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Name {
        Name::new_unchecked(s)
    }

    #[test]
    fn normalize_splits_duplicate_variable() {
        // Q(x) :- R(x,x)
        let query = Query::new(
            RelationalAtom::new(name("Q"), vec![Term::variable("x")]),
            vec![RelationalAtom::new(name("R"), vec![Term::variable("x"), Term::variable("x")]).into()],
        )
        .unwrap();
        let normalized = normalize(&query);
        let relational: Vec<&RelationalAtom> = normalized.relational_atoms().collect();
        assert_eq!(relational.len(), 1);
        assert_eq!(relational[0].variables().len(), 2);
        assert_eq!(normalized.comparison_atoms().count(), 1);
    }

    #[test]
    fn normalize_splits_embedded_constant() {
        // Q(x) :- R(x,5)
        let query = Query::new(
            RelationalAtom::new(name("Q"), vec![Term::variable("x")]),
            vec![RelationalAtom::new(name("R"), vec![Term::variable("x"), Term::IntConst(5)]).into()],
        )
        .unwrap();
        let normalized = normalize(&query);
        let relational: Vec<&RelationalAtom> = normalized.relational_atoms().collect();
        assert!(relational[0].terms().iter().all(Term::is_variable));
        let comparisons: Vec<&ComparisonAtom> = normalized.comparison_atoms().collect();
        assert_eq!(comparisons.len(), 1);
        assert_eq!(comparisons[0].right(), &Term::IntConst(5));
    }

    #[test]
    fn classify_separates_standalone_from_join() {
        // Q(a,c) :- R(a,b), S(b,c), a > 1
        let query = Query::new(
            RelationalAtom::new(name("Q"), vec![Term::variable("a"), Term::variable("c")]),
            vec![
                RelationalAtom::new(name("R"), vec![Term::variable("a"), Term::variable("b")]).into(),
                RelationalAtom::new(name("S"), vec![Term::variable("b"), Term::variable("c")]).into(),
                ComparisonAtom::new(Term::variable("a"), ComparisonOperator::GreaterThan, Term::IntConst(1))
                    .into(),
            ],
        )
        .unwrap();
        let (standalone, join) = classify(&query);
        assert_eq!(standalone.len(), 1);
        assert!(join.is_empty());
    }

    #[test]
    fn join_predicate_assigned_to_rightmost_relation() {
        // R(a), S(b), a < b -- a join predicate spanning the two relations.
        let atoms = vec![
            RelationalAtom::new(name("R"), vec![Term::variable("a")]),
            RelationalAtom::new(name("S"), vec![Term::variable("b")]),
        ];
        let predicate =
            ComparisonAtom::new(Term::variable("a"), ComparisonOperator::LessThan, Term::variable("b"));
        let assigned = assign_join_predicates(&atoms, &[predicate]).unwrap();
        assert!(assigned[0].is_empty());
        assert_eq!(assigned[1].len(), 1);
    }
}
