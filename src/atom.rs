/*!
The relational atom, comparison atom, and query model shared by the minimizer and the planner.

 */

use crate::error::{malformed_input, Error};
use crate::term::{ComparisonOperator, Term};
use crate::Name;
use std::fmt::{Display, Formatter};

// ------------------------------------------------------------------------------------------------
// Public Types & Constants
// ------------------------------------------------------------------------------------------------

/// `name(t1, .., tn)`, optionally carrying a `SUM(..)` aggregate (only meaningful on a query's
/// head atom).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationalAtom {
    name: Name,
    terms: Vec<Term>,
    sum_aggregate: Option<SumAggregate>,
}

/// `SUM(u1*u2*..)`: the product terms summed over the result tuples of a query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SumAggregate {
    product_terms: Vec<Term>,
}

/// `left op right`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComparisonAtom {
    left: Term,
    op: ComparisonOperator,
    right: Term,
}

/// A single body atom: either a relational atom or a comparison atom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BodyAtom {
    Relational(RelationalAtom),
    Comparison(ComparisonAtom),
}

/// `head :- body`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    head: RelationalAtom,
    body: Vec<BodyAtom>,
}

// ------------------------------------------------------------------------------------------------
// Implementations — RelationalAtom
// ------------------------------------------------------------------------------------------------

impl Display for RelationalAtom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let terms = self
            .terms
            .iter()
            .map(Term::to_string)
            .collect::<Vec<String>>()
            .join(", ");
        match &self.sum_aggregate {
            Some(agg) if terms.is_empty() => write!(f, "{}({})", self.name, agg),
            Some(agg) => write!(f, "{}({}, {})", self.name, terms, agg),
            None => write!(f, "{}({})", self.name, terms),
        }
    }
}

impl RelationalAtom {
    pub fn new(name: Name, terms: Vec<Term>) -> Self {
        Self {
            name,
            terms,
            sum_aggregate: None,
        }
    }

    pub fn with_sum_aggregate(name: Name, terms: Vec<Term>, sum_aggregate: SumAggregate) -> Self {
        Self {
            name,
            terms,
            sum_aggregate: Some(sum_aggregate),
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn sum_aggregate(&self) -> Option<&SumAggregate> {
        self.sum_aggregate.as_ref()
    }

    /// The index of a variable's first occurrence among this atom's terms.
    pub fn index_of(&self, name: &Name) -> Option<usize> {
        self.terms.iter().position(|t| t.as_variable() == Some(name))
    }

    /// All distinct variable names appearing in this atom's terms, in first-occurrence order.
    pub fn variables(&self) -> Vec<Name> {
        let mut seen = Vec::new();
        for term in &self.terms {
            if let Term::Variable(v) = term {
                if !seen.contains(v) {
                    seen.push(v.clone());
                }
            }
        }
        seen
    }

    /// A stable key usable to compare two atoms independent of their term sequence's ordinal
    /// position in a larger body: `(name, serialized terms)`.
    pub fn canonical_key(&self) -> (String, String) {
        (
            self.name.to_string(),
            self.terms
                .iter()
                .map(Term::to_string)
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

// ------------------------------------------------------------------------------------------------
// Implementations — SumAggregate
// ------------------------------------------------------------------------------------------------

impl Display for SumAggregate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SUM({})",
            self.product_terms
                .iter()
                .map(Term::to_string)
                .collect::<Vec<String>>()
                .join("*")
        )
    }
}

impl SumAggregate {
    pub fn new(product_terms: Vec<Term>) -> Self {
        Self { product_terms }
    }

    pub fn product_terms(&self) -> &[Term] {
        &self.product_terms
    }
}

// ------------------------------------------------------------------------------------------------
// Implementations — ComparisonAtom
// ------------------------------------------------------------------------------------------------

impl Display for ComparisonAtom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

impl ComparisonAtom {
    pub fn new(left: Term, op: ComparisonOperator, right: Term) -> Self {
        Self { left, op, right }
    }

    pub fn left(&self) -> &Term {
        &self.left
    }

    pub fn op(&self) -> ComparisonOperator {
        self.op
    }

    pub fn right(&self) -> &Term {
        &self.right
    }

    /// The distinct variables appearing in this comparison, in left-then-right order.
    pub fn variables(&self) -> Vec<Name> {
        let mut vars = Vec::new();
        if let Term::Variable(v) = &self.left {
            vars.push(v.clone());
        }
        if let Term::Variable(v) = &self.right {
            if !vars.contains(v) {
                vars.push(v.clone());
            }
        }
        vars
    }
}

// ------------------------------------------------------------------------------------------------
// Implementations — BodyAtom
// ------------------------------------------------------------------------------------------------

impl Display for BodyAtom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Relational(a) => write!(f, "{a}"),
            Self::Comparison(a) => write!(f, "{a}"),
        }
    }
}

impl From<RelationalAtom> for BodyAtom {
    fn from(v: RelationalAtom) -> Self {
        Self::Relational(v)
    }
}

impl From<ComparisonAtom> for BodyAtom {
    fn from(v: ComparisonAtom) -> Self {
        Self::Comparison(v)
    }
}

impl BodyAtom {
    pub fn as_relational(&self) -> Option<&RelationalAtom> {
        match self {
            Self::Relational(a) => Some(a),
            Self::Comparison(_) => None,
        }
    }

    pub fn as_comparison(&self) -> Option<&ComparisonAtom> {
        match self {
            Self::Comparison(a) => Some(a),
            Self::Relational(_) => None,
        }
    }

    pub fn is_relational(&self) -> bool {
        self.as_relational().is_some()
    }
}

// ------------------------------------------------------------------------------------------------
// Implementations — Query
// ------------------------------------------------------------------------------------------------

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let body = self
            .body
            .iter()
            .map(BodyAtom::to_string)
            .collect::<Vec<String>>()
            .join(", ");
        write!(f, "{} :- {}", self.head, body)
    }
}

impl Query {
    /// Construct a query, checking the safety invariant of §3: every head variable must appear
    /// in at least one body relational atom.
    pub fn new(head: RelationalAtom, body: Vec<BodyAtom>) -> Result<Self, Error> {
        let query = Self { head, body };
        query.check_safety()?;
        Ok(query)
    }

    /// Construct without re-checking safety; used internally by the planner and minimizer once a
    /// query is already known to be safe (e.g. after removing an atom that homomorphism search
    /// has proven redundant).
    pub fn new_unchecked(head: RelationalAtom, body: Vec<BodyAtom>) -> Self {
        Self { head, body }
    }

    fn check_safety(&self) -> Result<(), Error> {
        let body_vars = self.body_relational_variables();
        for term in self.head.terms() {
            if let Term::Variable(v) = term {
                if !body_vars.contains(v) {
                    return Err(malformed_input(format!(
                        "head variable '{v}' does not appear in any body relational atom"
                    )));
                }
            }
        }
        if let Some(agg) = self.head.sum_aggregate() {
            for term in agg.product_terms() {
                if let Term::Variable(v) = term {
                    if !body_vars.contains(v) {
                        return Err(malformed_input(format!(
                            "SUM term '{v}' does not appear in any body relational atom"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn body_relational_variables(&self) -> Vec<Name> {
        let mut vars = Vec::new();
        for atom in self.relational_atoms() {
            for v in atom.variables() {
                if !vars.contains(&v) {
                    vars.push(v);
                }
            }
        }
        vars
    }

    pub fn head(&self) -> &RelationalAtom {
        &self.head
    }

    pub fn body(&self) -> &[BodyAtom] {
        &self.body
    }

    pub fn relational_atoms(&self) -> impl Iterator<Item = &RelationalAtom> {
        self.body.iter().filter_map(BodyAtom::as_relational)
    }

    pub fn comparison_atoms(&self) -> impl Iterator<Item = &ComparisonAtom> {
        self.body.iter().filter_map(BodyAtom::as_comparison)
    }

    /// A query with the relational atom at `index` removed. Panics if `index` is not the index
    /// of a relational atom.
    pub fn without_relational_atom_at(&self, index: usize) -> Self {
        let mut body = self.body.clone();
        let removed = body.remove(index);
        assert!(removed.is_relational());
        Self {
            head: self.head.clone(),
            body,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------
