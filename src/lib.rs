/*!
This crate implements two independent, tightly-coupled cores over a shared conjunctive-query
data model:

* a *core minimizer* ([`minimizer`]) that rewrites a conjunctive query into an equivalent query
  with the fewest body atoms, via homomorphism search ([`homomorphism`]);
* a *planner and pipelined evaluator* ([`planner`], [`operators`]) that turns a conjunctive
  query into a left-deep tree of streaming operators over a small on-disk relational database
  ([`catalog`]) and drains it ([`runtime`]).

Both cores share a term algebra ([`term`]), a runtime value representation ([`value`]), and a
relational/comparison atom model ([`atom`]).

# Example

```no_run
use cq_engine::catalog::Catalog;
use cq_engine::parser::parse_query;
use cq_engine::planner::Planner;
use cq_engine::runtime::Runtime;

let catalog = Catalog::load("examples/db").unwrap();
let query = parse_query("Q(a,c) :- R(a,b), S(b,c), a > 1").unwrap();
let plan = Planner::new(&catalog).plan(&query).unwrap();
Runtime::new(std::io::stdout()).run(plan).unwrap();
```
 */

#![warn(
    unknown_lints,
    // ---------- Stylistic
    absolute_paths_not_starting_with_crate,
    elided_lifetimes_in_paths,
    explicit_outlives_requirements,
    macro_use_extern_crate,
    nonstandard_style, /* group */
    noop_method_call,
    rust_2018_idioms,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    // ---------- Future
    future_incompatible, /* group */
    rust_2021_compatibility, /* group */
    // ---------- Public
    missing_debug_implementations,
    unreachable_pub,
    // ---------- Unsafe
    unsafe_code,
    unsafe_op_in_unsafe_fn,
    // ---------- Unused
    unused, /* group */
)]
#![deny(
    // ---------- Deprecated
    anonymous_parameters,
    bare_trait_objects,
    ellipsis_inclusive_range_patterns,
    // ---------- Unsafe
    deref_nullptr,
    drop_bounds,
    dyn_drop,
)]

use error::{invalid_name_value, Error};
use lazy_static::lazy_static;
use std::{fmt::Display, str::FromStr};

// ------------------------------------------------------------------------------------------------
// Public Types & Constants
// ------------------------------------------------------------------------------------------------

/// A validated identifier, used for both relation names and variable names. Construction via
/// [`FromStr`] enforces the same lexical shape the parser accepts for identifiers.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(String);

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            static ref IDENTIFIER: regex::Regex =
                regex::Regex::new(r"^[\p{L}_][\p{L}\p{Nd}_]*$").unwrap();
        }

        if !s.is_empty() && s.len() < 128 && IDENTIFIER.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(invalid_name_value(s.to_string()))
        }
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Name> for String {
    fn from(v: Name) -> Self {
        v.0
    }
}

impl Name {
    /// Construct a `Name` without validating its lexical shape. Used for names already known to
    /// be well-formed, e.g. those produced internally by the planner's variable renaming.
    pub fn new_unchecked<S: Into<String>>(s: S) -> Self {
        let s = s.into();
        assert!(!s.is_empty());
        Self(s)
    }
}

// ------------------------------------------------------------------------------------------------
// Modules
// ------------------------------------------------------------------------------------------------

pub mod atom;

pub mod catalog;

pub mod error;

pub mod homomorphism;

pub mod minimizer;

pub mod operator;

pub mod operators;

pub mod parser;

pub mod planner;

pub mod runtime;

pub mod term;

pub mod value;
