/*!
The error kinds of §7: malformed input, catalog problems, I/O, tuple-shape mismatches, type
mismatches, and planner invariant violations. One enum, with a free constructor function per
variant, following the convention used throughout this crate's predecessor.

 */

use crate::value::DataType;
use crate::Name;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// The type for all errors returned from this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A string does not have the lexical shape of a valid identifier.
    #[error("'{value}' is not a valid identifier")]
    InvalidName { value: String },

    /// The parsed query is structurally invalid: empty, unsafe, or otherwise ill-formed.
    #[error("malformed query: {reason}")]
    MalformedInput { reason: String },

    /// A problem reading or interpreting the schema catalog.
    #[error("catalog error: {reason}")]
    Catalog { reason: String },

    /// An I/O failure reading a schema or data file.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A CSV row's field count did not match its relation's arity, or a field failed to parse.
    #[error("tuple shape error in '{relation}': {reason}")]
    TupleShape { relation: Name, reason: String },

    /// A comparison or aggregate operation was attempted over incompatible constant types.
    #[error("type mismatch: cannot compare {lhs_type} with {rhs_type}")]
    TypeMismatch { lhs_type: DataType, rhs_type: DataType },

    /// An internal planner invariant was violated; indicates a bug in the planner, not bad input.
    #[error("planner invariant violated: {reason}")]
    PlannerInvariant { reason: String },
}

/// The result of operations where the error returned is `crate::error::Error`.
pub type Result<T> = std::result::Result<T, Error>;

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

#[inline]
pub fn invalid_name_value<S: Into<String>>(value: S) -> Error {
    Error::InvalidName {
        value: value.into(),
    }
}

#[inline]
pub fn malformed_input<S: Into<String>>(reason: S) -> Error {
    Error::MalformedInput {
        reason: reason.into(),
    }
}

#[inline]
pub fn catalog_error<S: Into<String>>(reason: S) -> Error {
    Error::Catalog {
        reason: reason.into(),
    }
}

#[inline]
pub fn io_error<P: Into<String>>(path: P, source: std::io::Error) -> Error {
    Error::Io {
        path: path.into(),
        source,
    }
}

#[inline]
pub fn tuple_shape_error<S: Into<String>>(relation: Name, reason: S) -> Error {
    Error::TupleShape {
        relation,
        reason: reason.into(),
    }
}

#[inline]
pub fn incompatible_types(lhs_type: DataType, rhs_type: DataType) -> Error {
    Error::TypeMismatch { lhs_type, rhs_type }
}

#[inline]
pub fn planner_invariant<S: Into<String>>(reason: S) -> Error {
    Error::PlannerInvariant {
        reason: reason.into(),
    }
}
