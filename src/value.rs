/*!
The runtime value representation: the column types a schema may declare, and the constants that
flow through tuples. Kept distinct from [`crate::term::Term`], which additionally carries
variables — a tuple position is always resolved to a `Constant`, never a variable.

 */

use crate::error::{incompatible_types, Error};
use crate::term::ComparisonOperator;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// The two column types a `RelationalSchema` may declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    Int,
    Str,
}

/// A resolved runtime value: one column of one tuple.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Constant {
    Int(i64),
    Str(String),
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            Self::Int => "int",
            Self::Str => "string",
        })
    }
}

impl DataType {
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "int" => Some(Self::Int),
            "string" => Some(Self::Str),
            _ => None,
        }
    }
}

// ------------------------------------------------------------------------------------------------

impl Display for Constant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Constant {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<String> for Constant {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl Constant {
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Int(_) => DataType::Int,
            Self::Str(_) => DataType::Str,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Str(_) => None,
        }
    }

    /// Evaluate `self <op> other`. Errors if the two constants are of different types — the
    /// comparison is meaningless across types (§7, `TypeMismatch`).
    pub fn compare(&self, op: ComparisonOperator, other: &Self) -> Result<bool, Error> {
        let ordering = match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            _ => return Err(incompatible_types(self.data_type(), other.data_type())),
        };
        Ok(match op {
            ComparisonOperator::Equal => ordering == Ordering::Equal,
            ComparisonOperator::NotEqual => ordering != Ordering::Equal,
            ComparisonOperator::LessThan => ordering == Ordering::Less,
            ComparisonOperator::LessThanOrEqual => ordering != Ordering::Greater,
            ComparisonOperator::GreaterThan => ordering == Ordering::Greater,
            ComparisonOperator::GreaterThanOrEqual => ordering != Ordering::Less,
        })
    }
}

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_matching_types() {
        let a = Constant::Int(1);
        let b = Constant::Int(2);
        assert!(a.compare(ComparisonOperator::LessThan, &b).unwrap());
        assert!(!a.compare(ComparisonOperator::Equal, &b).unwrap());
        assert!(a.compare(ComparisonOperator::NotEqual, &b).unwrap());
    }

    #[test]
    fn compare_mismatched_types_errors() {
        let a = Constant::Int(1);
        let b = Constant::Str("1".to_string());
        assert!(a.compare(ComparisonOperator::Equal, &b).is_err());
    }

    #[test]
    fn strict_total_order_exactly_one_of_eq_neq() {
        for (a, b) in [(1, 1), (1, 2), (2, 1)] {
            let a = Constant::Int(a);
            let b = Constant::Int(b);
            let eq = a.compare(ComparisonOperator::Equal, &b).unwrap();
            let neq = a.compare(ComparisonOperator::NotEqual, &b).unwrap();
            assert_ne!(eq, neq);
        }
    }
}
