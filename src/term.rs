/*!
The term algebra shared by the minimizer and the evaluator: variables, integer constants, and
string constants, plus the comparison operators used in comparison atoms.

 */

use crate::value::Constant;
use crate::Name;
use std::fmt::{Display, Formatter};

// ------------------------------------------------------------------------------------------------
// Public Types & Constants
// ------------------------------------------------------------------------------------------------

/// A term occurring in a relational or comparison atom: a variable, or one of the two constant
/// kinds. Equality and hashing are structural and derived per-variant.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    Variable(Name),
    IntConst(i64),
    StrConst(String),
}

/// The comparison operators a `ComparisonAtom` may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Variable(v) => write!(f, "{v}"),
            Self::IntConst(v) => write!(f, "{v}"),
            Self::StrConst(v) => write!(f, "'{v}'"),
        }
    }
}

impl From<Name> for Term {
    fn from(v: Name) -> Self {
        Self::Variable(v)
    }
}

impl From<i64> for Term {
    fn from(v: i64) -> Self {
        Self::IntConst(v)
    }
}

impl From<Constant> for Term {
    fn from(v: Constant) -> Self {
        match v {
            Constant::Int(v) => Self::IntConst(v),
            Constant::Str(v) => Self::StrConst(v),
        }
    }
}

impl Term {
    pub fn variable<S: Into<String>>(name: S) -> Self {
        Self::Variable(Name::new_unchecked(name))
    }

    pub fn string<S: Into<String>>(v: S) -> Self {
        Self::StrConst(v.into())
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    pub fn as_variable(&self) -> Option<&Name> {
        match self {
            Self::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        !self.is_variable()
    }

    /// Returns this term's constant value, or `None` if it is a variable.
    pub fn as_constant(&self) -> Option<Constant> {
        match self {
            Self::Variable(_) => None,
            Self::IntConst(v) => Some(Constant::Int(*v)),
            Self::StrConst(v) => Some(Constant::Str(v.clone())),
        }
    }
}

// ------------------------------------------------------------------------------------------------

const EQUALITY_OPERATOR: &str = "=";
const INEQUALITY_OPERATOR: &str = "!=";
const LESS_THAN_OPERATOR: &str = "<";
const LESS_THAN_OR_EQUAL_OPERATOR: &str = "<=";
const GREATER_THAN_OPERATOR: &str = ">";
const GREATER_THAN_OR_EQUAL_OPERATOR: &str = ">=";

impl Display for ComparisonOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Equal => EQUALITY_OPERATOR,
                Self::NotEqual => INEQUALITY_OPERATOR,
                Self::LessThan => LESS_THAN_OPERATOR,
                Self::LessThanOrEqual => LESS_THAN_OR_EQUAL_OPERATOR,
                Self::GreaterThan => GREATER_THAN_OPERATOR,
                Self::GreaterThanOrEqual => GREATER_THAN_OR_EQUAL_OPERATOR,
            }
        )
    }
}

impl ComparisonOperator {
    /// Parse one of the six textual operator tokens, per the query grammar (§6).
    pub fn from_token(s: &str) -> Option<Self> {
        Some(match s {
            EQUALITY_OPERATOR => Self::Equal,
            INEQUALITY_OPERATOR => Self::NotEqual,
            LESS_THAN_OPERATOR => Self::LessThan,
            LESS_THAN_OR_EQUAL_OPERATOR => Self::LessThanOrEqual,
            GREATER_THAN_OPERATOR => Self::GreaterThan,
            GREATER_THAN_OR_EQUAL_OPERATOR => Self::GreaterThanOrEqual,
            _ => return None,
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
    fn display_variants() {
        assert_eq!(Term::variable("x").to_string(), "x");
        assert_eq!(Term::IntConst(-3).to_string(), "-3");
        assert_eq!(Term::string("hi").to_string(), "'hi'");
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(Term::variable("x"), Term::variable("x"));
        assert_ne!(Term::variable("x"), Term::variable("y"));
        assert_ne!(Term::IntConst(1), Term::string("1"));
    }

    #[test]
    fn operator_round_trip() {
        for op in [
            ComparisonOperator::Equal,
            ComparisonOperator::NotEqual,
            ComparisonOperator::LessThan,
            ComparisonOperator::LessThanOrEqual,
            ComparisonOperator::GreaterThan,
            ComparisonOperator::GreaterThanOrEqual,
        ] {
            assert_eq!(ComparisonOperator::from_token(&op.to_string()), Some(op));
        }
        assert_eq!(ComparisonOperator::from_token("<>"), None);
    }
}
