/*!
A small hand-rolled recursive-descent parser for the query grammar of §4.11/§6: a head atom
(optionally carrying a `SUM(..)` aggregate), `:-`, and a comma-separated body of relational and
comparison atoms.

 */

use crate::atom::{BodyAtom, ComparisonAtom, Query, RelationalAtom, SumAggregate};
use crate::error::{malformed_input, Error};
use crate::term::{ComparisonOperator, Term};
use crate::Name;
use std::str::FromStr;

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

/// Parse one query from `text`, per the grammar of §4.11.
pub fn parse_query(text: &str) -> Result<Query, Error> {
    let mut parser = Parser::new(text);
    let head = parser.parse_relational_atom(true)?;
    parser.expect_token(":-")?;
    let body = parser.parse_body()?;
    parser.expect_end()?;
    Query::new(head, body)
}

// ------------------------------------------------------------------------------------------------
// Private Types
// ------------------------------------------------------------------------------------------------

struct Parser<'a> {
    remaining: &'a str,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self { remaining: text }
    }

    fn skip_whitespace(&mut self) {
        self.remaining = self.remaining.trim_start();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.remaining.chars().next()
    }

    fn expect_token(&mut self, token: &str) -> Result<(), Error> {
        self.skip_whitespace();
        if let Some(rest) = self.remaining.strip_prefix(token) {
            self.remaining = rest;
            Ok(())
        } else {
            Err(malformed_input(format!(
                "expected '{token}' at '{}'",
                self.preview()
            )))
        }
    }

    fn expect_end(&mut self) -> Result<(), Error> {
        self.skip_whitespace();
        if self.remaining.is_empty() {
            Ok(())
        } else {
            Err(malformed_input(format!(
                "unexpected trailing input '{}'",
                self.preview()
            )))
        }
    }

    fn preview(&self) -> String {
        self.remaining.chars().take(24).collect()
    }

    /// An identifier lexeme: the longest prefix matching `Name`'s lexical shape.
    fn parse_identifier(&mut self) -> Result<String, Error> {
        self.skip_whitespace();
        let end = self
            .remaining
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(self.remaining.len());
        if end == 0 {
            return Err(malformed_input(format!(
                "expected an identifier at '{}'",
                self.preview()
            )));
        }
        let (identifier, rest) = self.remaining.split_at(end);
        self.remaining = rest;
        Ok(identifier.to_string())
    }

    fn parse_name(&mut self) -> Result<Name, Error> {
        let identifier = self.parse_identifier()?;
        Name::from_str(&identifier)
    }

    /// `name '(' term (',' term)* (',' 'SUM' '(' term ('*' term)* ')')? ')'`, or, for body atoms,
    /// a plain relational atom with no `SUM` clause.
    fn parse_relational_atom(&mut self, allow_sum: bool) -> Result<RelationalAtom, Error> {
        let name = self.parse_name()?;
        self.expect_token("(")?;

        let mut terms = Vec::new();
        let mut sum_aggregate = None;

        loop {
            if allow_sum && self.looks_like_sum() {
                sum_aggregate = Some(self.parse_sum_aggregate()?);
                break;
            }
            terms.push(self.parse_term()?);
            self.skip_whitespace();
            if self.peek() == Some(',') {
                self.expect_token(",")?;
            } else {
                break;
            }
        }

        self.expect_token(")")?;

        Ok(match sum_aggregate {
            Some(agg) => RelationalAtom::with_sum_aggregate(name, terms, agg),
            None => RelationalAtom::new(name, terms),
        })
    }

    fn looks_like_sum(&mut self) -> bool {
        self.skip_whitespace();
        self.remaining.starts_with("SUM(")
    }

    fn parse_sum_aggregate(&mut self) -> Result<SumAggregate, Error> {
        self.expect_token("SUM")?;
        self.expect_token("(")?;
        let mut product_terms = vec![self.parse_term()?];
        self.skip_whitespace();
        while self.peek() == Some('*') {
            self.expect_token("*")?;
            product_terms.push(self.parse_term()?);
            self.skip_whitespace();
        }
        self.expect_token(")")?;
        Ok(SumAggregate::new(product_terms))
    }

    /// `bodyAtom (',' bodyAtom)*`.
    fn parse_body(&mut self) -> Result<Vec<BodyAtom>, Error> {
        let mut body = vec![self.parse_body_atom()?];
        self.skip_whitespace();
        while self.peek() == Some(',') {
            self.expect_token(",")?;
            body.push(self.parse_body_atom()?);
            self.skip_whitespace();
        }
        Ok(body)
    }

    /// A body atom is a relational atom if the first term is followed by `(`; otherwise it is a
    /// comparison atom `term compOp term`.
    fn parse_body_atom(&mut self) -> Result<BodyAtom, Error> {
        let checkpoint = self.remaining;
        if let Ok(name) = self.parse_name() {
            self.skip_whitespace();
            if self.remaining.starts_with('(') {
                self.remaining = checkpoint;
                return Ok(self.parse_relational_atom(false)?.into());
            }
        }
        self.remaining = checkpoint;

        let left = self.parse_term()?;
        let op = self.parse_comparison_operator()?;
        let right = self.parse_term()?;
        Ok(ComparisonAtom::new(left, op, right).into())
    }

    fn parse_comparison_operator(&mut self) -> Result<ComparisonOperator, Error> {
        self.skip_whitespace();
        for token in ["!=", "<=", ">=", "=", "<", ">"] {
            if let Some(rest) = self.remaining.strip_prefix(token) {
                self.remaining = rest;
                return Ok(ComparisonOperator::from_token(token).unwrap());
            }
        }
        Err(malformed_input(format!(
            "expected a comparison operator at '{}'",
            self.preview()
        )))
    }

    /// `variable | intConst | strConst`.
    fn parse_term(&mut self) -> Result<Term, Error> {
        self.skip_whitespace();
        match self.peek() {
            Some('\'') => self.parse_string_constant(),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_int_constant(),
            Some(_) => self.parse_name().map(Term::Variable),
            None => Err(malformed_input("expected a term at end of input")),
        }
    }

    fn parse_string_constant(&mut self) -> Result<Term, Error> {
        self.expect_token("'")?;
        let end = self.remaining.find('\'').ok_or_else(|| {
            malformed_input(format!("unterminated string constant at '{}'", self.preview()))
        })?;
        let (value, rest) = self.remaining.split_at(end);
        self.remaining = &rest[1..];
        Ok(Term::string(value))
    }

    fn parse_int_constant(&mut self) -> Result<Term, Error> {
        self.skip_whitespace();
        let mut end = 0;
        let bytes = self.remaining.as_bytes();
        if bytes.first() == Some(&b'-') {
            end += 1;
        }
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        if end == 0 || (end == 1 && bytes[0] == b'-') {
            return Err(malformed_input(format!(
                "expected an integer constant at '{}'",
                self.preview()
            )));
        }
        let (digits, rest) = self.remaining.split_at(end);
        self.remaining = rest;
        digits
            .parse::<i64>()
            .map(Term::IntConst)
            .map_err(|_| malformed_input(format!("'{digits}' is not a valid integer constant")))
    }
}

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------
