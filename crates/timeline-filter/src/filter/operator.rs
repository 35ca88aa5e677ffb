//! Comparison operators for filter clauses.
//!
//! The [`Operator`] enum is a closed catalog. Each operator has exactly one
//! textual symbol and builds a [`Predicate`] over a literal operand.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Regex, RegexBuilder};

use super::error::{FilterError, FilterResult};

/// A single-argument test over a field value, closed over a clause literal.
///
/// Date operators fail per value when the value is not a timestamp.
pub type Predicate = Box<dyn Fn(&str) -> FilterResult<bool> + Send + Sync>;

/// Comparison operator for a filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Case-sensitive substring test (`contains`).
    Contains,
    /// Exact string equality (`==`).
    Eq,
    /// String inequality (`!=`).
    NotEq,
    /// Case-sensitive pattern search anywhere in the value (`regex`).
    Regex,
    /// Case-insensitive pattern search anywhere in the value (`iregex`).
    IRegex,
    /// Value timestamp strictly after the literal timestamp (`>`).
    DateGreaterThan,
    /// Value timestamp strictly before the literal timestamp (`<`).
    DateLessThan,
}

impl Operator {
    /// Every operator, longest symbol first.
    pub const ALL: [Operator; 7] = [
        Operator::Contains,
        Operator::IRegex,
        Operator::Regex,
        Operator::Eq,
        Operator::NotEq,
        Operator::DateGreaterThan,
        Operator::DateLessThan,
    ];

    /// The operator's textual symbol as written in a query.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Contains => "contains",
            Operator::Eq => "==",
            Operator::NotEq => "!=",
            Operator::Regex => "regex",
            Operator::IRegex => "iregex",
            Operator::DateGreaterThan => ">",
            Operator::DateLessThan => "<",
        }
    }

    /// Resolves a symbol to its operator.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::UnknownOperator` if no operator has this symbol.
    pub fn from_symbol(symbol: &str) -> FilterResult<Operator> {
        Self::ALL
            .into_iter()
            .find(|op| op.symbol() == symbol)
            .ok_or_else(|| FilterError::UnknownOperator {
                symbol: symbol.to_string(),
                expected: Self::symbols().join(", "),
            })
    }

    /// All symbols, in [`Operator::ALL`] order.
    pub fn symbols() -> Vec<&'static str> {
        Self::ALL.iter().map(|op| op.symbol()).collect()
    }

    /// Returns true for the chronological operators.
    pub fn is_date_op(self) -> bool {
        matches!(self, Operator::DateGreaterThan | Operator::DateLessThan)
    }

    /// Builds the predicate for this operator bound to `literal`.
    ///
    /// Patterns and date literals are validated here, once, rather than on
    /// every evaluation.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::Pattern` for an invalid regex literal and
    /// `FilterError::DateParse` for a date literal that is not ISO-8601.
    pub fn predicate(self, literal: &str) -> FilterResult<Predicate> {
        let literal = literal.to_string();
        match self {
            Operator::Contains => Ok(boxed(move |value| Ok(value.contains(literal.as_str())))),
            Operator::Eq => Ok(boxed(move |value| Ok(value == literal))),
            Operator::NotEq => Ok(boxed(move |value| Ok(value != literal))),
            Operator::Regex => {
                let regex = compile(&literal, false)?;
                Ok(boxed(move |value| Ok(regex.is_match(value))))
            }
            Operator::IRegex => {
                let regex = compile(&literal, true)?;
                Ok(boxed(move |value| Ok(regex.is_match(value))))
            }
            Operator::DateGreaterThan => {
                let bound = parse_timestamp(&literal)?;
                Ok(boxed(move |value| Ok(parse_timestamp(value)? > bound)))
            }
            Operator::DateLessThan => {
                let bound = parse_timestamp(&literal)?;
                Ok(boxed(move |value| Ok(parse_timestamp(value)? < bound)))
            }
        }
    }
}

fn boxed<F>(f: F) -> Predicate
where
    F: Fn(&str) -> FilterResult<bool> + Send + Sync + 'static,
{
    Box::new(f)
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::from_symbol(s)
    }
}

fn compile(pattern: &str, case_insensitive: bool) -> FilterResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| FilterError::pattern(pattern, &e))
}

/// Naive layouts accepted in addition to RFC 3339.
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Offset-carrying layouts not covered by RFC 3339 (space separator).
const OFFSET_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Parses an ISO-8601 timestamp into a UTC-normalized naive datetime.
///
/// Accepts full RFC 3339 (`2020-01-01T00:00:00Z`, `...+02:00`), naive date-times
/// with `T` or space separators and optional fractional seconds, and bare
/// dates (`2020-01-01`, taken as midnight). Values without an offset are
/// treated as UTC.
///
/// # Errors
///
/// Returns `FilterError::DateParse` if no accepted layout matches.
pub fn parse_timestamp(text: &str) -> FilterResult<NaiveDateTime> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.naive_utc());
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Ok(dt.naive_utc());
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| FilterError::date_parse(text))
}
