//! Atomic filter clauses: `<field> [not] <operator> "<literal>"`.
//!
//! Locating a clause and validating it are separate steps. [`scan_clause`]
//! recognizes the clause *shape* with a generic word/quote grammar; only then
//! is the field checked against the [`Schema`] and the operator word against
//! the [`Operator`] catalog. Field names never become part of a pattern, so
//! names containing regex metacharacters or sharing prefixes (`date` and
//! `datetime`) need no special handling.

use std::fmt;

use crate::record::{Record, Schema, ANY_FIELD};

use super::error::{FilterError, FilterResult};
use super::operator::{Operator, Predicate};

/// The left-hand side of a clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelector {
    /// `ANY`: the clause holds if any field satisfies the predicate.
    Any,
    /// A single named field from the schema.
    Named(String),
}

impl FieldSelector {
    fn selects(&self, name: &str) -> bool {
        match self {
            FieldSelector::Any => true,
            FieldSelector::Named(field) => field == name,
        }
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSelector::Any => f.write_str(ANY_FIELD),
            FieldSelector::Named(name) => f.write_str(name),
        }
    }
}

/// One compiled `field [not] operator "literal"` test.
///
/// The predicate is built once, when the clause is compiled, and re-run for
/// every candidate record. Negation is recorded on the clause but applied by
/// [`Clause::evaluate`], not folded into the predicate.
pub struct Clause {
    field: FieldSelector,
    operator: Operator,
    negated: bool,
    literal: String,
    predicate: Predicate,
}

impl fmt::Debug for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clause")
            .field("field", &self.field)
            .field("operator", &self.operator)
            .field("negated", &self.negated)
            .field("literal", &self.literal)
            .finish_non_exhaustive()
    }
}

impl Clause {
    /// Builds a clause, compiling the operator's predicate over `literal`.
    ///
    /// # Errors
    ///
    /// Propagates `FilterError::Pattern` and `FilterError::DateParse` from
    /// [`Operator::predicate`].
    pub fn new(
        field: FieldSelector,
        operator: Operator,
        negated: bool,
        literal: impl Into<String>,
    ) -> FilterResult<Self> {
        let literal = literal.into();
        let predicate = operator.predicate(&literal)?;
        Ok(Self {
            field,
            operator,
            negated,
            literal,
            predicate,
        })
    }

    /// Parses a standalone clause such as `desc not contains "Prefetch"`.
    ///
    /// The whole of `text` (ignoring surrounding whitespace) must be one clause.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::MalformedClause` if `text` is not exactly one
    /// clause, `FilterError::UnknownField` / `FilterError::UnknownOperator`
    /// if its parts are not recognized, and any predicate construction error.
    pub fn parse(text: &str, schema: &Schema) -> FilterResult<Self> {
        let trimmed = text.trim();
        let raw = scan_clause(trimmed).unwrap_or_else(|| {
            Err(FilterError::malformed_clause(
                trimmed,
                "expected <field> [not] <operator> \"<literal>\"",
            ))
        })?;

        if raw.len != trimmed.len() {
            return Err(FilterError::malformed_clause(
                trimmed,
                format!("unexpected text after clause: '{}'", &trimmed[raw.len..]),
            ));
        }

        raw.resolve(Some(schema))
    }

    pub fn field(&self) -> &FieldSelector {
        &self.field
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// Returns true if a selected field of `record` satisfies the predicate.
    ///
    /// Fields are visited in record order and the first satisfying field
    /// ends the search. Negation is *not* applied.
    ///
    /// # Errors
    ///
    /// Date operators fail with `FilterError::DateParse` when a visited
    /// field value is not a timestamp.
    pub fn matches(&self, record: &Record) -> FilterResult<bool> {
        for (name, value) in record.iter() {
            if self.field.selects(name) && (self.predicate)(value)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// [`Clause::matches`] with the clause's negation applied.
    pub fn evaluate(&self, record: &Record) -> FilterResult<bool> {
        Ok(self.matches(record)? != self.negated)
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quote = if self.literal.contains('"') { '\'' } else { '"' };
        write!(f, "{}", self.field)?;
        if self.negated {
            f.write_str(" not")?;
        }
        write!(
            f,
            " {} {quote}{}{quote}",
            self.operator.symbol(),
            self.literal
        )
    }
}

/// Clause text located by [`scan_clause`], not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawClause<'a> {
    pub field: &'a str,
    pub negated: bool,
    pub operator: &'a str,
    pub literal: &'a str,
    /// Byte length of the clause text, closing quote included.
    pub len: usize,
}

impl RawClause<'_> {
    /// Validates the field and operator and compiles the clause.
    ///
    /// Without a schema any field name is accepted.
    pub fn resolve(&self, schema: Option<&Schema>) -> FilterResult<Clause> {
        let field = match schema {
            _ if self.field == ANY_FIELD => FieldSelector::Any,
            Some(schema) if !schema.contains(self.field) => {
                return Err(schema.unknown_field(self.field))
            }
            _ => FieldSelector::Named(self.field.to_string()),
        };
        let operator = Operator::from_symbol(self.operator)?;
        Clause::new(field, operator, self.negated, self.literal)
    }
}

/// Returns true for characters that may appear in a field or operator word.
fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '"' | '\'')
}

/// Splits the leading word off `s`.
pub(crate) fn read_word(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !is_word_char(c)).unwrap_or(s.len());
    s.split_at(end)
}

/// Reads `<operator> <quote>` from the start of `s`, returning the operator
/// word and the rest starting at the opening quote.
fn operator_then_quote(s: &str) -> Option<(&str, &str)> {
    let (operator, rest) = read_word(s);
    if operator.is_empty() {
        return None;
    }
    let rest = rest.trim_start();
    rest.starts_with(['"', '\'']).then_some((operator, rest))
}

/// Recognizes a clause at the start of `input`.
///
/// Returns `None` if `input` does not begin with the clause shape
/// `<word> <ws> [not <ws>] <word> [<ws>] <quote>`. Returns `Some(Err(_))` if
/// the shape matches but the literal is never closed. The literal runs to the
/// next occurrence of its opening quote character; there is no escaping.
pub(crate) fn scan_clause(input: &str) -> Option<FilterResult<RawClause<'_>>> {
    let (field, rest) = read_word(input);
    if field.is_empty() {
        return None;
    }
    let after_field = rest.trim_start();
    if after_field.len() == rest.len() {
        return None;
    }

    // `field not op "..."` is tried before `field op "..."`.
    let (word, after_word) = read_word(after_field);
    let negated_form = if word.eq_ignore_ascii_case("not")
        && after_word.starts_with(char::is_whitespace)
    {
        operator_then_quote(after_word.trim_start())
    } else {
        None
    };
    let (negated, (operator, quoted)) = match negated_form {
        Some(found) => (true, found),
        None => (false, operator_then_quote(after_field)?),
    };

    let quote = quoted.chars().next()?;
    let body = &quoted[quote.len_utf8()..];
    let Some(close) = body.find(quote) else {
        return Some(Err(FilterError::malformed_clause(
            input.trim_end(),
            format!("unterminated literal starting with {quote}"),
        )));
    };

    let literal = &body[..close];
    let consumed_after = &body[close + quote.len_utf8()..];
    Some(Ok(RawClause {
        field,
        negated,
        operator,
        literal,
        len: input.len() - consumed_after.len(),
    }))
}
