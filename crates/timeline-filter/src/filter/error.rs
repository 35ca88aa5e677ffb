//! Error types for query parsing and evaluation.

use thiserror::Error;

/// A specialized Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while parsing or evaluating a filter query.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// The query contains no tokens.
    #[error("filter expression is empty")]
    EmptyExpression,

    /// An unexpected token was encountered during parsing.
    #[error("unexpected token: {token}")]
    UnexpectedToken {
        /// The unexpected token that was encountered.
        token: String,
    },

    /// The query ended where an operand was expected.
    #[error("unexpected end of expression")]
    UnexpectedEndOfInput,

    /// An opening parenthesis was never closed.
    #[error("unclosed parenthesis")]
    UnclosedParenthesis,

    /// Text that looks like part of a clause could not be read as one.
    #[error("malformed clause '{text}': {reason}")]
    MalformedClause {
        /// The offending text.
        text: String,
        /// What was missing or wrong.
        reason: String,
    },

    /// A clause names an operator symbol outside the catalog.
    #[error("unknown operator '{symbol}' (expected one of: {expected})")]
    UnknownOperator {
        /// The unrecognized symbol.
        symbol: String,
        /// The known symbols, comma-separated.
        expected: String,
    },

    /// A clause or field selection names a field outside the schema.
    #[error("unknown field '{field}'.{}", did_you_mean(.suggestion.as_deref()))]
    UnknownField {
        /// The unrecognized field name.
        field: String,
        /// The closest known field name, if any is close enough.
        suggestion: Option<String>,
    },

    /// A `regex`/`iregex` literal is not a valid pattern.
    #[error("invalid regex pattern '{pattern}': {message}")]
    Pattern {
        /// The pattern text.
        pattern: String,
        /// The regex engine's complaint.
        message: String,
    },

    /// A date comparison operand is not an ISO-8601 timestamp.
    #[error("invalid ISO-8601 timestamp: '{value}'")]
    DateParse {
        /// The text that failed to parse.
        value: String,
    },

    /// A named preset does not exist.
    #[error("unknown preset '{name}'.{}", did_you_mean(.suggestion.as_deref()))]
    UnknownPreset {
        /// The requested preset name.
        name: String,
        /// The closest preset name, if any is close enough.
        suggestion: Option<String>,
    },
}

fn did_you_mean(suggestion: Option<&str>) -> String {
    match suggestion {
        Some(s) => format!(" Did you mean '{}'?", s),
        None => String::new(),
    }
}

impl FilterError {
    /// Creates an unexpected token error.
    pub fn unexpected_token(token: impl Into<String>) -> Self {
        FilterError::UnexpectedToken {
            token: token.into(),
        }
    }

    /// Creates a malformed clause error.
    pub fn malformed_clause(text: impl Into<String>, reason: impl Into<String>) -> Self {
        FilterError::MalformedClause {
            text: text.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unknown field error.
    pub fn unknown_field(field: impl Into<String>, suggestion: Option<&str>) -> Self {
        FilterError::UnknownField {
            field: field.into(),
            suggestion: suggestion.map(str::to_string),
        }
    }

    /// Creates a pattern error from a failed regex compilation.
    pub fn pattern(pattern: impl Into<String>, err: &regex::Error) -> Self {
        FilterError::Pattern {
            pattern: pattern.into(),
            message: err.to_string(),
        }
    }

    /// Creates a date parse error.
    pub fn date_parse(value: impl Into<String>) -> Self {
        FilterError::DateParse {
            value: value.into(),
        }
    }
}
