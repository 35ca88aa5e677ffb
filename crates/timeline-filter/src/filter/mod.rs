//! Filter query parser and evaluator for timeline records.
//!
//! A query is free text mixing boolean connectives with embedded clauses.
//!
//! # Clauses
//!
//! `<field> [not] <operator> "<literal>"`
//!
//! - `<field>` is a schema field name, or `ANY` to test every field.
//! - `not` directly after the field negates the clause.
//! - The literal is delimited by `"` or `'` and runs to the next occurrence
//!   of the same quote; there is no escaping.
//!
//! ## Operators
//! - `contains` - Substring, case-sensitive
//! - `==` / `!=` - Exact (in)equality
//! - `regex` - Pattern search anywhere in the value
//! - `iregex` - Case-insensitive pattern search
//! - `>` / `<` - ISO-8601 timestamp after / before the literal
//!
//! ## Boolean Connectives
//! - `and`, `or`, `not` (case-insensitive)
//! - `True`, `False`
//! - `()` - Grouping
//!
//! Precedence, highest first: `not`, `and`, `or`.
//!
//! # Example
//!
//! ```
//! use timeline_filter::filter::{FilterSet, QueryEvaluator};
//! use timeline_filter::{Record, Schema};
//!
//! let schema = Schema::new(vec!["a".to_string(), "b".to_string()]);
//! let query = FilterSet::new()
//!     .with_fragment(r#"a == "1""#)
//!     .with_filter(r#"b == "2""#)
//!     .compose()
//!     .unwrap();
//! let evaluator = QueryEvaluator::new(&query, &schema).unwrap();
//!
//! let record: Record = [("a", "1"), ("b", "2")].into_iter().collect();
//! assert!(evaluator.matches(&record).unwrap());
//! ```

mod ast;
mod clause;
mod compose;
mod error;
mod evaluator;
mod lexer;
mod operator;
mod parser;
mod presets;

pub use ast::Expr;
pub use clause::{Clause, FieldSelector};
pub use compose::FilterSet;
pub use error::{FilterError, FilterResult};
pub use evaluator::{FilteredRecords, QueryEvaluator};
pub use lexer::{Lexer, LexerOutput, PositionedToken, QueryToken};
pub use operator::{parse_timestamp, Operator, Predicate};
pub use parser::{ParsedQuery, QueryParser};
pub use presets::{find_preset, Preset, PRESETS};
