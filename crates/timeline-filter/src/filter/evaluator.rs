//! Query evaluation against records.
//!
//! A [`QueryEvaluator`] is compiled once per query and schema, then applied
//! to any number of records. Per record it computes every clause's result
//! (negation applied) and folds the boolean skeleton over those values, so
//! the cost per record is bounded by the number of clauses.
//!
//! # Example
//!
//! ```
//! use timeline_filter::filter::QueryEvaluator;
//! use timeline_filter::{Record, Schema};
//!
//! let schema = Schema::new(vec!["msg".to_string()]);
//! let evaluator = QueryEvaluator::new(r#"msg contains "Prefetch""#, &schema).unwrap();
//!
//! let hit: Record = [("msg", "Prefetch {X}")].into_iter().collect();
//! let miss: Record = [("msg", "hello")].into_iter().collect();
//! assert!(evaluator.matches(&hit).unwrap());
//! assert!(!evaluator.matches(&miss).unwrap());
//! ```

use tracing::debug;

use crate::record::{Record, Schema};

use super::ast::Expr;
use super::clause::Clause;
use super::error::{FilterError, FilterResult};
use super::parser::QueryParser;

/// Evaluates a compiled query against records.
#[derive(Debug)]
pub struct QueryEvaluator {
    query: String,
    /// `None` for an empty query, which passes every record.
    expr: Option<Expr>,
    clauses: Vec<Clause>,
}

impl QueryEvaluator {
    /// Compiles `query` against `schema`.
    ///
    /// An empty or whitespace-only query compiles to an evaluator that
    /// passes every record.
    ///
    /// # Errors
    ///
    /// Returns any parse, resolution or predicate construction error from
    /// [`QueryParser::parse`].
    pub fn new(query: &str, schema: &Schema) -> FilterResult<Self> {
        if query.trim().is_empty() {
            return Ok(Self::pass_all());
        }

        let parsed = QueryParser::parse(query, schema)?;
        debug!(
            clauses = parsed.clauses.len(),
            query, "compiled filter query"
        );

        Ok(Self {
            query: query.to_string(),
            expr: Some(parsed.expr),
            clauses: parsed.clauses,
        })
    }

    /// Checks `query` for every fault that does not depend on a schema.
    ///
    /// An empty query is valid.
    ///
    /// # Errors
    ///
    /// Returns any error [`QueryParser::parse_unchecked`] reports.
    pub fn check_syntax(query: &str) -> FilterResult<()> {
        if query.trim().is_empty() {
            return Ok(());
        }
        QueryParser::parse_unchecked(query).map(|_| ())
    }

    /// An evaluator that passes every record.
    pub fn pass_all() -> Self {
        Self {
            query: String::new(),
            expr: None,
            clauses: Vec::new(),
        }
    }

    /// Returns true if this evaluator filters nothing out.
    pub fn is_pass_all(&self) -> bool {
        self.expr.is_none()
    }

    /// The query text this evaluator was compiled from.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The compiled clauses, in order of occurrence.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Computes every clause's result for `record`, negation applied.
    ///
    /// All clauses are evaluated, even those a short-circuit would skip.
    pub fn clause_values(&self, record: &Record) -> FilterResult<Vec<bool>> {
        self.clauses
            .iter()
            .map(|clause| clause.evaluate(record))
            .collect()
    }

    /// Returns true if the record passes the query.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::DateParse` when a date clause meets a field
    /// value that is not a timestamp.
    pub fn matches(&self, record: &Record) -> FilterResult<bool> {
        let Some(expr) = &self.expr else {
            return Ok(true);
        };
        let values = self.clause_values(record)?;
        Ok(expr.evaluate(&values))
    }

    /// Lazily filters a stream of fallible records.
    ///
    /// Upstream errors are passed through; an evaluation error is converted
    /// into the stream's error type. Neither ends the stream by itself.
    pub fn filter_records<I, E>(&self, records: I) -> FilteredRecords<'_, I::IntoIter>
    where
        I: IntoIterator<Item = Result<Record, E>>,
        E: From<FilterError>,
    {
        FilteredRecords {
            evaluator: self,
            records: records.into_iter(),
        }
    }
}

/// Iterator returned by [`QueryEvaluator::filter_records`].
#[derive(Debug)]
pub struct FilteredRecords<'a, I> {
    evaluator: &'a QueryEvaluator,
    records: I,
}

impl<I, E> Iterator for FilteredRecords<'_, I>
where
    I: Iterator<Item = Result<Record, E>>,
    E: From<FilterError>,
{
    type Item = Result<Record, E>;

    fn next(&mut self) -> Option<Self::Item> {
        for result in self.records.by_ref() {
            let record = match result {
                Ok(record) => record,
                Err(e) => return Some(Err(e)),
            };
            match self.evaluator.matches(&record) {
                Ok(true) => return Some(Ok(record)),
                Ok(false) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
        None
    }
}
