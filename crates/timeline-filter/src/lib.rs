//! Filtering for digital-forensics timeline exports.
//!
//! A [`Dataset`] decodes a timeline file (`json`, `json_line`, `l2tcsv` or
//! `dynamic`) into a lazy sequence of [`Record`]s. The first record defines
//! the [`Schema`], which the [`filter`] query language is compiled against.
//!
//! ```no_run
//! use timeline_filter::filter::QueryEvaluator;
//! use timeline_filter::Dataset;
//!
//! # fn main() -> timeline_filter::Result<()> {
//! let dataset = Dataset::open("case01.l2tcsv", None)?;
//! if let Some(schema) = dataset.schema()? {
//!     let evaluator = QueryEvaluator::new(r#"desc contains "Prefetch""#, &schema)?;
//!     for record in dataset.filter(&evaluator)? {
//!         println!("{:?}", record?.get("desc"));
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

mod dataset;
pub mod filter;
mod record;
mod source;

pub use dataset::Dataset;
pub use filter::{FilterError, FilterResult};
pub use record::{Record, Schema, ANY_FIELD};
pub use source::{Format, Records, SourceError, SourceResult};

/// Errors from a filtering pass: decoding or evaluation.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// Result type for filtering passes.
pub type Result<T> = std::result::Result<T, Error>;
