//! Datasets: a timeline file plus the format it is decoded with.
//!
//! A [`Records`] sequence is single-pass, so every read opens the file
//! afresh. Schema discovery costs one extra open and one decoded record
//! (the whole document for `json`).

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::filter::QueryEvaluator;
use crate::record::{Record, Schema};
use crate::source::{Format, Records, SourceError, SourceResult};
use crate::Error;

/// A timeline export on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    path: PathBuf,
    format: Format,
}

impl Dataset {
    /// Opens a dataset, inferring the format from the file name when
    /// `format` is `None`.
    ///
    /// Nothing is decoded yet.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::NotFound` if the path does not exist and
    /// `SourceError::UnknownFormat` if no format applies.
    pub fn open(path: impl Into<PathBuf>, format: Option<Format>) -> SourceResult<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(SourceError::NotFound { path });
        }

        let format = match format {
            Some(format) => format,
            None => {
                let inferred = Format::infer(&path)?;
                debug!(path = %path.display(), format = %inferred, "inferred input format");
                inferred
            }
        };

        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Starts a fresh pass over the dataset's records.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Io` if the file cannot be opened, or any error
    /// [`Records::new`] reports.
    pub fn records(&self) -> SourceResult<Records<BufReader<File>>> {
        let file = File::open(&self.path)?;
        Records::new(BufReader::new(file), self.format)
    }

    /// Discovers the schema from the first record of a fresh pass.
    ///
    /// Returns `Ok(None)` if the dataset holds no records.
    pub fn schema(&self) -> SourceResult<Option<Schema>> {
        let first = self.records()?.next().transpose()?;
        let schema = first.as_ref().map(Schema::from_record);
        if let Some(schema) = &schema {
            debug!(fields = schema.len(), "discovered schema");
        }
        Ok(schema)
    }

    /// Starts a fresh pass yielding only the records `evaluator` accepts.
    ///
    /// Decoding and evaluation errors are yielded in stream order.
    pub fn filter<'a>(
        &self,
        evaluator: &'a QueryEvaluator,
    ) -> SourceResult<impl Iterator<Item = crate::Result<Record>> + 'a> {
        let records = self.records()?.map(|record| record.map_err(Error::from));
        Ok(evaluator.filter_records(records))
    }
}
