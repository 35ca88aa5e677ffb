//! Record sources: decoding timeline exports into [`Record`] sequences.
//!
//! Three layouts are understood:
//!
//! - `json` - a top-level object whose values are record objects. The keys
//!   are discarded. The whole document is decoded before the first record is
//!   available.
//! - `json_line` - one JSON object per line.
//! - `l2tcsv` / `dynamic` - a comma-separated header line followed by
//!   comma-separated rows. There is no quoting, so a value cannot contain a
//!   comma.
//!
//! Every sequence is lazy, single-pass and forward-only. Use
//! [`Dataset`](crate::Dataset) to read the same file more than once.

use std::fmt;
use std::io::{self, BufRead, Lines};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::record::Record;

/// Result type for record source operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Errors that can occur while locating or decoding a record source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The input path does not exist.
    #[error("input file '{}' does not exist", path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// I/O error while reading the input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The content does not match the declared or inferred format.
    #[error("invalid {format} input: {message}")]
    Format {
        /// The format the content was decoded as.
        format: Format,
        /// What went wrong, including the location when known.
        message: String,
    },

    /// The format name (explicit or from the file extension) is not known.
    #[error("unknown input format '{name}' (expected one of: {})", Format::names().join(", "))]
    UnknownFormat {
        /// The unrecognized name, or the file name when inference failed.
        name: String,
    },
}

impl SourceError {
    fn format(format: Format, message: impl Into<String>) -> Self {
        Self::Format {
            format,
            message: message.into(),
        }
    }

    /// Maps a failed line read. Undecodable bytes are a format error at
    /// `line`; anything else stays an I/O error.
    fn read(format: Format, line: usize, error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::InvalidData {
            Self::format(format, format!("line {line}: {error}"))
        } else {
            Self::Io(error)
        }
    }
}

/// Supported input layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Object of record objects.
    Json,
    /// One record object per line.
    JsonLine,
    /// log2timeline CSV export.
    L2tCsv,
    /// psort "dynamic" CSV export.
    Dynamic,
}

impl Format {
    /// Every format, in the order names are listed to users.
    pub const ALL: [Format; 4] = [
        Format::Json,
        Format::JsonLine,
        Format::L2tCsv,
        Format::Dynamic,
    ];

    /// The format's name, also used as its file extension.
    pub fn name(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::JsonLine => "json_line",
            Format::L2tCsv => "l2tcsv",
            Format::Dynamic => "dynamic",
        }
    }

    /// Every format name.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|f| f.name()).collect()
    }

    /// Returns true for the comma-separated layouts.
    pub fn is_delimited(self) -> bool {
        matches!(self, Format::L2tCsv | Format::Dynamic)
    }

    /// Infers the format from the path's trailing `.{name}` suffix.
    ///
    /// When several names match, the longest suffix wins.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::UnknownFormat` if no format name matches.
    pub fn infer(path: &Path) -> SourceResult<Self> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self::ALL
            .iter()
            .copied()
            .filter(|format| file_name.ends_with(&format!(".{}", format.name())))
            .max_by_key(|format| format.name().len())
            .ok_or(SourceError::UnknownFormat { name: file_name })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SourceError::UnknownFormat {
                name: s.to_string(),
            })
    }
}

/// Renders a JSON value as field text.
///
/// Strings are taken as-is, `null` becomes empty, anything else is compact
/// JSON.
fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn object_to_record(object: Map<String, Value>) -> Record {
    object
        .into_iter()
        .map(|(name, value)| (name, value_to_text(value)))
        .collect()
}

/// A lazy sequence of records decoded from a reader.
pub struct Records<R> {
    inner: Inner<R>,
}

enum Inner<R> {
    Json(serde_json::map::IntoIter),
    JsonLines {
        lines: Lines<R>,
        line: usize,
    },
    Delimited {
        format: Format,
        header: Vec<String>,
        lines: Lines<R>,
        line: usize,
    },
    Empty,
}

impl<R: BufRead> Records<R> {
    /// Starts decoding `reader` as `format`.
    ///
    /// For `json` the whole document is decoded here. For the delimited
    /// layouts the header line is consumed here.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Format` if a `json` document is malformed or is
    /// not an object or a header line is not valid UTF-8, and
    /// `SourceError::Io` if the header cannot be read.
    pub fn new(mut reader: R, format: Format) -> SourceResult<Self> {
        let inner = match format {
            Format::Json => {
                let document: Value = serde_json::from_reader(&mut reader)
                    .map_err(|e| SourceError::format(format, e.to_string()))?;
                match document {
                    Value::Object(map) => Inner::Json(map.into_iter()),
                    _ => {
                        return Err(SourceError::format(
                            format,
                            "expected a top-level object of records",
                        ))
                    }
                }
            }
            Format::JsonLine => Inner::JsonLines {
                lines: reader.lines(),
                line: 0,
            },
            Format::L2tCsv | Format::Dynamic => {
                let mut lines = reader.lines();
                let mut line = 0;
                let mut header = None;
                for text in lines.by_ref() {
                    line += 1;
                    let text = text.map_err(|e| SourceError::read(format, line, e))?;
                    let text = text.trim_end_matches('\r');
                    if !text.trim().is_empty() {
                        header = Some(text.split(',').map(str::to_string).collect());
                        break;
                    }
                }
                match header {
                    Some(header) => Inner::Delimited {
                        format,
                        header,
                        lines,
                        line,
                    },
                    None => Inner::Empty,
                }
            }
        };

        Ok(Self { inner })
    }
}

impl<R> fmt::Debug for Records<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.inner {
            Inner::Json(_) => "json",
            Inner::JsonLines { .. } => "json_line",
            Inner::Delimited { format, .. } => format.name(),
            Inner::Empty => "empty",
        };
        f.debug_struct("Records").field("kind", &kind).finish()
    }
}

/// Returns the next non-blank line, advancing the 1-based line counter.
fn next_line<R: BufRead>(
    lines: &mut Lines<R>,
    line: &mut usize,
    format: Format,
) -> Option<SourceResult<String>> {
    for text in lines.by_ref() {
        *line += 1;
        match text {
            Ok(text) if text.trim().is_empty() => continue,
            Ok(mut text) => {
                if text.ends_with('\r') {
                    text.pop();
                }
                return Some(Ok(text));
            }
            Err(e) => return Some(Err(SourceError::read(format, *line, e))),
        }
    }
    None
}

impl<R: BufRead> Iterator for Records<R> {
    type Item = SourceResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Empty => None,

            Inner::Json(entries) => {
                let (key, value) = entries.next()?;
                Some(match value {
                    Value::Object(object) => Ok(object_to_record(object)),
                    _ => Err(SourceError::format(
                        Format::Json,
                        format!("entry '{key}' is not an object"),
                    )),
                })
            }

            Inner::JsonLines { lines, line } => {
                let text = match next_line(lines, line, Format::JsonLine)? {
                    Ok(text) => text,
                    Err(e) => return Some(Err(e)),
                };
                Some(match serde_json::from_str::<Value>(&text) {
                    Ok(Value::Object(object)) => Ok(object_to_record(object)),
                    Ok(_) => Err(SourceError::format(
                        Format::JsonLine,
                        format!("line {line}: expected a JSON object"),
                    )),
                    Err(e) => Err(SourceError::format(
                        Format::JsonLine,
                        format!("line {line}: {e}"),
                    )),
                })
            }

            Inner::Delimited {
                format,
                header,
                lines,
                line,
            } => {
                let text = match next_line(lines, line, *format)? {
                    Ok(text) => text,
                    Err(e) => return Some(Err(e)),
                };
                let values: Vec<&str> = text.split(',').collect();
                if values.len() != header.len() {
                    warn!(
                        format = format.name(),
                        line = *line,
                        expected = header.len(),
                        found = values.len(),
                        "row width does not match header; extra values are dropped"
                    );
                }
                Some(Ok(header
                    .iter()
                    .zip(values)
                    .map(|(name, value)| (name.as_str(), value))
                    .collect()))
            }
        }
    }
}
