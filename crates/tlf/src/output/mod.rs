//! Output formatting for the tlf CLI.
//!
//! - [`text`] - One block per record, fields aligned, blocks separated by a rule
//! - [`csv`] - Header row, then comma-joined rows
//! - [`json`] - One JSON object per record, one per line
//! - [`listings`] - Field and preset listings

mod csv;
mod json;
mod listings;
mod text;

use std::io::{self, Write};

use timeline_filter::Record;

use crate::cli::OutputFormat;

pub use csv::CsvWriter;
pub use json::JsonLinesWriter;
pub use listings::{
    format_fields_json, format_fields_text, format_presets_json, format_presets_table,
};
pub use text::TextWriter;

/// Streams records to an output, one at a time.
pub trait RecordWriter {
    /// Writes one record, restricted to the writer's selected fields.
    fn write_record(&mut self, record: &Record) -> io::Result<()>;

    /// Flushes buffered output. Called once after the last record.
    fn finish(&mut self) -> io::Result<()>;
}

/// Builds the writer for `format` over `out`.
///
/// `fields` is the ordered selection of field names to print.
pub fn record_writer<'a, W: Write + 'a>(
    format: OutputFormat,
    out: W,
    fields: Vec<String>,
    use_colors: bool,
) -> Box<dyn RecordWriter + 'a> {
    match format {
        OutputFormat::Text => Box::new(TextWriter::new(out, fields, use_colors)),
        OutputFormat::Csv => Box::new(CsvWriter::new(out, fields)),
        OutputFormat::Json => Box::new(JsonLinesWriter::new(out, fields)),
    }
}
