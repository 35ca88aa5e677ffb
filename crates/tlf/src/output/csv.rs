//! Comma-separated output.
//!
//! Values are joined as-is: a value containing a comma shifts the columns of
//! its row, matching the delimited input layouts which do no quoting either.

use std::io::{self, Write};

use timeline_filter::Record;

use super::RecordWriter;

/// Writes a header row of field names, then one row per record.
pub struct CsvWriter<W> {
    out: W,
    fields: Vec<String>,
    header_written: bool,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(out: W, fields: Vec<String>) -> Self {
        Self {
            out,
            fields,
            header_written: false,
        }
    }

    fn write_header(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", self.fields.join(","))?;
        self.header_written = true;
        Ok(())
    }
}

impl<W: Write> RecordWriter for CsvWriter<W> {
    fn write_record(&mut self, record: &Record) -> io::Result<()> {
        if !self.header_written {
            self.write_header()?;
        }
        let row: Vec<&str> = self
            .fields
            .iter()
            .map(|field| record.get(field).unwrap_or_default())
            .collect();
        writeln!(self.out, "{}", row.join(","))
    }

    fn finish(&mut self) -> io::Result<()> {
        // An empty result still gets its header.
        if !self.header_written {
            self.write_header()?;
        }
        self.out.flush()
    }
}
