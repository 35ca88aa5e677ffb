//! Line-delimited JSON output.

use std::io::{self, Write};

use timeline_filter::Record;

use super::RecordWriter;

/// Writes each record as one compact JSON object per line, keys in
/// selection order.
pub struct JsonLinesWriter<W> {
    out: W,
    fields: Vec<String>,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(out: W, fields: Vec<String>) -> Self {
        Self { out, fields }
    }
}

impl<W: Write> RecordWriter for JsonLinesWriter<W> {
    fn write_record(&mut self, record: &Record) -> io::Result<()> {
        let selected: Record = self
            .fields
            .iter()
            .map(|field| (field.as_str(), record.get(field).unwrap_or_default()))
            .collect();
        serde_json::to_writer(&mut self.out, &selected)?;
        writeln!(self.out)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
