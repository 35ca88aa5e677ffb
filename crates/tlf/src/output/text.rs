//! Human-readable block output.

use std::io::{self, Write};

use owo_colors::OwoColorize;
use timeline_filter::Record;

use super::RecordWriter;

/// Width of the rule printed after each record.
const RULE_WIDTH: usize = 80;

/// Writes each record as a block of `name : value` lines followed by a rule.
pub struct TextWriter<W> {
    out: W,
    fields: Vec<String>,
    name_width: usize,
    use_colors: bool,
}

impl<W: Write> TextWriter<W> {
    pub fn new(out: W, fields: Vec<String>, use_colors: bool) -> Self {
        let name_width = fields.iter().map(|f| f.chars().count()).max().unwrap_or(0);
        Self {
            out,
            fields,
            name_width,
            use_colors,
        }
    }
}

impl<W: Write> RecordWriter for TextWriter<W> {
    fn write_record(&mut self, record: &Record) -> io::Result<()> {
        for field in &self.fields {
            let value = record.get(field).unwrap_or_default();
            let name = format!("{:<width$}", field, width = self.name_width);
            if self.use_colors {
                writeln!(self.out, "{} : {}", name.cyan(), value)?;
            } else {
                writeln!(self.out, "{} : {}", name, value)?;
            }
        }

        let rule = "-".repeat(RULE_WIDTH);
        if self.use_colors {
            writeln!(self.out, "{}", rule.dimmed())
        } else {
            writeln!(self.out, "{}", rule)
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
