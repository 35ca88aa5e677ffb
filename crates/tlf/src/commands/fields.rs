//! Fields command implementation.
//!
//! Prints the schema of a timeline: the field names of its first record.

use std::path::Path;

use timeline_filter::{Dataset, Format};

use super::{CommandContext, Result};
use crate::output::{format_fields_json, format_fields_text};

/// Executes the fields command.
///
/// # Errors
///
/// Returns an error if the input cannot be opened or its first record
/// cannot be decoded.
pub fn execute(ctx: &CommandContext, source: &Path, format: Option<Format>) -> Result<()> {
    let dataset = Dataset::open(source, format)?;
    let schema = dataset.schema()?.unwrap_or_default();

    if ctx.json_output {
        println!("{}", format_fields_json(&schema, dataset.format().name())?);
    } else {
        print!("{}", format_fields_text(&schema));
    }

    Ok(())
}
