//! Presets command implementation.

use timeline_filter::filter::PRESETS;

use super::{CommandContext, Result};
use crate::output::{format_presets_json, format_presets_table};

/// Lists the built-in presets. `--verbose` also prints each query.
pub fn execute(ctx: &CommandContext) -> Result<()> {
    if ctx.json_output {
        println!("{}", format_presets_json(PRESETS)?);
    } else {
        print!("{}", format_presets_table(PRESETS, ctx.use_colors, ctx.verbose));
    }
    Ok(())
}
