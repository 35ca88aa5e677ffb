//! Command dispatch: routes parsed CLI commands to their handlers.
//!
//! Config-derived defaults are resolved here, so handlers receive fully
//! decided options. Precedence is flag, then `--json`, then config file.

use crate::cli::{Cli, Commands, ConfigCommands, OutputFormat};
use crate::commands::config::{self, Config};
use crate::commands::filter::FilterOptions;
use crate::commands::{self, CommandContext, CommandError, Result};

/// Resolves the output format for `tlf filter`.
fn resolve_output(flag: Option<OutputFormat>, json: bool, config: &Config) -> Result<OutputFormat> {
    if let Some(format) = flag {
        return Ok(format);
    }
    if json {
        return Ok(OutputFormat::Json);
    }
    Ok(config.output_format()?.unwrap_or(OutputFormat::Text))
}

/// Executes the command named on the command line.
pub fn execute(cli: &Cli, ctx: &CommandContext, config: &Config) -> Result<()> {
    let Some(command) = &cli.command else {
        if !ctx.quiet {
            println!("tlf - forensic timeline filter");
            println!("Use --help for usage information");
        }
        return Ok(());
    };

    match command {
        Commands::Filter {
            source,
            format,
            filter,
            filter_files,
            preset,
            fields,
            output,
            limit,
        } => {
            let format = match format {
                Some(format) => Some((*format).into()),
                None => config.input_format()?,
            };
            let opts = FilterOptions {
                source: source.clone(),
                format,
                filter: filter.clone(),
                filter_files: filter_files.clone(),
                preset: preset.clone(),
                fields: fields.clone(),
                output: resolve_output(*output, cli.json, config)?,
                limit: *limit,
            };
            commands::filter::execute(ctx, &opts)
        }
        Commands::Fields { source, format } => {
            let format = match format {
                Some(format) => Some((*format).into()),
                None => config.input_format()?,
            };
            commands::fields::execute(ctx, source, format)
        }
        Commands::Presets => commands::presets::execute(ctx),
        Commands::Config { command } => dispatch_config(ctx, command),
        Commands::Completions { shell } => {
            commands::completions::execute(shell).map_err(CommandError::Io)
        }
    }
}

/// Dispatch config subcommands.
fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => config::execute_show(ctx),
        Some(ConfigCommands::Set { key, value }) => {
            let opts = config::ConfigSetOptions {
                key: key.clone(),
                value: value.clone(),
            };
            config::execute_set(ctx, &opts)
        }
        Some(ConfigCommands::Path) => config::execute_path(ctx),
    }
}
