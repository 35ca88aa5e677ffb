use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod dispatch;
mod output;

use cli::Cli;
use commands::config::load_config;
use commands::{CommandContext, CommandError};
use timeline_filter::filter::FilterError;
use timeline_filter::SourceError;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                eprintln!("{error_json:#}");
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::from(exit_status(&e))
        }
    }
}

/// Logs go to stderr: `warn` by default, `debug` with `--verbose`, `error`
/// with `--quiet`. `RUST_LOG` takes precedence.
fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> commands::Result<()> {
    let config = load_config()?;
    let ctx = CommandContext::from_cli(cli, &config);
    dispatch::execute(cli, &ctx, &config)
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Source(SourceError::NotFound { .. }) => "NOT_FOUND",
        CommandError::Source(SourceError::UnknownFormat { .. }) => "UNKNOWN_FORMAT",
        CommandError::Source(SourceError::Format { .. }) => "FORMAT_ERROR",
        CommandError::Source(SourceError::Io(_)) => "IO_ERROR",
        CommandError::Filter(FilterError::DateParse { .. }) => "DATE_PARSE_ERROR",
        CommandError::Filter(FilterError::Pattern { .. }) => "PATTERN_ERROR",
        CommandError::Filter(FilterError::UnknownField { .. }) => "UNKNOWN_FIELD",
        CommandError::Filter(FilterError::UnknownOperator { .. }) => "UNKNOWN_OPERATOR",
        CommandError::Filter(FilterError::UnknownPreset { .. }) => "UNKNOWN_PRESET",
        CommandError::Filter(_) => "FILTER_ERROR",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the process exit status for an error.
fn exit_status(e: &CommandError) -> u8 {
    match e {
        CommandError::Filter(_) | CommandError::Json(_) => 1,
        CommandError::Source(SourceError::Format { .. }) => 2,
        CommandError::Source(SourceError::Io(_)) | CommandError::Io(_) => 3,
        CommandError::Source(SourceError::NotFound { .. })
        | CommandError::Source(SourceError::UnknownFormat { .. }) => 4,
        CommandError::Config(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let e = CommandError::Filter(FilterError::date_parse("x"));
        assert_eq!(error_code(&e), "DATE_PARSE_ERROR");
        assert_eq!(exit_status(&e), 1);

        let e = CommandError::Filter(FilterError::EmptyExpression);
        assert_eq!(error_code(&e), "FILTER_ERROR");

        let e = CommandError::Source(SourceError::UnknownFormat {
            name: "x.csv".into(),
        });
        assert_eq!(error_code(&e), "UNKNOWN_FORMAT");
        assert_eq!(exit_status(&e), 4);

        let e = CommandError::Config("bad".into());
        assert_eq!(exit_status(&e), 5);
    }
}
