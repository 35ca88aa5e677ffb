//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the tlf CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use timeline_filter::Format;

/// tlf - Filter forensic timeline exports with a small query language
#[derive(Parser, Debug)]
#[command(name = "tlf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// JSON output for listings and errors
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Filter a timeline and print the matching records
    #[command(alias = "f")]
    Filter {
        /// Timeline file to read
        source: PathBuf,

        /// Input format (default: inferred from the file extension)
        #[arg(long, value_enum)]
        format: Option<InputFormat>,

        /// Filter query (e.g. 'desc contains "Prefetch" and not user == "SYSTEM"')
        #[arg(short, long)]
        filter: Option<String>,

        /// Read a filter fragment from a file (repeatable)
        #[arg(long = "filter-file", value_name = "PATH", action = clap::ArgAction::Append)]
        filter_files: Vec<PathBuf>,

        /// Apply a built-in preset (see `tlf presets`)
        #[arg(short, long)]
        preset: Option<String>,

        /// Comma-separated fields to print (default: all)
        #[arg(long, value_name = "FIELDS")]
        fields: Option<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Stop after this many matching records
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List the fields of a timeline
    Fields {
        /// Timeline file to read
        source: PathBuf,

        /// Input format (default: inferred from the file extension)
        #[arg(long, value_enum)]
        format: Option<InputFormat>,
    },

    /// List the built-in filter presets
    Presets,

    /// View or edit configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Input formats accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    #[value(name = "json_line")]
    JsonLine,
    L2tcsv,
    Dynamic,
}

impl From<InputFormat> for Format {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Json => Format::Json,
            InputFormat::JsonLine => Format::JsonLine,
            InputFormat::L2tcsv => Format::L2tCsv,
            InputFormat::Dynamic => Format::Dynamic,
        }
    }
}

/// Output formats for matching records.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// One block per record
    Text,
    /// Header row plus comma-joined rows
    Csv,
    /// One JSON object per line
    Json,
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. output.format)
        key: String,

        /// Configuration value
        value: String,
    },

    /// Print config file path
    Path,
}
