//! `tlf config`: the TOML settings file.
//!
//! Settings live in `$XDG_CONFIG_HOME/tlf/config.toml`, falling back to
//! `~/.config/tlf/config.toml`. `TLF_CONFIG` names a different file.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueEnum;
use directories::BaseDirs;
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use timeline_filter::Format;
use tracing::debug;

use super::{CommandContext, CommandError, Result};
use crate::cli::OutputFormat;

/// Layout version written to new files. Files from a newer tlf are refused.
const CONFIG_VERSION: u32 = 1;

/// Environment variable naming an explicit config file.
const CONFIG_ENV: &str = "TLF_CONFIG";

/// A settable key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    InputFormat,
    OutputFormat,
    OutputColor,
}

impl Setting {
    pub const ALL: [Setting; 3] = [
        Setting::InputFormat,
        Setting::OutputFormat,
        Setting::OutputColor,
    ];

    /// Dotted key as written on the command line.
    pub fn key(self) -> &'static str {
        match self {
            Setting::InputFormat => "input.format",
            Setting::OutputFormat => "output.format",
            Setting::OutputColor => "output.color",
        }
    }

    fn help(self) -> &'static str {
        match self {
            Setting::InputFormat => "input layout when the file extension names none",
            Setting::OutputFormat => "default output of `tlf filter` (text, csv, json)",
            Setting::OutputColor => "colored terminal output (true/false)",
        }
    }
}

impl FromStr for Setting {
    type Err = CommandError;

    fn from_str(key: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|setting| setting.key().eq_ignore_ascii_case(key))
            .ok_or_else(|| {
                let keys: Vec<&str> = Self::ALL.iter().map(|s| s.key()).collect();
                CommandError::Config(format!(
                    "unknown setting '{key}' (expected one of: {})",
                    keys.join(", ")
                ))
            })
    }
}

/// Contents of `config.toml`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "current_version")]
    pub version: u32,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

fn current_version() -> u32 {
    CONFIG_VERSION
}

/// `[input]` table.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// `[output]` table.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            input: InputConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// The configured input format, if any.
    pub fn input_format(&self) -> Result<Option<Format>> {
        self.input.format.as_deref().map(parse_input_format).transpose()
    }

    /// The configured output format, if any.
    pub fn output_format(&self) -> Result<Option<OutputFormat>> {
        self.output
            .format
            .as_deref()
            .map(parse_output_format)
            .transpose()
    }

    /// The stored value of `setting`, as text.
    pub fn get(&self, setting: Setting) -> Option<String> {
        match setting {
            Setting::InputFormat => self.input.format.clone(),
            Setting::OutputFormat => self.output.format.clone(),
            Setting::OutputColor => self.output.color.map(|c| c.to_string()),
        }
    }

    /// Validates `value` and stores its canonical spelling.
    pub fn set(&mut self, setting: Setting, value: &str) -> Result<()> {
        match setting {
            Setting::InputFormat => {
                self.input.format = Some(parse_input_format(value)?.name().to_string());
            }
            Setting::OutputFormat => {
                self.output.format = Some(parse_output_format(value)?.name().to_string());
            }
            Setting::OutputColor => self.output.color = Some(parse_bool(value)?),
        }
        Ok(())
    }

    fn check_version(mut self) -> Result<Self> {
        if self.version > CONFIG_VERSION {
            return Err(CommandError::Config(format!(
                "config version {} is newer than this tlf understands ({CONFIG_VERSION})",
                self.version
            )));
        }
        self.version = CONFIG_VERSION;
        Ok(self)
    }
}

fn parse_input_format(name: &str) -> Result<Format> {
    name.parse::<Format>()
        .map_err(|e| CommandError::Config(format!("input.format: {e}")))
}

fn parse_output_format(name: &str) -> Result<OutputFormat> {
    <OutputFormat as ValueEnum>::from_str(name, true).map_err(|_| {
        let names: Vec<&str> = OutputFormat::value_variants()
            .iter()
            .map(|f| f.name())
            .collect();
        CommandError::Config(format!(
            "output.format: unknown format '{name}' (expected one of: {})",
            names.join(", ")
        ))
    })
}

fn parse_bool(s: &str) -> Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(CommandError::Config(format!(
            "'{s}' is not a boolean (use true/false, yes/no, on/off or 1/0)"
        ))),
    }
}

/// Location of the config file.
pub fn config_path() -> Result<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    let base = match env::var_os("XDG_CONFIG_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".config"))
            .ok_or_else(|| CommandError::Config("cannot locate a home directory".into()))?,
    };
    Ok(base.join("tlf").join("config.toml"))
}

/// Loads the config file, or defaults when there is none.
pub fn load_config() -> Result<Config> {
    load_from(&config_path()?)
}

fn load_from(path: &Path) -> Result<Config> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file");
            return Ok(Config::default());
        }
        Err(e) => {
            return Err(CommandError::Config(format!(
                "cannot read {}: {e}",
                path.display()
            )))
        }
    };

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("cannot parse {}: {e}", path.display())))?;
    debug!(path = %path.display(), "loaded config");
    config.check_version()
}

fn save_to(path: &Path, config: &Config) -> Result<()> {
    let write_error =
        |e: io::Error| CommandError::Config(format!("cannot write {}: {e}", path.display()));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| CommandError::Config(format!("cannot encode config: {e}")))?;
    fs::write(path, content).map_err(write_error)
}

/// `tlf config show`: every setting with its stored value.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let path = config_path()?;
    let config = load_from(&path)?;

    if ctx.json_output {
        let settings: serde_json::Map<String, serde_json::Value> = Setting::ALL
            .iter()
            .map(|s| (s.key().to_string(), config.get(*s).into()))
            .collect();
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "settings": settings,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }
    if ctx.quiet {
        return Ok(());
    }

    let location = if path.exists() {
        format!("# {}", path.display())
    } else {
        format!("# {} (not created yet)", path.display())
    };
    if ctx.use_colors {
        println!("{}", location.dimmed());
    } else {
        println!("{location}");
    }

    let width = Setting::ALL.iter().map(|s| s.key().len()).max().unwrap_or(0);
    for setting in Setting::ALL {
        let key = format!("{:<width$}", setting.key());
        let value = config.get(setting);
        let shown = value.as_deref().unwrap_or("(unset)");
        if ctx.use_colors {
            match value {
                Some(_) => println!("{} = {shown}", key.cyan()),
                None => println!("{} = {}", key.cyan(), shown.dimmed()),
            }
        } else {
            println!("{key} = {shown}");
        }
        if ctx.verbose {
            println!("{:<width$}   {}", "", setting.help());
        }
    }

    Ok(())
}

/// Arguments of `tlf config set`.
pub struct ConfigSetOptions {
    pub key: String,
    pub value: String,
}

/// `tlf config set <key> <value>`.
pub fn execute_set(ctx: &CommandContext, opts: &ConfigSetOptions) -> Result<()> {
    let setting: Setting = opts.key.parse()?;
    let path = config_path()?;

    let mut config = load_from(&path)?;
    config.set(setting, &opts.value)?;
    save_to(&path, &config)?;

    let stored = config.get(setting).unwrap_or_default();
    if ctx.json_output {
        let output = serde_json::json!({
            "key": setting.key(),
            "value": stored,
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("{} = {stored}", setting.key());
    }

    Ok(())
}

/// `tlf config path`.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_parse_bool() {
        for yes in ["true", "True", "yes", "1", "ON"] {
            assert!(parse_bool(yes).unwrap(), "{yes}");
        }
        for no in ["false", "NO", "0", "off"] {
            assert!(!parse_bool(no).unwrap(), "{no}");
        }
        assert!(parse_bool("maybe").is_err());
        assert!(parse_bool("").is_err());
    }

    #[test]
    fn test_setting_keys() {
        assert_eq!("output.format".parse::<Setting>().unwrap(), Setting::OutputFormat);
        assert_eq!("INPUT.FORMAT".parse::<Setting>().unwrap(), Setting::InputFormat);
        match "token".parse::<Setting>() {
            Err(CommandError::Config(message)) => assert!(message.contains("output.color")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_set_stores_canonical_values() {
        let mut config = Config::default();
        config.set(Setting::InputFormat, "JSON_LINE").unwrap();
        config.set(Setting::OutputFormat, "CSV").unwrap();
        config.set(Setting::OutputColor, "off").unwrap();

        assert_eq!(config.get(Setting::InputFormat).as_deref(), Some("json_line"));
        assert_eq!(config.get(Setting::OutputFormat).as_deref(), Some("csv"));
        assert_eq!(config.get(Setting::OutputColor).as_deref(), Some("false"));
        assert_eq!(config.output_format().unwrap(), Some(OutputFormat::Csv));

        assert!(config.set(Setting::OutputFormat, "yaml").is_err());
        assert!(config.set(Setting::InputFormat, "xml").is_err());
        assert_eq!(config.get(Setting::OutputFormat).as_deref(), Some("csv"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[output]\nformat = \"json\"\n").unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.output_format().unwrap(), Some(OutputFormat::Json));
        assert_eq!(config.input_format().unwrap(), None);
        assert_eq!(config.get(Setting::OutputColor), None);
    }

    #[test]
    fn test_hand_edited_invalid_formats_are_reported() {
        let config: Config =
            toml::from_str("[input]\nformat = \"xml\"\n\n[output]\nformat = \"yaml\"\n").unwrap();
        assert!(config.input_format().is_err());
        assert!(config.output_format().is_err());
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(config.input.format.is_none());
        assert!(config.output.format.is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set(Setting::InputFormat, "l2tcsv").unwrap();
        config.set(Setting::OutputColor, "no").unwrap();
        save_to(&path, &config).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("version = 1"));
        assert!(written.contains("[input]"));
        assert!(written.contains("format = \"l2tcsv\""));

        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded.input_format().unwrap(), Some(Format::L2tCsv));
        assert_eq!(loaded.output.color, Some(false));
    }

    #[test]
    fn test_newer_version_is_refused() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "version = 99\n").unwrap();
        assert!(matches!(load_from(&path), Err(CommandError::Config(_))));

        fs::write(&path, "version = 0\n").unwrap();
        assert_eq!(load_from(&path).unwrap().version, CONFIG_VERSION);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[output\n").unwrap();
        match load_from(&path) {
            Err(CommandError::Config(message)) => assert!(message.contains("cannot parse")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn test_env_override_names_the_file() {
        let dir = TempDir::new().unwrap();
        let override_path = dir.path().join("custom.toml");

        let original = env::var_os(CONFIG_ENV);
        env::set_var(CONFIG_ENV, &override_path);
        let resolved = config_path();
        match original {
            Some(value) => env::set_var(CONFIG_ENV, value),
            None => env::remove_var(CONFIG_ENV),
        }

        assert_eq!(resolved.unwrap(), override_path);
    }
}
