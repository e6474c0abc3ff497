//! CLI configuration
//!
//! Flag parsing and validation for the converter binary. All
//! cross-option rules are checked here, before any input is read.

use std::path::PathBuf;

use thiserror::Error;

use crate::encoding::{Encoding, EncodingError};

/// Formats the tokenizer side understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    #[default]
    Ansi,
    Neotex,
    /// A token list previously dumped with `--oformat json`
    Json,
}

/// Formats the emitter side produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Ansi,
    Neotex,
    PlainText,
    Table,
    Stats,
    Json,
}

impl InputFormat {
    fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "ansi" => Ok(InputFormat::Ansi),
            "neotex" => Ok(InputFormat::Neotex),
            "json" => Ok(InputFormat::Json),
            other => Err(ConfigError::UnknownInputFormat(other.to_string())),
        }
    }
}

impl OutputFormat {
    fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "ansi" => Ok(OutputFormat::Ansi),
            "neotex" => Ok(OutputFormat::Neotex),
            "plaintext" => Ok(OutputFormat::PlainText),
            "table" => Ok(OutputFormat::Table),
            "stats" => Ok(OutputFormat::Stats),
            "json" => Ok(OutputFormat::Json),
            other => Err(ConfigError::UnknownOutputFormat(other.to_string())),
        }
    }
}

/// Parsed command line
#[derive(Debug, Clone)]
pub struct Config {
    pub input_format: InputFormat,
    pub input_encoding: Encoding,
    pub output_format: OutputFormat,
    pub output_encoding: Encoding,
    /// Terminal columns (default 80)
    pub width: usize,
    /// Terminal rows (default 1000)
    pub lines: usize,
    /// Emit exact VGA palette RGB for standard colors
    pub vga: bool,
    /// Write neotex output to this path instead of stdout
    pub save: Option<PathBuf>,
    pub debug: bool,
    /// Positional input file; stdin when absent
    pub input: Option<PathBuf>,
    pub help: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_format: InputFormat::Ansi,
            input_encoding: Encoding::Utf8,
            output_format: OutputFormat::Ansi,
            output_encoding: Encoding::Utf8,
            width: 80,
            lines: 1000,
            vga: false,
            save: None,
            debug: false,
            input: None,
            help: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown input format: {0}")]
    UnknownInputFormat(String),
    #[error("unknown output format: {0}")]
    UnknownOutputFormat(String),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error("missing value for {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {flag}: {value}")]
    InvalidNumber { flag: &'static str, value: String },
    #[error("unknown flag: {0}")]
    UnknownFlag(String),
    #[error("neotex output requires utf8 output encoding, got {0}")]
    NeotexRequiresUtf8(&'static str),
    #[error("--save is only valid with --oformat neotex")]
    SaveRequiresNeotex,
}

impl Config {
    /// Parse argv (without the program name). Validation runs separately
    /// so `--help` can short-circuit.
    pub fn parse(args: &[String]) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_str();
            match arg {
                "-h" | "--help" => config.help = true,
                "--iformat" => {
                    config.input_format = InputFormat::from_name(take(args, &mut i, "--iformat")?)?;
                }
                "--iencoding" => {
                    config.input_encoding =
                        Encoding::from_name(take(args, &mut i, "--iencoding")?)?;
                }
                "--oformat" => {
                    config.output_format =
                        OutputFormat::from_name(take(args, &mut i, "--oformat")?)?;
                }
                "--oencoding" => {
                    config.output_encoding =
                        Encoding::from_name(take(args, &mut i, "--oencoding")?)?;
                }
                "--width" => {
                    config.width = number(take(args, &mut i, "--width")?, "--width")?;
                }
                "--lines" => {
                    config.lines = number(take(args, &mut i, "--lines")?, "--lines")?;
                }
                "--vga" => config.vga = true,
                "--save" => {
                    config.save = Some(PathBuf::from(take(args, &mut i, "--save")?));
                }
                "-d" | "--debug" => config.debug = true,
                _ if arg.starts_with('-') => {
                    return Err(ConfigError::UnknownFlag(arg.to_string()));
                }
                _ => {
                    if config.input.is_none() {
                        config.input = Some(PathBuf::from(arg));
                    }
                }
            }
            i += 1;
        }

        Ok(config)
    }

    /// Cross-option rules, enforced before any processing starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_format == OutputFormat::Neotex && self.output_encoding != Encoding::Utf8 {
            return Err(ConfigError::NeotexRequiresUtf8(self.output_encoding.name()));
        }
        if self.save.is_some() && self.output_format != OutputFormat::Neotex {
            return Err(ConfigError::SaveRequiresNeotex);
        }
        Ok(())
    }
}

fn take<'a>(args: &'a [String], i: &mut usize, flag: &'static str) -> Result<&'a str, ConfigError> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or(ConfigError::MissingValue(flag))
}

fn number(value: &str, flag: &'static str) -> Result<usize, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        flag,
        value: value.to_string(),
    })
}
