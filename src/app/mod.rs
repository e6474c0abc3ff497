//! Application glue
//!
//! CLI configuration and validation for the converter binary.

mod config;

pub use config::{Config, ConfigError, InputFormat, OutputFormat};
