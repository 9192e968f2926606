//! Command-line argument definitions for hydroprofile
//!
//! This module defines the CLI interface using the clap derive API.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::{Error, Result};

/// CLI arguments for the hydroprofile tool
///
/// Decodes raw profile extracts with a parser definition, checks parser
/// definitions and profiles, and converts values between units.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hydroprofile",
    version,
    about = "Decode and inspect hydrologic time series profiles",
    long_about = "Decodes raw indexed or fixed-width profile extracts into per-timestamp, \
                  multi-parameter rows using a declarative parser definition, validates \
                  parser definitions and profile documents, and converts values between units."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    ///
    /// TOML file with decoder, retrieval, store and unit settings.
    /// Environment overrides are applied on top.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        global = true,
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress log output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Decode a raw extract with a parser definition
    Decode(DecodeArgs),
    /// Check a parser definition, and optionally a profile against it
    Validate(ValidateArgs),
    /// Convert a value between units
    Convert(ConvertArgs),
}

/// Arguments for the decode command
#[derive(Debug, Clone, Parser)]
pub struct DecodeArgs {
    /// Parser definition document (JSON)
    #[arg(
        short = 'd',
        long = "definition",
        value_name = "FILE",
        help = "Parser definition document (JSON)"
    )]
    pub definition: PathBuf,

    /// Raw profile extract to decode
    #[arg(value_name = "INPUT", help = "Raw profile extract to decode")]
    pub input: PathBuf,

    /// Output format for decoded rows
    #[arg(
        long = "format",
        value_enum,
        default_value = "json",
        help = "Output format for decoded rows"
    )]
    pub output_format: OutputFormat,

    /// Output file; defaults to stdout
    #[arg(
        short = 'o',
        long = "output-file",
        value_name = "FILE",
        help = "Write decoded rows to a file instead of stdout"
    )]
    pub output_file: Option<PathBuf>,
}

/// Arguments for the validate command
#[derive(Debug, Clone, Parser)]
pub struct ValidateArgs {
    /// Parser definition document (JSON)
    #[arg(value_name = "DEFINITION", help = "Parser definition document (JSON)")]
    pub definition: PathBuf,

    /// Profile document (JSON) checked against the definition
    #[arg(
        short = 'p',
        long = "profile",
        value_name = "FILE",
        help = "Profile document (JSON) to check against the definition"
    )]
    pub profile: Option<PathBuf>,
}

/// Arguments for the convert command
#[derive(Debug, Clone, Parser)]
pub struct ConvertArgs {
    /// Value to convert
    #[arg(allow_negative_numbers = true, help = "Value to convert")]
    pub value: f64,

    /// Unit of the value
    #[arg(long = "from", value_name = "UNIT", help = "Unit of the value")]
    pub from: String,

    /// Target unit
    #[arg(long = "to", value_name = "UNIT", help = "Target unit")]
    pub to: String,
}

/// Output format for decoded rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Rows and decode statistics as JSON
    Json,
    /// One CSV line per row, empty cells for nulls
    Csv,
}

impl Args {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Validate argument consistency before running a command
    pub fn validate(&self) -> Result<()> {
        if let Some(config_file) = &self.config_file {
            if !config_file.is_file() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        if let Some(Commands::Convert(convert)) = &self.command {
            if !convert.value.is_finite() {
                return Err(Error::invalid_argument("Value to convert must be finite"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_decode() {
        let args = Args::try_parse_from([
            "hydroprofile",
            "-v",
            "decode",
            "--definition",
            "keys.json",
            "extract.txt",
            "--format",
            "csv",
        ])
        .unwrap();

        assert_eq!(args.verbose, 1);
        match args.command {
            Some(Commands::Decode(decode)) => {
                assert_eq!(decode.definition, PathBuf::from("keys.json"));
                assert_eq!(decode.input, PathBuf::from("extract.txt"));
                assert_eq!(decode.output_format, OutputFormat::Csv);
                assert!(decode.output_file.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_convert_negative_value() {
        let args =
            Args::try_parse_from(["hydroprofile", "convert", "-40", "--from", "F", "--to", "C"])
                .unwrap();
        match args.command {
            Some(Commands::Convert(convert)) => {
                assert_eq!(convert.value, -40.0);
                assert_eq!(convert.from, "F");
                assert_eq!(convert.to, "C");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["hydroprofile", "-q", "-v", "validate", "d.json"]).is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = Args::try_parse_from(["hydroprofile", "validate", "d.json"]).unwrap();
        assert_eq!(args.get_log_level(), "warn");

        args.verbose = 2;
        assert_eq!(args.get_log_level(), "debug");

        args.verbose = 5;
        assert_eq!(args.get_log_level(), "trace");

        args.quiet = true;
        assert_eq!(args.get_log_level(), "error");
    }

    #[test]
    fn test_validate_config_path() {
        let mut args = Args::try_parse_from(["hydroprofile", "validate", "d.json"]).unwrap();
        args.config_file = Some(PathBuf::from("/nonexistent/hydroprofile.toml"));
        assert!(matches!(args.validate(), Err(Error::Configuration { .. })));

        let file = NamedTempFile::new().unwrap();
        args.config_file = Some(file.path().to_path_buf());
        assert!(args.validate().is_ok());
    }
}
