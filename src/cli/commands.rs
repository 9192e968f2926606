//! Command implementations for the hydroprofile CLI
//!
//! Each command writes its result to the given writer so it can be driven
//! from tests as well as from `main`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::app::models::{ParserDefinition, Profile};
use crate::app::services::profile_decoder::{DecodeResult, DecodeStats, ProfileTextDecoder};
use crate::app::services::profile_registry::check_parameter_count;
use crate::app::services::unit_converter::UnitConverter;
use crate::cli::args::{Args, Commands, ConvertArgs, DecodeArgs, OutputFormat, ValidateArgs};
use crate::config::Config;
use crate::{Error, Result};

/// Run the parsed command
pub fn run(args: &Args) -> Result<()> {
    debug!("Command line arguments: {:?}", args);
    args.validate()?;

    let config = load_configuration(args)?;
    debug!("Loaded configuration: {:?}", config);

    let stdout = std::io::stdout();
    match &args.command {
        Some(Commands::Decode(decode)) => {
            let stats = match &decode.output_file {
                Some(path) => {
                    let file = File::create(path).map_err(|e| {
                        Error::io(format!("Failed to create {}", path.display()), e)
                    })?;
                    let mut writer = BufWriter::new(file);
                    let stats = run_decode(decode, &config, &mut writer)?;
                    writer.flush()?;
                    stats
                }
                None => run_decode(decode, &config, &mut stdout.lock())?,
            };
            info!(
                "Decoded {} of {} record(s) ({:.1}% success)",
                stats.rows_decoded,
                stats.total_records,
                stats.success_rate()
            );
        }
        Some(Commands::Validate(validate)) => run_validate(validate, &mut stdout.lock())?,
        Some(Commands::Convert(convert)) => {
            run_convert(convert, &config, &mut stdout.lock())?;
        }
        None => {
            return Err(Error::invalid_argument(
                "No command given; run with --help for usage",
            ));
        }
    }

    Ok(())
}

/// Install the tracing subscriber for the CLI
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hydroprofile={}", log_level)));

    let installed = if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    installed.map_err(|e| Error::configuration(format!("Failed to install logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Configuration file if given, defaults otherwise; environment overrides on top
pub fn load_configuration(args: &Args) -> Result<Config> {
    match &args.config_file {
        Some(path) => Config::load(path),
        None => Config::default().apply_env_overrides(),
    }
}

/// Decode an extract and write the rows
pub fn run_decode(args: &DecodeArgs, config: &Config, out: &mut dyn Write) -> Result<DecodeStats> {
    let definition: ParserDefinition = read_document(&args.definition)?;
    let raw = read_text(&args.input)?;

    let decoder = ProfileTextDecoder::from_config(&config.decoder);
    let result = decoder.decode(&raw, &definition)?;
    if result.stats.has_skips() {
        warn!(
            "Skipped {} record(s) in {}",
            result.stats.rows_skipped,
            args.input.display()
        );
    }

    match args.output_format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &result)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => write_csv(&result, &definition, out)?,
    }

    Ok(result.stats)
}

fn write_csv(result: &DecodeResult, definition: &ParserDefinition, out: &mut dyn Write) -> Result<()> {
    let mut header = vec!["timestamp".to_string()];
    header.extend(definition.parameter_names());
    writeln!(out, "{}", header.join(","))?;

    for row in &result.rows {
        let cells: Vec<String> = row
            .values
            .iter()
            .map(|v| v.map(|v| v.to_string()).unwrap_or_default())
            .collect();
        writeln!(out, "{},{}", row.timestamp, cells.join(","))?;
    }
    Ok(())
}

/// Check a definition and, if given, a profile against it
pub fn run_validate(args: &ValidateArgs, out: &mut dyn Write) -> Result<()> {
    let definition: ParserDefinition = read_document(&args.definition)?;
    ProfileTextDecoder::validate_definition(&definition)?;
    writeln!(
        out,
        "Parser definition {} / {} is valid ({} parameter(s))",
        definition.location_id,
        definition.key_parameter,
        definition.parameter_count()
    )?;

    if let Some(path) = &args.profile {
        let profile: Profile = read_document(path)?;
        profile.validate()?;
        if profile.location_id != definition.location_id
            || profile.key_parameter != definition.key_parameter
        {
            return Err(Error::invalid_argument(format!(
                "Profile is for {} / {}, definition is for {} / {}",
                profile.location_id,
                profile.key_parameter,
                definition.location_id,
                definition.key_parameter
            )));
        }
        check_parameter_count(&profile, &definition)?;
        writeln!(out, "Profile matches the parser definition")?;
    }

    Ok(())
}

/// Convert one value and print it
pub fn run_convert(args: &ConvertArgs, config: &Config, out: &mut dyn Write) -> Result<f64> {
    let converter = UnitConverter::from_config(&config.units)?;
    let converted = converter.convert(args.value, &args.from, &args.to)?;
    writeln!(out, "{} {}", converted, args.to)?;
    Ok(converted)
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))
}

fn read_document<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_text(path)?;
    serde_json::from_str(&content)
        .map_err(|e| Error::serialization(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{LocationId, ParameterInfo, TimeSpec};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn definition() -> ParserDefinition {
        ParserDefinition {
            location_id: LocationId::new("SWT", "KEYS"),
            key_parameter: "Depth".to_string(),
            time_zone: "UTC".to_string(),
            time_format: "EPOCH".to_string(),
            time_spec: TimeSpec::Indexed {
                time_field: 0,
                second_time_field: None,
                field_delimiter: ",".to_string(),
                record_delimiter: "\n".to_string(),
            },
            parameters: vec![
                ParameterInfo::indexed("Depth", "m", 0, 1),
                ParameterInfo::indexed("Temp-Water", "C", 1, 2),
            ],
        }
    }

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn decode_args(dir: &TempDir, format: OutputFormat) -> DecodeArgs {
        DecodeArgs {
            definition: write_file(dir, "keys.json", &serde_json::to_string(&definition()).unwrap()),
            input: write_file(dir, "extract.txt", "1568033337,12.3,55.1\n1568033350,,54.9\nbad,1,2"),
            output_format: format,
            output_file: None,
        }
    }

    #[test]
    fn test_decode_json() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();

        let stats = run_decode(&decode_args(&dir, OutputFormat::Json), &Config::default(), &mut out)
            .unwrap();
        assert_eq!(stats.rows_decoded, 2);
        assert_eq!(stats.rows_skipped, 1);

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["rows"][0]["timestamp"], 1_568_033_337_000_i64);
        assert!(json["rows"][1]["values"][0].is_null());
        assert_eq!(json["stats"]["rows-skipped"], 1);
    }

    #[test]
    fn test_decode_csv() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();

        run_decode(&decode_args(&dir, OutputFormat::Csv), &Config::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "timestamp,Depth,Temp-Water",
                "1568033337000,12.3,55.1",
                "1568033350000,,54.9"
            ]
        );
    }

    #[test]
    fn test_validate_with_profile() {
        let dir = TempDir::new().unwrap();
        let definition_path =
            write_file(&dir, "keys.json", &serde_json::to_string(&definition()).unwrap());
        let profile = Profile {
            location_id: LocationId::new("SWT", "KEYS"),
            key_parameter: "Depth".to_string(),
            description: String::new(),
            parameter_list: vec!["Depth".to_string()],
            reference_ts_id: None,
        };
        let profile_path = write_file(&dir, "profile.json", &serde_json::to_string(&profile).unwrap());

        let mut out = Vec::new();
        run_validate(
            &ValidateArgs {
                definition: definition_path.clone(),
                profile: None,
            },
            &mut out,
        )
        .unwrap();
        assert!(String::from_utf8(out).unwrap().contains("is valid"));

        let result = run_validate(
            &ValidateArgs {
                definition: definition_path,
                profile: Some(profile_path),
            },
            &mut Vec::new(),
        );
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    }

    #[test]
    fn test_validate_unreadable_document() {
        let dir = TempDir::new().unwrap();
        let broken = write_file(&dir, "broken.json", "{ not json");

        let result = run_validate(
            &ValidateArgs {
                definition: broken,
                profile: None,
            },
            &mut Vec::new(),
        );
        assert!(matches!(result, Err(Error::Serialization { .. })));

        let missing = run_validate(
            &ValidateArgs {
                definition: dir.path().join("missing.json"),
                profile: None,
            },
            &mut Vec::new(),
        );
        assert!(matches!(missing, Err(Error::Io { .. })));
    }

    #[test]
    fn test_convert() {
        let mut out = Vec::new();
        let args = ConvertArgs {
            value: 212.0,
            from: "F".to_string(),
            to: "C".to_string(),
        };
        let converted = run_convert(&args, &Config::default(), &mut out).unwrap();
        assert!((converted - 100.0).abs() < 1e-9);
        assert!(String::from_utf8(out).unwrap().ends_with(" C\n"));
    }
}
