//! CrateGen CLI - convert TES and WES documents to and from WRROC.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crategen_convert::{Config, ConverterManager, Direction};
use crategen_core::Strictness;

mod error;

use error::CliError;

/// CrateGen - convert between TES, WES and WRROC
#[derive(Parser, Debug)]
#[command(name = "crategen")]
#[command(about = "Convert TES tasks and WES runs to and from WRROC", long_about = None)]
struct Cli {
    /// Input JSON file
    #[arg(short, long)]
    input: PathBuf,

    /// Output JSON file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Conversion to perform
    #[arg(short = 'c', long, value_enum)]
    conversion_type: ConversionType,

    /// Reject unknown fields
    #[arg(long)]
    strict: bool,

    /// Skip validation of the converted document
    #[arg(long)]
    no_revalidate: bool,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ConversionType {
    TesToWrroc,
    WrrocToTes,
    WesToWrroc,
    WrrocToWes,
}

impl From<ConversionType> for Direction {
    fn from(value: ConversionType) -> Self {
        match value {
            ConversionType::TesToWrroc => Direction::TesToWrroc,
            ConversionType::WrrocToTes => Direction::WrrocToTes,
            ConversionType::WesToWrroc => Direction::WesToWrroc,
            ConversionType::WrrocToWes => Direction::WrrocToWes,
        }
    }
}

impl Cli {
    fn config(&self) -> Config {
        let strictness = if self.strict {
            Strictness::Strict
        } else {
            Strictness::Lenient
        };
        Config::default()
            .with_strictness(strictness)
            .with_revalidate_output(!self.no_revalidate)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for JSON
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            if let CliError::Convert(convert) = &err {
                for field in convert.field_errors().into_iter().flatten() {
                    eprintln!("  - {field}");
                }
            }
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let raw = fs::read_to_string(&cli.input).map_err(|source| CliError::Read {
        path: cli.input.clone(),
        source,
    })?;
    let data: Value = serde_json::from_str(&raw).map_err(|source| CliError::Parse {
        path: cli.input.clone(),
        source,
    })?;

    let direction = Direction::from(cli.conversion_type);
    let converted = ConverterManager::new(cli.config()).convert(direction, &data)?;
    for notice in &converted.notices {
        warn!(field = notice.field(), "{}", notice);
    }

    let text = render(&converted.data, cli.compact)?;
    match &cli.output {
        Some(path) => {
            fs::write(path, text + "\n").map_err(|source| CliError::Write {
                path: path.clone(),
                source,
            })?;
            info!(%direction, output = %path.display(), "Conversion complete");
        }
        None => println!("{text}"),
    }

    Ok(())
}

fn render(value: &Value, compact: bool) -> Result<String, CliError> {
    let text = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    text.map_err(|err| CliError::Convert(err.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
        path
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("crategen").chain(args.iter().copied())).unwrap()
    }

    fn task() -> Value {
        json!({
            "id": "t1",
            "name": "n",
            "executors": [{"image": "img", "command": []}],
            "inputs": [{"url": "http://e/i", "path": "/in/i"}],
            "outputs": [{"url": "http://e/o", "path": "/out/o"}],
            "creation_time": "2024-01-01T00:00:00Z"
        })
    }

    #[test]
    fn test_parse_flags() {
        let cli = parse(&[
            "--input",
            "in.json",
            "--conversion-type",
            "wrroc-to-wes",
            "--strict",
            "--no-revalidate",
        ]);

        assert_eq!(cli.conversion_type, ConversionType::WrrocToWes);
        assert_eq!(cli.output, None);
        assert_eq!(
            cli.config(),
            Config::default()
                .with_strictness(Strictness::Strict)
                .with_revalidate_output(false)
        );
    }

    #[test]
    fn test_unknown_conversion_type_is_rejected() {
        let result =
            Cli::try_parse_from(["crategen", "--input", "in.json", "--conversion-type", "tes-to-wes"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_converts_file_to_file() {
        let dir = TempDir::new().unwrap();
        let input = write_json(&dir, "task.json", &task());
        let output = dir.path().join("wrroc.json");

        let cli = parse(&[
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--conversion-type",
            "tes-to-wrroc",
        ]);
        run(&cli).unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["@id"], "t1");
        assert_eq!(written["instrument"], "img");
        assert_eq!(written["endTime"], Value::Null);
    }

    #[test]
    fn test_compact_output() {
        let dir = TempDir::new().unwrap();
        let input = write_json(&dir, "task.json", &task());
        let output = dir.path().join("wrroc.json");

        let cli = parse(&[
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "-c",
            "tes-to-wrroc",
            "--compact",
        ]);
        run(&cli).unwrap();

        let text = fs::read_to_string(&output).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_exit_codes() {
        let dir = TempDir::new().unwrap();

        let missing = dir.path().join("missing.json");
        let cli = parse(&["-i", missing.to_str().unwrap(), "-c", "tes-to-wrroc"]);
        let err = run(&cli).unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
        assert_eq!(err.exit_code(), 1);

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "{not json").unwrap();
        let cli = parse(&["-i", garbage.to_str().unwrap(), "-c", "tes-to-wrroc"]);
        let err = run(&cli).unwrap_err();
        assert!(matches!(err, CliError::Parse { .. }));
        assert_eq!(err.exit_code(), 1);

        let invalid = write_json(&dir, "invalid.json", &json!({"name": "no id"}));
        let cli = parse(&["-i", invalid.to_str().unwrap(), "-c", "tes-to-wrroc"]);
        let err = run(&cli).unwrap_err();
        assert!(matches!(err, CliError::Convert(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
