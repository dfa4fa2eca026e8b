use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use recdiag_validator::{
    DEFAULT_CONFIG_FILE, DEFAULT_MAX_FILE_SIZE, DiagConfig, ValidationResult, output,
    validate_with,
};
use tracing::debug;

use crate::logging;

/// The source passed (or had nothing to validate).
pub const EXIT_PASSED: i32 = 0;
/// The source failed validation or could not be validated.
pub const EXIT_FAILED: i32 = 1;
/// The tool itself failed (bad arguments, unwritable output).
pub const EXIT_USAGE: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Check that a log agent source's record parser splits a sample log file.
#[derive(Debug, Parser)]
#[command(name = "recdiag", version, about)]
pub struct Cli {
    /// Id of the source to diagnose
    pub source_id: String,

    /// Sample file name inside the source's directory (default: the only file matching its filter)
    #[arg(short, long = "log", value_name = "NAME")]
    pub log: Option<String>,

    /// Directory holding the agent configuration file
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub config_dir: PathBuf,

    /// Agent configuration file name
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Maximum size in bytes of the configuration file and the sample log
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub max_file_size: u64,

    /// Use the source's Directory verbatim, without expanding ~ and $VARS
    #[arg(long)]
    pub no_env_expand: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    fn diag_config(&self) -> DiagConfig {
        let mut config = DiagConfig::default();
        config.config_dir.clone_from(&self.config_dir);
        config.config_file.clone_from(&self.config_file);
        config.max_file_size = self.max_file_size;
        config.expand_env = !self.no_env_expand;
        config
    }
}

/// Parse arguments, run the diagnostics and return the process exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if cli.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&cli, &mut out)
}

/// Run the diagnostics described by `cli`, writing the report to `out`.
pub fn execute(cli: &Cli, out: &mut dyn Write) -> Result<i32> {
    let options = cli.diag_config();
    debug!(
        source_id = cli.source_id.as_str(),
        config = %options.config_path().display(),
        "starting diagnostics"
    );

    let result = validate_with(&cli.source_id, cli.log.as_deref(), &options);
    match cli.format {
        OutputFormat::Json => output::write_json(&result, out)?,
        OutputFormat::Human => write_colored(&result, out)?,
    }
    Ok(exit_code(&result))
}

fn write_colored(result: &ValidationResult, out: &mut dyn Write) -> Result<()> {
    output::write_details(result, out)?;
    let line = output::verdict_line(result);
    let painted = if result.passed {
        line.green().bold()
    } else {
        line.red().bold()
    };
    writeln!(out, "{painted}")?;
    writeln!(out, "{}", "=".repeat(80))?;
    Ok(())
}

fn exit_code(result: &ValidationResult) -> i32 {
    if result.passed { EXIT_PASSED } else { EXIT_FAILED }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("recdiag").chain(args.iter().copied())).unwrap()
    }

    /// A configuration with one timestamp source over a directory holding `lines`.
    fn fixture(lines: &str) -> TempDir {
        let tmp = TempDir::new().unwrap();
        let logs = tmp.path().join("logs");
        fs::create_dir(&logs).unwrap();
        fs::write(logs.join("app.log"), lines).unwrap();
        let config = serde_json::json!({
            "Sources": [{
                "Id": "app1",
                "SourceType": "DirectorySource",
                "RecordParser": "Timestamp",
                "TimestampFormat": "yyyy-MM-dd HH:mm:ss",
                "Directory": logs.to_string_lossy()
            }]
        });
        fs::write(tmp.path().join("appsettings.json"), config.to_string()).unwrap();
        tmp
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["app1"]);
        assert_eq!(cli.source_id, "app1");
        assert_eq!(cli.log, None);
        assert_eq!(cli.config_dir, PathBuf::from("."));
        assert_eq!(cli.config_file, DEFAULT_CONFIG_FILE);
        assert_eq!(cli.format, OutputFormat::Human);
        assert_eq!(cli.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(cli.verbose, 0);

        let config = cli.diag_config();
        assert!(config.expand_env);
    }

    #[test]
    fn test_all_flags() {
        let cli = parse(&[
            "svc",
            "--log",
            "x.log",
            "--config-dir",
            "/etc/agent",
            "--config-file",
            "agent.json",
            "--format",
            "json",
            "--max-file-size",
            "42",
            "--no-env-expand",
            "-vv",
        ]);
        assert_eq!(cli.log.as_deref(), Some("x.log"));
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);

        let config = cli.diag_config();
        assert_eq!(config.config_path(), PathBuf::from("/etc/agent/agent.json"));
        assert_eq!(config.max_file_size, 42);
        assert!(!config.expand_env);
    }

    #[test]
    fn test_source_id_is_required() {
        assert!(Cli::try_parse_from(["recdiag"]).is_err());
    }

    #[test]
    fn test_execute_passing_source_json() {
        let tmp = fixture("2020-01-01 00:00:00 start\n2020-01-01 00:00:01 end\n");
        let dir = tmp.path().to_string_lossy().into_owned();
        let cli = parse(&["app1", "--config-dir", &dir, "--format", "json"]);

        let mut out = Vec::new();
        let code = execute(&cli, &mut out).unwrap();

        assert_eq!(code, EXIT_PASSED);
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["passed"], true);
        assert_eq!(value["record_count"], 2);
    }

    #[test]
    fn test_execute_failing_source_human() {
        let tmp = fixture("not a timestamp line\nnot a timestamp line\n");
        let dir = tmp.path().to_string_lossy().into_owned();
        let cli = parse(&["app1", "--config-dir", &dir, "--no-color"]);

        let mut out = Vec::new();
        let code = execute(&cli, &mut out).unwrap();

        assert_eq!(code, EXIT_FAILED);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Invalid Timestamp format at source ID: app1."));
        assert!(text.contains("RECORD BOUNDARY DIAGNOSTICS"));
    }
}
