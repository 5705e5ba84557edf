//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use colored::{Colorize, control};
use serde_json::Value;
use thiserror::Error;

use sizechecker::check::{CheckConfig, CheckReport, CheckRequest, run_check};
use sizechecker::core::config::Config;
use sizechecker::core::errors::SizeCheckError;
use sizechecker::core::units::format_duration;
use sizechecker::notify::dispatch::{DestinationReport, DispatchOutcome};
use sizechecker::platform::pal::detect_platform;

/// Check a directory's used or available space against a limit.
#[derive(Debug, Parser)]
#[command(
    name = "sizechecker",
    author,
    version,
    about = "Disk usage threshold checker with rate-limited notifications",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Size threshold, e.g. `5MB`, `10 GiB`, `1TB`.
    #[arg(long, value_name = "SIZE")]
    limit: String,
    /// `u` to measure used space below PATH, `a` for available space on its filesystem.
    #[arg(long, value_name = "u|a")]
    runtype: String,
    /// Discord webhook URL to notify on violation.
    #[arg(long, value_name = "URL")]
    discord: Option<String>,
    /// Pushover destination token; credentials come from PUSHOVER_APITOKEN and PUSHOVER_USERKEY.
    #[arg(short = 'o', value_name = "TOKEN")]
    pushover: Option<String>,
    /// Minimum interval between notifications per destination (e.g. `30s`, `1h30m`).
    #[arg(long, value_name = "DURATION")]
    cooldown: Option<String>,
    /// Override config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long)]
    json: bool,
    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
    /// Directory to check.
    #[arg(value_name = "PATH")]
    path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// Result of a completed check, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clear,
    Violation,
}

impl Outcome {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Clear => 0,
            Self::Violation => 1,
        }
    }
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid arguments or configuration.
    #[error("{0}")]
    Usage(String),
    /// Probe or environment failure.
    #[error("{0}")]
    Runtime(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI. Code 1 is reserved for violations.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) | Self::Runtime(_) | Self::Json(_) | Self::Io(_) => 2,
        }
    }

    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

impl From<SizeCheckError> for CliError {
    fn from(err: SizeCheckError) -> Self {
        if err.is_usage() {
            Self::Usage(err.to_string())
        } else {
            Self::Runtime(err.to_string())
        }
    }
}

/// One-line usage summary for error output.
pub fn usage() -> String {
    format!(
        "{}\nFor more information, try '--help'.",
        Cli::command().render_usage()
    )
}

/// Run one check and print the result.
pub fn run(cli: &Cli) -> Result<Outcome, CliError> {
    if cli.no_color || !io::stdout().is_terminal() {
        control::set_override(false);
    }

    let settings = Config::load(cli.config.as_deref())?;
    let config = CheckConfig::resolve(
        CheckRequest {
            path: cli.path.clone(),
            limit: cli.limit.clone(),
            runtype: cli.runtype.clone(),
            cooldown: cli.cooldown.clone(),
            discord: cli.discord.clone(),
            pushover: cli.pushover.clone(),
        },
        settings,
    )?;

    let platform = detect_platform()?;
    let report = run_check(&config, platform.as_ref())?;

    Ok(finish(
        &report,
        output_mode(cli),
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    ))
}

/// Print `report` and map it to an outcome. The check already ran, so a
/// failed write is reported on `err` and never changes the exit code.
fn finish(
    report: &CheckReport,
    mode: OutputMode,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Outcome {
    let written = match mode {
        OutputMode::Json => serde_json::to_value(report)
            .map_err(CliError::from)
            .and_then(|payload| write_json_line(out, &payload)),
        OutputMode::Human => print_human(report, out, err),
    };
    if let Err(e) = written {
        let _ = writeln!(err, "sizechecker: {e}");
    }

    if report.violated() {
        Outcome::Violation
    } else {
        Outcome::Clear
    }
}

fn print_human(
    report: &CheckReport,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if report.violated() {
        writeln!(out, "{}", report.verdict.message.yellow().bold())?;
    } else {
        writeln!(out, "{}", report.verdict.message.green())?;
    }

    for destination in &report.notifications {
        writeln!(err, "{}", describe(destination))?;
    }
    Ok(())
}

fn describe(report: &DestinationReport) -> String {
    let provider = report.provider;
    match &report.outcome {
        DispatchOutcome::Sent => format!("{provider}: {}", "notification sent".green()),
        DispatchOutcome::SentUnrecorded { error } => format!(
            "{provider}: {} ({error})",
            "notification sent, cooldown not recorded".yellow()
        ),
        DispatchOutcome::RateLimited { remaining_secs } => format!(
            "{provider}: {} (next allowed in {})",
            "rate limited".yellow(),
            format_duration(std::time::Duration::from_secs(*remaining_secs))
        ),
        DispatchOutcome::SendFailed { error } => {
            format!("{provider}: {} ({error})", "notification failed".red())
        }
        DispatchOutcome::GateFailed { error } => {
            format!("{provider}: {} ({error})", "cooldown check failed".red())
        }
    }
}

fn write_json_line(out: &mut dyn Write, payload: &Value) -> Result<(), CliError> {
    let line = serde_json::to_string(payload)?;
    writeln!(out, "{line}")?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("SIZECHECKER_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        _ => OutputMode::Human,
    }
}

#[cfg(test)]
mod tests {
    use sizechecker::prelude::{ProbeMode, evaluate};

    use super::*;

    #[test]
    fn parses_full_argument_set() {
        let cli = Cli::try_parse_from([
            "sizechecker",
            "--limit",
            "5 MB",
            "--runtype",
            "u",
            "--discord",
            "https://discord.test/hook",
            "-o",
            "ops",
            "--cooldown",
            "1h30m",
            "--json",
            "/data",
        ])
        .unwrap();
        assert_eq!(cli.limit, "5 MB");
        assert_eq!(cli.runtype, "u");
        assert_eq!(cli.discord.as_deref(), Some("https://discord.test/hook"));
        assert_eq!(cli.pushover.as_deref(), Some("ops"));
        assert_eq!(cli.cooldown.as_deref(), Some("1h30m"));
        assert!(cli.json);
        assert_eq!(cli.path, PathBuf::from("/data"));
    }

    #[test]
    fn limit_runtype_and_path_are_required() {
        assert!(Cli::try_parse_from(["sizechecker", "--runtype", "u", "/data"]).is_err());
        assert!(Cli::try_parse_from(["sizechecker", "--limit", "1GB", "/data"]).is_err());
        assert!(Cli::try_parse_from(["sizechecker", "--limit", "1GB", "--runtype", "a"]).is_err());
    }

    #[test]
    fn output_mode_resolution_honors_precedence() {
        assert_eq!(resolve_output_mode(true, Some("human")), OutputMode::Json);
        assert_eq!(resolve_output_mode(false, Some("json")), OutputMode::Json);
        assert_eq!(resolve_output_mode(false, Some(" JSON ")), OutputMode::Json);
        assert_eq!(resolve_output_mode(false, Some("human")), OutputMode::Human);
        assert_eq!(resolve_output_mode(false, None), OutputMode::Human);
    }

    #[test]
    fn exit_codes() {
        assert_eq!(Outcome::Clear.exit_code(), 0);
        assert_eq!(Outcome::Violation.exit_code(), 1);
        let usage: CliError = SizeCheckError::InvalidLimit {
            input: "abc".to_string(),
            details: "bad".to_string(),
        }
        .into();
        assert!(usage.is_usage());
        assert_eq!(usage.exit_code(), 2);
        let runtime: CliError = SizeCheckError::NotADirectory {
            path: PathBuf::from("/x"),
        }
        .into();
        assert!(!runtime.is_usage());
        assert_eq!(runtime.exit_code(), 2);
    }

    #[test]
    fn describe_outcomes() {
        control::set_override(false);
        let line = describe(&DestinationReport {
            provider: "discord",
            outcome: DispatchOutcome::RateLimited { remaining_secs: 45 },
        });
        assert_eq!(line, "discord: rate limited (next allowed in 45s)");
        let line = describe(&DestinationReport {
            provider: "pushover",
            outcome: DispatchOutcome::SendFailed {
                error: "boom".to_string(),
            },
        });
        assert_eq!(line, "pushover: notification failed (boom)");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn report(observed: u64) -> CheckReport {
        CheckReport {
            verdict: evaluate(
                observed,
                bytesize::ByteSize(1_024),
                ProbeMode::Used,
                std::path::Path::new("/data"),
            ),
            notifications: Vec::new(),
        }
    }

    #[test]
    fn write_failure_keeps_violation_exit_code() {
        control::set_override(false);
        for mode in [OutputMode::Human, OutputMode::Json] {
            let mut diagnostics = Vec::new();
            let outcome = finish(&report(4_096), mode, &mut BrokenPipe, &mut diagnostics);
            assert_eq!(outcome, Outcome::Violation);
            assert_eq!(outcome.exit_code(), 1);
            let text = String::from_utf8(diagnostics).unwrap();
            assert!(text.contains("failed to write output"), "{text}");
        }

        let mut diagnostics = Vec::new();
        let outcome = finish(&report(1), OutputMode::Human, &mut BrokenPipe, &mut diagnostics);
        assert_eq!(outcome, Outcome::Clear);
        assert!(!diagnostics.is_empty());
    }

    #[test]
    fn human_output_goes_to_the_given_writers() {
        control::set_override(false);
        let mut out = Vec::new();
        let mut err = Vec::new();
        let outcome = finish(&report(4_096), OutputMode::Human, &mut out, &mut err);
        assert_eq!(outcome, Outcome::Violation);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Warning: 4.00KB used in /data, which is beyond the limit of 1.00KB.\n"
        );
        assert!(err.is_empty());
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
