//! Rhythm CLI - Command-line interface for Synheart Rhythm
//!
//! Commands:
//! - analyze: Analyze a recorded session log into a rhythm report
//! - validate: Check a session log without analyzing it
//! - schema: Print the session log / report shapes
//! - doctor: Diagnose installation and configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use synheart_rhythm::session::MIN_EVENTS;
use synheart_rhythm::{
    Report, RhythmAnalyzer, RhythmConfig, RhythmError, SessionLog, PRODUCER_NAME,
    RHYTHM_VERSION,
};

/// Rhythm - On-device keystroke rhythm analysis
#[derive(Parser)]
#[command(name = "rhythm")]
#[command(author = "Synheart AI Inc")]
#[command(version = RHYTHM_VERSION)]
#[command(about = "Analyze keystroke rhythm of a typing session", long_about = None)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a session log into a rhythm report
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,

        /// Analyzer thresholds as JSON (defaults when absent)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a session log without analyzing it
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,
    },

    /// Diagnose installation and configuration
    Doctor {
        /// Check a config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Human-readable summary
    Text,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (session log)
    Input,
    /// Output schema (rhythm report)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(rust_log.as_deref(), verbose))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// `RUST_LOG` directives when set, `warn` otherwise; `--verbose` adds `debug`
fn env_filter(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    let filter = rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    if verbose {
        filter.add_directive(Level::DEBUG.into())
    } else {
        filter
    }
}

fn run(cli: Cli) -> Result<(), RhythmCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            format,
            config,
        } => cmd_analyze(&input, &output, format, config.as_deref()),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Schema { schema_type } => cmd_schema(schema_type),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn read_input(input: &Path) -> Result<String, RhythmCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn load_config(path: Option<&Path>) -> Result<RhythmConfig, RhythmCliError> {
    match path {
        Some(path) => Ok(RhythmConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(RhythmConfig::default()),
    }
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    format: OutputFormat,
    config: Option<&Path>,
) -> Result<(), RhythmCliError> {
    let analyzer = RhythmAnalyzer::with_config(load_config(config)?)?;

    let input_data = read_input(input)?;
    let session = SessionLog::parse(&input_data)?.into_frozen()?;
    let report = analyzer.analyze(&session);

    let output_data = format_output(&report, &format)?;
    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn format_output(report: &Report, format: &OutputFormat) -> Result<String, RhythmCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(report)? + "\n"),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(report)? + "\n"),
        OutputFormat::Text => Ok(format_text(report)),
    }
}

fn format_text(report: &Report) -> String {
    let pattern = report.pause_pattern.pattern;
    let mut lines = vec![
        "Rhythm Report".to_string(),
        "=============".to_string(),
        format!(
            "Rhythm type:   {} ({})",
            report.rhythm_type,
            report.rhythm_type.interpretation()
        ),
        format!(
            "Fluency:       {} ({:.3})",
            report.fluency_level, report.fluency_score
        ),
        format!("Pause pattern: {} ({})", pattern, pattern.interpretation()),
        format!("Duration:      {:.2}s", report.duration_seconds),
        format!("Speed:         {:.1} chars/min", report.chars_per_minute),
        format!("Consistency:   {:.3}", report.consistency),
        format!(
            "Keystrokes:    {} for {} chars (ratio {:.2}, {})",
            report.total_keystrokes,
            report.actual_chars,
            report.keystroke_ratio,
            report.detected_modality.as_str()
        ),
        format!(
            "Deletions:     {} ({:.1}%)",
            report.deletion_count,
            report.deletion_ratio * 100.0
        ),
        format!(
            "Pauses:        {} short, {} medium, {} long",
            report.pause_pattern.short_pauses,
            report.pause_pattern.medium_pauses,
            report.pause_pattern.long_pauses
        ),
        format!("Hesitations:   {}", report.hesitation_count),
        format!("Bursts:        {}", report.burst_count),
        format!(
            "Text rhythm:   {} ({} sentences)",
            report.text_rhythm.rhythm_category.as_str(),
            report.text_rhythm.sentence_count
        ),
    ];
    lines.push(String::new());
    lines.join("\n")
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), RhythmCliError> {
    let input_data = read_input(input)?;

    let mut report = ValidationReport {
        valid: false,
        total_events: 0,
        duration_seconds: None,
        error: None,
    };

    match SessionLog::parse(&input_data) {
        Ok(log) => {
            report.total_events = log.events.len();
            match log.into_frozen() {
                Ok(session) => {
                    report.valid = true;
                    report.duration_seconds = Some(session.duration_sec());
                }
                Err(e) => report.error = Some(e.to_string()),
            }
        }
        Err(e) => report.error = Some(e.to_string()),
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total events: {}", report.total_events);
        if let Some(duration) = report.duration_seconds {
            println!("Duration:     {:.2}s", duration);
        }
        println!("Valid:        {}", report.valid);
        if let Some(error) = &report.error {
            println!("\nError: {}", error);
        }
    }

    match report.error {
        Some(error) => Err(RhythmCliError::ValidationFailed(error)),
        None => Ok(()),
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), RhythmCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "rhythm_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Rhythm version {}", RHYTHM_VERSION),
    });

    checks.push(DoctorCheck {
        name: "minimum_input".to_string(),
        status: CheckStatus::Ok,
        message: format!("Sessions need at least {} events and non-blank text", MIN_EVENTS),
    });

    // Check config file if provided
    if let Some(config_path) = config {
        let check = if config_path.exists() {
            match fs::read_to_string(config_path) {
                Ok(content) => match RhythmConfig::from_json(&content) {
                    Ok(config) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Config valid (pauses {}/{}/{}s, burst < {}s x{})",
                            config.short_pause_min_sec,
                            config.medium_pause_min_sec,
                            config.long_pause_min_sec,
                            config.burst_interval_max_sec,
                            config.burst_min_length
                        ),
                    },
                    Err(e) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: e.to_string(),
                    },
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read config file: {}", e),
                },
            }
        } else {
            DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist".to_string(),
            }
        };
        checks.push(check);
    } else {
        checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: "Using default thresholds".to_string(),
        });
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass -i <file>)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (-i - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: RHYTHM_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Rhythm Doctor Report");
        println!("====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!();
        for check in &report.checks {
            let symbol = match check.status {
                CheckStatus::Ok => "✓",
                CheckStatus::Warning => "!",
                CheckStatus::Error => "✗",
            };
            println!("[{}] {}: {}", symbol, check.name, check.message);
        }
    }

    if report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error))
    {
        Err(RhythmCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType) -> Result<(), RhythmCliError> {
    let schema = match schema_type {
        SchemaType::Input => input_json_schema(),
        SchemaType::Output => output_json_schema(),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn input_json_schema() -> serde_json::Value {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "rhythm.session_log",
        "description": "Recorded keystroke session",
        "type": "object",
        "required": ["final_text", "events"],
        "properties": {
            "start_time": { "type": "integer", "minimum": 0, "description": "milliseconds" },
            "end_time": { "type": "integer", "minimum": 0, "description": "milliseconds" },
            "final_text": { "type": "string" },
            "events": {
                "type": "array",
                "minItems": MIN_EVENTS,
                "items": {
                    "type": "object",
                    "required": ["kind", "timestamp"],
                    "properties": {
                        "kind": {
                            "type": "string",
                            "enum": [
                                "type",
                                "backspace",
                                "delete",
                                "composition",
                                "composition_delete",
                                "composition_confirm"
                            ]
                        },
                        "char": { "type": "string" },
                        "timestamp": { "type": "integer", "minimum": 0 },
                        "is_ime": { "type": "boolean" }
                    }
                }
            }
        }
    })
}

fn output_json_schema() -> serde_json::Value {
    let number = serde_json::json!({ "type": "number" });
    let integer = serde_json::json!({ "type": "integer", "minimum": 0 });
    let array = serde_json::json!({ "type": "array", "items": { "type": "object" } });

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "rhythm.report",
        "description": "Keystroke rhythm report",
        "type": "object",
        "properties": {
            "timestamp": { "type": "string", "format": "date-time" },
            "duration_seconds": number,
            "chars_per_minute": number,
            "pause_pattern": {
                "type": "object",
                "properties": {
                    "short_pauses": integer,
                    "medium_pauses": integer,
                    "long_pauses": integer,
                    "pattern": {
                        "type": "string",
                        "enum": ["continuous", "choppy", "thoughtful", "contemplative"]
                    }
                }
            },
            "consistency": number,
            "text_rhythm": { "type": "object" },
            "rhythm_type": {
                "type": "string",
                "enum": [
                    "steady_fast", "burst_fast", "erratic_fast", "steady_slow", "hesitant",
                    "labored", "fluid", "measured", "uneven", "balanced"
                ]
            },
            "total_keystrokes": integer,
            "actual_chars": integer,
            "keystroke_ratio": number,
            "avg_interval": number,
            "deletion_count": integer,
            "deletion_ratio": number,
            "deletion_patterns": array,
            "burst_count": integer,
            "burst_segments": array,
            "max_burst_speed": number,
            "hesitation_count": integer,
            "hesitation_locations": { "type": "array", "items": integer },
            "hesitations": array,
            "fluency_score": number,
            "fluency_level": {
                "type": "string",
                "enum": ["very_fluent", "fluent", "normal", "hesitant"]
            },
            "detected_modality": { "type": "string", "enum": ["direct", "ime"] },
            "ime_events": integer,
            "ime_event_ratio": number,
            "typing_trajectory": array
        }
    })
}

// Error types
#[derive(Debug)]
enum RhythmCliError {
    Io(io::Error),
    Rhythm(RhythmError),
    Json(serde_json::Error),
    ValidationFailed(String),
    DoctorFailed,
}

impl From<io::Error> for RhythmCliError {
    fn from(e: io::Error) -> Self {
        RhythmCliError::Io(e)
    }
}

impl From<RhythmError> for RhythmCliError {
    fn from(e: RhythmError) -> Self {
        RhythmCliError::Rhythm(e)
    }
}

impl From<serde_json::Error> for RhythmCliError {
    fn from(e: serde_json::Error) -> Self {
        RhythmCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<RhythmCliError> for CliError {
    fn from(e: RhythmCliError) -> Self {
        match e {
            RhythmCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            RhythmCliError::Rhythm(e) => {
                let (code, hint) = match &e {
                    RhythmError::InsufficientInput(_) => (
                        "INSUFFICIENT_INPUT",
                        "Record more keystrokes and non-blank final text",
                    ),
                    RhythmError::InvalidConfig(_) => {
                        ("INVALID_CONFIG", "Run 'rhythm doctor --config <file>' for details")
                    }
                    RhythmError::InvalidEventLog(_) => {
                        ("INVALID_EVENT_LOG", "Run 'rhythm validate' for details")
                    }
                    RhythmError::InvalidState(_) => ("INVALID_STATE", "Begin a new session"),
                    RhythmError::ParseError(_) | RhythmError::JsonError(_) => (
                        "PARSE_ERROR",
                        "Ensure input matches 'rhythm schema input'",
                    ),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            RhythmCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            RhythmCliError::ValidationFailed(message) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message,
                hint: Some("Fix the session log and retry".to_string()),
            },
            RhythmCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types
#[derive(serde::Serialize)]
struct ValidationReport {
    valid: bool,
    total_events: usize,
    duration_seconds: Option<f64>,
    error: Option<String>,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::prelude::*;

    fn enabled_with(rust_log: Option<&str>, verbose: bool, level: Level) -> bool {
        let subscriber = tracing_subscriber::registry().with(env_filter(rust_log, verbose));
        tracing::subscriber::with_default(subscriber, || {
            if level == Level::TRACE {
                tracing::enabled!(Level::TRACE)
            } else if level == Level::DEBUG {
                tracing::enabled!(Level::DEBUG)
            } else if level == Level::INFO {
                tracing::enabled!(Level::INFO)
            } else if level == Level::WARN {
                tracing::enabled!(Level::WARN)
            } else {
                tracing::enabled!(Level::ERROR)
            }
        })
    }

    #[test]
    fn test_global_rust_log_level_is_honoured() {
        assert!(enabled_with(Some("debug"), false, Level::DEBUG));
        assert!(enabled_with(Some("trace"), false, Level::TRACE));
        assert!(!enabled_with(Some("error"), false, Level::WARN));
    }

    #[test]
    fn test_default_level_is_warn() {
        assert!(enabled_with(None, false, Level::WARN));
        assert!(!enabled_with(None, false, Level::INFO));
        assert!(!enabled_with(Some("  "), false, Level::INFO));
    }

    #[test]
    fn test_verbose_enables_debug() {
        assert!(enabled_with(None, true, Level::DEBUG));
        assert!(enabled_with(Some("info"), true, Level::DEBUG));
    }
}
