//! hmmspec - HMM specification builder
//!
//! Entry point for the `hmmspec` binary:
//! - Replaying command scripts into a specification
//! - Serializing to the wire map and decoding it back
//! - Configuration inspection and validation

use clap::{Args, Parser, Subcommand};
use hs_common::{format_error_human, Error, OutputFormat, SessionId, StructuredError, SCHEMA_VERSION};
use hs_core::config::{
    list_presets, load_config, load_config_file, ConfigError, ConfigOptions, ResolvedConfig,
};
use hs_core::exit_codes::ExitCode;
use hs_core::logging::{event_names, init_logging, LogConfig, LogFormat};
use hs_core::session::{EditSession, ReplaySummary};
use hs_core::wire::{self, HmmForm};
use hs_core::WireMap;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;

/// hmmspec - build and validate HMM specifications
#[derive(Parser)]
#[command(name = "hmmspec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Config directory holding builder.toml or builder.json
    /// (falls back to HMMSPEC_CONFIG_DIR)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use a built-in preset instead of any config file (default, legacy, strict)
    #[arg(long, global = true)]
    preset: Option<String>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a command script and print the wire map
    Run(RunArgs),

    /// Replay a command script and report vector statuses without serializing
    Check(CheckArgs),

    /// Decode a wire map JSON object into the structured form
    Decode(DecodeArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Script file, or '-' for stdin
    script: String,

    /// Also decode the wire map and include the structured form
    #[arg(long)]
    decode: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Script file, or '-' for stdin
    script: String,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Wire map JSON file, or '-' for stdin. A `run` envelope is accepted too.
    input: String,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective configuration and where it came from
    Show,
    /// List built-in presets
    Presets,
    /// Validate a config file, or the resolved configuration
    Validate {
        /// Config file to validate
        path: Option<PathBuf>,
    },
}

fn main() {
    // Usage errors exit with ERR_ARGS; 2 is reserved for rejected commands
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            std::process::exit(code.as_i32());
        }
    };

    // JSON output gets JSON log lines on stderr
    let log_format = if cli.global.format == OutputFormat::Json {
        Some(LogFormat::Jsonl)
    } else {
        None
    };
    let log_config = LogConfig::resolve(cli.global.verbose, cli.global.quiet, log_format);
    init_logging(&log_config);

    let exit_code = match &cli.command {
        Commands::Run(args) => run_script(&cli.global, args),
        Commands::Check(args) => run_check(&cli.global, args),
        Commands::Decode(args) => run_decode(&cli.global, args),
        Commands::Config(args) => run_config(&cli.global, args),
        Commands::Version => {
            print_version(&cli.global);
            ExitCode::Clean
        }
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Shared helpers
// ============================================================================

fn config_options(global: &GlobalOpts) -> ConfigOptions {
    ConfigOptions {
        config_dir: global.config.clone(),
        config_path: None,
        preset: global.preset.clone(),
    }
}

fn read_input(source: &str) -> Result<String, Error> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(source)?)
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("{{\"error\":\"serialization_failed\",\"message\":\"{}\"}}", e),
    }
}

fn envelope(session_id: &SessionId, command: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "session_id": session_id.0,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "command": command,
        "status": status,
    })
}

fn use_color(global: &GlobalOpts) -> bool {
    !global.no_color && std::io::stderr().is_terminal()
}

/// Report a failed command on stderr and map it to an exit code.
fn output_error(global: &GlobalOpts, command: &str, error: &Error) -> ExitCode {
    let exit_code = ExitCode::for_error(error);
    tracing::error!(event = event_names::INTERNAL_ERROR, command, code = error.code(), error = %error);

    match global.format {
        OutputFormat::Json => {
            let mut response = envelope(&SessionId::new(), command, "error");
            response["exit_code"] = serde_json::json!(exit_code.code_name());
            response["error"] = serde_json::to_value(StructuredError::from(error))
                .unwrap_or(serde_json::Value::Null);
            match serde_json::to_string_pretty(&response) {
                Ok(text) => eprintln!("{}", text),
                Err(_) => eprintln!("{}", StructuredError::from(error).to_json()),
            }
        }
        OutputFormat::Summary => {
            eprintln!("{} error [{}]: {}", command, error.code(), error);
        }
        OutputFormat::Exitcode => {}
        OutputFormat::Md => {
            eprintln!("{}", format_error_human(error, use_color(global)));
        }
    }

    exit_code
}

fn output_config_error(global: &GlobalOpts, command: &str, error: ConfigError) -> ExitCode {
    tracing::warn!(event = event_names::CONFIG_ERROR, error = %error, "configuration rejected");
    output_error(global, command, &Error::from(error))
}

fn load(global: &GlobalOpts, command: &str) -> Result<ResolvedConfig, ExitCode> {
    load_config(&config_options(global)).map_err(|e| output_config_error(global, command, e))
}

fn config_source_label(resolved: &ResolvedConfig) -> String {
    match (&resolved.path, resolved.preset) {
        (_, Some(preset)) => format!("preset '{}'", preset.as_str()),
        (Some(path), None) => format!("{} ({})", path.display(), resolved.source),
        (None, None) => "built-in defaults".to_string(),
    }
}

// ============================================================================
// run / check
// ============================================================================

fn replay(global: &GlobalOpts, command: &str, script: &str) -> Result<(ResolvedConfig, EditSession, ReplaySummary), ExitCode> {
    let resolved = load(global, command)?;
    let text = read_input(script).map_err(|e| output_error(global, command, &e))?;
    let mut session = EditSession::new(&resolved.config);
    let summary = session.run_script(&text);
    Ok((resolved, session, summary))
}

fn run_script(global: &GlobalOpts, args: &RunArgs) -> ExitCode {
    let (resolved, session, summary) = match replay(global, "run", &args.script) {
        Ok(replayed) => replayed,
        Err(code) => return code,
    };

    let wire_result = session.serialize();
    let decoded: Option<Result<HmmForm, Error>> = match (&wire_result, args.decode) {
        (Ok(wire_map), true) => Some(wire::decode(wire_map)),
        _ => None,
    };
    if let Some(Err(err)) = &decoded {
        // The serializer's own output must always decode.
        tracing::error!(event = event_names::INTERNAL_ERROR, error = %err, "serialized map failed to decode");
        output_error(global, "run", err);
        return ExitCode::InternalError;
    }

    let exit_code = ExitCode::for_outcome(summary.rejected, wire_result.is_ok());
    let status = if wire_result.is_ok() { "complete" } else { "incomplete" };
    let notices = session.notices();
    let problems = match &wire_result {
        Err(Error::IncompleteSpecification { problems }) => problems.clone(),
        _ => Vec::new(),
    };

    match global.format {
        OutputFormat::Json => {
            let mut response = envelope(session.id(), "run", status);
            response["exit_code"] = serde_json::json!(exit_code.code_name());
            response["config"] = serde_json::to_value(resolved.snapshot()).unwrap_or_default();
            response["summary"] = serde_json::to_value(summary).unwrap_or_default();
            response["notices"] = serde_json::to_value(&notices).unwrap_or_default();
            match &wire_result {
                Ok(wire_map) => response["wire"] = serde_json::json!(wire_map),
                Err(_) => response["problems"] = serde_json::json!(problems),
            }
            if let Some(Ok(form)) = &decoded {
                response["form"] = serde_json::to_value(form).unwrap_or_default();
            }
            print_json(&response);
        }
        OutputFormat::Summary => {
            println!(
                "[{}] run: {} ({} commands, {} rejected, {} problems)",
                session.id(),
                status,
                summary.commands,
                summary.rejected,
                problems.len()
            );
        }
        OutputFormat::Exitcode => {}
        OutputFormat::Md => {
            println!("# hmmspec run");
            println!();
            println!("Session: {}", session.id());
            println!("Config: {}", config_source_label(&resolved));
            println!("Status: **{}**", status);
            println!();
            print_summary_md(&summary);
            print_notices_md(&notices);
            if !problems.is_empty() {
                println!("## Problems");
                println!();
                for problem in &problems {
                    println!("- {}", problem);
                }
                println!();
            }
            if let Ok(wire_map) = &wire_result {
                print_wire_md(wire_map);
            }
        }
    }

    exit_code
}

fn run_check(global: &GlobalOpts, args: &CheckArgs) -> ExitCode {
    let (resolved, session, summary) = match replay(global, "check", &args.script) {
        Ok(replayed) => replayed,
        Err(code) => return code,
    };

    let report = session.report();
    let complete = report.problems.is_empty();
    let exit_code = ExitCode::for_outcome(summary.rejected, complete);
    let status = if complete { "complete" } else { "incomplete" };

    match global.format {
        OutputFormat::Json => {
            let mut response = envelope(session.id(), "check", status);
            response["exit_code"] = serde_json::json!(exit_code.code_name());
            response["config"] = serde_json::to_value(resolved.snapshot()).unwrap_or_default();
            response["summary"] = serde_json::to_value(summary).unwrap_or_default();
            response["report"] = serde_json::to_value(&report).unwrap_or_default();
            print_json(&response);
        }
        OutputFormat::Summary => {
            println!(
                "[{}] check: {} ({} states, {} notices, {} problems)",
                session.id(),
                status,
                report.states.len(),
                report.notices.len(),
                report.problems.len()
            );
        }
        OutputFormat::Exitcode => {}
        OutputFormat::Md => {
            println!("# hmmspec check");
            println!();
            println!("Session: {}", session.id());
            println!("Status: **{}**", status);
            println!();
            println!("## States");
            println!();
            println!("| # | Name | Mode | Components | Weights |");
            println!("|---|------|------|------------|---------|");
            for state in &report.states {
                let components: Vec<String> =
                    state.components.iter().map(|c| c.to_string()).collect();
                println!(
                    "| {} | {} | {} | {} | {} |",
                    state.index,
                    state.label,
                    state.mode,
                    components.join(", "),
                    state
                        .weights
                        .as_ref()
                        .map(|w| w.to_string())
                        .unwrap_or_else(|| "-".to_string())
                );
            }
            println!();
            if let Some(initial) = &report.initial_vector {
                println!("Initial vector: {}", initial);
            }
            for (i, row) in report.transition_rows.iter().enumerate() {
                println!("Transition row {}: {}", i + 1, row);
            }
            println!();
            print_summary_md(&summary);
            print_notices_md(&report.notices);
            if !report.problems.is_empty() {
                println!("## Problems");
                println!();
                for problem in &report.problems {
                    println!("- {}", problem);
                }
            }
        }
    }

    exit_code
}

fn print_summary_md(summary: &ReplaySummary) {
    println!(
        "Commands: {} applied, {} rejected, {} flagged (of {})",
        summary.applied, summary.rejected, summary.flagged, summary.commands
    );
    println!();
}

fn print_notices_md(notices: &[hs_core::session::Notice]) {
    if notices.is_empty() {
        return;
    }
    println!("## Notices");
    println!();
    for notice in notices {
        let line = notice
            .line
            .map(|l| format!(" (line {})", l))
            .unwrap_or_default();
        let level = match notice.level {
            hs_core::session::NoticeLevel::Blocking => "BLOCKING",
            hs_core::session::NoticeLevel::Warning => "warning",
        };
        println!("- {} {}{}: {}", level, notice.scope, line, notice.message);
    }
    println!();
}

fn print_wire_md(wire_map: &WireMap) {
    println!("## Wire map");
    println!();
    println!("```text");
    for (key, value) in wire_map {
        println!("{} = {}", key, value);
    }
    println!("```");
}

// ============================================================================
// decode
// ============================================================================

fn parse_wire(text: &str) -> Result<WireMap, Error> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let map = match value.get("wire") {
        Some(inner) => inner.clone(),
        None => value,
    };
    Ok(serde_json::from_value(map)?)
}

fn run_decode(global: &GlobalOpts, args: &DecodeArgs) -> ExitCode {
    let form = match read_input(&args.input)
        .and_then(|text| parse_wire(&text))
        .and_then(|wire_map| wire::decode(&wire_map))
    {
        Ok(form) => form,
        Err(e) => return output_error(global, "decode", &e),
    };

    match global.format {
        OutputFormat::Json => {
            let mut response = envelope(&SessionId::new(), "decode", "ok");
            response["form"] = serde_json::to_value(&form).unwrap_or_default();
            print_json(&response);
        }
        OutputFormat::Summary => {
            println!(
                "decode: {} states, {} transitions",
                form.states.len(),
                form.transition_probabilities.len()
            );
        }
        OutputFormat::Exitcode => {}
        OutputFormat::Md => {
            println!("# hmmspec decode");
            println!();
            if let Some(name) = &form.hmm_name {
                println!("Model: {}", name);
                println!();
            }
            for state in &form.states {
                let p = form
                    .initial_probability(&state.name)
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let components = state.components.len().max(1);
                println!(
                    "- {} ({:?}, {} component(s), initial p = {})",
                    state.name, state.com_type, components, p
                );
            }
        }
    }

    ExitCode::Clean
}

// ============================================================================
// config
// ============================================================================

fn run_config(global: &GlobalOpts, args: &ConfigArgs) -> ExitCode {
    match &args.command {
        ConfigCommands::Show => run_config_show(global),
        ConfigCommands::Presets => run_config_presets(global),
        ConfigCommands::Validate { path } => run_config_validate(global, path.as_ref()),
    }
}

/// Display the effective configuration (including defaults if no file is present).
fn run_config_show(global: &GlobalOpts) -> ExitCode {
    let resolved = match load(global, "config show") {
        Ok(r) => r,
        Err(code) => return code,
    };
    let snapshot = resolved.snapshot();

    match global.format {
        OutputFormat::Json => {
            let mut response = envelope(&SessionId::new(), "config show", "ok");
            response["source"] = serde_json::to_value(&snapshot).unwrap_or_default();
            response["config"] = serde_json::to_value(&resolved.config).unwrap_or_default();
            print_json(&response);
        }
        OutputFormat::Summary => {
            println!(
                "config: {} (hash {})",
                config_source_label(&resolved),
                snapshot.short_id()
            );
        }
        OutputFormat::Exitcode => {}
        OutputFormat::Md => {
            println!("# hmmspec config show");
            println!();
            println!("Source: {}", config_source_label(&resolved));
            println!("Hash: {}", snapshot.config_hash);
            println!();
            println!("- max states: {}", resolved.config.limits.max_states);
            println!(
                "- probabilities from: {} states",
                resolved.config.limits.min_states_for_probabilities
            );
            println!("- sum check: {}", resolved.config.sum_check.label());
            println!("- component indices: {}", resolved.config.component_indices);
            println!(
                "- uniform bounds enforced: {}",
                resolved.config.enforce_uniform_bounds
            );
            println!("- model name required: {}", resolved.config.require_model_name);
        }
    }

    ExitCode::Clean
}

fn run_config_presets(global: &GlobalOpts) -> ExitCode {
    let presets = list_presets();
    match global.format {
        OutputFormat::Json => {
            let mut response = envelope(&SessionId::new(), "config presets", "ok");
            response["presets"] = serde_json::to_value(&presets).unwrap_or_default();
            print_json(&response);
        }
        OutputFormat::Summary => {
            let names: Vec<&str> = presets.iter().map(|p| p.name.as_str()).collect();
            println!("presets: {}", names.join(", "));
        }
        OutputFormat::Exitcode => {}
        OutputFormat::Md => {
            println!("# Presets");
            println!();
            for preset in &presets {
                println!(
                    "- **{}**: {} (sum check {}, indices {})",
                    preset.name.as_str(),
                    preset.description,
                    preset.sum_check,
                    preset.component_indices
                );
            }
        }
    }
    ExitCode::Clean
}

/// Validate one config file, or whatever the standard resolution finds.
fn run_config_validate(global: &GlobalOpts, path: Option<&PathBuf>) -> ExitCode {
    let (config, source) = match path {
        Some(path) => match load_config_file(path) {
            Ok(config) => (config, path.display().to_string()),
            Err(e) => return output_config_error(global, "config validate", e),
        },
        None => match load(global, "config validate") {
            Ok(resolved) => {
                let label = config_source_label(&resolved);
                (resolved.config, label)
            }
            Err(code) => return code,
        },
    };

    match global.format {
        OutputFormat::Json => {
            let mut response = envelope(&SessionId::new(), "config validate", "valid");
            response["source"] = serde_json::json!(source);
            response["config"] = serde_json::to_value(&config).unwrap_or_default();
            print_json(&response);
        }
        OutputFormat::Summary => println!("config validate: OK ({})", source),
        OutputFormat::Exitcode => {}
        OutputFormat::Md => {
            println!("# Configuration Validation");
            println!();
            println!("Status: valid");
            println!("Source: {}", source);
        }
    }

    ExitCode::Clean
}

fn print_version(global: &GlobalOpts) {
    match global.format {
        OutputFormat::Json => {
            print_json(&serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "hmmspec_version": env!("CARGO_PKG_VERSION"),
                "rust_version": env!("CARGO_PKG_RUST_VERSION"),
                "config_schema_version": hs_config::CONFIG_SCHEMA_VERSION,
            }));
        }
        OutputFormat::Exitcode => {}
        _ => {
            println!("hmmspec {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}
