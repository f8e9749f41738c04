// LogScope - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading (config.toml, --config override)
// 3. Logging initialisation (debug mode support)
// 4. Dispatch to the analyze / formats / parse-line commands

use clap::{Parser, Subcommand};
use logscope::app::session;
use logscope::core::export;
use logscope::core::model::{FormatSelector, LogFormat};
use logscope::core::parser::LineParser;
use logscope::core::registry::FormatRegistry;
use logscope::core::report;
use logscope::platform::config::{self, AppConfig, PlatformPaths};
use logscope::util::error::{ConfigError, ExportError, LogScopeError, Result};
use logscope::util::{constants, logging};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// LogScope - Multi-format web and application log analyser.
///
/// Detects the format of each line, aggregates traffic statistics and
/// flags error responses, oversized responses and suspicious paths.
#[derive(Parser, Debug)]
#[command(name = "LogScope", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Configuration file to use instead of the platform default.
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse a log file and print the report.
    Analyze {
        /// Log file to analyse.
        file: PathBuf,

        /// Format selector: auto, apache, nginx, common, combined or custom.
        #[arg(short = 'f', long = "format")]
        format: Option<String>,

        /// Also write the text report to this file.
        #[arg(long = "report")]
        report: Option<PathBuf>,

        /// Export analysis, anomalies and an entry sample as JSON.
        #[arg(long = "json")]
        json: Option<PathBuf>,

        /// Export every entry as CSV.
        #[arg(long = "csv")]
        csv: Option<PathBuf>,
    },

    /// List the supported log formats.
    Formats,

    /// Parse a single line and print the extracted fields as JSON.
    ParseLine {
        /// The raw log line.
        line: String,

        /// Format selector: auto, apache, nginx, common, combined or custom.
        #[arg(short = 'f', long = "format")]
        format: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Config is read before logging starts so its [logging] level applies;
    // problems found while loading are logged once the subscriber exists.
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PlatformPaths::resolve().config_file());
    let (app_config, config_warnings) = config::load_config(&config_path);

    logging::init(cli.debug, app_config.log_level.as_deref());

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "LogScope starting"
    );
    for warning in config_warnings {
        // An explicitly requested config that cannot be read is fatal;
        // the platform default silently falls back.
        let unreadable = !matches!(warning, ConfigError::ValueOutOfRange { .. });
        if cli.config.is_some() && unreadable {
            fail(LogScopeError::from(warning));
        }
        tracing::warn!(error = %warning, "Configuration warning");
    }

    if let Err(e) = run(cli.command, &app_config) {
        fail(e);
    }
}

fn fail(e: LogScopeError) -> ! {
    tracing::error!(error = %e, "Command failed");
    eprintln!("Error: {e}");
    std::process::exit(1);
}

fn run(command: Command, app_config: &AppConfig) -> Result<()> {
    match command {
        Command::Analyze {
            file,
            format,
            report,
            json,
            csv,
        } => {
            let selector = format.as_deref().map(FormatSelector::parse);
            let session = session::analyze_file(&file, app_config, selector)?;
            let anomalies = session.anomalies();

            let text = report::render(&session.analysis, &anomalies);
            write_stdout(&text)?;

            if let Some(path) = report {
                export::export_report(
                    &session.analysis,
                    &anomalies,
                    create_export(&path)?,
                    &path,
                )?;
            }
            if let Some(path) = json {
                export::export_json(
                    &session.analysis,
                    &anomalies,
                    &session.entries,
                    app_config.export_sample_entries,
                    create_export(&path)?,
                    &path,
                )?;
            }
            if let Some(path) = csv {
                export::export_csv(&session.entries, create_export(&path)?, &path)?;
            }
            Ok(())
        }

        Command::Formats => {
            let mut text = format!(
                "{:<10} Try every format in priority order\n",
                constants::DEFAULT_FORMAT_SELECTOR
            );
            for format in LogFormat::all() {
                text.push_str(&format!("{:<10} {}\n", format.name(), format.description()));
            }
            write_stdout(&text)
        }

        Command::ParseLine { line, format } => {
            let selector = format
                .as_deref()
                .map(FormatSelector::parse)
                .unwrap_or_else(|| app_config.default_format.clone());
            if let FormatSelector::Unrecognised(name) = &selector {
                tracing::warn!(selector = %name, "Unrecognised format selector");
            }

            let registry = FormatRegistry::builtin();
            let entry = LineParser::new(&registry).parse(line.trim(), &selector);
            let json = serde_json::to_string_pretty(&entry).map_err(|e| ExportError::Json {
                path: PathBuf::from("<stdout>"),
                source: e,
            })?;
            write_stdout(&format!("{json}\n"))
        }
    }
}

/// Open an export destination for buffered writing.
fn create_export(path: &Path) -> std::result::Result<BufWriter<File>, ExportError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| ExportError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| LogScopeError::Io {
            path: PathBuf::from("<stdout>"),
            operation: "write",
            source: e,
        })
}
