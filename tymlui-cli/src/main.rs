use std::fmt::Write as FmtWrite;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};
use color_eyre::eyre::{Result, WrapErr, eyre};
use serde_json::Value;
use tracing::{debug, info};

use tymlui::{
    ArrayDefault, DocumentFormat, OutputDestination, OutputOptions, SessionParams, TymlUI,
    TypeRegistry, UiOptions,
    io::input::{parse_document_any, read_type_registry},
    logging::{LogConfig, LogFormat, init_logging},
};

#[derive(Debug, Parser)]
#[command(
    name = "tymlui",
    version,
    about = "Edit typed JSON documents in an interactive TUI"
)]
struct Cli {
    /// Document to edit: a file path or "-" for stdin
    #[arg(short = 's', long = "source", value_name = "SPEC")]
    source: Option<String>,

    /// Type of the document, or of a fresh document when no source is given
    #[arg(short = 't', long = "type", value_name = "NAME")]
    type_name: Option<String>,

    /// Type registry file ({"types": [...]}); defaults to the built-in types
    #[arg(short = 'r', long = "registry", value_name = "PATH")]
    registry: Option<PathBuf>,

    /// Session parameters as a query string, e.g. "?source=a.json&type=FStab"
    #[arg(short = 'q', long = "query", value_name = "QUERY")]
    query: Option<String>,

    /// Title shown at the top of the UI
    #[arg(long = "title", value_name = "TEXT")]
    title: Option<String>,

    /// Output destinations ("-" writes to stdout). Defaults to stdout.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DEST",
        num_args = 1..,
        action = ArgAction::Append
    )]
    outputs: Vec<String>,

    /// Emit compact JSON/TOML rather than pretty formatting
    #[arg(long = "no-pretty")]
    no_pretty: bool,

    /// Overwrite output files even if they already exist
    #[arg(short = 'f', long = "force", short_alias = 'y', alias = "yes")]
    force: bool,

    /// What new arrays start with
    #[arg(long = "array-default", value_enum, default_value_t = ArrayDefaultArg::Single)]
    array_default: ArrayDefaultArg,

    /// Hide the JSON panel
    #[arg(long = "no-mirror")]
    no_mirror: bool,

    /// Print the names of the registered types and exit
    #[arg(long = "list-types")]
    list_types: bool,

    /// More log detail (-v debug, -vv trace); only used with --log-file
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Write logs to this file
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log line format
    #[arg(long = "log-format", value_enum, default_value_t = LogFormatArg::Pretty)]
    log_format: LogFormatArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ArrayDefaultArg {
    Empty,
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose)
        .with_format(match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        })
        .with_log_file(cli.log_file.clone());
    init_logging(&log_config).wrap_err("failed to initialize logging")?;

    let types = match &cli.registry {
        Some(path) => read_type_registry(path).map_err(|err| eyre!("{err:#}"))?,
        None => TypeRegistry::builtin(),
    };
    if cli.list_types {
        for name in types.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let mut diagnostics = DiagnosticCollector::default();
    let mut params = SessionParams::parse(cli.query.as_deref().unwrap_or_default());
    let mut stdin_value = None;
    match cli.source.as_deref() {
        Some("-") => match read_stdin() {
            Ok(value) => {
                params.remove("source");
                stdin_value = Some(value);
            }
            Err(err) => diagnostics.push_input("source", format!("{err:#}")),
        },
        Some(path) if path.trim().is_empty() => {
            diagnostics.push_input("source", "source path cannot be empty")
        }
        Some(path) => params.set("source", path),
        None => {}
    }
    if let Some(name) = &cli.type_name {
        params.set("type", name.as_str());
    }

    let source_format = params
        .get("source")
        .and_then(|source| DocumentFormat::from_path(Path::new(source)));
    let (output, output_paths) = build_output_options(&cli, source_format, &mut diagnostics);
    ensure_output_paths_available(&output_paths, cli.force, &mut diagnostics);
    diagnostics.into_result()?;

    let array_default = match cli.array_default {
        ArrayDefaultArg::Empty => ArrayDefault::Empty,
        ArrayDefaultArg::Single => ArrayDefault::SingleElement,
    };
    let options = UiOptions::default()
        .with_array_default(array_default)
        .with_mirror(!cli.no_mirror);
    debug!(?options, params = %params, "parsed command line");

    let mut ui = TymlUI::new(types)
        .with_params(params)
        .with_options(options)
        .with_output(output);
    if let Some(value) = stdin_value {
        ui = ui.with_value(value);
    }
    if let Some(title) = cli.title.as_ref() {
        ui = ui.with_title(title.clone());
    }

    ui.run().map_err(|err| eyre!("{err:#}"))?;
    info!("finished");
    Ok(())
}

fn read_stdin() -> Result<Value> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .wrap_err("failed to read from stdin")?;
    parse_document_any(&buffer, DocumentFormat::default()).map_err(|err| eyre!("{err:#}"))
}

#[derive(Default)]
struct DiagnosticCollector {
    messages: Vec<String>,
}

impl DiagnosticCollector {
    fn push_input(&mut self, label: &str, message: impl Into<String>) {
        self.messages
            .push(format!("input ({label}): {}", message.into()));
    }

    fn push_output(&mut self, message: impl Into<String>) {
        self.messages.push(format!("output: {}", message.into()));
    }

    fn into_result(self) -> Result<()> {
        if self.messages.is_empty() {
            return Ok(());
        }
        let mut body = String::from("encountered input/output issues:\n");
        for (idx, msg) in self.messages.iter().enumerate() {
            let _ = writeln!(body, "  {}. {}", idx + 1, msg);
        }
        Err(eyre!(body))
    }
}

/// Destinations from `-o`, stdout when none are given. Files decide the
/// format from their extensions; stdout follows the source document.
fn build_output_options(
    cli: &Cli,
    source_format: Option<DocumentFormat>,
    diagnostics: &mut DiagnosticCollector,
) -> (OutputOptions, Vec<PathBuf>) {
    let mut destinations = Vec::new();
    for raw in &cli.outputs {
        if raw.trim().is_empty() {
            diagnostics.push_output("output destination cannot be empty");
        } else if raw == "-" {
            destinations.push(OutputDestination::Stdout);
        } else {
            destinations.push(OutputDestination::file(raw));
        }
    }
    if cli.outputs.is_empty() {
        destinations.push(OutputDestination::Stdout);
    }

    let file_paths: Vec<PathBuf> = destinations
        .iter()
        .filter_map(|dest| match dest {
            OutputDestination::File(path) => Some(path.clone()),
            OutputDestination::Stdout => None,
        })
        .collect();

    let format = if file_paths.is_empty() {
        source_format.unwrap_or_default()
    } else {
        infer_format_from_files(&file_paths, diagnostics).unwrap_or_default()
    };

    let options = OutputOptions::new(format)
        .with_pretty(!cli.no_pretty)
        .with_destinations(destinations);
    (options, file_paths)
}

fn infer_format_from_files(
    file_paths: &[PathBuf],
    diagnostics: &mut DiagnosticCollector,
) -> Option<DocumentFormat> {
    let mut detected: Option<DocumentFormat> = None;
    for path in file_paths {
        match DocumentFormat::from_path(path) {
            Some(format) => match detected {
                Some(existing) if existing != format => diagnostics.push_output(format!(
                    "output file {} uses {format} but other destinations use {existing}; align extensions",
                    path.display()
                )),
                Some(_) => {}
                None => detected = Some(format),
            },
            None => diagnostics.push_output(format!(
                "cannot infer format from output file {}; use {}",
                path.display(),
                extension_list()
            )),
        }
    }
    detected
}

fn extension_list() -> String {
    DocumentFormat::available_formats()
        .into_iter()
        .map(|format| format!(".{format}"))
        .collect::<Vec<_>>()
        .join("/")
}

fn ensure_output_paths_available(
    paths: &[PathBuf],
    force: bool,
    diagnostics: &mut DiagnosticCollector,
) {
    if force {
        return;
    }
    for path in paths {
        if path.exists() {
            diagnostics.push_output(format!(
                "file {} already exists (pass --force to overwrite)",
                path.display()
            ));
        }
    }
}
