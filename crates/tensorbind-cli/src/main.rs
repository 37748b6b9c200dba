use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use glob::glob;
use serde::Serialize;
use tensorbind_core::{
    DecodeError, Decoder, DecoderOptions, DynamicRecord, InferResponse, ModelInferResponse,
    ShapeStrategy, classify_shape, dispatch,
};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("TENSORBIND_BUILD_COMMIT"),
    " ",
    env!("TENSORBIND_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "tensorbind")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Offline decoder for inference response dumps (KServe v2 style raw outputs).",
    long_about = None,
    after_help = "Examples:\n  tensorbind response inspect response.json\n  tensorbind response decode response.json --field scores=Vec<f32> --stdout\n  tensorbind response decode response.json -f top=i64 -o record.json"
)]
struct Cli {
    /// Log decoder activity to stderr (same as RUST_LOG=tensorbind_core=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on JSON response dumps.
    Response {
        #[command(subcommand)]
        command: ResponseCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ResponseCommands {
    /// List each output with its datatype, shape class and payload size.
    Inspect {
        /// Path to a response dump (.json)
        input: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Decode outputs into named, typed fields and write them as JSON.
    #[command(
        after_help = "Field types: bool u8 u16 u32 i8 i16 i32 i64 f32 f64 String,\nwrapped as T, Vec<T> or Vec<Vec<T>>.\n\nExamples:\n  tensorbind response decode response.json --field scores=Vec<f32> --stdout\n  tensorbind response decode response.json -f boxes=Vec<Vec<f32>> -f count=i32 -o record.json"
    )]
    Decode {
        /// Path to a response dump (.json)
        input: PathBuf,

        /// Bind an output to a typed field: name=type (repeatable)
        #[arg(short = 'f', long = "field", value_name = "NAME=TYPE", required = true)]
        fields: Vec<String>,

        /// Fail when a bound field has no output in the response
        #[arg(long)]
        strict: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write JSON to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Response { command } => match command {
            ResponseCommands::Inspect { input, output } => cmd_response_inspect(&input, &output),
            ResponseCommands::Decode {
                input,
                fields,
                strict,
                output,
            } => cmd_response_decode(&input, &fields, strict, &output),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("tensorbind_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

impl From<DecodeError> for CliError {
    fn from(err: DecodeError) -> Self {
        let hint = match &err {
            DecodeError::InvalidTarget { .. } => {
                Some("fields look like name=type, e.g. scores=Vec<f32>".to_string())
            }
            DecodeError::TypeMismatch { actual, .. } => {
                Some(format!("declare the field as {}", actual))
            }
            DecodeError::UnknownDatatype { .. } => Some(
                "known datatypes: BOOL UINT8 UINT16 UINT32 INT8 INT16 INT32 INT64 FLOAT16 FLOAT32 FLOAT64 STRING"
                    .to_string(),
            ),
            DecodeError::UnsupportedRank { .. } | DecodeError::InvalidDimension { .. } => {
                Some("only shapes [n], [1,n] and [m,n] can be decoded".to_string())
            }
            DecodeError::MissingOutput { .. } => {
                Some("run `tensorbind response inspect` to list output names".to_string())
            }
            DecodeError::InvalidResponse { .. } => {
                Some("raw_output_contents must hold one payload per output".to_string())
            }
            _ => None,
        };
        CliError::new(err.to_string(), hint)
    }
}

#[derive(Debug, Serialize)]
struct InspectReport {
    model_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    model_version: String,
    outputs: Vec<InspectedOutput>,
}

#[derive(Debug, Serialize)]
struct InspectedOutput {
    index: usize,
    name: String,
    datatype: String,
    shape: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<ShapeStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn inspect(response: &ModelInferResponse) -> InspectReport {
    let contents = response.raw_output_contents();
    let outputs = response
        .outputs()
        .iter()
        .enumerate()
        .map(|(index, output)| {
            let payload_bytes = contents.get(index).map(Vec::len);
            let mut entry = InspectedOutput {
                index,
                name: output.name.clone(),
                datatype: output.datatype.clone(),
                shape: output.shape.clone(),
                layout: None,
                kind: None,
                payload_bytes,
                error: None,
            };
            match classify_shape(&output.shape) {
                Ok(strategy) => {
                    entry.layout = Some(strategy);
                    match dispatch(&output.datatype, strategy) {
                        Ok(routine) => entry.kind = Some(routine.kind().to_string()),
                        Err(err) => entry.error = Some(err.to_string()),
                    }
                }
                Err(err) => entry.error = Some(err.to_string()),
            }
            if entry.error.is_none() && payload_bytes.is_none() {
                entry.error = Some("no raw content at this index".to_string());
            }
            entry
        })
        .collect();

    InspectReport {
        model_name: response.model_name.clone(),
        model_version: response.model_version.clone(),
        outputs,
    }
}

fn cmd_response_inspect(input: &Path, output: &OutputArgs) -> Result<(), CliError> {
    let (resolved_input, response) = load_response(input, output)?;
    let report = inspect(&response);
    let json = serialize_json(&report, output)?;
    tracing::debug!(
        input = %resolved_input.display(),
        outputs = report.outputs.len(),
        "inspected response"
    );
    emit(json, output)
}

fn cmd_response_decode(
    input: &Path,
    fields: &[String],
    strict: bool,
    output: &OutputArgs,
) -> Result<(), CliError> {
    let mut record = DynamicRecord::from_specs(fields)?;
    let (_, response) = load_response(input, output)?;

    let decoder = Decoder::new(DecoderOptions {
        strict_names: strict,
    });
    decoder.decode(&response, &mut record)?;

    let json = serialize_json(&record, output)?;
    emit(json, output)
}

fn load_response(
    input: &Path,
    output: &OutputArgs,
) -> Result<(PathBuf, ModelInferResponse), CliError> {
    let resolved_input = resolve_input_path(input)?;
    validate_input_file(&resolved_input)?;
    if let Some(report) = output.report.as_deref() {
        ensure_distinct_paths(&resolved_input, report)?;
    }

    let json = fs::read_to_string(&resolved_input)
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;
    let response = ModelInferResponse::from_json(&json).map_err(|err| {
        CliError::new(
            format!(
                "invalid response dump {}: {}",
                resolved_input.display(),
                err
            ),
            Some("expected {\"outputs\": [...], \"raw_output_contents\": [...]}".to_string()),
        )
    })?;
    Ok((resolved_input, response))
}

fn ensure_distinct_paths(input: &Path, report: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let report_dir = match report.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // A missing output directory cannot contain the input.
    let Ok(report_dir) = fs::canonicalize(report_dir) else {
        return Ok(());
    };
    let file_name = report
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path: {}", report.display()))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!("report path must differ from input: {}", report.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn serialize_json<T: Serialize>(value: &T, output: &OutputArgs) -> Result<String, CliError> {
    if output.pretty && output.compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if output.pretty {
        serde_json::to_string_pretty(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn emit(json: String, output: &OutputArgs) -> Result<(), CliError> {
    if output.stdout {
        println!("{}", json);
        return Ok(());
    }

    let report = output.report.as_ref().ok_or_else(|| {
        CliError::new(
            "missing output path",
            Some("use -o/--report or --stdout".to_string()),
        )
    })?;
    if let Some(parent) = report.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(report, json)
        .with_context(|| format!("Failed to write report: {}", report.display()))?;

    if !output.quiet {
        eprintln!("OK: report written -> {}", report.display());
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a JSON response dump".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a JSON response dump".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "json" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .json response dump".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected a .json dump".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut message = format!(
                "multiple files match pattern '{}' ({} matches); matches: ",
                pattern, count
            );
            message.push_str(
                &matches
                    .iter()
                    .take(3)
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            );
            if count > 3 {
                message.push_str(", ...");
            }
            Err(CliError::new(
                message,
                Some("pass a single response file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
