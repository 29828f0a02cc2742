//! # beam-report
//!
//! Command-line front end: reads a force table, builds the report and
//! renders it to PDF.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use report_core::config::{load_config, ReportConfig};
use report_core::pipeline::{load_table, prepare_report};
use report_core::render::{JsonModelRenderer, PdfRenderer, RenderAdapter};
use report_core::{FsImageLookup, ReportError, ReportResult};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Generate a beam force report (SFD/BMD) from tabular data",
    long_about = "Reads position, shear force and bending moment columns from a CSV, JSON or \
                  Excel table and renders a structural analysis report to PDF.\n\n\
                  EXAMPLES:\n  \
                  beam-report -i force_table.csv\n\n  \
                  beam-report -i force_table.csv --image ssbeam.png -o beam.pdf\n\n  \
                  beam-report -i data.json --config report.json --emit-model model.json"
)]
struct Args {
    /// Path to the force table (.csv, .json or .xlsx)
    #[arg(short, long)]
    input: PathBuf,

    /// Beam illustration to include in the introduction
    #[arg(long)]
    image: Option<PathBuf>,

    /// Output PDF path
    #[arg(short, long, default_value = "output.pdf")]
    output: PathBuf,

    /// JSON configuration file (metadata and render settings)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report title
    #[arg(long)]
    title: Option<String>,

    /// Report author
    #[arg(long)]
    author: Option<String>,

    /// Also write the report model as JSON
    #[arg(long)]
    emit_model: Option<PathBuf>,

    /// Keep the generated Typst source next to the PDF
    #[arg(long)]
    keep_source: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only show warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print errors as JSON on stderr
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over the verbosity flags.
fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the config file (if any) and apply command-line overrides.
fn resolve_config(args: &Args) -> ReportResult<ReportConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ReportConfig::default(),
    };

    if let Some(title) = &args.title {
        config.metadata.title = title.clone();
    }
    if let Some(author) = &args.author {
        config.metadata.author = author.clone();
    }
    if let Some(image) = &args.image {
        config.metadata.image_path = Some(image.clone());
    }
    if args.keep_source {
        config.render.keep_source = true;
    }
    if config.metadata.data_source.is_empty() {
        config.metadata.data_source = display_name(&args.input);
    }

    config.render.validate()?;
    Ok(config)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn run(args: &Args) -> ReportResult<()> {
    let config = resolve_config(args)?;
    info!(report_id = %config.metadata.short_id(), input = %args.input.display(), "generating report");

    let table = load_table(&args.input)?;
    let prepared = prepare_report(&table, &config.metadata, &FsImageLookup)?;

    PdfRenderer::new(config.render.clone()).render(&prepared.model, &args.output)?;

    if let Some(model_path) = &args.emit_model {
        if let Err(err) = JsonModelRenderer.render(&prepared.model, model_path) {
            remove_outputs(&args.output, config.render.keep_source);
            return Err(err);
        }
    }

    println!("Report written to {}", args.output.display());
    Ok(())
}

/// Undo a finished PDF render so a failed run leaves nothing behind.
fn remove_outputs(output: &Path, keep_source: bool) {
    let _ = fs::remove_file(output);
    if keep_source {
        let _ = fs::remove_file(output.with_extension("typ"));
    }
}

fn report_error(err: &ReportError, as_json: bool) {
    eprintln!("Error: {}", err);
    if as_json {
        if let Ok(json) = serde_json::to_string_pretty(err) {
            eprintln!();
            eprintln!("Error JSON:");
            eprintln!("{}", json);
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, args.json);
            ExitCode::from(err.exit_code())
        }
    }
}
