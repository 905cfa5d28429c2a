use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};

use annotations::config::{ConfigError, LayoutConfig};
use annotations::highlight::lines_under_highlight;
use annotations::layout::window;
use annotations::{DocError, Document, DocumentSnapshot, ErrorCode, Point, ProcessedLine, TextBlock, layout};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("invalid JSON in {path}: {source}")]
    Json { path: String, source: serde_json::Error },
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("document error [{code}]: {0}", code = .0.error_code())]
    Document(#[from] DocError),
    #[error("{0}")]
    Usage(&'static str),
}

#[derive(Parser, Debug)]
#[command(name = "folio", about = "Lay out book text and inspect annotation documents")]
struct Cli {
    #[command(flatten)]
    layout: LayoutArgs,

    #[command(subcommand)]
    command: Command,
}

/// Overrides applied on top of the `FOLIO_*` environment config.
#[derive(Args, Debug, Default)]
struct LayoutArgs {
    #[arg(long, global = true)]
    line_width: Option<f64>,

    #[arg(long, global = true)]
    char_advance: Option<f64>,

    #[arg(long, global = true)]
    line_height: Option<f64>,

    #[arg(long, global = true, help = "Emit at most this many lines")]
    max_lines: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lay out `[{"text": ...}]` blocks and print the processed lines.
    Layout {
        #[arg(default_value = "-", help = "Blocks file path, or - for stdin")]
        blocks: String,
    },
    /// Summarize a document snapshot.
    Inspect {
        #[arg(help = "Snapshot file path, or - for stdin")]
        snapshot: String,
    },
    /// Print the lines each highlight of a snapshot covers. At most one of
    /// the two inputs may be `-`.
    Highlights { snapshot: String, blocks: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    elements: BTreeMap<&'static str, usize>,
    curves: usize,
    free_curves: usize,
    highlights: usize,
    scale: f64,
    offset_position: Point,
    anchor_index_matched: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HighlightLines {
    id: String,
    line_ys: Vec<usize>,
}

fn main() -> Result<(), CliError> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(LayoutConfig::parse_env()?, &cli.layout)?;
    tracing::debug!(?config, "layout config resolved");

    match cli.command {
        Command::Layout { blocks } => {
            let blocks: Vec<TextBlock> = read_json(&blocks)?;
            let lines = run_layout(&blocks, &config);
            print_json(&window(&lines, config.max_lines))
        }
        Command::Inspect { snapshot } => print_json(&inspect(read_json(&snapshot)?)?),
        Command::Highlights { snapshot, blocks } => {
            check_single_stdin(&snapshot, &blocks)?;
            let doc = Document::from_snapshot(read_json(&snapshot)?)?;
            let blocks: Vec<TextBlock> = read_json(&blocks)?;
            let lines = run_layout(&blocks, &config);
            print_json(&map_highlights(&doc, window(&lines, config.max_lines), &config)?)
        }
    }
}

fn resolve_config(base: LayoutConfig, args: &LayoutArgs) -> Result<LayoutConfig, ConfigError> {
    let config = LayoutConfig {
        line_width_budget: args.line_width.unwrap_or(base.line_width_budget),
        char_advance: args.char_advance.unwrap_or(base.char_advance),
        line_height: args.line_height.unwrap_or(base.line_height),
        max_lines: args.max_lines.or(base.max_lines),
    };
    config.validate()?;
    Ok(config)
}

/// Stdin can only be consumed once.
fn check_single_stdin(snapshot: &str, blocks: &str) -> Result<(), CliError> {
    if snapshot == "-" && blocks == "-" {
        return Err(CliError::Usage("snapshot and blocks cannot both be read from stdin"));
    }
    Ok(())
}

fn run_layout(blocks: &[TextBlock], config: &LayoutConfig) -> Vec<ProcessedLine> {
    let lines = layout(blocks, config.line_width_budget, config.char_advance);
    tracing::info!(blocks = blocks.len(), lines = lines.len(), "layout complete");
    lines
}

fn inspect(snapshot: DocumentSnapshot) -> Result<Summary, DocError> {
    let anchor_index_matched = snapshot.anchor_index_matches();
    let doc = Document::from_snapshot(snapshot)?;

    let mut elements = BTreeMap::new();
    for element in doc.elements() {
        *elements.entry(element.kind().tag()).or_insert(0) += 1;
    }
    let view = doc.view();
    Ok(Summary {
        elements,
        curves: doc.arrows().len(),
        free_curves: doc.free_curves().len(),
        highlights: doc.highlights().len(),
        scale: view.scale,
        offset_position: view.offset_position,
        anchor_index_matched,
    })
}

fn map_highlights(
    doc: &Document,
    lines: &[ProcessedLine],
    config: &LayoutConfig,
) -> Result<Vec<HighlightLines>, DocError> {
    doc.highlights()
        .iter()
        .map(|h| {
            Ok(HighlightLines { id: h.id.clone(), line_ys: lines_under_highlight(h, lines, config.line_height)? })
        })
        .collect()
}

fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, CliError> {
    let raw = if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| CliError::Read { path: path.to_owned(), source })?;
        buf
    } else {
        fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_owned(), source })?
    };
    serde_json::from_str(&raw).map_err(|source| CliError::Json { path: path.to_owned(), source })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
