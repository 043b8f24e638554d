use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ledger_sheets::ingest::BatchCounts;
use ledger_sheets::io::excel_read;
use ledger_sheets::model::DateRange;
use ledger_sheets::summary::summarize;
use ledger_sheets::{
    DetectorConfig, IngestError, Ingestor, Result, TemplateCatalog, TemplateChoice, TemplateId,
};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| IngestError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let catalog = TemplateCatalog::standard();
    match cli.command {
        Command::Detect(args) => execute_detect(&catalog, args),
        Command::Ingest(args) => execute_ingest(&catalog, args),
        Command::Summary(args) => execute_summary(&catalog, args),
    }
}

fn execute_detect(catalog: &TemplateCatalog, args: InputArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(IngestError::MissingInput(args.input));
    }
    let sheet = excel_read::read_worksheet(&args.input, args.detection.sheet.as_deref())?;
    let detector = Ingestor::new(catalog, args.detection.config()).detector();
    let header = detector.locate(&sheet, args.detection.choice())?;
    let scores: serde_json::Map<String, serde_json::Value> = detector
        .scores(&sheet.row_text(header.row))
        .into_iter()
        .map(|(id, score)| (id.to_string(), json!(score)))
        .collect();

    print_json(&json!({
        "template": header.template,
        "header_row": header.row + 1,
        "scores": scores,
    }))
}

fn execute_ingest(catalog: &TemplateCatalog, args: InputArgs) -> Result<()> {
    let ingestor = Ingestor::new(catalog, args.detection.config());
    let outcome = ingestor.ingest_file(
        &args.input,
        args.detection.choice(),
        args.detection.sheet.as_deref(),
    )?;
    print_json(&outcome)
}

fn execute_summary(catalog: &TemplateCatalog, args: SummaryArgs) -> Result<()> {
    let ingestor = Ingestor::new(catalog, args.detection.config());
    let mut records = Vec::new();
    let mut counts = BatchCounts::default();
    for input in &args.inputs {
        let outcome = ingestor.ingest_file(
            input,
            args.detection.choice(),
            args.detection.sheet.as_deref(),
        )?;
        counts.records += outcome.records.len();
        counts.issues += outcome.issues.len();
        records.extend(outcome.records);
    }
    let range =
        (args.from.is_some() || args.to.is_some()).then(|| DateRange::new(args.from, args.to));

    print_json(&json!({
        "summary": summarize(&records, range),
        "counts": counts,
    }))
}

fn parse_template(value: &str) -> std::result::Result<TemplateId, String> {
    value.parse().map_err(|error: IngestError| error.to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Normalize bookkeeping spreadsheet exports into canonical operations."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report which template a spreadsheet matches and where its header is.
    Detect(InputArgs),
    /// Extract operations and row issues as JSON.
    Ingest(InputArgs),
    /// Aggregate the operations of one or more spreadsheets.
    Summary(SummaryArgs),
}

#[derive(clap::Args)]
struct InputArgs {
    /// Spreadsheet file (.xlsx, .xls, .ods).
    #[arg(long)]
    input: PathBuf,

    #[command(flatten)]
    detection: DetectionArgs,
}

#[derive(clap::Args)]
struct SummaryArgs {
    /// Spreadsheet files to aggregate; repeat the flag for several files.
    #[arg(long = "input", required = true)]
    inputs: Vec<PathBuf>,

    #[command(flatten)]
    detection: DetectionArgs,

    /// First operation date to include (YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last operation date to include (YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(clap::Args)]
struct DetectionArgs {
    /// Worksheet name; defaults to the first sheet.
    #[arg(long)]
    sheet: Option<String>,

    /// Skip detection and use this template (RIVAL, AJUR, MIKROINVEST,
    /// BusinessNavigator, UNIVERSUM).
    #[arg(long, value_parser = parse_template)]
    template: Option<TemplateId>,

    /// Minimum fraction of expected headers a template must match.
    #[arg(long, default_value_t = 0.5)]
    min_overlap: f64,

    /// Scores within this distance of the best one are a tie.
    #[arg(long, default_value_t = 0.1)]
    epsilon: f64,

    /// Number of leading rows searched for the header row.
    #[arg(long, default_value_t = 20)]
    header_scan_rows: usize,
}

impl DetectionArgs {
    fn choice(&self) -> TemplateChoice {
        self.template
            .map(TemplateChoice::Explicit)
            .unwrap_or(TemplateChoice::Detect)
    }

    fn config(&self) -> DetectorConfig {
        DetectorConfig {
            min_overlap: self.min_overlap,
            epsilon: self.epsilon,
            header_scan_rows: self.header_scan_rows,
        }
    }
}
