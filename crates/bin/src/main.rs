//! Folio CLI binary.
//!
//! Rebuilds financial statement tables from XBRL linkbases and reported
//! facts, and fetches the documents it needs from SEC EDGAR.

mod commands;
mod config;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio: financial statement tables from XBRL linkbases", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Materialize every presentation role into statement files
    Extract(ExtractArgs),

    /// Download filing documents and company facts from SEC EDGAR
    Fetch(FetchArgs),
}

#[derive(Args, Debug, Default)]
struct ExtractArgs {
    /// Configuration file (folio.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Presentation linkbase (_pre.xml)
    #[arg(long)]
    presentation: Option<PathBuf>,

    /// Label linkbase (_lab.xml)
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Taxonomy schema (.xsd) with role definitions and linkbase references
    #[arg(long)]
    schema: Option<PathBuf>,

    /// SEC companyfacts JSON
    #[arg(long, conflicts_with = "instance")]
    company_facts: Option<PathBuf>,

    /// XBRL instance document
    #[arg(long)]
    instance: Option<PathBuf>,

    /// Last day of the target period (YYYY-MM-DD)
    #[arg(long)]
    period_end: Option<chrono::NaiveDate>,

    /// First day of the target period (default: one year before the end)
    #[arg(long)]
    period_start: Option<chrono::NaiveDate>,

    /// Only match facts from this form type (e.g. 10-K)
    #[arg(long)]
    form: Option<String>,

    /// Canonical currency unit
    #[arg(long)]
    currency: Option<String>,

    /// Output directory
    #[arg(long)]
    out: Option<PathBuf>,

    /// Output format (csv, json or pretty-json)
    #[arg(long)]
    format: Option<folio_output::ExportFormat>,

    /// Skip roles that do not look like primary financial statements
    #[arg(long)]
    statements_only: bool,

    /// Use the preferredLabel role of presentation arcs
    #[arg(long)]
    preferred_labels: bool,

    /// Print each statement as a text table
    #[arg(long)]
    print: bool,
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Company CIK
    #[arg(long)]
    cik: String,

    /// Filing archive directory URL
    #[arg(long, conflicts_with = "accession")]
    archive_url: Option<String>,

    /// Accession number, used to build the archive URL
    #[arg(long)]
    accession: Option<String>,

    /// File in the filing archive to download (repeatable)
    #[arg(long = "file")]
    files: Vec<String>,

    /// Output directory
    #[arg(long)]
    out: PathBuf,

    /// User-Agent sent to SEC (name and contact e-mail)
    #[arg(long, default_value = concat!("folio/", env!("CARGO_PKG_VERSION")))]
    user_agent: String,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Extract(args) => commands::extract::run(&args)?,
        Commands::Fetch(args) => commands::fetch::run(&args).await?,
    }

    Ok(())
}

fn init_tracing(verbose: u8, json_logs: bool) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
