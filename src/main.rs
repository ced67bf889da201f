// src/main.rs
mod config;
mod extractors;
mod pipeline;
mod portal;
mod report;
mod storage;
mod utils;

use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use pipeline::Pipeline;
use portal::client::{PortalClient, DEFAULT_BASE_URL};
use report::{CsvSink, ReportAccumulator};
use storage::DocumentStore;
use utils::AppError;

/// Command Line Interface for the financial statement collector
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Portal session token (the taxisSession cookie value)
    #[arg(short, long, env = "TAXIS_SESSION", hide_env_values = true)]
    session: String,

    /// Directory the downloaded documents are cached under
    #[arg(short, long, default_value = "./statements")]
    output_dir: PathBuf,

    /// Path of the CSV report
    #[arg(short, long, default_value = "./Results.csv")]
    report: PathBuf,

    /// JSON file with the entity list (ordered array of {"taxId", "name"});
    /// the built-in list is used when omitted
    #[arg(short, long)]
    entities: Option<PathBuf>,

    /// Portal base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Pause between statement downloads, in milliseconds
    #[arg(long, default_value = "200")]
    delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!(
        "Starting collection run: cache dir {}, report {}",
        args.output_dir.display(),
        args.report.display()
    );

    // 3. Entity list - the one error that is fatal for the whole run
    let entities = match &args.entities {
        Some(path) => config::load_entities(path)?,
        None => config::default_entities(),
    };
    tracing::info!("Loaded {} entities", entities.len());

    // 4. Wire the portal client, cache and report sink
    let client = PortalClient::new(&args.base_url, &args.session)?;
    let store = DocumentStore::new(&args.output_dir, client.clone())?;
    let pipeline = Pipeline::new(client, store, Duration::from_millis(args.delay_ms));

    let report_file = File::create(&args.report)?;
    let mut sink = CsvSink::new(report_file)?;
    let mut report = ReportAccumulator::new();

    // 5. Run the per-entity, per-statement loop
    let summary = pipeline.run(&entities, &mut report, &mut sink).await;

    tracing::info!(
        "Done. {} records written to {}, {} failed work items",
        report.len(),
        args.report.display(),
        summary.failures
    );

    Ok(())
}
