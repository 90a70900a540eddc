use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use waitstats::{build_dataset_with, compute_summary, source, DayOfWeek, Filter, PipelineConfig};

/// Hospital wait time summary for a CSV or JSON export of visits.
#[derive(Parser, Debug)]
#[command(name = "waitstats", version)]
struct Args {
    /// Visit records (.csv or .json)
    input: PathBuf,

    /// Pipeline config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only these days of the week (repeatable)
    #[arg(long = "day")]
    days: Vec<String>,

    /// Only these doctor types (repeatable)
    #[arg(long = "doctor")]
    doctor_types: Vec<String>,

    /// Write the JSON report here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    let days = args
        .days
        .iter()
        .map(|day| day.parse::<DayOfWeek>().map_err(anyhow::Error::msg))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let filter = Filter::none().with_days(days).with_doctor_types(args.doctor_types.clone());

    info!(input = %args.input.display(), "loading visits");
    let table = source::read_file(&args.input)?;
    let dataset = build_dataset_with(&table, &config)
        .with_context(|| format!("cannot build dataset from {}", args.input.display()))?;
    if !dataset.anomalies().is_empty() {
        warn!(
            count = dataset.anomalies().len(),
            "visits with out-of-order timestamps are included as-is"
        );
    }

    let summary = compute_summary(&dataset, &filter);
    info!(
        average_wait = %summary.average_wait_label(),
        total_patients = summary.total_patients,
        "summary computed"
    );

    let report = serde_json::json!({
        "filter": filter,
        "filterOptions": dataset.filter_options(),
        "summary": summary,
        "rejected": dataset.rejected(),
        "anomalies": dataset.anomalies(),
    });
    let text = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => println!("{}", text),
    }

    Ok(())
}
