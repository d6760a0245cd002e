//! Demo command - parse a folder of statements and write every export format.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use stmtx_core::{export_all, StatementPipeline};

/// Arguments for the demo command.
#[derive(Args)]
pub struct DemoArgs {
    /// Directory containing statement PDFs
    #[arg(long, default_value = "sample_pdfs")]
    input_dir: PathBuf,

    /// Directory for results.json, results.csv and results.db
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

pub async fn run(args: DemoArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    if !args.input_dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", args.input_dir.display());
    }

    let pipeline = StatementPipeline::new(config);
    let outcomes = pipeline.process_path(&args.input_dir)?;
    info!(
        "Parsed {} of {} statements",
        outcomes.iter().filter(|o| o.result().is_some()).count(),
        outcomes.len()
    );

    for outcome in &outcomes {
        if let Some(error) = outcome.error() {
            eprintln!("{} {}: {}", style("✗").red(), outcome.file(), error);
        }
    }

    let paths = export_all(&outcomes, pipeline.config(), &args.out_dir)?;

    println!(
        "Wrote {} results -> {}, {}, {}",
        outcomes.len(),
        paths.json.display(),
        paths.csv.display(),
        paths.db.display()
    );

    Ok(())
}
