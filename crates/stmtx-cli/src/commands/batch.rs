//! Batch processing command for multiple statement files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use stmtx_core::{CsvSink, ParseOutcome, ResultSink, StatementPipeline};

use super::process::{format_results, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each statement
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;
    let pretty = config.export.pretty_json;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "pdf" | "zip")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let pipeline = StatementPipeline::new(config);
    let mut outcomes = Vec::new();
    let mut stems = Vec::new();

    for path in &files {
        let file_outcomes = match pipeline.process_path(path) {
            Ok(found) => found,
            Err(e) => vec![ParseOutcome::failed(path.display().to_string(), e)],
        };

        if let Some(failed) = file_outcomes.iter().find(|o| o.error().is_some()) {
            let message = failed.error().unwrap_or("unknown error");
            if args.continue_on_error {
                warn!("Failed to process {}: {}", failed.file(), message);
            } else {
                error!("Failed to process {}: {}", failed.file(), message);
                pb.abandon();
                anyhow::bail!("Processing failed for {}: {}", failed.file(), message);
            }
        }

        stems.extend(file_outcomes.iter().map(|o| output_stem(path, o.file())));
        outcomes.extend(file_outcomes);
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    let successful: Vec<_> = outcomes.iter().filter_map(ParseOutcome::result).collect();
    let failed: Vec<_> = outcomes.iter().filter(|o| o.error().is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        let mut used = HashSet::new();
        for (outcome, stem) in outcomes.iter().zip(stems) {
            let Some(result) = outcome.result() else {
                continue;
            };
            let name = claim_name(&mut used, stem);
            let output_path = output_dir.join(format!("{}.{}", name, args.format.extension()));

            let content = format_results(&[result], args.format, pretty)?;
            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        CsvSink::new(&summary_path).write(&outcomes)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} statements in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for outcome in &failed {
            println!(
                "  - {}: {}",
                outcome.file(),
                outcome.error().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Output file stem for one statement. Archive members are prefixed with the
/// archive's stem so that members of different archives do not collide.
fn output_stem(input: &Path, statement_file: &str) -> String {
    let stem = |path: &Path| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("statement")
            .to_string()
    };

    let member = stem(Path::new(statement_file));
    let is_archive = input
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("zip"))
        .unwrap_or(false);

    if is_archive {
        format!("{}_{}", stem(input), member)
    } else {
        member
    }
}

/// Claim `stem` for an output file, appending `-2`, `-3`, ... when taken.
fn claim_name(used: &mut HashSet<String>, stem: String) -> String {
    if used.insert(stem.clone()) {
        return stem;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", stem, n);
        if used.insert(candidate.clone()) {
            warn!("Output name {} already used, writing {}", stem, candidate);
            return candidate;
        }
        n += 1;
    }
}
