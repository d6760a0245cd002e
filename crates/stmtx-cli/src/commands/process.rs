//! Process command - parse a single statement PDF or ZIP archive.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use stmtx_core::statement::rules::format_inr;
use stmtx_core::{ParseOutcome, ParseResult, StatementPipeline};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or ZIP of PDFs)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show extraction confidence scores
    #[arg(long)]
    show_confidence: bool,

    /// Show validation warnings
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per transaction
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;
    let pretty = config.export.pretty_json;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Parsing {}...", args.input.display()));

    let pipeline = StatementPipeline::new(config);
    let outcomes = pipeline.process_path(&args.input)?;

    pb.finish_and_clear();

    let failures: Vec<&ParseOutcome> = outcomes
        .iter()
        .filter(|o| matches!(o, ParseOutcome::Failed(_)))
        .collect();
    for failed in &failures {
        eprintln!(
            "{} {}: {}",
            style("✗").red(),
            failed.file(),
            failed.error().unwrap_or("unknown error")
        );
    }
    if failures.len() == outcomes.len() {
        anyhow::bail!("No statement could be parsed from {}", args.input.display());
    }

    let results: Vec<&ParseResult> = outcomes.iter().filter_map(ParseOutcome::result).collect();

    if args.validate {
        for result in &results {
            let warnings = &result.metadata().warnings;
            if !warnings.is_empty() {
                eprintln!(
                    "{} {}",
                    style("Validation issues:").yellow(),
                    result.file()
                );
                for warning in warnings {
                    eprintln!("  - {}", warning);
                }
            }
        }
    }

    let output = format_results(&results, args.format, pretty)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        for result in &results {
            let metadata = result.metadata();
            println!();
            println!(
                "{} {}: extraction confidence {:.1}%, issuer confidence {:.1}%",
                style("ℹ").blue(),
                result.file(),
                metadata.confidence * 100.0,
                metadata.issuer_confidence * 100.0
            );
            println!(
                "{} Processing time: {}ms",
                style("ℹ").blue(),
                metadata.processing_time_ms
            );
            if !metadata.missing_fields.is_empty() {
                println!(
                    "{} Missing: {}",
                    style("ℹ").blue(),
                    metadata.missing_fields.join(", ")
                );
            }
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Render parsed statements. A single statement is emitted as one JSON object.
pub fn format_results(
    results: &[&ParseResult],
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let json = match results {
                [single] => serde_json::to_value(single)?,
                many => serde_json::to_value(many)?,
            };
            if pretty {
                Ok(serde_json::to_string_pretty(&json)?)
            } else {
                Ok(serde_json::to_string(&json)?)
            }
        }
        OutputFormat::Csv => format_csv(results),
        OutputFormat::Text => Ok(results
            .iter()
            .map(|r| format_text(r))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn format_csv(results: &[&ParseResult]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "file",
        "issuer",
        "card_last4",
        "date",
        "description",
        "amount",
        "direction",
        "category",
    ])?;

    for result in results {
        let card = result.summary().card_last4.clone().unwrap_or_default();
        for txn in result.transactions() {
            wtr.write_record([
                result.file(),
                result.issuer().code(),
                &card,
                &txn.date().to_string(),
                txn.description(),
                &txn.signed_amount().to_string(),
                txn.direction().as_str(),
                txn.category().map(|c| c.as_str()).unwrap_or(""),
            ])?;
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ParseResult) -> String {
    let summary = result.summary();
    let mut output = String::new();

    output.push_str(&format!("Statement: {} ({})\n", result.file(), result.issuer()));
    if let Some(name) = &summary.customer_name {
        output.push_str(&format!("Cardholder: {}\n", name));
    }
    if let Some(last4) = &summary.card_last4 {
        let network = summary
            .card_network
            .map(|n| format!(" {}", n))
            .unwrap_or_default();
        output.push_str(&format!("Card:{} ending {}\n", network, last4));
    }
    if let Some(period) = summary.period {
        output.push_str(&format!("Period: {} to {}\n", period.start, period.end));
    }
    if let Some(date) = summary.statement_date {
        output.push_str(&format!("Statement date: {}\n", date));
    }
    output.push('\n');

    output.push_str("Dues:\n");
    if let Some(total) = summary.total_due {
        output.push_str(&format!("  Total:   {}\n", format_inr(total)));
    }
    if let Some(minimum) = summary.minimum_due {
        output.push_str(&format!("  Minimum: {}\n", format_inr(minimum)));
    }
    if let Some(due) = summary.payment_due_date {
        output.push_str(&format!("  Pay by:  {}\n", due));
    }
    if let Some(limit) = summary.credit_limit {
        output.push_str(&format!("  Limit:   {}\n", format_inr(limit)));
    }

    if !result.transactions().is_empty() {
        output.push_str(&format!("\nTransactions ({}):\n", result.transactions().len()));
        for txn in result.transactions() {
            output.push_str(&format!(
                "  {}  {:<40} {:>14}\n",
                txn.date(),
                txn.description(),
                format_inr(txn.signed_amount())
            ));
        }
        output.push_str(&format!(
            "  Debits {} / Credits {}\n",
            format_inr(result.total_debits()),
            format_inr(result.total_credits())
        ));
    }

    output
}
