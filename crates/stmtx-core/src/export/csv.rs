//! CSV sinks: one statement row per outcome, optionally one row per transaction.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{opt_string, Result, ResultSink};
use crate::models::statement::{ParseOutcome, ParseResult};

const STATEMENT_HEADER: [&str; 16] = [
    "file",
    "status",
    "issuer",
    "customer_name",
    "card_last4",
    "card_network",
    "statement_date",
    "period_start",
    "period_end",
    "payment_due_date",
    "total_amount_due",
    "minimum_amount_due",
    "credit_limit",
    "transaction_count",
    "confidence",
    "error",
];

const TRANSACTION_HEADER: [&str; 10] = [
    "file",
    "issuer",
    "card_last4",
    "date",
    "description",
    "amount",
    "direction",
    "signed_amount",
    "category",
    "reference",
];

/// Writes the statements CSV and, when configured, the transactions CSV.
pub struct CsvSink {
    path: PathBuf,
    transactions_path: Option<PathBuf>,
}

impl CsvSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            transactions_path: None,
        }
    }

    /// Also write one row per transaction to `path`.
    pub fn with_transactions(mut self, path: impl AsRef<Path>) -> Self {
        self.transactions_path = Some(path.as_ref().to_path_buf());
        self
    }
}

impl ResultSink for CsvSink {
    fn write(&mut self, outcomes: &[ParseOutcome]) -> Result<()> {
        let mut wtr = csv::Writer::from_path(&self.path)?;
        wtr.write_record(STATEMENT_HEADER)?;
        for outcome in outcomes {
            wtr.write_record(statement_record(outcome))?;
        }
        wtr.flush()?;
        debug!("Wrote {} statement rows to {}", outcomes.len(), self.path.display());

        if let Some(path) = &self.transactions_path {
            let mut wtr = csv::Writer::from_path(path)?;
            wtr.write_record(TRANSACTION_HEADER)?;
            let mut count = 0;
            for result in outcomes.iter().filter_map(ParseOutcome::result) {
                for record in transaction_records(result) {
                    wtr.write_record(record)?;
                    count += 1;
                }
            }
            wtr.flush()?;
            debug!("Wrote {} transaction rows to {}", count, path.display());
        }

        Ok(())
    }
}

fn statement_record(outcome: &ParseOutcome) -> Vec<String> {
    match outcome {
        ParseOutcome::Parsed(result) => {
            let summary = result.summary();
            vec![
                result.file().to_string(),
                outcome.status().to_string(),
                result.issuer().to_string(),
                summary.customer_name.clone().unwrap_or_default(),
                summary.card_last4.clone().unwrap_or_default(),
                opt_string(summary.card_network),
                opt_string(summary.statement_date),
                opt_string(summary.period.map(|p| p.start)),
                opt_string(summary.period.map(|p| p.end)),
                opt_string(summary.payment_due_date),
                opt_string(summary.total_due),
                opt_string(summary.minimum_due),
                opt_string(summary.credit_limit),
                result.transactions().len().to_string(),
                format!("{:.2}", result.metadata().confidence),
                String::new(),
            ]
        }
        ParseOutcome::Failed(failed) => {
            let mut record = vec![String::new(); STATEMENT_HEADER.len()];
            record[0] = failed.file.clone();
            record[1] = outcome.status().to_string();
            record[2] = failed.issuer_detected.clone().unwrap_or_default();
            record[15] = failed.error.clone();
            record
        }
    }
}

fn transaction_records(result: &ParseResult) -> impl Iterator<Item = Vec<String>> + '_ {
    let card = result.summary().card_last4.clone().unwrap_or_default();
    result.transactions().iter().map(move |txn| {
        vec![
            result.file().to_string(),
            result.issuer().to_string(),
            card.clone(),
            txn.date().to_string(),
            txn.description().to_string(),
            txn.amount().to_string(),
            txn.direction().as_str().to_string(),
            txn.signed_amount().to_string(),
            txn.category().map(|c| c.as_str().to_string()).unwrap_or_default(),
            txn.reference().unwrap_or_default().to_string(),
        ]
    })
}
