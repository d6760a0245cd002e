//! SQLite sink.
//!
//! Amounts and dates are stored as text so decimals keep their scale.
//! Tables are created on first use; later exports append.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, Transaction as SqlTransaction};
use tracing::debug;

use super::{Result, ResultSink};
use crate::models::statement::ParseOutcome;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS statements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file TEXT NOT NULL,
    status TEXT NOT NULL,
    issuer TEXT,
    customer_name TEXT,
    card_last4 TEXT,
    card_network TEXT,
    statement_date TEXT,
    period_start TEXT,
    period_end TEXT,
    payment_due_date TEXT,
    total_amount_due TEXT,
    minimum_amount_due TEXT,
    credit_limit TEXT,
    available_credit TEXT,
    confidence REAL,
    error TEXT,
    raw_json TEXT NOT NULL,
    exported_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    statement_id INTEGER NOT NULL REFERENCES statements(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    date TEXT NOT NULL,
    description TEXT NOT NULL,
    amount TEXT NOT NULL,
    direction TEXT NOT NULL,
    signed_amount TEXT NOT NULL,
    category TEXT,
    reference TEXT
);

CREATE INDEX IF NOT EXISTS idx_transactions_statement ON transactions(statement_id);
"#;

/// Writes outcomes into a SQLite database, one SQL transaction per call.
pub struct SqliteSink {
    path: PathBuf,
}

impl SqliteSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ResultSink for SqliteSink {
    fn write(&mut self, outcomes: &[ParseOutcome]) -> Result<()> {
        let mut conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;

        let tx = conn.transaction()?;
        for outcome in outcomes {
            insert_outcome(&tx, outcome)?;
        }
        tx.commit()?;

        debug!("Wrote {} outcomes to {}", outcomes.len(), self.path.display());
        Ok(())
    }
}

fn insert_outcome(tx: &SqlTransaction<'_>, outcome: &ParseOutcome) -> Result<()> {
    let raw_json = serde_json::to_string(outcome)?;

    match outcome {
        ParseOutcome::Parsed(result) => {
            let summary = result.summary();
            tx.execute(
                "INSERT INTO statements (
                    file, status, issuer, customer_name, card_last4, card_network,
                    statement_date, period_start, period_end, payment_due_date,
                    total_amount_due, minimum_amount_due, credit_limit, available_credit,
                    confidence, error, raw_json
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, NULL, ?16)",
                params![
                    result.file(),
                    outcome.status(),
                    result.issuer().code(),
                    summary.customer_name,
                    summary.card_last4,
                    summary.card_network.map(|n| n.as_str()),
                    summary.statement_date.map(|d| d.to_string()),
                    summary.period.map(|p| p.start.to_string()),
                    summary.period.map(|p| p.end.to_string()),
                    summary.payment_due_date.map(|d| d.to_string()),
                    summary.total_due.map(|d| d.to_string()),
                    summary.minimum_due.map(|d| d.to_string()),
                    summary.credit_limit.map(|d| d.to_string()),
                    summary.available_credit.map(|d| d.to_string()),
                    f64::from(result.metadata().confidence),
                    raw_json,
                ],
            )?;
            let statement_id = tx.last_insert_rowid();

            let mut stmt = tx.prepare(
                "INSERT INTO transactions (
                    statement_id, position, date, description, amount, direction,
                    signed_amount, category, reference
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for (position, txn) in result.transactions().iter().enumerate() {
                stmt.execute(params![
                    statement_id,
                    position as i64,
                    txn.date().to_string(),
                    txn.description(),
                    txn.amount().to_string(),
                    txn.direction().as_str(),
                    txn.signed_amount().to_string(),
                    txn.category().map(|c| c.as_str()),
                    txn.reference(),
                ])?;
            }
        }
        ParseOutcome::Failed(failed) => {
            tx.execute(
                "INSERT INTO statements (file, status, issuer, error, raw_json)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    failed.file,
                    outcome.status(),
                    failed.issuer_detected,
                    failed.error,
                    raw_json,
                ],
            )?;
        }
    }

    Ok(())
}
