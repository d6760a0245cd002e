//! Statement data models: documents, transactions, summaries and results.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::bank::Issuer;
use crate::pdf::PdfType;

/// One input statement file.
#[derive(Debug, Clone)]
pub struct StatementDocument {
    path: PathBuf,
    bytes: Vec<u8>,
    issuer: Option<Issuer>,
}

impl StatementDocument {
    /// Read a statement from disk.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Ok(Self::from_bytes(path, bytes))
    }

    /// Wrap bytes that were obtained elsewhere (e.g. an archive member).
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes,
            issuer: None,
        }
    }

    /// Path or archive member name.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base file name used in outputs.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Raw file content.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Issuer detected by the classifier, once it has run.
    pub fn issuer(&self) -> Option<Issuer> {
        self.issuer
    }

    pub(crate) fn set_issuer(&mut self, issuer: Issuer) {
        self.issuer = Some(issuer);
    }
}

/// Money flow direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Spend, fee or charge.
    Debit,
    /// Payment, refund or reversal.
    Credit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Debit => "debit",
            Direction::Credit => "credit",
        }
    }
}

/// Spending category assigned by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Food,
    Groceries,
    Fuel,
    Travel,
    Shopping,
    Utilities,
    Entertainment,
    Health,
    Fees,
    Emi,
    Cash,
    Payment,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Groceries => "groceries",
            Category::Fuel => "fuel",
            Category::Travel => "travel",
            Category::Shopping => "shopping",
            Category::Utilities => "utilities",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Fees => "fees",
            Category::Emi => "emi",
            Category::Cash => "cash",
            Category::Payment => "payment",
            Category::Other => "other",
        }
    }
}

/// A normalized statement transaction.
///
/// The amount is always non-negative; `direction` carries the sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    date: NaiveDate,
    description: String,
    amount: Decimal,
    direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
}

impl Transaction {
    /// Create a transaction. A negative amount is stored as its magnitude.
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Decimal,
        direction: Direction,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            amount: amount.abs(),
            direction,
            category: None,
            reference: None,
        }
    }

    pub fn with_category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    pub fn with_reference(mut self, reference: Option<String>) -> Self {
        self.reference = reference;
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn is_credit(&self) -> bool {
        self.direction == Direction::Credit
    }

    /// Amount with credits negated.
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::Debit => self.amount,
            Direction::Credit => -self.amount,
        }
    }
}

/// Card scheme printed on the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardNetwork {
    Visa,
    Mastercard,
    Rupay,
    Amex,
    Diners,
}

impl CardNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardNetwork::Visa => "Visa",
            CardNetwork::Mastercard => "Mastercard",
            CardNetwork::Rupay => "RuPay",
            CardNetwork::Amex => "American Express",
            CardNetwork::Diners => "Diners Club",
        }
    }
}

impl fmt::Display for CardNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Billing period covered by a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl StatementPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Statement-level fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementSummary {
    /// Last four digits of the card number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_last4: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_network: Option<CardNetwork>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,

    /// Date the statement was generated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<StatementPeriod>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_due_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_due: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_due: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_credit: Option<Decimal>,

    /// ISO currency code.
    pub currency: String,
}

impl StatementSummary {
    /// An empty summary in the given currency.
    pub fn empty(currency: impl Into<String>) -> Self {
        Self {
            card_last4: None,
            card_network: None,
            customer_name: None,
            statement_date: None,
            period: None,
            payment_due_date: None,
            total_due: None,
            minimum_due: None,
            credit_limit: None,
            available_credit: None,
            currency: currency.into(),
        }
    }
}

/// Where a result came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// File or archive member name.
    pub file: String,
    pub page_count: u32,
    pub pdf_type: PdfType,
}

/// Metadata about the extraction process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Overall extraction confidence (0.0 - 1.0).
    pub confidence: f32,

    /// Share of issuer keyword hits that went to the detected issuer.
    pub issuer_confidence: f32,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Warnings or issues encountered during extraction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Fields that could not be extracted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,
}

/// The parsed form of one statement. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    source: SourceInfo,
    issuer: Issuer,
    summary: StatementSummary,
    transactions: Vec<Transaction>,
    metadata: ExtractionMetadata,
}

impl ParseResult {
    pub(crate) fn new(
        source: SourceInfo,
        issuer: Issuer,
        summary: StatementSummary,
        transactions: Vec<Transaction>,
        metadata: ExtractionMetadata,
    ) -> Self {
        Self {
            source,
            issuer,
            summary,
            transactions,
            metadata,
        }
    }

    pub fn source(&self) -> &SourceInfo {
        &self.source
    }

    pub fn file(&self) -> &str {
        &self.source.file
    }

    pub fn issuer(&self) -> Issuer {
        self.issuer
    }

    pub fn summary(&self) -> &StatementSummary {
        &self.summary
    }

    /// Transactions in statement order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn metadata(&self) -> &ExtractionMetadata {
        &self.metadata
    }

    pub fn total_debits(&self) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| !t.is_credit())
            .map(Transaction::amount)
            .sum()
    }

    pub fn total_credits(&self) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.is_credit())
            .map(Transaction::amount)
            .sum()
    }
}

/// A document that could not be parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedDocument {
    pub file: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_detected: Option<String>,
}

/// Per-document outcome of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParseOutcome {
    Parsed(ParseResult),
    Failed(FailedDocument),
}

impl ParseOutcome {
    pub fn failed(file: impl Into<String>, error: impl fmt::Display) -> Self {
        ParseOutcome::Failed(FailedDocument {
            file: file.into(),
            error: error.to_string(),
            issuer_detected: None,
        })
    }

    pub fn file(&self) -> &str {
        match self {
            ParseOutcome::Parsed(result) => result.file(),
            ParseOutcome::Failed(failed) => &failed.file,
        }
    }

    pub fn result(&self) -> Option<&ParseResult> {
        match self {
            ParseOutcome::Parsed(result) => Some(result),
            ParseOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ParseOutcome::Parsed(_) => None,
            ParseOutcome::Failed(failed) => Some(&failed.error),
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            ParseOutcome::Parsed(_) => "parsed",
            ParseOutcome::Failed(_) => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_transaction_amount_is_never_negative() {
        let txn = Transaction::new(
            date(2024, 3, 12),
            "REFUND",
            Decimal::from_str("-250.00").unwrap(),
            Direction::Credit,
        );
        assert_eq!(txn.amount(), Decimal::from_str("250.00").unwrap());
        assert_eq!(txn.signed_amount(), Decimal::from_str("-250.00").unwrap());
    }

    #[test]
    fn test_result_totals() {
        let txns = vec![
            Transaction::new(date(2024, 3, 1), "A", Decimal::new(10000, 2), Direction::Debit),
            Transaction::new(date(2024, 3, 2), "B", Decimal::new(2500, 2), Direction::Credit),
            Transaction::new(date(2024, 3, 3), "C", Decimal::new(5000, 2), Direction::Debit),
        ];
        let result = ParseResult::new(
            SourceInfo {
                file: "a.pdf".to_string(),
                page_count: 1,
                pdf_type: PdfType::Text,
            },
            Issuer::Hdfc,
            StatementSummary::empty("INR"),
            txns,
            ExtractionMetadata::default(),
        );
        assert_eq!(result.total_debits(), Decimal::new(15000, 2));
        assert_eq!(result.total_credits(), Decimal::new(2500, 2));
        assert_eq!(result.transactions()[1].description(), "B");
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = ParseOutcome::failed("bad.pdf", "PDF has no pages");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["file"], "bad.pdf");
        assert_eq!(json["error"], "PDF has no pages");
    }

    #[test]
    fn test_period_contains() {
        let period = StatementPeriod {
            start: date(2024, 2, 12),
            end: date(2024, 3, 11),
        };
        assert!(period.contains(date(2024, 3, 1)));
        assert!(!period.contains(date(2024, 3, 12)));
    }
}
