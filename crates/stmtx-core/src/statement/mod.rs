//! Statement field parsing and normalization.

pub mod normalize;
mod parser;
pub mod rules;

pub use normalize::{NormalizedStatement, Normalizer};
pub use parser::StatementParser;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::bank::Issuer;
use crate::error::ExtractionError;
use crate::models::statement::{CardNetwork, StatementPeriod};

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// A transaction row as printed, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    pub date_text: String,
    pub description: String,
    /// Amount with its leading sign, if any.
    pub amount_text: String,
    /// Debit/credit marker printed after the amount.
    pub marker: Option<String>,
    pub reference: Option<String>,
}

/// Fields pulled out of one statement's text.
#[derive(Debug, Clone, PartialEq)]
pub struct RawStatement {
    pub issuer: Issuer,
    pub card_last4: Option<String>,
    pub card_network: Option<CardNetwork>,
    pub customer_name: Option<String>,
    pub statement_date: Option<NaiveDate>,
    pub period: Option<StatementPeriod>,
    pub payment_due_date: Option<NaiveDate>,
    pub total_due: Option<Decimal>,
    pub minimum_due: Option<Decimal>,
    pub credit_limit: Option<Decimal>,
    pub available_credit: Option<Decimal>,
    pub transactions: Vec<RawTransaction>,
    pub warnings: Vec<String>,
}

impl RawStatement {
    pub fn new(issuer: Issuer) -> Self {
        Self {
            issuer,
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
            transactions: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Trait for statement field extractors.
pub trait StatementExtractor {
    /// Extract summary fields and transaction rows from cleaned text.
    fn extract(&self, text: &str, issuer: Issuer) -> Result<RawStatement>;
}
