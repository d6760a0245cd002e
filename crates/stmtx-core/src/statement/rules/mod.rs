//! Rule-based field extractors for credit card statements.

pub mod amounts;
pub mod card;
pub mod dates;
pub mod labels;
pub mod name;
pub mod patterns;
pub mod transactions;

pub use amounts::{
    find_labelled_amount, format_inr, largest_amount, parse_inr_amount, AmountExtractor,
};
pub use card::{detect_network, extract_last4, CardExtractor};
pub use dates::{extract_statement_dates, parse_date, parse_row_date, DateExtractor, StatementDates};
pub use labels::{find_labels, LabelHit};
pub use name::extract_customer_name;
pub use transactions::TransactionRowExtractor;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Byte range in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Start offset, or `usize::MAX` when unknown.
    pub fn start(&self) -> usize {
        self.position.map(|(s, _)| s).unwrap_or(usize::MAX)
    }

    /// End offset, or 0 when unknown.
    pub fn end(&self) -> usize {
        self.position.map(|(_, e)| e).unwrap_or(0)
    }
}
