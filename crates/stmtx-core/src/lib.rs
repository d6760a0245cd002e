//! Core library for credit card statement parsing.
//!
//! This crate provides:
//! - PDF text extraction with a raw-bytes fallback
//! - Issuer detection for HDFC, ICICI, SBI, Axis and Kotak statements
//! - Statement field and transaction extraction
//! - Normalization into one canonical schema
//! - JSON, CSV and SQLite export

pub mod bank;
pub mod error;
pub mod export;
pub mod models;
pub mod pdf;
pub mod pipeline;
pub mod statement;

pub use bank::{Classification, Issuer, IssuerClassifier};
pub use error::{ExportError, ExtractionError, PdfError, Result, StmtError};
pub use export::{export_all, CsvSink, JsonSink, ResultSink, SqliteSink};
pub use models::config::StmtxConfig;
pub use models::statement::{
    CardNetwork, Category, Direction, ParseOutcome, ParseResult, StatementDocument,
    StatementSummary, Transaction,
};
pub use pdf::{PdfContent, PdfProcessor, PdfType};
pub use pipeline::StatementPipeline;
pub use statement::{StatementExtractor, StatementParser};
