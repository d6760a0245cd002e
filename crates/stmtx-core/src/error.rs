//! Error types for the stmtx-core library.

use thiserror::Error;

/// Main error type for the stmtx library.
#[derive(Error, Debug)]
pub enum StmtError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Statement field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Export sink error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// ZIP archive could not be read.
    #[error("archive error: {0}")]
    Archive(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Input is neither a PDF, a ZIP archive nor a directory.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The document yielded no text at all (scanned statement).
    #[error("no extractable text in document")]
    NoText,
}

/// Errors related to statement field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The issuing bank could not be identified or is not supported.
    #[error(
        "unsupported or unrecognized bank statement (detected: {detected}); only HDFC, ICICI, SBI, AXIS and KOTAK statements are supported"
    )]
    UnsupportedIssuer { detected: String },

    /// No statement data could be extracted.
    #[error("no statement data found")]
    NoData,
}

/// Errors raised by export sinks.
#[derive(Error, Debug)]
pub enum ExportError {
    /// JSON serialization failed.
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing failed.
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    /// SQLite write failed.
    #[error("SQLite export failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Output file could not be written.
    #[error("export I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the stmtx library.
pub type Result<T> = std::result::Result<T, StmtError>;
