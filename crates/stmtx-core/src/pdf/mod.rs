//! PDF processing module.

mod extractor;
pub mod text;

pub use extractor::{PdfContent, PdfExtractor, PdfPage};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Type of PDF content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PdfType {
    /// Contains extractable text.
    Text,
    /// Contains only images (scanned document).
    Image,
    /// Contains both text and images.
    Hybrid,
    /// Empty or unreadable.
    Empty,
    /// Not parsed as a PDF; text recovered from the raw bytes.
    Raw,
}

impl PdfType {
    /// Classify from the amount of text and the number of images found.
    pub fn classify(text_len: usize, image_count: usize, min_text_length: usize) -> Self {
        match (text_len > min_text_length, image_count > 0) {
            (true, false) => PdfType::Text,
            (false, true) => PdfType::Image,
            (true, true) => PdfType::Hybrid,
            (false, false) => PdfType::Empty,
        }
    }
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Analyze the PDF to determine its type.
    fn analyze(&self) -> PdfType;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;

    /// Extract text page by page, in page order.
    fn extract_pages(&self) -> Result<Vec<String>>;
}

/// Extract a document's content, falling back to the raw bytes when the PDF
/// libraries produce nothing.
///
/// Encrypted documents are never decoded raw; their bytes are ciphertext.
pub fn extract_document(data: &[u8], config: &PdfConfig) -> Result<PdfContent> {
    let mut extractor = PdfExtractor::new().with_min_text_length(config.min_text_length);

    let primary = extractor
        .load(data)
        .and_then(|_| extractor.extract_all(config.max_pages));

    match primary {
        Ok(content) if !content.text.trim().is_empty() => Ok(content),
        Ok(content) if !config.raw_fallback => Ok(content),
        Err(PdfError::Encrypted) => Err(PdfError::Encrypted),
        Err(e) if !config.raw_fallback => Err(e),
        other => {
            match &other {
                Ok(_) => debug!("PDF yielded no text, decoding raw bytes"),
                Err(e) => warn!("PDF extraction failed ({}), decoding raw bytes", e),
            }
            let raw = text::decode_raw(data);
            if raw.trim().is_empty() {
                return match other {
                    Ok(content) => Ok(content),
                    Err(e) => Err(e),
                };
            }
            Ok(PdfContent::from_raw_text(raw))
        }
    }
}
