//! PDF text extraction using lopdf and pdf-extract.

use std::panic::{self, AssertUnwindSafe};

use lopdf::{Document, Object};
use tracing::{debug, trace, warn};

use super::text::split_cells;
use super::{PdfProcessor, PdfType, Result};
use crate::error::PdfError;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    min_text_length: usize,
}

/// Extracted content from a PDF.
#[derive(Debug, Clone)]
pub struct PdfContent {
    /// Type of PDF content.
    pub pdf_type: PdfType,
    /// Extracted text of all pages, separated by blank lines.
    pub text: String,
    /// Pages with their content.
    pub pages: Vec<PdfPage>,
}

/// Content from a single PDF page.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Extracted text from this page.
    pub text: String,
    /// Table-like cells, one entry per non-empty line.
    pub rows: Vec<Vec<String>>,
}

impl PdfPage {
    /// Build a page and split its lines into cells.
    pub fn new(number: u32, text: String) -> Self {
        let rows = text
            .lines()
            .map(split_cells)
            .filter(|cells| !cells.is_empty())
            .collect();
        Self { number, text, rows }
    }
}

impl PdfContent {
    /// Wrap text recovered outside the PDF libraries as a single page.
    pub fn from_raw_text(text: String) -> Self {
        Self {
            pdf_type: PdfType::Raw,
            pages: vec![PdfPage::new(1, text.clone())],
            text,
        }
    }

    /// Number of pages carried.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            min_text_length: 50,
        }
    }

    /// Set the minimum text length for a PDF to count as text-based.
    pub fn with_min_text_length(mut self, min_text_length: usize) -> Self {
        self.min_text_length = min_text_length;
        self
    }

    /// Extract the text of every page (up to `max_pages`, 0 = all).
    pub fn extract_all(&self, max_pages: usize) -> Result<PdfContent> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }

        let page_count = self.page_count();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        let mut page_texts = self.extract_pages()?;
        if max_pages > 0 && page_texts.len() > max_pages {
            debug!("Truncating {} pages to {}", page_texts.len(), max_pages);
            page_texts.truncate(max_pages);
        }

        let mut full_text = String::new();
        let mut pages = Vec::with_capacity(page_texts.len());

        for (idx, page_text) in page_texts.into_iter().enumerate() {
            if !page_text.trim().is_empty() {
                if !full_text.is_empty() {
                    full_text.push_str("\n\n");
                }
                full_text.push_str(&page_text);
            }
            pages.push(PdfPage::new(idx as u32 + 1, page_text));
        }

        let image_count = self.count_images();
        let text_len = full_text.trim().len();
        let pdf_type = PdfType::classify(text_len, image_count, self.min_text_length);

        debug!(
            "PDF analysis: {} pages, {} chars text, {} images -> {:?}",
            page_count, text_len, image_count, pdf_type
        );

        Ok(PdfContent {
            pdf_type,
            text: full_text,
            pages,
        })
    }

    /// Count image XObjects anywhere in the document.
    pub fn count_images(&self) -> usize {
        let doc = match self.document.as_ref() {
            Some(d) => d,
            None => return 0,
        };

        doc.objects
            .values()
            .filter(|object| is_image_stream(object))
            .count()
    }
}

fn is_image_stream(object: &Object) -> bool {
    let Object::Stream(stream) = object else {
        return false;
    };
    let is_image = stream
        .dict
        .get(b"Subtype")
        .and_then(|subtype| subtype.as_name())
        .map(|name| name == b"Image")
        .unwrap_or(false);
    if is_image {
        trace!("Found image XObject");
    }
    is_image
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Statements are often "encrypted" with an empty user password
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads bytes, so hand it the decrypted document
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn analyze(&self) -> PdfType {
        let text = self.extract_text().unwrap_or_default();
        let pdf_type =
            PdfType::classify(text.trim().len(), self.count_images(), self.min_text_length);
        debug!("PDF analysis: {} chars -> {:?}", text.len(), pdf_type);
        pdf_type
    }

    fn extract_text(&self) -> Result<String> {
        guarded(|| pdf_extract::extract_text_from_mem(&self.raw_data))
    }

    fn extract_pages(&self) -> Result<Vec<String>> {
        guarded(|| pdf_extract::extract_text_from_mem_by_pages(&self.raw_data))
    }
}

/// Run a pdf-extract call, turning its panics into `TextExtraction` errors.
///
/// pdf-extract panics on fonts it does not understand (unknown `/Encoding`
/// names, missing descendant fonts) instead of returning an error.
fn guarded<T>(
    extract: impl FnOnce() -> std::result::Result<T, pdf_extract::OutputError>,
) -> Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(extract)) {
        Ok(result) => result.map_err(|e| PdfError::TextExtraction(e.to_string())),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!("pdf-extract panicked: {}", message);
            Err(PdfError::TextExtraction(message))
        }
    }
}
