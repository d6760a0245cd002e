//! End-to-end statement processing: extract, classify, parse, normalize.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::bank::IssuerClassifier;
use crate::error::{ExtractionError, PdfError, Result, StmtError};
use crate::models::config::StmtxConfig;
use crate::models::statement::{
    ExtractionMetadata, FailedDocument, ParseOutcome, ParseResult, SourceInfo, StatementDocument,
};
use crate::pdf::{extract_document, text};
use crate::statement::{Normalizer, StatementExtractor, StatementParser};

/// Runs documents through every stage and collects outcomes.
pub struct StatementPipeline {
    config: StmtxConfig,
    classifier: IssuerClassifier,
    parser: StatementParser,
    normalizer: Normalizer,
}

impl StatementPipeline {
    pub fn new(config: StmtxConfig) -> Self {
        Self {
            classifier: IssuerClassifier::new(),
            parser: StatementParser::from_config(&config.extraction),
            normalizer: Normalizer::from_config(&config.extraction),
            config,
        }
    }

    pub fn config(&self) -> &StmtxConfig {
        &self.config
    }

    /// Parse one statement document.
    ///
    /// The detected issuer is recorded on the document even when a later
    /// stage fails.
    pub fn parse_document(&self, document: &mut StatementDocument) -> Result<ParseResult> {
        let start = Instant::now();
        let file = document.file_name();

        let content = extract_document(document.bytes(), &self.config.pdf)?;
        if content.text.trim().is_empty() {
            return Err(PdfError::NoText.into());
        }
        debug!(
            "{}: {} pages, {:?}, {} characters",
            file,
            content.page_count(),
            content.pdf_type,
            content.text.len()
        );

        let text = text::clean_text(&content.text);

        let classification = self.classifier.classify(&text);
        let issuer = classification.issuer.ok_or_else(|| {
            ExtractionError::UnsupportedIssuer {
                detected: classification.label(),
            }
        })?;
        document.set_issuer(issuer);
        info!(
            "{}: detected {} ({:.0}% of keyword hits)",
            file,
            issuer,
            classification.confidence * 100.0
        );

        let raw = self.parser.extract(&text, issuer)?;
        let normalized = self.normalizer.normalize(raw);

        for warning in &normalized.warnings {
            debug!("{}: {}", file, warning);
        }

        let metadata = ExtractionMetadata {
            confidence: normalized.confidence,
            issuer_confidence: classification.confidence,
            processing_time_ms: start.elapsed().as_millis() as u64,
            warnings: normalized.warnings,
            missing_fields: normalized.missing_fields,
        };

        Ok(ParseResult::new(
            SourceInfo {
                file,
                page_count: content.page_count(),
                pdf_type: content.pdf_type,
            },
            issuer,
            normalized.summary,
            normalized.transactions,
            metadata,
        ))
    }

    /// Parse a document, turning any failure into a `Failed` outcome.
    pub fn process_document(&self, mut document: StatementDocument) -> ParseOutcome {
        match self.parse_document(&mut document) {
            Ok(result) => ParseOutcome::Parsed(result),
            Err(e) => {
                warn!("{}: {}", document.file_name(), e);
                let issuer_detected = match &e {
                    StmtError::Extraction(ExtractionError::UnsupportedIssuer { detected }) => {
                        Some(detected.clone())
                    }
                    _ => document.issuer().map(|i| i.code().to_string()),
                };
                ParseOutcome::Failed(FailedDocument {
                    file: document.file_name(),
                    error: e.to_string(),
                    issuer_detected,
                })
            }
        }
    }

    /// Process a PDF file, a ZIP archive of PDFs or a directory of PDFs.
    ///
    /// Directory entries and archive members are processed in name order.
    pub fn process_path(&self, path: &Path) -> Result<Vec<ParseOutcome>> {
        if path.is_dir() {
            return self.process_dir(path);
        }

        match extension(path).as_str() {
            "pdf" => Ok(vec![self.process_pdf_file(path)]),
            "zip" => self.process_zip(path),
            other => Err(StmtError::UnsupportedInput(format!(
                "{} (extension '{}')",
                path.display(),
                other
            ))),
        }
    }

    fn process_pdf_file(&self, path: &Path) -> ParseOutcome {
        match StatementDocument::open(path) {
            Ok(document) => self.process_document(document),
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                let name = StatementDocument::from_bytes(path, Vec::new()).file_name();
                ParseOutcome::failed(name, StmtError::Io(e))
            }
        }
    }

    fn process_dir(&self, dir: &Path) -> Result<Vec<ParseOutcome>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && extension(&path) == "pdf" {
                files.push(path);
            }
        }
        files.sort();

        info!("Found {} PDF files in {}", files.len(), dir.display());
        Ok(files.iter().map(|p| self.process_pdf_file(p)).collect())
    }

    fn process_zip(&self, path: &Path) -> Result<Vec<ParseOutcome>> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)
            .map_err(|e| StmtError::Archive(format!("{}: {}", path.display(), e)))?;

        let mut names: Vec<String> = archive
            .file_names()
            .filter(|name| is_pdf_member(name))
            .map(String::from)
            .collect();
        names.sort();

        info!("Found {} PDF members in {}", names.len(), path.display());

        let mut outcomes = Vec::with_capacity(names.len());
        for name in names {
            let mut bytes = Vec::new();
            let read = archive
                .by_name(&name)
                .map_err(|e| e.to_string())
                .and_then(|mut member| member.read_to_end(&mut bytes).map_err(|e| e.to_string()));

            let outcome = match read {
                Ok(_) => self.process_document(StatementDocument::from_bytes(&name, bytes)),
                Err(e) => {
                    warn!("Cannot read archive member {}: {}", name, e);
                    let file = StatementDocument::from_bytes(&name, Vec::new()).file_name();
                    ParseOutcome::failed(file, StmtError::Archive(e))
                }
            };
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

impl Default for StatementPipeline {
    fn default() -> Self {
        Self::new(StmtxConfig::default())
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// PDF archive members, without directories or macOS resource forks.
fn is_pdf_member(name: &str) -> bool {
    !name.ends_with('/')
        && !name.starts_with("__MACOSX/")
        && extension(Path::new(name)) == "pdf"
}
