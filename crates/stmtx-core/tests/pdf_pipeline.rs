//! End-to-end tests over generated statement PDFs.

use std::fs::File;
use std::io::Write;

use lopdf::{dictionary, Document, Object, Stream};
use rust_decimal::Decimal;
use stmtx_core::models::config::PdfConfig;
use stmtx_core::pdf::extract_document;
use stmtx_core::{
    export_all, Issuer, ParseOutcome, PdfError, PdfType, StatementDocument, StatementPipeline,
    StmtxConfig,
};

/// Build a PDF with one text line per entry, one page per slice.
fn statement_pdf(pages: &[&[&str]]) -> Vec<u8> {
    save(build_document(pages, None))
}

fn save(mut doc: Document) -> Vec<u8> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Uncompressed document whose Helvetica font optionally names `encoding`.
fn build_document(pages: &[&[&str]], encoding: Option<&str>) -> Document {
    let mut doc = Document::with_version("1.5");

    let mut font = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    };
    if let Some(encoding) = encoding {
        font.set("Encoding", Object::Name(encoding.as_bytes().to_vec()));
    }
    let font_id = doc.add_object(font);

    let mut page_ids = Vec::new();
    for lines in pages {
        let mut content = String::from("BT /F1 10 Tf 14 TL 40 800 Td\n");
        for line in lines.iter() {
            let escaped = line.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)");
            content.push_str(&format!("({escaped}) Tj T*\n"));
        }
        content.push_str("ET");

        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
        });
        page_ids.push(page_id);
    }

    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        "Count" => Object::Integer(page_ids.len() as i64),
    });
    for &page_id in &page_ids {
        if let Ok(dict) = doc.get_object_mut(page_id).and_then(Object::as_dict_mut) {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}

const HDFC_PAGE: &[&str] = &[
    "HDFC Bank Credit Card Statement",
    "Name: RAHUL SHARMA",
    "Card No: 4375 XXXX XXXX 1234",
    "Statement Date: 12/03/2024",
    "Billing Period: 13/02/2024 to 12/03/2024",
    "Payment Due Date: 01/04/2024",
    "Total Dues: 12,345.00",
    "Minimum Amount Due: 620.00",
];

const HDFC_TRANSACTIONS: &[&str] = &[
    "Domestic Transactions",
    "Date  Transaction Description  Amount (in Rs.)",
    "15/02/2024  SWIGGY BANGALORE  450.00",
    "18/02/2024  PAYMENT RECEIVED NETBANKING  5,000.00 Cr",
    "Reward Points Summary",
];

const SBI_PAGE: &[&str] = &[
    "SBI Card Monthly Statement",
    "Credit Card Number: XXXX XXXX XXXX 5678",
    "Statement Date: 05 Mar 2024",
    "Payment Due Date: 25 Mar 2024",
    "Total Amount Due: 8,900.50",
];

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn test_parse_generated_hdfc_statement() {
    let bytes = statement_pdf(&[HDFC_PAGE, HDFC_TRANSACTIONS]);
    let mut doc = StatementDocument::from_bytes("hdfc.pdf", bytes);

    let result = StatementPipeline::default().parse_document(&mut doc).unwrap();

    assert_eq!(result.issuer(), Issuer::Hdfc);
    assert_eq!(result.source().page_count, 2);
    let summary = result.summary();
    assert_eq!(summary.card_last4.as_deref(), Some("1234"));
    assert_eq!(summary.total_due, Some(dec("12345.00")));
    assert_eq!(summary.minimum_due, Some(dec("620.00")));
    assert_eq!(summary.payment_due_date.map(|d| d.to_string()).as_deref(), Some("2024-04-01"));
    assert_eq!(summary.currency, "INR");

    assert!(!result.transactions().is_empty());
    for txn in result.transactions() {
        assert!(txn.amount() >= Decimal::ZERO);
        assert_eq!(txn.signed_amount() < Decimal::ZERO, txn.is_credit());
    }
}

#[test]
fn test_zip_with_one_bad_member() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("batch.zip");

    let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    zip.start_file("1_hdfc.pdf", options).unwrap();
    zip.write_all(&statement_pdf(&[HDFC_PAGE, HDFC_TRANSACTIONS])).unwrap();
    zip.start_file("2_broken.pdf", options).unwrap();
    zip.write_all(b"%PDF-1.4\n%%EOF").unwrap();
    zip.start_file("3_sbi.pdf", options).unwrap();
    zip.write_all(&statement_pdf(&[SBI_PAGE])).unwrap();
    zip.finish().unwrap();

    let outcomes = StatementPipeline::default().process_path(&path).unwrap();

    let statuses: Vec<(&str, &str)> = outcomes.iter().map(|o| (o.file(), o.status())).collect();
    assert_eq!(
        statuses,
        vec![
            ("1_hdfc.pdf", "parsed"),
            ("2_broken.pdf", "failed"),
            ("3_sbi.pdf", "parsed"),
        ]
    );
    assert_eq!(outcomes[2].result().unwrap().issuer(), Issuer::Sbi);
}

#[test]
fn test_zip_survives_member_with_unknown_font_encoding() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("batch.zip");

    let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    zip.start_file("1_hdfc.pdf", options).unwrap();
    zip.write_all(&statement_pdf(&[HDFC_PAGE, HDFC_TRANSACTIONS])).unwrap();
    zip.start_file("2_badfont.pdf", options).unwrap();
    zip.write_all(&save(build_document(&[SBI_PAGE], Some("BogusEncoding"))))
        .unwrap();
    zip.finish().unwrap();

    let outcomes = StatementPipeline::default().process_path(&path).unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].file(), "1_hdfc.pdf");
    assert_eq!(outcomes[0].status(), "parsed");
    assert_eq!(outcomes[1].file(), "2_badfont.pdf");
}

#[test]
fn test_unknown_font_encoding_falls_back_to_raw_text() {
    let data = save(build_document(&[SBI_PAGE], Some("BogusEncoding")));

    let content = extract_document(&data, &PdfConfig::default()).unwrap();
    assert_eq!(content.pdf_type, PdfType::Raw);
    assert!(content.text.contains("SBI Card Monthly Statement"));

    let strict = PdfConfig {
        raw_fallback: false,
        ..PdfConfig::default()
    };
    assert!(matches!(
        extract_document(&data, &strict),
        Err(PdfError::TextExtraction(_))
    ));
}

#[test]
fn test_encrypted_document_is_never_decoded_raw() {
    let mut doc = build_document(&[HDFC_PAGE], None);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => Object::Integer(5),
        "R" => Object::Integer(6),
        "P" => Object::Integer(-4),
    });
    doc.trailer.set("Encrypt", Object::Reference(encrypt_id));
    let data = save(doc);

    let result = extract_document(&data, &PdfConfig::default());
    assert!(matches!(result, Err(PdfError::Encrypted)));
}

#[test]
fn test_document_without_pages() {
    let data = statement_pdf(&[]);
    let result = extract_document(&data, &PdfConfig::default());
    assert!(matches!(result, Err(PdfError::NoPages)));
}

#[test]
fn test_max_pages_truncates_extraction() {
    let data = statement_pdf(&[HDFC_PAGE, HDFC_TRANSACTIONS, SBI_PAGE]);
    let config = PdfConfig {
        max_pages: 2,
        ..PdfConfig::default()
    };

    let content = extract_document(&data, &config).unwrap();
    assert_eq!(content.pages.len(), 2);
    assert!(content.text.contains("Domestic Transactions"));
    assert!(!content.text.contains("SBI Card"));
}

#[test]
fn test_directory_export_has_one_record_per_outcome() {
    let input = tempfile::tempdir().unwrap();
    std::fs::write(
        input.path().join("a_hdfc.pdf"),
        statement_pdf(&[HDFC_PAGE, HDFC_TRANSACTIONS]),
    )
    .unwrap();
    std::fs::write(input.path().join("b_sbi.pdf"), statement_pdf(&[SBI_PAGE])).unwrap();
    std::fs::write(input.path().join("c_empty.pdf"), b"").unwrap();

    let outcomes = StatementPipeline::default().process_path(input.path()).unwrap();
    assert_eq!(outcomes.len(), 3);
    assert!(matches!(outcomes[2], ParseOutcome::Failed(_)));

    let out = tempfile::tempdir().unwrap();
    let paths = export_all(&outcomes, &StmtxConfig::default(), out.path()).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.json).unwrap()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 3);

    let mut rdr = csv::Reader::from_path(&paths.csv).unwrap();
    assert_eq!(rdr.records().count(), 3);

    let conn = rusqlite::Connection::open(&paths.db).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM statements", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 3);
}
