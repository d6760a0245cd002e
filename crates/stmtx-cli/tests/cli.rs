//! Integration tests for the `stmtx` binary.

use std::path::Path;

use assert_cmd::Command;
use lopdf::{dictionary, Document, Object, Stream};
use predicates::prelude::*;
use tempfile::TempDir;

/// Command with the config directory pointed at `home`.
fn cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stmtx").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path()).env("HOME", home.path());
    cmd
}

/// Single-page PDF with one text line per entry.
fn statement_pdf(lines: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut content = String::from("BT /F1 10 Tf 14 TL 40 800 Td\n");
    for line in lines {
        content.push_str(&format!("({line}) Tj T*\n"));
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

    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => Object::Integer(1),
    });
    if let Ok(dict) = doc.get_object_mut(page_id).and_then(Object::as_dict_mut) {
        dict.set("Parent", Object::Reference(pages_id));
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

const ICICI: &[&str] = &[
    "ICICI Bank Credit Card Statement",
    "Customer Name: PRIYA NAIR",
    "Card Number: 5241 XXXX XXXX 4321",
    "Statement Date: 15/03/2024",
    "Statement Period: 16/02/2024 to 15/03/2024",
    "Payment Due Date: 02/04/2024",
    "Total Amount Due: 12,499.00",
    "Minimum Amount Due: 625.00",
];

const KOTAK: &[&str] = &[
    "Kotak Mahindra Bank Credit Card Statement",
    "Card No: 4147 XXXX XXXX 7788",
    "Statement Date: 20/03/2024",
    "Payment Due Date: 08/04/2024",
    "Total Amount Due: 3,150.75",
];

fn write_pdf(dir: &Path, name: &str, lines: &[&str]) {
    std::fs::write(dir.join(name), statement_pdf(lines)).unwrap();
}

#[test]
fn test_help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("demo"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_process_prints_json() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "icici.pdf", ICICI);

    cmd(&home)
        .arg("process")
        .arg(dir.path().join("icici.pdf"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"issuer\": \"ICICI\""))
        .stdout(predicate::str::contains("\"card_last4\": \"4321\""))
        .stdout(predicate::str::contains("12499.00"));
}

#[test]
fn test_process_text_format_to_file() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "kotak.pdf", KOTAK);
    let output = dir.path().join("kotak.txt");

    cmd(&home)
        .arg("process")
        .arg(dir.path().join("kotak.pdf"))
        .args(["-f", "text", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"));

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("KOTAK"));
    assert!(text.contains("ending 7788"));
    assert!(text.contains("₹3,150.75"));
}

#[test]
fn test_process_rejects_unknown_bank() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    write_pdf(
        dir.path(),
        "other.pdf",
        &["Some Other Bank Statement", "Total Amount Due: 100.00"],
    );

    cmd(&home)
        .arg("process")
        .arg(dir.path().join("other.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported"));
}

#[test]
fn test_process_rejects_unsupported_extension() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("statement.txt");
    std::fs::write(&path, "HDFC Bank").unwrap();

    cmd(&home)
        .arg("process")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported input"));
}

#[test]
fn test_demo_writes_all_outputs() {
    let home = TempDir::new().unwrap();
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_pdf(input.path(), "a_icici.pdf", ICICI);
    write_pdf(input.path(), "b_kotak.pdf", KOTAK);

    cmd(&home)
        .arg("demo")
        .arg("--input-dir")
        .arg(input.path())
        .arg("--out-dir")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 results ->"));

    for name in ["results.json", "results.csv", "results_transactions.csv", "results.db"] {
        assert!(out.path().join(name).exists(), "{} missing", name);
    }
}

#[test]
fn test_batch_with_summary_continues_on_error() {
    let home = TempDir::new().unwrap();
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_pdf(input.path(), "icici.pdf", ICICI);
    std::fs::write(input.path().join("broken.pdf"), b"").unwrap();

    let pattern = format!("{}/*.pdf", input.path().display());
    cmd(&home)
        .args(["batch", &pattern, "--summary", "--continue-on-error", "-o"])
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 statements"))
        .stdout(predicate::str::contains("broken.pdf"));

    assert!(out.path().join("icici.json").exists());
    let summary = std::fs::read_to_string(out.path().join("summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 3);
}

#[test]
fn test_batch_keeps_same_named_statements_apart() {
    let home = TempDir::new().unwrap();
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    for (dir, lines) in [("icici", ICICI), ("kotak", KOTAK)] {
        let dir = input.path().join(dir);
        std::fs::create_dir(&dir).unwrap();
        write_pdf(&dir, "statement.pdf", lines);
    }

    let pattern = format!("{}/*/statement.pdf", input.path().display());
    cmd(&home)
        .args(["batch", &pattern, "-o"])
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 statements"));

    let first = std::fs::read_to_string(out.path().join("statement.json")).unwrap();
    let second = std::fs::read_to_string(out.path().join("statement-2.json")).unwrap();
    assert!(first.contains("ICICI"));
    assert!(second.contains("KOTAK"));
}

#[test]
fn test_batch_stops_on_first_error() {
    let home = TempDir::new().unwrap();
    let input = TempDir::new().unwrap();
    std::fs::write(input.path().join("broken.pdf"), b"").unwrap();

    let pattern = format!("{}/*.pdf", input.path().display());
    cmd(&home)
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn test_config_set_and_get() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("custom.json");

    cmd(&home)
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "extraction.min_year", "2018"])
        .assert()
        .success();

    cmd(&home)
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "extraction.min_year"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2018"));

    cmd(&home)
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "extraction.no_such_key", "1"])
        .assert()
        .failure();
}

#[test]
fn test_config_path_uses_config_dir() {
    let home = TempDir::new().unwrap();
    cmd(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stmtx"))
        .stdout(predicate::str::contains("not created"));
}
