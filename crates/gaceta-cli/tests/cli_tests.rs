//! Integration tests for the gaceta binary.
//!
//! Exercise argument parsing and fatal configuration errors with real
//! invocations; nothing here needs PDFium, the model or Tesseract because
//! every case fails (or exits) before worker resources are bound.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_gaceta"))
}

/// A vocabulary file with a couple of entries.
fn write_vocab(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("vocab.txt");
    std::fs::write(&path, "gaceta\ninformacion\n").unwrap();
    path
}

#[test]
fn help_describes_the_tool() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Digitize folders of scanned gazette PDFs"))
        .stdout(predicate::str::contains("--crop-workers"))
        .stdout(predicate::str::contains("--subset"));
}

#[test]
fn missing_required_arguments_fail() {
    cli()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--source"));
}

#[test]
fn missing_vocabulary_is_fatal() {
    let dir = TempDir::new().unwrap();
    cli()
        .arg("--source")
        .arg(dir.path())
        .arg("--output")
        .arg(dir.path().join("out"))
        .arg("--vocab")
        .arg(dir.path().join("no-vocab.txt"))
        .arg("--model")
        .arg(dir.path().join("model.onnx"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-vocab.txt"));
}

#[test]
fn empty_vocabulary_is_fatal() {
    let dir = TempDir::new().unwrap();
    let vocab = dir.path().join("vocab.txt");
    std::fs::write(&vocab, "\n  \n").unwrap();
    cli()
        .arg("--source")
        .arg(dir.path())
        .arg("--output")
        .arg(dir.path().join("out"))
        .arg("--vocab")
        .arg(&vocab)
        .arg("--model")
        .arg(dir.path().join("model.onnx"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("is empty"));
}

#[test]
fn unknown_subset_is_fatal_and_lists_known_names() {
    let dir = TempDir::new().unwrap();
    let vocab = write_vocab(&dir);
    let subsets = dir.path().join("subsets.json");
    std::fs::write(
        &subsets,
        r#"{"subsets": [{"name": "ensayo", "subfolders": ["1930"]}]}"#,
    )
    .unwrap();

    cli()
        .arg("--source")
        .arg(dir.path())
        .arg("--output")
        .arg(dir.path().join("out"))
        .arg("--vocab")
        .arg(&vocab)
        .arg("--model")
        .arg(dir.path().join("model.onnx"))
        .arg("--subset")
        .arg("produccion")
        .arg("--subsets-file")
        .arg(&subsets)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown subset 'produccion'"))
        .stderr(predicate::str::contains("ensayo"));
}

#[test]
fn missing_model_is_fatal() {
    let dir = TempDir::new().unwrap();
    let vocab = write_vocab(&dir);
    cli()
        .arg("--source")
        .arg(dir.path())
        .arg("--output")
        .arg(dir.path().join("out"))
        .arg("--vocab")
        .arg(&vocab)
        .arg("--model")
        .arg(dir.path().join("missing.onnx"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("layout model not found"));
}

#[test]
fn invalid_device_is_rejected_at_parse_time() {
    let dir = TempDir::new().unwrap();
    let vocab = write_vocab(&dir);
    cli()
        .arg("--source")
        .arg(dir.path())
        .arg("--output")
        .arg(dir.path().join("out"))
        .arg("--vocab")
        .arg(&vocab)
        .arg("--model")
        .arg(dir.path().join("model.onnx"))
        .arg("--device")
        .arg("mps")
        .assert()
        .failure()
        .stderr(predicate::str::contains("device"));
}
