use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn permit() -> Command {
    Command::cargo_bin("permit").unwrap()
}

#[test]
fn formats_lists_pdf_and_images() {
    permit()
        .arg("formats")
        .assert()
        .success()
        .stdout(predicate::str::contains(".pdf"))
        .stdout(predicate::str::contains("application/pdf"))
        .stdout(predicate::str::contains(".tiff"));
}

#[test]
fn process_missing_file_fails() {
    let dir = TempDir::new().unwrap();

    permit()
        .arg("process")
        .arg(dir.path().join("missing.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn process_rejects_unsupported_format() {
    let dir = TempDir::new().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "Owner: Jane").unwrap();

    permit()
        .arg("process")
        .arg(&notes)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn process_without_models_explains_how_to_fix() {
    let dir = TempDir::new().unwrap();
    let scan = dir.path().join("scan.png");
    std::fs::write(&scan, b"not really a png").unwrap();

    permit()
        .arg("process")
        .arg(&scan)
        .arg("--model-dir")
        .arg(dir.path().join("no-models"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--model-dir"));
}

#[test]
fn batch_without_matches_fails() {
    let dir = TempDir::new().unwrap();
    let pattern = format!("{}/*.pdf", dir.path().display());

    permit()
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn config_init_get_set() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    let config = config.to_str().unwrap();

    permit()
        .args(["-c", config, "config", "init"])
        .assert()
        .success();

    permit()
        .args(["-c", config, "config", "get", "pdf.render_dpi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("300"));

    permit()
        .args(["-c", config, "config", "set", "extraction.description_max_chars", "200"])
        .assert()
        .success();

    permit()
        .args(["-c", config, "config", "get", "extraction.description_max_chars"])
        .assert()
        .success()
        .stdout(predicate::str::contains("200"));

    permit()
        .args(["-c", config, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn config_set_rejects_unknown_key() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");

    permit()
        .args(["-c", config.to_str().unwrap(), "config", "set", "ocr.unknown", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
