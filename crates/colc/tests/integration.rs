//! End-to-end CLI integration tests for the `colc` binary.
//!
//! Each test creates its own temporary directory, initializes a project,
//! and exercises the `colc` binary as a subprocess via `assert_cmd`.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a `Command` targeting the cargo-built `colc` binary, isolated from
/// any colcipher settings in the caller's environment.
fn colc() -> Command {
    let mut cmd = Command::cargo_bin("colc").unwrap();
    for var in [
        "COLCIPHER_DIR",
        "COLCIPHER_PASSKEY",
        "COLCIPHER_JSON",
        "COLCIPHER_SAMPLE",
        "COLCIPHER_STORE",
        "COLCIPHER_HISTORY_LIMIT",
        "COLCIPHER_MAX_FAILURES",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Initialize a fresh project in a temp directory and return the handle.
fn init_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    colc()
        .args(["init", "--quiet"])
        .current_dir(tmp.path())
        .assert()
        .success();
    tmp
}

/// Run `colc` with `args` in `dir` and parse stdout as JSON.
fn json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let output = colc().arg("--json").args(args).current_dir(dir).output().unwrap();
    assert!(
        output.status.success(),
        "colc {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn read_rows(path: &Path) -> Vec<serde_json::Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// init / version / completion
// ---------------------------------------------------------------------------

#[test]
fn init_creates_project_with_default_formulas() {
    let tmp = init_project();
    let dir = tmp.path().join(".colcipher");
    assert!(dir.join("config.yaml").exists());
    assert!(dir.join(".gitignore").exists());
    assert!(dir.join("colcipher.db").exists());

    let list = json(tmp.path(), &["formula", "list"]);
    let ids: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["caesar-3", "digit-reversal", "position-shift-2"]);
}

#[test]
fn commands_fail_outside_a_project() {
    let tmp = TempDir::new().unwrap();
    colc()
        .args(["formula", "list"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("colc init"));
}

#[test]
fn dir_flag_points_at_project() {
    let tmp = init_project();
    let elsewhere = TempDir::new().unwrap();
    colc()
        .args(["--dir", tmp.path().to_str().unwrap(), "formula", "show", "caesar-3"])
        .current_dir(elsewhere.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Caesar Shift (+3)"));
}

#[test]
fn version_and_completion() {
    colc()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("colc version"));
    colc()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("colc"));
}

// ---------------------------------------------------------------------------
// encode / decode
// ---------------------------------------------------------------------------

#[test]
fn encode_decode_caesar() {
    let tmp = init_project();
    colc()
        .args(["encode", "caesar-3", "ABC123XYZ"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout("DEF456ABC\n");
    colc()
        .args(["decode", "caesar-3", "DEF456ABC"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout("ABC123XYZ\n");
}

#[test]
fn encode_json_lists_each_value() {
    let tmp = init_project();
    let out = json(tmp.path(), &["encode", "digit-reversal", "ab12", "x-y"]);
    assert_eq!(out["formula"], "digit-reversal");
    assert_eq!(out["operation"], "encode");
    let results = out["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["input"], "ab12");
    assert_eq!(results[0]["output"], "21ba");
}

#[test]
fn encode_unknown_formula_fails() {
    let tmp = init_project();
    colc()
        .args(["encode", "nope", "abc"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}

// ---------------------------------------------------------------------------
// formula management
// ---------------------------------------------------------------------------

#[test]
fn formula_add_test_and_remove() {
    let tmp = init_project();
    let added = json(
        tmp.path(),
        &["formula", "add", "Shift back", "-a", "caesar", "--shift", "-1"],
    );
    let id = added["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("fm-"), "generated id: {id}");
    assert_eq!(added["parameters"]["shiftValue"], -1);

    colc()
        .args(["encode", &id, "B2"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout("A1\n");

    let tested = json(tmp.path(), &["formula", "test", &id, "--extended"]);
    let results = tested["results"].as_array().unwrap();
    assert!(results.len() > 1);
    assert_eq!(results[0]["original"], "Test123ABC");
    assert!(results.iter().all(|r| r["isReversible"] == true));

    colc()
        .args(["formula", "remove", &id])
        .current_dir(tmp.path())
        .assert()
        .success();
    colc()
        .args(["formula", "show", &id])
        .current_dir(tmp.path())
        .assert()
        .failure();
}

#[test]
fn formula_add_rejects_missing_shift() {
    let tmp = init_project();
    colc()
        .args(["formula", "add", "Broken", "-a", "caesar"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Shift value is required"));
}

#[test]
fn formula_custom_mapping_warns_when_not_reversible() {
    let tmp = init_project();
    colc()
        .args([
            "formula", "add", "Lossy", "--id", "lossy", "-a", "custom_mapping", "--map", "a=x",
            "--map", "b=x",
        ])
        .current_dir(tmp.path())
        .assert()
        .success();
    colc()
        .args(["formula", "test", "lossy", "--sample", "ab"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not reversible"));
}

#[test]
fn formula_edit_keeps_unspecified_fields() {
    let tmp = init_project();
    let edited = json(tmp.path(), &["formula", "edit", "caesar-3", "--shift", "5"]);
    assert_eq!(edited["name"], "Caesar Shift (+3)");
    assert_eq!(edited["parameters"]["shiftValue"], 5);
    colc()
        .args(["encode", "caesar-3", "a"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout("f\n");
}

#[test]
fn formula_import_and_validate_file() {
    let tmp = init_project();
    let file = tmp.path().join("formulas.json");
    fs::write(
        &file,
        r#"[
            {"id": "rot13", "name": "ROT13", "algorithm": "caesar", "parameters": {"shiftValue": 13}},
            {"id": "caesar-3", "name": "Dup", "algorithm": "digit_reversal"}
        ]"#,
    )
    .unwrap();

    let out = json(tmp.path(), &["formula", "import", file.to_str().unwrap()]);
    assert_eq!(out["added"], serde_json::json!(["rot13"]));
    assert_eq!(out["skipped"], serde_json::json!(["caesar-3"]));

    colc()
        .args(["formula", "validate", "--file", file.to_str().unwrap()])
        .current_dir(tmp.path())
        .assert()
        .success();

    let bad = tmp.path().join("bad.json");
    fs::write(&bad, r#"{"id": "x", "name": "X", "algorithm": "rot47"}"#).unwrap();
    colc()
        .args(["formula", "validate", "--file", bad.to_str().unwrap()])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unknown algorithm: rot47"));
}

// ---------------------------------------------------------------------------
// config / mapping / run / stats
// ---------------------------------------------------------------------------

fn configure_pipeline(tmp: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let input = tmp.path().join("input.jsonl");
    let output = tmp.path().join("output.jsonl");
    fs::write(
        &input,
        "{\"id\": \"r1\", \"ssn\": \"123-45\", \"name\": \"Ann\"}\n\
         not json\n\
         {\"id\": \"r3\", \"name\": \"Bob\"}\n",
    )
    .unwrap();

    for (key, value) in [
        ("source.path", input.to_str().unwrap()),
        ("destination.path", output.to_str().unwrap()),
        ("default_formula", "caesar-3"),
    ] {
        colc()
            .args(["config", "set", key, value])
            .current_dir(tmp.path())
            .assert()
            .success();
    }
    colc()
        .args(["mapping", "add", "ssn", "-t", "ssn_enc"])
        .current_dir(tmp.path())
        .assert()
        .success();
    colc()
        .args(["mapping", "add", "name", "--no-encode"])
        .current_dir(tmp.path())
        .assert()
        .success();
    (input, output)
}

#[test]
fn config_get_set_and_reject_unknown() {
    let tmp = init_project();
    colc()
        .args(["config", "set", "source.batch_size", "25"])
        .current_dir(tmp.path())
        .assert()
        .success();
    colc()
        .args(["config", "get", "source.batch_size"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout("25\n");
    colc()
        .args(["config", "set", "source.batch_size", "0"])
        .current_dir(tmp.path())
        .assert()
        .failure();
    colc()
        .args(["config", "set", "default_formula", "missing"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing"));
    colc()
        .args(["config", "set", "nope", "1"])
        .current_dir(tmp.path())
        .assert()
        .failure();
}

#[test]
fn run_processes_rows_and_records_history() {
    let tmp = init_project();
    let (_, output) = configure_pipeline(&tmp);

    let record = json(tmp.path(), &["run"]);
    assert_eq!(record["stats"]["totalRows"], 3);
    assert_eq!(record["stats"]["processedRows"], 1);
    assert_eq!(record["stats"]["failedRows"], 2);
    assert_eq!(record["stats"]["encodedValues"], 1);

    let rows = read_rows(&output);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], serde_json::json!({"ssn_enc": "456-78", "name": "Ann"}));
    assert_eq!(rows[1], serde_json::json!({"name": "Bob"}));

    let stats = json(tmp.path(), &["stats", "--history"]);
    assert_eq!(stats["runs"], 1);
    assert_eq!(stats["totals"]["totalRows"], 3);
    assert_eq!(stats["mappings"], 2);
    assert_eq!(stats["failureReasons"]["ssn"]["column not found in row"], 1);
    assert_eq!(stats["history"].as_array().unwrap().len(), 1);
}

#[test]
fn dry_run_writes_nothing() {
    let tmp = init_project();
    let (_, output) = configure_pipeline(&tmp);

    let record = json(tmp.path(), &["run", "--dry-run"]);
    assert_eq!(record["dryRun"], true);
    assert!(!output.exists());

    let stats = json(tmp.path(), &["stats"]);
    assert_eq!(stats["runs"], 0);
}

#[test]
fn run_without_source_fails() {
    let tmp = init_project();
    colc()
        .args(["run"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no source path configured"));
}

#[test]
fn mapping_list_and_remove() {
    let tmp = init_project();
    configure_pipeline(&tmp);
    colc()
        .args(["mapping", "list"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("caesar-3 (default)"))
        .stdout(predicate::str::contains("(copy)"));

    colc()
        .args(["mapping", "remove", "ssn"])
        .current_dir(tmp.path())
        .assert()
        .success();
    let list = json(tmp.path(), &["mapping", "list"]);
    assert_eq!(list.as_array().unwrap().len(), 1);

    colc()
        .args(["mapping", "remove", "ssn"])
        .current_dir(tmp.path())
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// passkey
// ---------------------------------------------------------------------------

#[test]
fn passkey_gates_mutations() {
    let tmp = init_project();
    colc()
        .args(["passkey", "set", "s3cret"])
        .current_dir(tmp.path())
        .assert()
        .success();

    colc()
        .args(["config", "set", "source.table", "people"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("access denied"));
    colc()
        .args(["--passkey", "wrong", "config", "set", "source.table", "people"])
        .current_dir(tmp.path())
        .assert()
        .failure();
    colc()
        .args(["--passkey", "s3cret", "config", "set", "source.table", "people"])
        .current_dir(tmp.path())
        .assert()
        .success();

    // Reads stay open.
    colc()
        .args(["config", "get", "source.table"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout("people\n");

    colc()
        .args(["passkey", "check"])
        .env("COLCIPHER_PASSKEY", "s3cret")
        .current_dir(tmp.path())
        .assert()
        .success();
    colc()
        .args(["passkey", "check"])
        .current_dir(tmp.path())
        .assert()
        .failure();

    colc()
        .args(["--passkey", "s3cret", "passkey", "clear"])
        .current_dir(tmp.path())
        .assert()
        .success();
    colc()
        .args(["config", "set", "source.table", "other"])
        .current_dir(tmp.path())
        .assert()
        .success();
}
