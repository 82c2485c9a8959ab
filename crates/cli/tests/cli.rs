use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const FIXTURE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../go-frontend/tests/fixtures/test_data.go"
);

#[allow(deprecated)]
fn typex() -> Command {
    let mut cmd = Command::cargo_bin("typex").expect("binary");
    cmd.arg("--quiet");
    cmd
}

fn run_json(args: &[&str]) -> (bool, Value) {
    let output = typex().args(args).output().expect("command run");
    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    (output.status.success(), body)
}

fn write_go(dir: &Path, name: &str, source: &str) {
    fs::write(dir.join(name), source).unwrap();
}

#[test]
fn extract_fixture_prints_graph_and_stats() {
    let (ok, body) = run_json(&["extract", FIXTURE]);
    assert!(ok);

    assert_eq!(body["stats"]["declarations"], 5);
    assert_eq!(body["stats"]["structs"], 3);
    assert_eq!(body["stats"]["interfaces"], 1);
    assert_eq!(body["stats"]["aliases"], 1);
    assert_eq!(body["diagnostics"], serde_json::json!([]));

    let names: Vec<&str> = body["graph"]["declarations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["SimpleStruct", "GroupedStruct", "NestedStruct", "MyInt", "Doer"]
    );
}

#[test]
fn fields_query_promotes_embedded_fields() {
    let (ok, body) = run_json(&["fields", FIXTURE, "--type", "NestedStruct"]);
    assert!(ok);

    let names: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["SimpleStruct", "Other", "Field"]);
    assert_eq!(body["fields"][2]["owner"], "SimpleStruct");
}

#[test]
fn methods_query_lists_interface_methods() {
    let (ok, body) = run_json(&["methods", FIXTURE, "--type", "Doer"]);
    assert!(ok);
    assert_eq!(body["interface"], "Doer");
    assert_eq!(body["methods"][0]["signature"]["name"], "Do");
}

#[test]
fn unknown_type_prints_not_found_and_fails() {
    let (ok, body) = run_json(&["fields", FIXTURE, "--type", "Missing"]);
    assert!(!ok);
    assert_eq!(body["kind"], "NotFound");
    assert_eq!(body["subject"], "Missing");
}

#[test]
fn wrong_shape_query_fails_without_json() {
    typex()
        .args(["methods", FIXTURE, "--type", "SimpleStruct"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an interface"));
}

#[test]
fn diagnostics_do_not_change_exit_status() {
    let temp = tempdir().unwrap();
    write_go(
        temp.path(),
        "cycle.go",
        "package p\n\ntype A struct {\n\tB\n}\n\ntype B struct {\n\tA\n}\n\ntype A int\n",
    );

    let (ok, body) = run_json(&["extract", temp.path().to_str().unwrap()]);
    assert!(ok);
    let kinds: Vec<&str> = body["diagnostics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["DuplicateTypeName", "EmbeddingCycle"]);
}

#[test]
fn test_files_excluded_unless_requested() {
    let temp = tempdir().unwrap();
    write_go(temp.path(), "types.go", "package p\n\ntype Real int\n");
    write_go(temp.path(), "types_test.go", "package p\n\ntype Fake int\n");
    let dir = temp.path().to_str().unwrap();

    let (_, body) = run_json(&["extract", dir]);
    assert_eq!(body["stats"]["declarations"], 1);

    let (_, body) = run_json(&["extract", dir, "--include-tests"]);
    assert_eq!(body["stats"]["declarations"], 2);
}

#[test]
fn config_file_is_applied() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("typex.toml");
    fs::write(&config, "keep_doc_comments = false\n").unwrap();

    let (ok, body) = run_json(&["extract", FIXTURE, "--config", config.to_str().unwrap()]);
    assert!(ok);
    assert!(body["graph"]["declarations"][0]["doc"].is_null());
}

#[test]
fn invalid_config_is_rejected() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("typex.toml");
    fs::write(&config, "max_inline_depth = 0\n").unwrap();

    typex()
        .args(["extract", FIXTURE, "--config", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_inline_depth"));
}

#[test]
fn missing_path_fails() {
    typex()
        .args(["extract", "/definitely/not/here"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}
