// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! CLI end-to-end tests for `apigraph analyze`.
//!
//! These tests spawn the actual `apigraph` binary and validate stdout and
//! exit codes:
//! - 0: Success
//! - 2: Invalid arguments (no package, bad config)
//! - 3: Input error (missing trees directory, malformed tree)

use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::{json, Value};
use tempfile::TempDir;

/// Run apigraph with given arguments and return (stdout, stderr, exit_code).
fn run_apigraph(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_apigraph"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute apigraph");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn write_tree(dir: &Path, rel: &str, tree: Value) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(&tree).unwrap()).unwrap();
}

fn sample_trees() -> TempDir {
    let temp = TempDir::new().unwrap();
    write_tree(
        temp.path(),
        "pkg/__init__.json",
        json!({
            "path": "pkg/__init__.py",
            "fullname": "pkg",
            "body": [
                {"node": "import_from", "module": "_core", "relative": 1,
                 "names": [{"name": "_Client", "alias": "Client"}]}
            ]
        }),
    );
    write_tree(
        temp.path(),
        "pkg/_core.json",
        json!({
            "path": "pkg/_core.py",
            "fullname": "pkg._core",
            "body": [
                {"node": "class_def", "name": "_Client", "fullname": "pkg._core._Client",
                 "docstring": concat!(
                     "A client.\n\nArgs:\n",
                     "    retries (int): How often to retry. Defaults to 3.\n"
                 ),
                 "body": [
                     {"node": "func_def", "name": "__init__",
                      "fullname": "pkg._core._Client.__init__",
                      "arguments": [
                          {"name": "self", "kind": "pos", "is_self": true},
                          {"name": "retries", "kind": "opt",
                           "type": {"kind": "instance", "fullname": "builtins.int"},
                           "initializer": {"expr": "int", "value": 3}}
                      ]}
                 ]},
                {"node": "class_def", "name": "Pool", "fullname": "pkg._core.Pool"}
            ]
        }),
    );
    temp
}

// ============================================================================
// Success
// ============================================================================

#[test]
fn analyze_writes_document_to_stdout() {
    let trees = sample_trees();
    let dir = trees.path().to_str().unwrap();
    let (stdout, _stderr, exit_code) = run_apigraph(&[
        "analyze",
        dir,
        "--package",
        "pkg",
        "--version",
        "1.2.0",
        "--docstyle",
        "google",
    ]);
    assert_eq!(exit_code, 0, "stdout: {}", stdout);

    let doc: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(doc["schema_version"], "1");
    assert_eq!(doc["distribution"], "pkg");
    assert_eq!(doc["version"], "1.2.0");

    let classes = doc["classes"].as_array().unwrap();
    let client = classes
        .iter()
        .find(|c| c["id"] == "pkg/_core/_Client")
        .expect("client class");
    assert_eq!(client["is_public"], true);
    assert_eq!(client["constructor"], "pkg/_core/_Client/__init__");

    let parameters = doc["parameters"].as_array().unwrap();
    let retries = parameters
        .iter()
        .find(|p| p["id"] == "pkg/_core/_Client/__init__/retries")
        .expect("retries parameter");
    assert_eq!(retries["is_optional"], true);
    assert_eq!(retries["docstring"]["description"], "How often to retry. Defaults to 3.");
    assert_eq!(retries["docstring"]["default_value"], "3");
}

#[test]
fn public_only_with_config_file_and_out() {
    let trees = sample_trees();
    let work = TempDir::new().unwrap();
    let config = work.path().join("apigraph.json");
    fs::write(&config, r#"{"package": "pkg", "distribution": "pkg-dist"}"#).unwrap();
    let out = work.path().join("api.json");

    let (stdout, _stderr, exit_code) = run_apigraph(&[
        "analyze",
        trees.path().to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--public-only",
        "--out",
        out.to_str().unwrap(),
    ]);
    assert_eq!(exit_code, 0, "stdout: {}", stdout);
    assert!(stdout.is_empty());

    let doc: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(doc["distribution"], "pkg-dist");
    let ids: Vec<&str> = doc["classes"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["pkg/_core/_Client"]);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn missing_package_returns_exit_2() {
    let trees = sample_trees();
    let (stdout, _stderr, exit_code) = run_apigraph(&["analyze", trees.path().to_str().unwrap()]);
    assert_eq!(exit_code, 2);

    let json: Value = serde_json::from_str(stdout.trim()).expect("stdout should be valid JSON");
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], 2);
}

#[test]
fn missing_trees_dir_returns_exit_3() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("absent");
    let (stdout, _stderr, exit_code) =
        run_apigraph(&["analyze", missing.to_str().unwrap(), "--package", "pkg"]);
    assert_eq!(exit_code, 3);

    let json: Value = serde_json::from_str(stdout.trim()).expect("stdout should be valid JSON");
    assert_eq!(json["error"]["code"], 3);
}

#[test]
fn malformed_tree_returns_exit_3() {
    let trees = sample_trees();
    fs::write(trees.path().join("pkg/broken.json"), r#"{"fullname": 7}"#).unwrap();
    let (stdout, _stderr, exit_code) =
        run_apigraph(&["analyze", trees.path().to_str().unwrap(), "--package", "pkg"]);
    assert_eq!(exit_code, 3);

    let json: Value = serde_json::from_str(stdout.trim()).expect("stdout should be valid JSON");
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("broken.json"));
}
