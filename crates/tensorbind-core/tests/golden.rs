use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tensorbind_core::{DynamicRecord, ModelInferResponse, decode};

fn case_dir(dir: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join(dir)
}

fn read_json(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {}: {err}", path.display()))
}

fn run_golden(dir: &str) {
    let root = case_dir(dir);
    let response = ModelInferResponse::from_json(&read_json(&root.join("response.json")))
        .expect("parse response.json");
    let fields: Vec<String> =
        serde_json::from_str(&read_json(&root.join("fields.json"))).expect("parse fields.json");
    let expected: Value =
        serde_json::from_str(&read_json(&root.join("expected.json"))).expect("parse expected.json");

    let mut record = DynamicRecord::from_specs(&fields).expect("field specs");
    decode(&response, &mut record).expect("decode response");

    let actual = serde_json::to_value(&record).expect("serialize record");
    assert_eq!(actual, expected, "golden mismatch in {dir}");
}

#[test]
fn golden_classification() {
    run_golden("tests/golden/classification");
}

#[test]
fn golden_detection_2d() {
    run_golden("tests/golden/detection_2d");
}

#[test]
fn golden_empty_strings() {
    run_golden("tests/golden/empty_strings");
}

#[test]
fn golden_mixed_ints() {
    run_golden("tests/golden/mixed_ints");
}

#[test]
fn golden_classification_skips_unbound_output() {
    let root = case_dir("tests/golden/classification");
    let response = ModelInferResponse::from_json(&read_json(&root.join("response.json")))
        .expect("parse response.json");
    assert!(response.outputs.iter().any(|output| output.name == "debug"));

    let expected: Value =
        serde_json::from_str(&read_json(&root.join("expected.json"))).expect("parse expected.json");
    assert!(expected.get("debug").is_none());
}
