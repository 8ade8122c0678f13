//! CLI integration tests

use std::process::{Command, Output};

fn demo_model() -> String {
    format!("{}/../../models/demo_forest.json", env!("CARGO_MANIFEST_DIR"))
}

fn medcost(args: &[&str]) -> Output {
    Command::new("cargo")
        .args(["run", "-q", "-p", "medcost-cli", "--"])
        .args(args)
        .env_remove("MEDCOST_API_URL")
        .env_remove("MEDCOST_MODEL")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = medcost(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("Medical Insurance Cost Predictor"),
        "Should show app name"
    );
    assert!(stdout.contains("predict"), "Should show predict command");
    assert!(stdout.contains("encode"), "Should show encode command");
    assert!(stdout.contains("health"), "Should show health command");
}

/// Test predict subcommand help lists the form fields
#[test]
fn test_predict_help() {
    let output = medcost(&["predict", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Predict help should succeed");
    for flag in ["--age", "--bmi", "--smoker", "--diet-type", "--condition", "--screen-time"] {
        assert!(stdout.contains(flag), "Should show {} option", flag);
    }
}

/// Test encoding the reference input as JSON
#[test]
fn test_encode_reference_input() {
    let output = medcost(&[
        "--format", "json", "encode", "--sex", "Male", "--condition", "None",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Encode should succeed: {}", stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(
        parsed["values"],
        serde_json::json!([30.0, 1.0, 25.0, 1.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 7.0, 5.0, 2.0, 6.0, 2.0])
    );
    assert_eq!(parsed["feature_names"][5], "region");
}

/// Test rejecting an out-of-range field
#[test]
fn test_encode_rejects_out_of_range() {
    let output = medcost(&["encode", "--stress-level", "11"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("stress_level"), "stderr was {}", stderr);
}

/// Test a local prediction with the demo model
#[test]
fn test_predict_with_local_model() {
    let model = demo_model();
    let output = medcost(&[
        "--model", &model, "--format", "json", "predict", "--sex", "Male",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Predict should succeed: {}", stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(parsed["predicted_cost"], 4966.67);
    assert_eq!(parsed["display"], "₹4966.67");
}

/// Test the eligibility message for ages above the limit
#[test]
fn test_predict_ineligible_age() {
    let model = demo_model();
    let output = medcost(&["--model", &model, "predict", "--age", "70"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(2));
    assert!(
        stdout.contains("Life insurance is not provided for individuals above 65."),
        "stdout was {}",
        stdout
    );
}

/// Test that a missing model fails instead of predicting
#[test]
fn test_predict_missing_model_fails() {
    let output = medcost(&["--model", "/nonexistent/insurance_model.onnx", "predict"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Model artifact unavailable"), "stderr was {}", stderr);
}
