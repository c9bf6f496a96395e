// Integration tests enforcing the --json stdout contract.
//
// These tests guarantee that stdout from --json commands is:
//   1. Valid JSON
//   2. Exactly one JSON value (no extra lines, no banners)
//   3. The correct shape for its command type
//
// Run with: cargo test -p truthgrid-cli --test json_contract_tests

use std::process::Command;

fn tgrid() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tgrid"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd
}

/// Assert stdout is a single, parseable JSON value with no extra lines.
fn assert_single_json(stdout: &str) -> serde_json::Value {
    let trimmed = stdout.trim();
    assert!(!trimmed.is_empty(), "stdout should not be empty");
    serde_json::from_str(trimmed).unwrap_or_else(|e| {
        panic!("stdout must be valid JSON.\nParse error: {e}\nstdout:\n{trimmed}")
    })
}

// ===========================================================================
// tgrid eval --json
// ===========================================================================

#[test]
fn eval_json_has_meta_summary_entries() {
    let output = tgrid().args(["eval", "--json"]).output().expect("tgrid eval --json");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let val = assert_single_json(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(
        val["meta"]["model_name"],
        "Constructed vs. Reality-Constrained Truth"
    );
    assert_eq!(val["summary"]["claims_passed"], 4);
    assert_eq!(val["summary"]["claims_failed"], 0);

    let entries = val["entries"].as_array().expect("entries array");
    assert!(entries.iter().any(|e| e["id"] == "CL1" && e["value"] == true));
    // The placeholder calculation carries no value key at all
    let hole = entries.iter().find(|e| e["id"] == "F_T_C_from_K").unwrap();
    assert_eq!(hole["status"], "undefined");
    assert!(hole.get("value").is_none());
}

#[test]
fn eval_json_set_edits_propagate() {
    let output = tgrid()
        .args(["eval", "--json", "--set", "C_me=9.2e-31"])
        .output()
        .expect("tgrid eval --set");
    assert!(output.status.success());

    let val = assert_single_json(&String::from_utf8_lossy(&output.stdout));
    let entries = val["entries"].as_array().unwrap();
    let cl2 = entries.iter().find(|e| e["id"] == "CL2").unwrap();
    assert_eq!(cl2["value"], false);
    // Unit invariance is untouched by the mass edit
    let cl1 = entries.iter().find(|e| e["id"] == "CL1").unwrap();
    assert_eq!(cl1["value"], true);
}

// ===========================================================================
// tgrid check --json
// ===========================================================================

#[test]
fn check_json_all_pass_on_builtin() {
    let output = tgrid().args(["check", "--json"]).output().expect("tgrid check --json");
    assert!(output.status.success());

    let val = assert_single_json(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(val["passed"], 4);
    assert_eq!(val["failed"], 0);
    assert!(val["failing"].as_array().unwrap().is_empty());
}

#[test]
fn check_json_reports_failing_claims() {
    let output = tgrid()
        .args(["check", "--json", "--set", "C_me=9.2e-31"])
        .output()
        .expect("tgrid check --set");
    assert_eq!(output.status.code(), Some(3));

    let val = assert_single_json(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(val["failed"], 1);
    let failing = val["failing"].as_array().unwrap();
    assert_eq!(failing[0]["id"], "CL2");
    assert_eq!(failing[0]["tolerance"], 1e-22);
}

// ===========================================================================
// tgrid questions --json
// ===========================================================================

#[test]
fn questions_json_is_an_array_of_answers() {
    let output = tgrid().args(["questions", "--json"]).output().expect("tgrid questions --json");
    assert!(output.status.success());

    let val = assert_single_json(&String::from_utf8_lossy(&output.stdout));
    let answers = val.as_array().expect("array of answers");
    assert_eq!(answers.len(), 6);

    let q2 = answers.iter().find(|q| q["id"] == "Q2").unwrap();
    assert_eq!(q2["answer"], false);
    let q0 = answers.iter().find(|q| q["id"] == "Q0").unwrap();
    assert_eq!(q0["answer"], true);
    assert!(q0["explanation"].as_str().unwrap().contains("CL4"));
}
