use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const EXAMPLE: &str = "max 2x1+3x2\ns.t.\nx1+x2<=4\nx1-x2>=1\nend\n";

fn lpp(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lpp"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("run lpp")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn json(text: &str) -> serde_json::Value {
    serde_json::from_str(text).expect("valid json")
}

#[test]
fn parse_prints_json_model() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("example.lp"), EXAMPLE).unwrap();

    let output = lpp(&["parse", "example.lp", "--json", "--print"], dir.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let model = json(&stdout(&output));
    assert_eq!(model["MinMax"], 1);
    assert_eq!(model["c"], serde_json::json!([2.0, 3.0]));
    assert_eq!(model["A"], serde_json::json!([[1.0, 1.0], [1.0, -1.0]]));
    assert_eq!(model["Eqin"], serde_json::json!([-1, 1]));
    assert_eq!(model["b"], serde_json::json!([4.0, 1.0]));
    assert_eq!(model["naturalConstraints"], serde_json::json!([1, 1]));
}

#[test]
fn parse_dual_prints_dual_model() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("example.lp"), EXAMPLE).unwrap();

    let output = lpp(&["parse", "example.lp", "-d", "-j", "-p"], dir.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let model = json(&stdout(&output));
    assert_eq!(model["MinMax"], -1);
    assert_eq!(model["c"], serde_json::json!([4.0, 1.0]));
    assert_eq!(model["Eqin"], serde_json::json!([1, 1]));
    assert_eq!(model["b"], serde_json::json!([2.0, 3.0]));
    assert_eq!(model["naturalConstraints"], serde_json::json!([1, -1]));
}

#[test]
fn parse_writes_default_json_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("example.lp"), EXAMPLE).unwrap();

    let output = lpp(&["parse", "example.lp", "--json"], dir.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let written = fs::read_to_string(dir.path().join("(LP-2) example.lp.json")).unwrap();
    assert_eq!(json(&written)["MinMax"], 1);
}

#[test]
fn parse_writes_report_to_named_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("example.lp"), EXAMPLE).unwrap();

    let output = lpp(&["parse", "example.lp", "-o", "report.txt"], dir.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("not meant for parsing"));

    let report = fs::read_to_string(dir.path().join("report.txt")).unwrap();
    assert!(report.starts_with("MinMax = 1\n"));
    assert!(report.contains("A =\n[[1 1]\n [1 -1]]"));
}

#[test]
fn load_round_trips_json() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("example.lp"), EXAMPLE).unwrap();

    let first = lpp(&["parse", "example.lp", "-j", "-o", "model.json"], dir.path());
    assert!(first.status.success(), "stderr: {}", stderr(&first));

    let loaded = lpp(&["load", "model.json", "-j", "-p"], dir.path());
    assert!(loaded.status.success(), "stderr: {}", stderr(&loaded));

    let written = fs::read_to_string(dir.path().join("model.json")).unwrap();
    assert_eq!(json(&stdout(&loaded)), json(&written));
}

#[test]
fn load_then_dual_twice_returns_primal() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("example.lp"), EXAMPLE).unwrap();

    let primal = lpp(&["parse", "example.lp", "-j", "-o", "primal.json"], dir.path());
    assert!(primal.status.success());
    let dual = lpp(&["load", "primal.json", "-d", "-j", "-o", "dual.json"], dir.path());
    assert!(dual.status.success());
    let back = lpp(&["load", "dual.json", "-d", "-j", "-p"], dir.path());
    assert!(back.status.success(), "stderr: {}", stderr(&back));

    let written = fs::read_to_string(dir.path().join("primal.json")).unwrap();
    assert_eq!(json(&stdout(&back)), json(&written));
}

#[test]
fn load_rejects_inconsistent_model() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("bad.json"),
        r#"{"MinMax": 1, "c": [1, 2], "A": [[1]], "Eqin": [-1], "b": [3], "naturalConstraints": [1, 1]}"#,
    )
    .unwrap();

    let output = lpp(&["load", "bad.json", "-p"], dir.path());
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Row 1 of A"), "stderr: {}", stderr(&output));
}

#[test]
fn load_dual_rejects_inconsistent_result() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("partial.json"),
        r#"{"MinMax": -1, "c": [1, 2], "A": [[1, 0]], "Eqin": [1], "b": [3]}"#,
    )
    .unwrap();

    let output = lpp(&["load", "partial.json", "-d", "-j"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Length mismatch"), "stderr: {}", stderr(&output));
    assert!(!dir.path().join("(LP-2) partial.json.json").exists());
}

#[test]
fn load_reads_column_shaped_json() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("columns.json"),
        r#"{"MinMax": 1, "c": [2.0, 3.0], "A": [[1.0, 1.0], [1.0, -1.0]], "Eqin": [[-1], [1]], "b": [[4.0], [1.0]], "naturalConstraints": [1, 1]}"#,
    )
    .unwrap();

    let output = lpp(&["load", "columns.json", "-j", "-p"], dir.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let model = json(&stdout(&output));
    assert_eq!(model["Eqin"], serde_json::json!([-1, 1]));
    assert_eq!(model["b"], serde_json::json!([4.0, 1.0]));
}

#[test]
fn malformed_constraint_fails_with_location() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.lp"), "max 2x1+3x2\ns.t.\nx1 + x2\nend\n").unwrap();

    let output = lpp(&["parse", "bad.lp", "-p"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Constraint 1"), "stderr: {}", err);
    assert!(err.contains("line 3, column 1"), "stderr: {}", err);
    assert!(stdout(&output).is_empty());
}

#[test]
fn check_reports_ignored_natural_constraint() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("natural.lp"),
        "min x1 + x2\ns.t.\nx1 + x2 >= 1\nwith\nx1 <= 0\nx5 free\nend\n",
    )
    .unwrap();

    let output = lpp(&["check", "natural.lp"], dir.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("2 variables: x1, x2"), "stdout: {}", out);
    assert!(out.contains("1 constraints"), "stdout: {}", out);
    assert!(out.contains("unknown variable \"x5\""), "stdout: {}", out);
}

#[test]
fn check_json_summary() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("example.lp"), EXAMPLE).unwrap();

    let output = lpp(&["check", "example.lp", "--json"], dir.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report = json(&stdout(&output));
    assert_eq!(report["variables"], serde_json::json!(["x1", "x2"]));
    assert_eq!(report["constraints"], 2);
    assert_eq!(report["diagnostics"], serde_json::json!([]));
}

#[test]
fn missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = lpp(&["parse", "nope.lp", "-p"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("reading nope.lp"));
}
