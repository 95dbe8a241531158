//! Integration tests for `qat report` over saved item files.

mod common;

use common::{TestEnv, stdout_json};
use predicates::prelude::*;

const ITEMS: &str = r#"{
    "success": true,
    "testData": [
        {"id": "C1", "text": "Add item to cart", "feature": "Cart", "status": "Failed", "bugId": "BUG-1"},
        {"id": "C2", "text": "Remove item, then undo", "feature": "Cart", "status": "Pass", "bugId": "OLD-7"},
        {"id": "L1", "text": "Valid login succeeds", "feature": "Login", "status": "Pass", "bugId": null},
        {"id": "L2", "text": "Invalid password is rejected", "feature": "Login", "status": "Pending", "bugId": null}
    ]
}"#;

fn env_with_items() -> TestEnv {
    let env = TestEnv::new();
    env.write_file("session.json", ITEMS);
    env
}

#[test]
fn test_report_json_summary() {
    let env = env_with_items();
    let output = env
        .qat()
        .args(["report", "--input", "session.json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["summary"]["total"], 4);
    assert_eq!(json["summary"]["passed"], 2);
    assert_eq!(json["summary"]["failed"], 1);
    assert_eq!(json["summary"]["pending"], 1);
    assert_eq!(json["summary"]["passPercent"], 50.0);
    assert_eq!(json["summary"]["failPercent"], 25.0);
    assert_eq!(json["rows"].as_array().unwrap().len(), 4);
}

#[test]
fn test_report_bug_column_only_for_failed() {
    let env = env_with_items();
    let output = env
        .qat()
        .args(["report", "--input", "session.json"])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    assert_eq!(json["rows"][0]["bugId"], "BUG-1");
    // A stale bug id on a passed item is not exported
    assert_eq!(json["rows"][1]["bugId"], "-");
}

#[test]
fn test_report_human_text_table() {
    let env = env_with_items();
    env.qat()
        .args(["report", "--input", "session.json", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Total: 4 | Pass: 2 (50.0%) | Failed: 1 (25.0%) | Pending: 1",
        ))
        .stdout(predicate::str::contains("Checklist ID"))
        .stdout(predicate::str::contains("BUG-1"));
}

#[test]
fn test_report_csv_quotes_fields() {
    let env = env_with_items();
    env.qat()
        .args(["report", "--input", "session.json", "--format", "csv", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Feature,Checklist ID,Description,Bug ID,Status\n",
        ))
        .stdout(predicate::str::contains(
            "Cart,C2,\"Remove item, then undo\",-,Pass",
        ));
}

#[test]
fn test_report_csv_on_stdout_stays_json() {
    let env = env_with_items();
    let output = env
        .qat()
        .args(["report", "--input", "session.json", "--format", "csv"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["format"], "csv");
    assert_eq!(json["rows"], 4);
    let content = json["content"].as_str().unwrap();
    assert_eq!(content.lines().count(), 5);
    assert!(content.contains("Cart,C1,Add item to cart,BUG-1,Failed"));
}

#[test]
fn test_report_xlsx_save() {
    use calamine::{Reader, Xlsx, open_workbook};

    let env = env_with_items();
    let output = env
        .qat()
        .args(["report", "--input", "session.json", "--format", "xlsx", "--save"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["format"], "xlsx");

    let path = env.path().join("QA_Report.xlsx");
    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    assert_eq!(workbook.sheet_names().len(), 1);
    let range = workbook.worksheet_range("QA Report").unwrap();
    assert_eq!(range.height(), 5);
    let header: Vec<String> = range
        .rows()
        .next()
        .unwrap()
        .iter()
        .map(|cell| cell.to_string())
        .collect();
    assert_eq!(header, ["Feature", "Checklist ID", "Description", "Bug ID", "Status"]);
}

#[test]
fn test_report_pdf_output() {
    let env = env_with_items();
    env.qat()
        .args(["report", "--input", "session.json", "--format", "pdf", "-o", "rtm.pdf", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 4 row(s) to rtm.pdf"));
    let bytes = std::fs::read(env.path().join("rtm.pdf")).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn test_report_pdf_refuses_stdout() {
    let env = env_with_items();
    env.qat()
        .args(["report", "--input", "session.json", "--format", "pdf", "-H"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--output or --save"));
}

#[test]
fn test_report_filter_and_sort() {
    let env = env_with_items();
    let output = env
        .qat()
        .args([
            "report", "--input", "session.json", "--status", "pass", "--sort", "id", "--desc",
        ])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    let ids: Vec<&str> = json["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["L1", "C2"]);
    // The summary still covers the whole session
    assert_eq!(json["summary"]["total"], 4);
}

#[test]
fn test_report_search_and_feature() {
    let env = env_with_items();
    let output = env
        .qat()
        .args([
            "report", "--input", "session.json", "--feature", "Login", "--search", "PASSWORD",
        ])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    assert_eq!(json["rows"].as_array().unwrap().len(), 1);
    assert_eq!(json["rows"][0]["id"], "L2");
}

#[test]
fn test_report_output_file() {
    let env = env_with_items();
    let output = env
        .qat()
        .args([
            "report", "--input", "session.json", "--format", "csv", "--output", "out.csv",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["rows"], 4);
    assert_eq!(json["format"], "csv");

    let content = std::fs::read_to_string(env.path().join("out.csv")).unwrap();
    assert_eq!(content.lines().count(), 5);
}

#[test]
fn test_report_save_uses_default_name() {
    let env = env_with_items();
    env.qat()
        .args(["report", "--input", "session.json", "--format", "json", "--save", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 4 row(s) to QA_Report.json"));
    assert!(env.path().join("QA_Report.json").is_file());
}

#[test]
fn test_report_bare_item_array() {
    let env = TestEnv::new();
    env.write_file(
        "items.json",
        r#"[{"id": "S1", "text": "Search", "feature": "Search", "status": "Pending", "bugId": null}]"#,
    );
    let output = env
        .qat()
        .args(["report", "--input", "items.json"])
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output)["summary"]["pending"], 1);
}

#[test]
fn test_report_rejects_non_item_json() {
    let env = TestEnv::new();
    env.write_file("bad.json", r#"{"features": []}"#);
    env.qat()
        .args(["report", "--input", "bad.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a checklist item list"));
}

#[test]
fn test_report_unknown_format_is_usage_error() {
    let env = env_with_items();
    env.qat()
        .args(["report", "--input", "session.json", "--format", "docx"])
        .assert()
        .failure()
        .code(2);
}
