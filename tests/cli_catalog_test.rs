//! Integration tests for `qat catalog` commands.

mod common;

use common::{TestEnv, stdout_json};
use predicates::prelude::*;

#[test]
fn test_catalog_features_sorted() {
    let env = TestEnv::with_catalog();
    let output = env.qat().args(["catalog", "features"]).output().unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["features"], serde_json::json!(["Cart", "Login", "Search"]));
}

#[test]
fn test_catalog_features_human() {
    let env = TestEnv::with_catalog();
    env.qat()
        .args(["catalog", "features", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 feature(s):"))
        .stdout(predicate::str::contains("  Cart"));
}

#[test]
fn test_catalog_merge_follows_request_order() {
    let env = TestEnv::with_catalog();
    let output = env
        .qat()
        .args(["catalog", "merge", "Search", "Cart"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    let ids: Vec<&str> = json["checklists"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["S1", "C1", "C2"]);
    assert_eq!(json["checklists"][1]["feature"], "Cart");
}

#[test]
fn test_catalog_merge_skips_unknown_features() {
    let env = TestEnv::with_catalog();
    let output = env
        .qat()
        .args(["catalog", "merge", "Payments", "Search"])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    assert_eq!(json["checklists"].as_array().unwrap().len(), 1);

    env.qat()
        .args(["catalog", "merge", "Payments", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No checklist items for: Payments"));
}

#[test]
fn test_catalog_merge_requires_a_feature() {
    TestEnv::with_catalog()
        .qat()
        .args(["catalog", "merge"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_catalog_check_valid() {
    let env = TestEnv::with_catalog();
    env.qat()
        .args(["catalog", "check", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(3 features, 5 templates)"))
        .stdout(predicate::str::contains("  Login: 2"));
}

#[test]
fn test_catalog_check_rejects_duplicate_ids_in_feature() {
    let env = TestEnv::new();
    env.write_file(
        "data/checklists.json",
        r#"{"Cart": [{"id": "C1", "text": "a"}, {"id": "C1", "text": "b"}]}"#,
    );
    env.qat()
        .args(["catalog", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("C1"));
}

#[test]
fn test_catalog_check_rejects_malformed_json() {
    let env = TestEnv::new();
    env.write_file("data/checklists.json", "{ not json");
    env.qat()
        .args(["catalog", "check", "-H"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Catalog parse error"));
}

#[test]
fn test_catalog_flag_overrides_default_path() {
    let env = TestEnv::new();
    env.write_file(
        "other/catalog.json",
        r#"{"Profile": [{"id": "P1", "text": "Edit name"}]}"#,
    );
    let output = env
        .qat()
        .args(["catalog", "features", "--catalog", "other/catalog.json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["features"], serde_json::json!(["Profile"]));
}

#[test]
fn test_catalog_path_from_config_file() {
    let env = TestEnv::new();
    env.write_file(
        "cfg/catalog.json",
        r#"{"Profile": [{"id": "P1", "text": "Edit name"}]}"#,
    );
    let config = env.write_file("qat.kdl", "catalog \"cfg/catalog.json\"\n");
    let output = env
        .qat()
        .args(["catalog", "features", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["features"], serde_json::json!(["Profile"]));
}
