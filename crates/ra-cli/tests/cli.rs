//! CLI integration tests: each subcommand against a temporary config dir.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ra(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ra").expect("binary");
    cmd.arg("--config-dir").arg(dir.path());
    cmd
}

fn write_doc(dir: &TempDir, filename: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(filename);
    std::fs::write(&path, body).expect("write fixture");
    path
}

fn demo_body() -> String {
    serde_json::json!({
        "name": "demo.zenodo.org",
        "description": "",
        "app-name": "rda",
        "targets": [{
            "repo-pid": "PLACE_HOLDER",
            "repo-name": "demo.zenodo.org",
            "repo-display-name": "Zenodo Dev Environment",
            "bridge-module-class": "ZenodoApiDepositor",
            "target-url": "https://zenodo.org/api/deposit/depositions"
        }]
    })
    .to_string()
}

#[test]
fn upsert_show_list_delete_cycle() {
    let conf_dir = TempDir::new().expect("conf dir");
    let work_dir = TempDir::new().expect("work dir");
    let doc = write_doc(&work_dir, "demo.json", &demo_body());

    ra(&conf_dir)
        .arg("upsert")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""saved-conf":"demo.zenodo.org""#));

    ra(&conf_dir)
        .arg("show")
        .arg("demo.zenodo.org")
        .assert()
        .success()
        .stdout(predicate::str::contains("ZenodoApiDepositor"));

    ra(&conf_dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("demo.zenodo.org"));

    ra(&conf_dir)
        .arg("delete")
        .arg("demo.zenodo.org")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""deleted":"demo.zenodo.org""#));

    ra(&conf_dir)
        .arg("show")
        .arg("demo.zenodo.org")
        .assert()
        .failure()
        .code(13)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn second_upsert_requires_overwrite() {
    let conf_dir = TempDir::new().expect("conf dir");
    let work_dir = TempDir::new().expect("work dir");
    let doc = write_doc(&work_dir, "demo.json", &demo_body());

    ra(&conf_dir).arg("upsert").arg(&doc).assert().success();

    ra(&conf_dir)
        .arg("upsert")
        .arg(&doc)
        .assert()
        .failure()
        .code(12)
        .stderr(predicate::str::contains("already exists"));

    ra(&conf_dir)
        .arg("upsert")
        .arg(&doc)
        .arg("--overwrite")
        .assert()
        .success()
        .stdout(predicate::str::contains("saved-conf"));
}

#[test]
fn validate_reports_every_violation() {
    let conf_dir = TempDir::new().expect("conf dir");
    let work_dir = TempDir::new().expect("work dir");
    let doc = write_doc(
        &work_dir,
        "bad.json",
        r#"{ "name": "", "targets": [] }"#,
    );

    ra(&conf_dir)
        .arg("validate")
        .arg(&doc)
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("name"))
        .stderr(predicate::str::contains("app-name"))
        .stderr(predicate::str::contains("targets"));
}

#[test]
fn validate_accepts_good_document() {
    let conf_dir = TempDir::new().expect("conf dir");
    let work_dir = TempDir::new().expect("work dir");
    let doc = write_doc(&work_dir, "demo.json", &demo_body());

    ra(&conf_dir)
        .arg("validate")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""valid":"demo.zenodo.org""#));
}

#[test]
fn non_json_input_is_malformed_request() {
    let conf_dir = TempDir::new().expect("conf dir");
    let work_dir = TempDir::new().expect("work dir");
    let doc = write_doc(&work_dir, "nonsense.txt", "this is not json");

    ra(&conf_dir)
        .arg("upsert")
        .arg(&doc)
        .assert()
        .failure()
        .code(11)
        .stderr(predicate::str::contains("not valid JSON"));
}

#[test]
fn delete_unknown_name_fails_with_not_found() {
    let conf_dir = TempDir::new().expect("conf dir");

    ra(&conf_dir)
        .arg("delete")
        .arg("ghost")
        .assert()
        .failure()
        .code(13)
        .stderr(predicate::str::contains("not found"));
}
