// ABOUTME: Integration tests for the gameday CLI binary.
// ABOUTME: Tests request validation failures and an end-to-end stats download against a mock site.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn gameday_cmd() -> Command {
    Command::cargo_bin("gameday").unwrap()
}

fn write_settings(dir: &Path, base_url: &str) -> PathBuf {
    let path = dir.join("settings.json");
    let settings = format!(
        r#"{{
            "navigation": {{"settle_millis": 0, "page_load_timeout_secs": 5}},
            "teams": {{
                "nu": {{
                    "name": "Northwestern",
                    "abbreviation": "NU",
                    "base_url": "{base_url}",
                    "conference": {{"base_url": "https://bigten.org", "provider": "boost"}}
                }}
            }}
        }}"#
    );
    fs::write(&path, settings).unwrap();
    path
}

#[test]
fn help_lists_artifact_flags() {
    gameday_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--box-scores"))
        .stdout(predicate::str::contains("--articles"));
}

#[test]
fn unknown_team_fails_fast() {
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(temp_dir.path(), "https://nusports.com");

    gameday_cmd()
        .arg("--settings")
        .arg(&settings)
        .args(["--team", "iu", "--roster"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown team 'iu'"));
}

#[test]
fn no_artifact_selected_fails_fast() {
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(temp_dir.path(), "https://nusports.com");

    gameday_cmd()
        .arg("--settings")
        .arg(&settings)
        .args(["--team", "nu"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no artifact selected"));
}

#[test]
fn malformed_article_date_fails_fast() {
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(temp_dir.path(), "https://nusports.com");

    gameday_cmd()
        .arg("--settings")
        .arg(&settings)
        .args(["--team", "nu", "--articles", "2024-13-01", "2024-12-01"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unparseable date"));
}

#[test]
fn zero_box_scores_fails_fast() {
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(temp_dir.path(), "https://nusports.com");

    gameday_cmd()
        .arg("--settings")
        .arg(&settings)
        .args(["--team", "nu", "--box-scores", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("must be positive"));
}

#[test]
fn stats_run_reports_each_year() {
    let server = MockServer::start();
    let page_2023 = server.mock(|when, then| {
        when.method(GET).path("/stats/2023/pdf");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(r#"<html><body><embed src="/docs/2023.pdf"></body></html>"#);
    });
    let pdf_2023 = server.mock(|when, then| {
        when.method(GET).path("/docs/2023.pdf");
        then.status(200)
            .header("content-type", "application/pdf")
            .body("%PDF-1.4 season");
    });
    server.mock(|when, then| {
        when.method(GET).path("/stats/2022/pdf");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(r#"<html><body><object data="/docs/2022.pdf"></object></body></html>"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/docs/2022.pdf");
        then.status(404);
    });

    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(temp_dir.path(), &server.base_url());
    let out = temp_dir.path().join("out");

    gameday_cmd()
        .arg("--settings")
        .arg(&settings)
        .arg("--output")
        .arg(&out)
        .args(["--team", "nu", "--stats", "2022", "2023"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("failed  Northwestern 2022 Stats.pdf: file not found"))
        .stdout(predicate::str::contains("saved   Northwestern 2023 Stats.pdf"));

    page_2023.assert();
    pdf_2023.assert();
    assert_eq!(
        fs::read(out.join("Northwestern 2023 Stats.pdf")).unwrap(),
        b"%PDF-1.4 season"
    );
    assert!(!out.join("Northwestern 2022 Stats.pdf").exists());
}

#[test]
fn json_report_carries_outcomes() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/stats/2024/pdf");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body("<html><body><p>No stats yet</p></body></html>");
    });

    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(temp_dir.path(), &server.base_url());

    let output = gameday_cmd()
        .arg("--settings")
        .arg(&settings)
        .arg("--output")
        .arg(temp_dir.path().join("out"))
        .args(["--team", "nu", "--stats", "2024", "--json"])
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["team"], "Northwestern");
    assert_eq!(report["ok"], false);
    assert_eq!(report["outcomes"][0]["kind"], "stats");
    assert_eq!(report["outcomes"][0]["reason"], "could not find the PDF url");
}
