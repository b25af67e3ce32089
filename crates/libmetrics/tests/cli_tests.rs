//! CLI integration tests: commands, JSON output and exit codes.


use assert_cmd::Command;
use harness::TableFixture;
use libmetrics::config::SourceKind;
use predicates::prelude::*;

fn fixture() -> TableFixture {
    TableFixture::new()
        .library("Requests", "github.com/x/requests", "HTTP Clients")
        .library("httpx", "github.com/x/httpx", "HTTP Clients")
        .library("orjson", "github.com/x/orjson", "JSON")
        .popularity("Requests", "100")
        .popularity("httpx", "50")
        .raw(
            SourceKind::ReleaseFrequency,
            "Requests,httpx,orjson\n2019-05-01,2020-01-01,2018-01-01\n",
        )
        .raw(
            SourceKind::BackwardsCompatibility,
            "Release,Requests,httpx,orjson\nv1,3,0,1\n",
        )
        .discussed("httpx", "Never", "0")
        .write()
}

fn libmetrics(fixture: &TableFixture) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("libmetrics"));
    cmd.env_remove("RUST_LOG")
        .env_remove("LIBMETRICS_DATA_DIR")
        .arg("--data-dir")
        .arg(fixture.data_dir());
    cmd
}

#[test]
fn test_domains_lists_in_first_seen_order() {
    let fixture = fixture();

    libmetrics(&fixture)
        .arg("domains")
        .assert()
        .success()
        .stdout("HTTP Clients (2 libraries)\nJSON (1 library)\n");
}

#[test]
fn test_show_popularity_draws_bars() {
    let fixture = fixture();

    libmetrics(&fixture)
        .args(["show", "HTTP Clients"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("HTTP Clients: Popularity"))
        .stdout(predicate::str::contains(&"#".repeat(40)));
}

#[test]
fn test_show_discussion_renders_never() {
    let fixture = fixture();

    libmetrics(&fixture)
        .args(["show", "HTTP Clients", "--metric", "discussion"])
        .assert()
        .success()
        .stdout(predicate::str::contains("never"));
}

#[test]
fn test_show_unknown_domain_exits_not_found() {
    let fixture = fixture();

    libmetrics(&fixture)
        .args(["show", "Parsers"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Domain 'Parsers' not found"))
        .stderr(predicate::str::contains("HTTP Clients, JSON"));
}

#[test]
fn test_library_json_envelope() {
    let fixture = fixture();

    let output = libmetrics(&fixture)
        .args(["library", "Requests", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["metadata"]["command"], "library");
    assert_eq!(value["data"]["name"], "Requests");
    assert_eq!(value["data"]["popularity"], 100);
    assert_eq!(value["data"]["release_dates"][0], "2019-05-01");
}

#[test]
fn test_library_unknown_exits_not_found_json() {
    let fixture = fixture();

    let output = libmetrics(&fixture)
        .args(["library", "Ghost", "--json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["success"], false);
    assert_eq!(value["error"]["code"], "NOT_FOUND");
}

#[test]
fn test_check_clean_tables() {
    let fixture = fixture();

    libmetrics(&fixture)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ingested 2 domains with 3 libraries"))
        .stdout(predicate::str::contains("No problems found"));
}

#[test]
fn test_check_lists_problems_and_exits_validation_failed() {
    let fixture = fixture().popularity("Ghost", "1").write();

    libmetrics(&fixture)
        .arg("check")
        .assert()
        .code(4)
        .stdout(predicate::str::contains("[CORRELATION_MISS]"))
        .stdout(predicate::str::contains("\"Ghost\""));
}

#[test]
fn test_check_groups_problems_by_table() {
    let fixture = fixture()
        .modified("Ghost", "2020-01-01")
        .popularity("Phantom", "1")
        .write();

    let output = libmetrics(&fixture).arg("check").output().unwrap();

    assert_eq!(output.status.code(), Some(4));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let popularity = stdout.find("Popularity:\n  [CORRELATION_MISS]").unwrap();
    let modification = stdout
        .find("Last Modification Date:\n  [CORRELATION_MISS]")
        .unwrap();
    assert!(popularity < modification);
}

#[test]
fn test_other_commands_warn_about_problems() {
    let fixture = fixture().popularity("Ghost", "1").write();

    libmetrics(&fixture)
        .arg("domains")
        .assert()
        .success()
        .stderr(predicate::str::contains("1 problem(s) recorded"));

    libmetrics(&fixture)
        .args(["domains", "--quiet"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_strict_flag_aborts_on_malformed_record() {
    let fixture = fixture().modified("orjson", "yesterday").write();

    libmetrics(&fixture).arg("domains").assert().success();

    libmetrics(&fixture)
        .args(["domains", "--strict"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("malformed modification date"));
}

#[test]
fn test_missing_data_dir_exits_not_found() {
    let temp = tempfile::TempDir::new().unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("libmetrics"))
        .env_remove("RUST_LOG")
        .env("LIBMETRICS_DATA_DIR", temp.path().join("absent"))
        .arg("domains")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Library Info table could not be read"))
        .stderr(predicate::str::contains("--data-dir"));
}

#[test]
fn test_export_writes_model_file() {
    let fixture = fixture();
    let out = fixture.data_dir().join("model.json");

    libmetrics(&fixture)
        .args(["export", "--output"])
        .arg(&out)
        .assert()
        .success();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value[0]["name"], "HTTP Clients");
    assert_eq!(value[1]["libraries"][0]["name"], "orjson");
}

#[test]
fn test_verbose_logs_each_table() {
    let fixture = fixture();

    libmetrics(&fixture)
        .args(["domains", "--verbose"])
        .assert()
        .success()
        .stderr(predicate::str::contains("ingested table"));
}
