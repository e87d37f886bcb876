//! End-to-end tests for the `macrum` binary.
//!
//! stdout is a pipe under the test harness, so commands answer in JSON.

use assert_cmd::Command;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn macrum(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("macrum").unwrap();
    cmd.env_remove("MACRUM_DB")
        .env_remove("MACRUM_TEST_DB")
        .env_remove("RUST_LOG")
        .arg("--db")
        .arg(db);
    cmd
}

fn init() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("macrum.db");
    macrum(&db).arg("init").assert().success();
    (dir, db)
}

fn run_json(db: &Path, args: &[&str]) -> Value {
    let output = macrum(db).args(args).assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

fn corrupt(db: &Path, key: &str) {
    let conn = rusqlite::Connection::open(db).unwrap();
    conn.execute(
        "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, '{broken', 0)",
        [key],
    )
    .unwrap();
}

fn stored(db: &Path, key: &str) -> Option<String> {
    let conn = rusqlite::Connection::open(db).unwrap();
    conn.query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
        .ok()
}

fn stderr_json(db: &Path, args: &[&str], code: i32) -> Value {
    let output = macrum(db).args(args).assert().code(code).get_output().stderr.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn test_commands_require_init() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("missing.db");
    let err = stderr_json(&db, &["business", "list"], 2);
    assert_eq!(err["error"]["code"], "NOT_INITIALIZED");
}

#[test]
fn test_init_twice_needs_force() {
    let (_dir, db) = init();
    let err = stderr_json(&db, &["init"], 2);
    assert_eq!(err["error"]["code"], "ALREADY_INITIALIZED");
    macrum(&db).args(["init", "--force"]).assert().success();
}

#[test]
fn test_business_create_and_list() {
    let (_dir, db) = init();

    let created = run_json(&db, &["business", "create", "Acme", "--email", "a@b.com"]);
    let id = created["business"]["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("biz_"));
    assert_eq!(created["notices"][0]["kind"], "created");

    let listed = run_json(&db, &["business", "list"]);
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["businesses"][0]["id"], id.as_str());
    assert_eq!(listed["businesses"][0]["projectCount"], 0);
}

#[test]
fn test_validation_failure_reports_fields() {
    let (_dir, db) = init();
    let err = stderr_json(&db, &["business", "create", " ", "--email", "nope"], 4);
    assert_eq!(err["error"]["code"], "VALIDATION_FAILED");
    assert_eq!(err["error"]["fields"][0]["field"], "name");
    assert_eq!(err["error"]["fields"][1]["field"], "email");

    let listed = run_json(&db, &["business", "list"]);
    assert_eq!(listed["count"], 0);
}

#[test]
fn test_project_and_task_bookkeeping() {
    let (_dir, db) = init();
    let biz = run_json(&db, &["business", "create", "Acme"]);
    let biz_id = biz["business"]["id"].as_str().unwrap().to_string();

    let err = stderr_json(
        &db,
        &[
            "project", "create", "Site", "--business", &biz_id, "--start", "2024-02-01", "--due",
            "2024-01-01",
        ],
        4,
    );
    assert_eq!(err["error"]["fields"][0]["field"], "dueDate");

    let project = run_json(
        &db,
        &[
            "project", "create", "Site", "--business", &biz_id, "--start", "2024-01-01", "--due",
            "2024-02-01", "--status", "wip",
        ],
    );
    let project_id = project["project"]["id"].as_str().unwrap().to_string();
    assert_eq!(project["project"]["status"], "in-progress");

    let task = run_json(&db, &["task", "create", "Write copy", "--project", &project_id]);
    let task_id = task["task"]["id"].as_str().unwrap().to_string();
    run_json(&db, &["task", "create", "Review", "--project", &project_id]);
    run_json(&db, &["task", "complete", &task_id]);

    let shown = run_json(&db, &["project", "show", &project_id]);
    assert_eq!(shown["project"]["taskCount"], 2);
    assert_eq!(shown["project"]["completedTasks"], 1);
    assert_eq!(shown["project"]["progress"], 50);
    assert_eq!(shown["tasks"].as_array().unwrap().len(), 2);

    let business = run_json(&db, &["business", "show", &biz_id]);
    assert_eq!(business["business"]["projectCount"], 1);
    assert_eq!(business["business"]["activeProjects"], 1);

    let completed = run_json(&db, &["task", "list", "--status", "done"]);
    assert_eq!(completed["count"], 1);
    assert_eq!(completed["tasks"][0]["id"], task_id.as_str());
}

#[test]
fn test_unknown_id_suggests_similar() {
    let (_dir, db) = init();
    let biz = run_json(&db, &["business", "create", "Acme"]);
    let id = biz["business"]["id"].as_str().unwrap().to_string();
    let typo = format!("{}x", &id[..id.len() - 1]);

    let err = stderr_json(&db, &["business", "show", &typo], 3);
    assert_eq!(err["error"]["code"], "BUSINESS_NOT_FOUND");
    assert!(err["error"]["hint"].as_str().unwrap().contains(&id));
}

#[test]
fn test_client_export_csv() {
    let (dir, db) = init();
    run_json(&db, &["client", "create", "Doe, Jane", "--email", "jane@example.com", "--company", "Acme"]);

    let out = macrum(&db).args(["client", "export"]).assert().success().get_output().stdout.clone();
    let csv = String::from_utf8(out).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Name,Email,Phone,Company,Status,Projects,Created"));
    assert!(lines.next().unwrap().starts_with("\"Doe, Jane\",jane@example.com,,Acme,active,0,"));

    let file = dir.path().join("clients.csv");
    let report = run_json(&db, &["client", "export", "--output", file.to_str().unwrap()]);
    assert_eq!(report["count"], 1);
    assert!(std::fs::read_to_string(&file).unwrap().starts_with("Name,Email"));
}

#[test]
fn test_notes_round_trip() {
    let (_dir, db) = init();
    run_json(&db, &["notes", "set", "first"]);
    let notes = run_json(&db, &["notes", "append", "second"]);
    assert_eq!(notes["content"], "first\nsecond");

    let cleared = run_json(&db, &["notes", "clear"]);
    assert_eq!(cleared["content"], "");
}

#[test]
fn test_dashboard_counts() {
    let (_dir, db) = init();
    run_json(&db, &["business", "create", "Acme"]);
    run_json(&db, &["client", "create", "Jane", "--email", "jane@example.com", "--status", "lead"]);

    let dash = run_json(&db, &["dashboard"]);
    assert_eq!(dash["businesses"]["total"], 1);
    assert_eq!(dash["clients"]["byStatus"]["prospect"], 1);
    assert_eq!(dash["tasks"]["total"], 0);
}

#[test]
fn test_csv_list_reports_data_reset() {
    let (_dir, db) = init();
    corrupt(&db, "macrum.projects");

    let assert = macrum(&db)
        .args(["-q", "--format", "csv", "project", "list"])
        .assert()
        .success();
    let output = assert.get_output();

    let stdout = String::from_utf8(output.stdout.clone()).unwrap();
    assert_eq!(stdout, "id,name,business_id,status,priority,progress,start_date,due_date\n");
    let stderr = String::from_utf8(output.stderr.clone()).unwrap();
    assert!(stderr.contains("Saved project data was corrupted and has been reset"));
    assert_eq!(stored(&db, "macrum.projects"), None);
}

#[test]
fn test_silent_create_still_reports_data_reset() {
    let (_dir, db) = init();
    corrupt(&db, "macrum.businesses");

    let assert = macrum(&db)
        .args(["--silent", "business", "create", "Acme"])
        .assert()
        .success();
    let output = assert.get_output();

    let stdout = String::from_utf8(output.stdout.clone()).unwrap();
    assert!(stdout.trim().starts_with("biz_"));
    let stderr = String::from_utf8(output.stderr.clone()).unwrap();
    assert!(stderr.contains("Saved business data was corrupted and has been reset"));
    assert!(!stderr.contains("created"));
}
