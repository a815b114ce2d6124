//! End-to-end runs of the `tw` binary against a DuckDB file

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Path to the compiled tw binary
fn tw_bin() -> String {
    env!("CARGO_BIN_EXE_tw").to_string()
}

/// Run `tw` inside `dir` with no inherited connection settings.
///
/// Returns (stdout, stderr, exit code).
fn run_tw(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(tw_bin())
        .current_dir(dir)
        .env_remove("DB_HOST")
        .env_remove("DB_PORT")
        .env_remove("DB_USER")
        .env_remove("DB_PASSWORD")
        .env_remove("DB_NAME")
        .env_remove("DB_PATH")
        .env_remove("DB_BACKEND")
        .env_remove("TW_PROFILE")
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute tw with args {:?}: {}", args, e));
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Run `tw` against the DuckDB file `db.duckdb` in `dir`
fn run_duckdb(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let mut full = vec!["--backend", "duckdb", "--db-path", "db.duckdb"];
    full.extend_from_slice(args);
    run_tw(dir, &full)
}

fn write(dir: &TempDir, name: &str, content: &str) {
    std::fs::write(dir.path().join(name), content).unwrap();
}

#[test]
fn test_duplicate_create_is_skipped() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "dup.sql",
        "CREATE TABLE t (id INT);\n-- comment\nCREATE TABLE t (id INT);",
    );

    let (stdout, stderr, code) = run_duckdb(dir.path(), &["apply", "dup.sql", "--policy", "abort"]);
    assert_eq!(code, 0, "stdout: {stdout}\nstderr: {stderr}");
    assert!(stdout.contains("2 attempted, 1 applied, 1 skipped, 0 failed"));
    assert!(stdout.contains("✓ [1] CREATE TABLE t (id INT)"));
    assert!(stdout.contains("⚠ [2] CREATE TABLE t (id INT)"));
}

#[test]
fn test_second_run_reports_no_failures() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "schema.sql",
        "CREATE TABLE departments (id INTEGER PRIMARY KEY, name VARCHAR);\n\
         CREATE INDEX idx_departments_name ON departments (name);\n\
         CREATE TABLE teams (id INTEGER, department_id INTEGER);\n",
    );

    let (first, _, code) = run_duckdb(dir.path(), &["apply", "schema.sql", "--policy", "abort"]);
    assert_eq!(code, 0);
    assert!(first.contains("3 attempted, 3 applied, 0 skipped, 0 failed"));

    let (second, _, code) = run_duckdb(
        dir.path(),
        &["apply", "schema.sql", "--policy", "abort", "--strict-exit"],
    );
    assert_eq!(code, 0);
    assert!(second.contains("3 attempted, 0 applied, 3 skipped, 0 failed"));
}

#[test]
fn test_continue_policy_runs_past_failures() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "partial.sql",
        "CREATE TABLE a (id INTEGER);\nINSERT INTO missing VALUES (1);\nCREATE TABLE b (id INTEGER);\n",
    );

    let (stdout, _, code) =
        run_duckdb(dir.path(), &["apply", "partial.sql", "--policy", "continue"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("3 attempted, 2 applied, 0 skipped, 1 failed"));
    assert!(stdout.contains("✗ [2] INSERT INTO missing VALUES (1)"));

    let (_, _, code) = run_duckdb(dir.path(), &["verify", "a", "b"]);
    assert_eq!(code, 0);
}

#[test]
fn test_strict_exit_fails_on_any_failure() {
    let dir = TempDir::new().unwrap();
    let (_, _, code) = run_duckdb(
        dir.path(),
        &[
            "apply",
            "--sql",
            "CREATE TABLE a (id INTEGER); INSERT INTO missing VALUES (1);",
            "--policy",
            "continue",
            "--strict-exit",
        ],
    );
    assert_eq!(code, 1);
}

#[test]
fn test_abort_policy_stops_and_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "strict.sql",
        "INSERT INTO missing VALUES (1);\nCREATE TABLE a (id INTEGER);\nCREATE TABLE b (id INTEGER);\n",
    );

    let (stdout, stderr, code) =
        run_duckdb(dir.path(), &["apply", "strict.sql", "--policy", "abort"]);
    assert_eq!(code, 1);
    assert!(stdout.contains("1 attempted, 0 applied, 0 skipped, 1 failed"));
    assert!(stderr.contains("[A001]"));

    let (stdout, _, code) = run_duckdb(dir.path(), &["verify", "a", "b"]);
    assert_eq!(code, 1);
    assert!(stdout.contains("a (missing)"));
    assert!(stdout.contains("b (missing)"));
}

#[test]
fn test_dry_run_strips_comments_without_connecting() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "data.sql",
        "-- ranks\n\nINSERT INTO ranks VALUES ('a;b');\n# legacy\nINSERT INTO ranks VALUES ('c');\n",
    );

    let (stdout, _, code) = run_tw(
        dir.path(),
        &[
            "--profile",
            "production",
            "apply",
            "data.sql",
            "--policy",
            "continue",
            "--strip-comments",
            "--dry-run",
        ],
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("2 statements (dry run"));
    assert!(stdout.contains("[1] INSERT INTO ranks VALUES ('a;b')"));
    assert!(stdout.contains("[2] INSERT INTO ranks VALUES ('c')"));
    assert!(!stdout.contains("Connecting"));
}

#[test]
fn test_production_profile_refuses_defaults() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_tw(
        dir.path(),
        &[
            "--profile",
            "production",
            "--host",
            "db.internal",
            "--user",
            "deploy",
            "--database",
            "cms_db",
            "apply",
            "--sql",
            "SELECT 1",
            "--policy",
            "abort",
        ],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("DB_PASSWORD"), "stderr: {stderr}");
}

#[test]
fn test_missing_sql_file_fails_before_connecting() {
    let dir = TempDir::new().unwrap();
    let (stdout, stderr, code) =
        run_duckdb(dir.path(), &["apply", "nope.sql", "--policy", "abort"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("[C005]"));
    assert!(!stdout.contains("Connecting"));
}

#[test]
fn test_plan_with_guards_and_verification() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("sql")).unwrap();
    write(
        &dir,
        "sql/org.sql",
        "-- Organizational tables\nCREATE TABLE departments (id INTEGER);\n\nCREATE TABLE ranks (id INTEGER);\n",
    );
    write(
        &dir,
        "plan.yml",
        r#"
scripts:
  - name: base
    sql: "CREATE TABLE users (id INTEGER, name VARCHAR);"
    policy: abort
  - name: hierarchy
    policy: abort
    steps:
      - sql: ALTER TABLE users ADD COLUMN parent_id INTEGER
        unless:
          column_exists: { table: users, column: parent_id }
  - name: organizational
    file: sql/org.sql
    comments: strip
    policy: continue
verify:
  tables: [users, departments, ranks]
"#,
    );

    let (first, stderr, code) = run_duckdb(dir.path(), &["plan", "plan.yml"]);
    assert_eq!(code, 0, "stdout: {first}\nstderr: {stderr}");
    assert!(first.contains("4 attempted, 4 applied, 0 skipped, 0 failed"));
    assert!(first.contains("✓ ranks"));

    let (second, _, code) = run_duckdb(dir.path(), &["plan", "plan.yml", "--strict-exit"]);
    assert_eq!(code, 0);
    assert!(second.contains("4 attempted, 0 applied, 4 skipped, 0 failed"));
    assert!(second.contains("column users.parent_id already exists"));
}

#[test]
fn test_plan_verification_failure_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "plan.yml",
        "scripts:\n  - name: base\n    sql: \"CREATE TABLE users (id INTEGER);\"\n    policy: abort\nverify:\n  tables: [users, audit_logs]\n",
    );

    let (stdout, _, code) = run_duckdb(dir.path(), &["plan", "plan.yml"]);
    assert_eq!(code, 1);
    assert!(stdout.contains("audit_logs (missing)"));
}
