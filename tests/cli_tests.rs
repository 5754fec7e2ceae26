use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use diesel::RunQueryDsl;
use predicates::prelude::*;
use tempfile::TempDir;

use datasolver::adapter::outbound::sqlite::SqliteSource;

const LITERAL_PROBLEM: &str = r#"
constraints = ["x + y >= minimo", "x <= 4"]

[[variables]]
name = "x"

[[variables]]
name = "y"
upper = 10

[bindings.minimo]
value = 6

[objective]
direction = "minimize"
expression = "2 * x + 3 * y"
"#;

const DATABASE_PROBLEM: &str = r#"
constraints = ["compra >= previsao"]

[[variables]]
name = "compra"
domain = "integer"
over = "previsao"

[bindings.previsao]
source = "vendas"
table = "produtos"
column = "previsao"
key = "sku"

[bindings.custo]
source = "vendas"
table = "produtos"
column = "custo"
key = "sku"

[objective]
direction = "minimize"
expression = "custo * compra"
"#;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn datasolver(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("datasolver").expect("binary built");
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

fn seeded_workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("vendas.db");
    let source = SqliteSource::open("seed_db", db.to_str().unwrap(), 1).unwrap();
    let mut conn = source.pool().get().unwrap();
    for sql in [
        "CREATE TABLE produtos (sku TEXT, custo REAL, previsao INTEGER)",
        "INSERT INTO produtos VALUES ('a', 2.0, 3), ('b', 1.5, 4)",
    ] {
        diesel::sql_query(sql).execute(&mut conn).unwrap();
    }

    write(
        dir.path(),
        "datasolver.toml",
        &format!(
            "[[databases]]\nname = \"vendas\"\ndatabase = \"{}\"\n",
            db.display()
        ),
    );
    dir
}

#[test]
fn check_compiles_without_database() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "problem.toml", LITERAL_PROBLEM);

    datasolver(&dir)
        .args(["--color", "never", "check", "problem.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Problem compiles"))
        .stdout(predicate::str::contains("c0"));
}

#[test]
fn solve_prints_json_solution() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "problem.toml", LITERAL_PROBLEM);

    let output = datasolver(&dir)
        .args(["solve", "problem.toml", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["command"], "solve");
    assert_eq!(doc["solution"]["status"], "optimal");
    let objective = doc["solution"]["objective_value"].as_f64().unwrap();
    assert!((objective - 14.0).abs() < 1e-6, "objective {objective}");
    let x = doc["solution"]["values"]["x"].as_f64().unwrap();
    assert!((x - 4.0).abs() < 1e-6);
}

#[test]
fn solve_reads_bindings_from_configured_database() {
    let dir = seeded_workspace();
    write(dir.path(), "problem.toml", DATABASE_PROBLEM);

    let output = datasolver(&dir)
        .args(["--json", "solve", "problem.toml"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["model"]["variables"], 2);
    assert_eq!(doc["solution"]["values"]["compra[b]"].as_f64(), Some(4.0));
    let objective = doc["solution"]["objective_value"].as_f64().unwrap();
    assert!((objective - 12.0).abs() < 1e-6);
}

#[test]
fn solve_human_output_lists_values() {
    let dir = seeded_workspace();
    write(dir.path(), "problem.toml", DATABASE_PROBLEM);

    datasolver(&dir)
        .args(["--color", "never", "solve", "problem.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("optimal"))
        .stdout(predicate::str::contains("compra[a]"));
}

#[test]
fn infeasible_problem_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "problem.toml",
        r#"
constraints = ["x >= 10", "x <= 5"]

[[variables]]
name = "x"

[objective]
direction = "minimize"
expression = "x"
"#,
    );

    datasolver(&dir)
        .args(["--color", "never", "solve", "problem.toml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("infeasible"))
        .stderr(predicate::str::contains("model is infeasible"));
}

#[test]
fn compile_error_shows_the_expression() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "problem.toml",
        r#"
constraints = ["x * y <= 3"]

[[variables]]
name = "x"

[[variables]]
name = "y"

[objective]
direction = "minimize"
expression = "x"
"#,
    );

    datasolver(&dir)
        .args(["--color", "never", "check", "problem.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-linear expression"))
        .stderr(predicate::str::contains("x * y <= 3"));
}

#[test]
fn missing_database_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "problem.toml", DATABASE_PROBLEM);

    datasolver(&dir)
        .args(["--color", "never", "check", "problem.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("data source 'vendas' not found"));
}

#[test]
fn config_validate_reports_invalid_backend() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "bad.toml", "[solver]\nbackend = \"cplex\"\n");

    datasolver(&dir)
        .args(["--color", "never", "config", "validate", "--config", "bad.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("solver.backend"));
}

#[test]
fn config_validate_accepts_defaults() {
    let dir = tempfile::tempdir().unwrap();

    datasolver(&dir)
        .args(["--json", "config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"valid\":true"))
        .stdout(predicate::str::contains("built-in defaults"));
}

#[test]
fn missing_problem_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();

    datasolver(&dir)
        .args(["--color", "never", "check", "absent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read absent.toml"));
}
