use assert_cmd::Command;
use predicates::prelude::*;

fn tally() -> Command {
    Command::cargo_bin("tally").unwrap()
}

fn write_statement(dir: &std::path::Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn import_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("tally.db").to_string_lossy().to_string();
    let stmt = write_statement(
        dir.path(),
        "jan.csv",
        "Date,Description,Amount\n\
         01/15/2025,GROCERY MART,-45.10\n\
         01/15/2025,GROCERY MART,-45.10\n\
         junk,COFFEE SHOP,-4.50\n",
    );

    tally()
        .args(["--db", &db, "import", &stmt])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 imported"))
        .stdout(predicate::str::contains("1 skipped as duplicates"))
        .stdout(predicate::str::contains("1 malformed"));
}

#[test]
fn reimporting_identical_file_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("tally.db").to_string_lossy().to_string();
    let stmt = write_statement(
        dir.path(),
        "jan.csv",
        "Date,Description,Amount\n01/15/2025,GROCERY MART,-45.10\n",
    );

    tally().args(["--db", &db, "import", &stmt]).assert().success();
    tally()
        .args(["--db", &db, "import", &stmt])
        .assert()
        .success()
        .stdout(predicate::str::contains("already been imported"));
}

#[test]
fn promote_teaches_suggestions() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("tally.db").to_string_lossy().to_string();
    let stmt = write_statement(
        dir.path(),
        "jan.csv",
        "Date,Description,Amount\n01/15/2025,STARBUCKS #4521,-4.50\n",
    );

    tally().args(["--db", &db, "import", &stmt]).assert().success();
    tally()
        .args(["--db", &db, "promote", "1", "--category", "Food", "--subcategory", "Coffee"])
        .assert()
        .success();
    tally()
        .args(["--db", &db, "suggest", "STARBUCKS #7788"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Food / Coffee"));
}

#[test]
fn reconcile_requires_budget_link() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("tally.db").to_string_lossy().to_string();
    let stmt = write_statement(
        dir.path(),
        "jan.csv",
        "Date,Description,Amount\n01/15/2025,GROCERY MART,-45.10\n",
    );

    tally().args(["--db", &db, "import", &stmt]).assert().success();
    tally()
        .args(["--db", &db, "reconcile", "set", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid state transition"));

    tally()
        .args(["--db", &db, "promote", "1", "--category", "Food", "--subcategory", "Groceries"])
        .assert()
        .success();
    tally()
        .args(["--db", &db, "reconcile", "set", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reconciled"));
}

#[test]
fn allocate_previews_then_commits() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("tally.db").to_string_lossy().to_string();

    tally()
        .args(["--db", &db, "goals", "add", "Emergency fund", "--target", "50", "--priority", "1"])
        .assert()
        .success();
    tally()
        .args(["--db", &db, "goals", "add", "Vacation", "--target", "200", "--priority", "2"])
        .assert()
        .success();

    tally()
        .args(["--db", &db, "allocate", "--month", "2025-01", "--leftover", "120"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$50.00"))
        .stdout(predicate::str::contains("$70.00"))
        .stdout(predicate::str::contains("Preview only"));

    tally()
        .args(["--db", &db, "allocate", "--month", "2025-01", "--leftover", "120", "--commit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Allocations committed"));

    // Both goals funded: nothing left to allocate for the emergency fund.
    tally()
        .args(["--db", &db, "goals", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$50.00"));
}

#[test]
fn allocate_rejects_bad_month() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("tally.db").to_string_lossy().to_string();
    tally()
        .args(["--db", &db, "allocate", "--month", "January", "--leftover", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid month"));
}

#[test]
fn purge_requires_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("tally.db").to_string_lossy().to_string();
    let stmt = write_statement(
        dir.path(),
        "jan.csv",
        "Date,Description,Amount\n01/15/2025,GROCERY MART,-45.10\n",
    );
    tally().args(["--db", &db, "import", &stmt]).assert().success();

    tally()
        .args(["--db", &db, "purge"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));
    tally()
        .args(["--db", &db, "purge", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1"));
}
