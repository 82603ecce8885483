use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn task_cli(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("task-cli").unwrap();
    cmd.env_remove("TASK_CLI_PATH")
        .env_remove("TASK_CLI_LOG")
        .arg("--file")
        .arg(temp.child("tasks.json").path());
    cmd
}

#[test]
fn test_add_creates_task_file() {
    let temp = TempDir::new().unwrap();

    task_cli(&temp)
        .args(["add", "buy milk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task added with ID 1"));

    temp.child("tasks.json")
        .assert(predicate::str::contains("\"Description\": \"buy milk\""));
}

#[test]
fn test_add_with_empty_description_fails_without_writing() {
    let temp = TempDir::new().unwrap();

    task_cli(&temp)
        .args(["add", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("description is required"));

    temp.child("tasks.json").assert(predicate::path::missing());
}

#[test]
fn test_full_lifecycle() {
    let temp = TempDir::new().unwrap();

    task_cli(&temp).args(["add", "buy milk"]).assert().success();
    task_cli(&temp)
        .args(["mark-in-progress", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task 1 marked in-progress"));
    task_cli(&temp)
        .args(["mark-in-progress", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "can't transition from in-progress to in-progress",
        ));
    task_cli(&temp)
        .args(["mark-done", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task 1 marked done"));

    task_cli(&temp)
        .args(["list", "done"])
        .assert()
        .success()
        .stdout(predicate::str::contains("buy milk"));
    task_cli(&temp)
        .args(["list", "todo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks"));

    task_cli(&temp).args(["delete", "1"]).assert().success();
    task_cli(&temp)
        .args(["get", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no such task: 1"));
}

#[test]
fn test_update_changes_description() {
    let temp = TempDir::new().unwrap();

    task_cli(&temp).args(["add", "draft"]).assert().success();
    task_cli(&temp)
        .args(["update", "1", "final"])
        .assert()
        .success();

    task_cli(&temp)
        .args(["get", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("final"));
}

#[test]
fn test_update_missing_task_reports_not_found() {
    let temp = TempDir::new().unwrap();

    task_cli(&temp)
        .args(["update", "7", "anything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no such task: 7"));
}

#[test]
fn test_invalid_log_level_is_rejected() {
    let temp = TempDir::new().unwrap();

    task_cli(&temp)
        .args(["--log", "loud", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid log level 'loud'"));
}

#[test]
fn test_task_file_can_come_from_environment() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("from-env.json");

    Command::cargo_bin("task-cli")
        .unwrap()
        .env("TASK_CLI_PATH", file.path())
        .env_remove("TASK_CLI_LOG")
        .args(["add", "from env"])
        .assert()
        .success();

    file.assert(predicate::str::contains("from env"));
}

#[test]
fn test_corrupt_task_file_is_reported() {
    let temp = TempDir::new().unwrap();
    temp.child("tasks.json").write_str("not json").unwrap();

    task_cli(&temp)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("list tasks failed"));
}
