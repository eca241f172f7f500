//! End-to-end exercises of the trecbench binary.

#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PERFECT: &str = r#"
printf 'map                   \tall\t1.0000\n'
printf 'P_10                  \tall\t1.0000\n'
printf 'P_20                  \tall\t1.0000\n'
"#;

fn write_tool(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake_trec_eval");
    fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

struct Env {
    dir: TempDir,
}

impl Env {
    fn new(tool_body: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let tool = write_tool(dir.path(), tool_body);
        fs::write(
            dir.path().join("trecbench.yaml"),
            format!(
                "version: 1\n\
                 data_dir: .trecbench\n\
                 media_dir: .trecbench/media\n\
                 eval_tool:\n\
                 \x20 program: {}\n",
                tool.display()
            ),
        )
        .unwrap();
        fs::write(dir.path().join("qrels.txt"), "1 0 doc1 1\n1 0 doc2 1\n").unwrap();
        fs::write(
            dir.path().join("results.txt"),
            "1 Q0 doc1 1 0.9 baseline\n1 Q0 doc2 2 0.8 baseline\n",
        )
        .unwrap();
        Env { dir }
    }

    fn cmd(&self, args: &[&str]) -> Command {
        let mut cmd = Command::cargo_bin("trecbench").unwrap();
        cmd.current_dir(self.dir.path())
            .env_remove("TRECBENCH_CONFIG")
            .env_remove("TRECBENCH_EVAL_BIN")
            .args(args);
        cmd
    }

    fn register_admin(&self) {
        self.cmd(&[
            "register",
            "--username",
            "admin",
            "--password",
            "hunter2!!",
            "--admin",
        ])
        .assert()
        .success();
    }

    fn seed_task(&self) {
        self.cmd(&["track", "add", "--title", "Web"]).assert().success();
        self.cmd(&[
            "task",
            "add",
            "--track",
            "1",
            "--title",
            "Ad hoc",
            "--year",
            "2014",
            "qrels.txt",
        ])
        .assert()
        .success();
    }
}

#[test]
fn init_writes_config_and_layout() {
    let env = Env::new(PERFECT);
    fs::remove_file(env.dir.path().join("trecbench.yaml")).unwrap();

    env.cmd(&["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote trecbench.yaml"));
    assert!(env.dir.path().join(".trecbench/trecbench.db").exists());
    assert!(env.dir.path().join(".trecbench/media/results").is_dir());

    // second init leaves the existing config alone
    env.cmd(&["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped trecbench.yaml"));
}

#[test]
fn missing_config_is_an_internal_error() {
    let env = Env::new(PERFECT);
    fs::remove_file(env.dir.path().join("trecbench.yaml")).unwrap();

    env.cmd(&["track", "list"]).assert().code(2);
}

#[test]
fn submission_flow_end_to_end() {
    let env = Env::new(PERFECT);
    env.register_admin();
    env.seed_task();

    env.cmd(&[
        "submit",
        "--task",
        "1",
        "--name",
        "baseline",
        "results.txt",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("map  1.0000"))
    .stdout(predicate::str::contains("P@20 1.0000"));

    env.cmd(&["results", "--task", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("baseline"))
        .stdout(predicate::str::contains("1.0000"));

    env.cmd(&["results", "--task", "1", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"results_sha256\""));
}

#[test]
fn failed_evaluation_rejects_the_submission() {
    let env = Env::new("exit 1\n");
    env.register_admin();
    env.seed_task();

    env.cmd(&[
        "submit",
        "--task",
        "1",
        "--name",
        "broken",
        "results.txt",
    ])
    .assert()
    .code(1)
    .stderr(predicate::str::contains(
        "there was a problem evaluating your results file",
    ));

    // nothing left behind on the board
    env.cmd(&["results", "--task", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("broken").not());
}

#[test]
fn auth_gates_and_messages() {
    let env = Env::new(PERFECT);
    env.register_admin();
    env.cmd(&["logout"]).assert().success();

    env.cmd(&["whoami"]).assert().code(1);

    env.cmd(&["login", "--username", "admin", "--password", "wrong!pass"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid login details"));

    env.cmd(&["login", "--username", "admin", "--password", "hunter2!!"])
        .assert()
        .success();
    env.cmd(&["whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("admin"));
}

#[test]
fn non_admins_cannot_administer() {
    let env = Env::new(PERFECT);
    env.register_admin();

    // second account cannot self-promote
    env.cmd(&["logout"]).assert().success();
    env.cmd(&[
        "register",
        "--username",
        "ann",
        "--password",
        "hunter2!!",
    ])
    .assert()
    .success();

    env.cmd(&["track", "add", "--title", "Web"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("only an administrator"));

    env.cmd(&[
        "register",
        "--username",
        "eve",
        "--password",
        "hunter2!!",
        "--admin",
    ])
    .assert()
    .code(1)
    .stderr(predicate::str::contains(
        "only an administrator can create administrator accounts",
    ));
}

#[test]
fn validation_errors_are_listed() {
    let env = Env::new(PERFECT);
    env.cmd(&[
        "register",
        "--username",
        "bad user",
        "--password",
        "short",
        "--website",
        "ftp://example.org",
    ])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("invalid username"))
    .stderr(predicate::str::contains("invalid password"))
    .stderr(predicate::str::contains("invalid website"));
}

#[test]
fn submit_requires_login_and_existing_task() {
    let env = Env::new(PERFECT);
    env.cmd(&["submit", "--task", "1", "--name", "x", "results.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not logged in"));

    env.register_admin();
    env.cmd(&["submit", "--task", "42", "--name", "x", "results.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown task 42"));
}

#[test]
fn profile_round_trip() {
    let env = Env::new(PERFECT);
    env.register_admin();

    env.cmd(&["profile", "update", "--organisation", "UofG"])
        .assert()
        .success();
    env.cmd(&["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("UofG"));
}
