//! End-to-end tests for the built-in `completion` command.
//!
//! The generated scripts cover every command in the assembled tree,
//! `completion` included, together with the global options.

#[allow(dead_code)]
mod common;
use common::prelude::*;

#[test]
fn test_completions_help() {
    let mut cmd = cargo_bin_cmd!("chainbridge");

    cmd.args(["completion", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Generate a completion script for the given shell",
        ))
        .stdout(predicate::str::contains("bash"))
        .stdout(predicate::str::contains("zsh"))
        .stdout(predicate::str::contains("fish"))
        .stdout(predicate::str::contains("powershell"))
        .stdout(predicate::str::contains("elvish"));
}

#[test]
fn test_completions_bash() {
    let mut cmd = cargo_bin_cmd!("chainbridge");

    cmd.args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_chainbridge()"))
        // Should include subcommands
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("run completion"))
        // and the global options
        .stdout(predicate::str::contains("--log-level"));
}

#[test]
fn test_completions_zsh() {
    let mut cmd = cargo_bin_cmd!("chainbridge");

    cmd.args(["completion", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef chainbridge"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn test_completions_fish() {
    let mut cmd = cargo_bin_cmd!("chainbridge");

    cmd.args(["completion", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("__fish_chainbridge"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn test_completions_powershell() {
    let mut cmd = cargo_bin_cmd!("chainbridge");

    cmd.args(["completion", "powershell"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Register-ArgumentCompleter"))
        .stdout(predicate::str::contains("chainbridge"));
}

#[test]
fn test_completions_elvish() {
    let mut cmd = cargo_bin_cmd!("chainbridge");

    cmd.args(["completion", "elvish"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "edit:completion:arg-completer[chainbridge]",
        ))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn test_completions_invalid_shell() {
    let mut cmd = cargo_bin_cmd!("chainbridge");

    cmd.args(["completion", "nushell"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_completions_missing_shell_argument() {
    let mut cmd = cargo_bin_cmd!("chainbridge");

    cmd.arg("completion")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("required"));
}
