use assert_cmd::cargo::{self};
use predicates::str::contains;

#[test]
fn prints_help() {
    let mut cmd = cargo::cargo_bin_cmd!("tymlui");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(contains("tymlui"))
        .stdout(contains("--source"));
}

#[test]
fn lists_builtin_types() {
    let mut cmd = cargo::cargo_bin_cmd!("tymlui");
    cmd.arg("--list-types")
        .assert()
        .success()
        .stdout(contains("FStab"))
        .stdout(contains("NiceEditorsTest"));
}

#[test]
fn rejects_unknown_output_extensions() {
    let mut cmd = cargo::cargo_bin_cmd!("tymlui");
    cmd.args(["-o", "out.unknown"])
        .assert()
        .failure()
        .stderr(contains("cannot infer format"));
}
