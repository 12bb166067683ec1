//! End-to-end tests for the `xwalk-sync fetch-chromium` command.
//!
//! Only the paths that never reach the network are covered here.

#[allow(dead_code)]
mod common;
use common::prelude::*;

#[test]
fn test_fetch_chromium_help() {
    let mut cmd = cargo_bin_cmd!("xwalk-sync");
    cmd.arg("fetch-chromium")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--xwalk-dir"))
        .stdout(predicate::str::contains("--use-git"));
}

#[test]
fn test_fetch_chromium_without_git_mode_is_noop() {
    let fixture = TestFixture::new().with_manifest(manifests::BASIC);

    fixture
        .command()
        .arg("fetch-chromium")
        .assert()
        .success()
        .stdout(predicate::str::contains("XWALK_USE_GIT is not set"));

    fixture
        .child("src/.git")
        .assert(predicate::path::missing());
}

#[test]
fn test_fetch_chromium_without_git_mode_ignores_missing_manifest() {
    let fixture = TestFixture::new();

    fixture.command().arg("fetch-chromium").assert().success();
}
