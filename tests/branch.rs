mod common;

use common::*;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;

#[test]
fn branch_creation_copies_the_current_head() {
    let dir = init_repo();
    write_file(&dir, "hello", "hello");
    add(&dir, "hello");
    commit(&dir, "m1");

    rit(&dir).args(["branch", "test"]).assert().success();

    assert_eq!(branch_names(&dir), vec!["main", "test"]);
    assert_eq!(
        read_file(&dir, ".git/refs/heads/main"),
        read_file(&dir, ".git/refs/heads/test")
    );
}

#[test]
fn current_branch_is_marked_in_the_listing() {
    let dir = init_repo();
    write_file(&dir, "hello", "hello");
    add(&dir, "hello");
    commit(&dir, "m1");
    rit(&dir).args(["branch", "test"]).assert().success();

    let listing = stdout_of(&dir, &["branch"]);
    assert_eq!(listing, "* main\n  test\n");
}

#[test]
fn deleting_the_checked_out_branch_is_refused() {
    let dir = init_repo();
    write_file(&dir, "hello", "hello");
    add(&dir, "hello");
    commit(&dir, "m1");
    rit(&dir).args(["branch", "test"]).assert().success();

    rit(&dir)
        .args(["branch", "-d", "main"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("checked out"));

    // listing unchanged
    assert_eq!(branch_names(&dir), vec!["main", "test"]);
}

#[test]
fn deleting_another_branch_succeeds() {
    let dir = init_repo();
    write_file(&dir, "hello", "hello");
    add(&dir, "hello");
    commit(&dir, "m1");
    rit(&dir).args(["branch", "test"]).assert().success();

    rit(&dir).args(["branch", "-d", "test"]).assert().success();

    assert_eq!(branch_names(&dir), vec!["main"]);
}

#[test]
fn branching_without_commits_fails() {
    let dir = init_repo();

    rit(&dir)
        .args(["branch", "test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid object name"));
}

#[test]
fn invalid_branch_names_are_rejected() {
    let dir = init_repo();
    write_file(&dir, "hello", "hello");
    add(&dir, "hello");
    commit(&dir, "m1");

    for name in ["bad..name", ".hidden", "trailing/", "with space", "x.lock"] {
        rit(&dir).args(["branch", name]).assert().failure();
    }
}

#[test]
fn duplicate_branch_names_are_rejected() {
    let dir = init_repo();
    write_file(&dir, "hello", "hello");
    add(&dir, "hello");
    commit(&dir, "m1");

    rit(&dir).args(["branch", "test"]).assert().success();
    rit(&dir)
        .args(["branch", "test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn packed_refs_surface_in_the_listing() {
    let dir = init_repo();
    write_file(&dir, "hello", "hello");
    add(&dir, "hello");
    commit(&dir, "m1");

    let head = read_file(&dir, ".git/refs/heads/main");
    let head = head.trim();
    std::fs::create_dir_all(dir.path().join(".git/info")).unwrap();
    write_file(
        &dir,
        ".git/info/refs",
        &format!("{head} refs/heads/packed\n{head} refs/tags/v1\n"),
    );

    assert_eq!(branch_names(&dir), vec!["main", "packed"]);

    // a packed branch can be switched to
    rit(&dir).args(["switch", "packed"]).assert().success();
}
