mod common;

use common::*;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;

#[test]
fn restore_staged_unstages_a_new_file() {
    let dir = init_repo();
    write_file(&dir, "hello", "hello");
    add(&dir, "hello");
    commit(&dir, "m1");

    write_file(&dir, "o", "o");
    add(&dir, "o");
    assert_eq!(status_lines(&dir), vec!["A  o"]);

    rit(&dir).args(["restore", "--staged", "o"]).assert().success();

    assert_eq!(status_lines(&dir), vec!["?? o"]);
    assert_eq!(read_file(&dir, "o"), "o");
}

#[test]
fn restore_staged_reverts_a_staged_modification() {
    let dir = init_repo();
    write_file(&dir, "o", "o");
    add(&dir, "o");
    commit(&dir, "m1");

    write_file(&dir, "o", "ok");
    add(&dir, "o");
    assert_eq!(status_lines(&dir), vec!["M  o"]);

    rit(&dir).args(["restore", "--staged", "o"]).assert().success();

    // back to: index matches HEAD, worktree still modified
    assert_eq!(status_lines(&dir), vec![" M o"]);
    assert_eq!(read_file(&dir, "o"), "ok");
}

#[test]
fn restore_overwrites_worktree_changes_from_the_index() {
    let dir = init_repo();
    write_file(&dir, "o", "o");
    add(&dir, "o");
    commit(&dir, "m1");

    write_file(&dir, "o", "ok");
    assert_eq!(status_lines(&dir), vec![" M o"]);

    rit(&dir).args(["restore", "o"]).assert().success();

    assert_eq!(read_file(&dir, "o"), "o");
    assert_eq!(status_lines(&dir), Vec::<String>::new());
}

#[test]
fn restore_recreates_a_deleted_file() {
    let dir = init_repo();
    write_file(&dir, "o", "o");
    add(&dir, "o");
    commit(&dir, "m1");

    remove_file(&dir, "o");
    assert_eq!(status_lines(&dir), vec![" D o"]);

    rit(&dir).args(["restore", "o"]).assert().success();

    assert_eq!(read_file(&dir, "o"), "o");
    assert_eq!(status_lines(&dir), Vec::<String>::new());
}

#[test]
fn restore_of_an_untracked_path_fails() {
    let dir = init_repo();
    write_file(&dir, "loose", "loose");

    rit(&dir)
        .args(["restore", "loose"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pathspec 'loose'"));
}

#[test]
fn restore_of_a_missing_path_fails() {
    let dir = init_repo();

    rit(&dir)
        .args(["restore", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pathspec 'ghost'"));
}

#[test]
fn restore_of_a_fresh_unmodified_addition_is_a_noop() {
    let dir = init_repo();
    write_file(&dir, "new", "new");
    add(&dir, "new");

    rit(&dir).args(["restore", "new"]).assert().success();

    assert_eq!(read_file(&dir, "new"), "new");
    assert_eq!(status_lines(&dir), vec!["A  new"]);
}

#[test]
fn full_restore_round_trip() {
    // the end-to-end sequence: stage, unstage, re-stage, commit, dirty,
    // restore
    let dir = init_repo();
    write_file(&dir, "hello", "hello");
    add(&dir, "hello");
    commit(&dir, "m1");

    write_file(&dir, "o", "o");
    add(&dir, "o");
    assert_eq!(status_lines(&dir), vec!["A  o"]);

    rit(&dir).args(["restore", "--staged", "o"]).assert().success();
    assert_eq!(status_lines(&dir), vec!["?? o"]);

    add(&dir, "o");
    commit(&dir, "m4");

    write_file(&dir, "o", "ok");
    assert_eq!(status_lines(&dir), vec![" M o"]);

    rit(&dir).args(["restore", "o"]).assert().success();
    assert_eq!(status_lines(&dir), Vec::<String>::new());
    assert_eq!(read_file(&dir, "o"), "o");
}
