mod common;

use common::*;
use pretty_assertions::assert_eq;

#[test]
fn init_establishes_default_repository_state() {
    let dir = init_repo();

    let head = read_file(&dir, ".git/HEAD");
    assert_eq!(head, "ref: refs/heads/main\n");

    assert!(file_exists(&dir, ".git/objects"));
    assert!(file_exists(&dir, ".git/refs"));
    assert!(file_exists(&dir, ".git/refs/heads"));
}

#[test]
fn fresh_repository_has_no_branches() {
    let dir = init_repo();

    // the default branch has no head file before the first commit
    assert_eq!(branch_names(&dir), Vec::<String>::new());
    assert!(!file_exists(&dir, ".git/refs/heads/main"));
}

#[test]
fn fresh_repository_has_empty_status() {
    let dir = init_repo();

    assert_eq!(status_lines(&dir), Vec::<String>::new());
}

#[test]
fn reinit_preserves_head() {
    let dir = init_repo();

    write_file(&dir, "hello", "hello");
    add(&dir, "hello");
    commit(&dir, "m1");

    rit(&dir).arg("init").assert().success();

    assert_eq!(read_file(&dir, ".git/HEAD"), "ref: refs/heads/main\n");
    assert_eq!(branch_names(&dir), vec!["main"]);
}
