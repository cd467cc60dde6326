mod common;

use common::*;
use pretty_assertions::assert_eq;

#[test]
fn untracked_file_is_reported() {
    let dir = init_repo();
    write_file(&dir, "hello", "hello");

    assert_eq!(status_lines(&dir), vec!["?? hello"]);
}

#[test]
fn added_file_is_reported_staged() {
    let dir = init_repo();
    write_file(&dir, "hello", "hello");
    add(&dir, "hello");

    assert_eq!(status_lines(&dir), vec!["A  hello"]);
}

#[test]
fn committed_file_is_clean() {
    let dir = init_repo();
    write_file(&dir, "hello", "hello");
    add(&dir, "hello");
    commit(&dir, "m1");

    assert_eq!(status_lines(&dir), Vec::<String>::new());
}

#[test]
fn worktree_modification_is_reported_unstaged() {
    let dir = init_repo();
    write_file(&dir, "hello", "hello");
    add(&dir, "hello");
    commit(&dir, "m1");

    write_file(&dir, "hello", "hello world");

    assert_eq!(status_lines(&dir), vec![" M hello"]);
}

#[test]
fn staged_modification_is_reported() {
    let dir = init_repo();
    write_file(&dir, "hello", "hello");
    add(&dir, "hello");
    commit(&dir, "m1");

    write_file(&dir, "hello", "hello world");
    add(&dir, "hello");

    assert_eq!(status_lines(&dir), vec!["M  hello"]);
}

#[test]
fn worktree_deletion_is_reported() {
    let dir = init_repo();
    write_file(&dir, "hello", "hello");
    add(&dir, "hello");
    commit(&dir, "m1");

    remove_file(&dir, "hello");

    assert_eq!(status_lines(&dir), vec![" D hello"]);
}

#[test]
fn staged_deletion_is_reported() {
    let dir = init_repo();
    write_file(&dir, "hello", "hello");
    add(&dir, "hello");
    commit(&dir, "m1");

    remove_file(&dir, "hello");
    add(&dir, "hello");

    assert_eq!(status_lines(&dir), vec!["D  hello"]);
}

#[test]
fn listing_is_sorted_by_path() {
    let dir = init_repo();
    write_file(&dir, "zebra", "z");
    write_file(&dir, "alpha", "a");
    write_file(&dir, "nested/mid", "m");

    assert_eq!(
        status_lines(&dir),
        vec!["?? alpha", "?? nested/mid", "?? zebra"]
    );
}

#[test]
fn ignored_files_never_appear() {
    let dir = init_repo();
    write_file(&dir, ".gitignore", "ignored.txt\nbuild/\n");
    write_file(&dir, "ignored.txt", "secret");
    write_file(&dir, "kept.txt", "kept");

    assert_eq!(status_lines(&dir), vec!["?? .gitignore", "?? kept.txt"]);
}

#[test]
fn unchanged_content_with_fresh_mtime_is_still_clean() {
    let dir = init_repo();
    write_file(&dir, "hello", "hello");
    add(&dir, "hello");
    commit(&dir, "m1");

    // rewrite identical bytes; mtime moves but content does not
    write_file(&dir, "hello", "hello");

    assert_eq!(status_lines(&dir), Vec::<String>::new());
}

#[test]
fn ls_files_lists_index_paths_sorted() {
    let dir = init_repo();
    write_file(&dir, "b.txt", "b");
    write_file(&dir, "a/a.txt", "a");
    add(&dir, ".");

    assert_eq!(stdout_of(&dir, &["ls-files"]), "a/a.txt\nb.txt\n");
}

#[test]
fn add_missing_pathspec_fails() {
    let dir = init_repo();

    rit(&dir)
        .args(["add", "ghost"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("pathspec 'ghost'"));
}
