#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::TempDir;
use std::path::Path;

/// Command for the binary, rooted in the given repository with a fixed
/// identity and colors disabled for stable assertions
pub fn rit(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rit").unwrap();
    cmd.current_dir(dir.path())
        .env("NO_COLOR", "1")
        .env("GIT_AUTHOR_NAME", "tester")
        .env("GIT_AUTHOR_EMAIL", "tester@test.com")
        .env_remove("GIT_COMMITTER_NAME")
        .env_remove("GIT_COMMITTER_EMAIL");
    cmd
}

/// Fresh temp dir with an initialized repository
pub fn init_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    rit(&dir).arg("init").assert().success();
    dir
}

pub fn write_file(dir: &TempDir, path: &str, content: &str) {
    let full = dir.path().join(path);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(full, content).unwrap();
}

pub fn read_file(dir: &TempDir, path: &str) -> String {
    std::fs::read_to_string(dir.path().join(path)).unwrap()
}

pub fn file_exists(dir: &TempDir, path: &str) -> bool {
    dir.path().join(path).exists()
}

pub fn remove_file(dir: &TempDir, path: &str) {
    std::fs::remove_file(dir.path().join(path)).unwrap();
}

pub fn add(dir: &TempDir, path: &str) {
    rit(dir).args(["add", path]).assert().success();
}

pub fn commit(dir: &TempDir, message: &str) {
    rit(dir).args(["commit", "-m", message]).assert().success();
}

/// Captured stdout of a successful command
pub fn stdout_of(dir: &TempDir, args: &[&str]) -> String {
    let output = rit(dir).args(args).assert().success();
    String::from_utf8(output.get_output().stdout.clone()).unwrap()
}

/// Status output lines, in order
pub fn status_lines(dir: &TempDir) -> Vec<String> {
    stdout_of(dir, &["status"])
        .lines()
        .map(str::to_string)
        .collect()
}

/// Count loose objects under `.git/objects/xx/`
pub fn loose_object_count(dir: &TempDir) -> usize {
    let objects = dir.path().join(".git/objects");
    let mut count = 0;

    for entry in walk_files(&objects) {
        let parent_name = entry
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        if parent_name.len() == 2 && parent_name.chars().all(|c| c.is_ascii_hexdigit()) {
            count += 1;
        }
    }

    count
}

fn walk_files(root: &Path) -> Vec<std::path::PathBuf> {
    let mut files = Vec::new();
    let Ok(entries) = std::fs::read_dir(root) else {
        return files;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            files.extend(walk_files(&path));
        } else {
            files.push(path);
        }
    }
    files
}

/// Branch listing without the current-branch marker
pub fn branch_names(dir: &TempDir) -> Vec<String> {
    stdout_of(dir, &["branch"])
        .lines()
        .map(|line| line.trim_start_matches("* ").trim().to_string())
        .collect()
}
