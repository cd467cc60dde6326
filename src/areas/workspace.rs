//! Working-tree operations
//!
//! The workspace is the checked-out file tree under the repository root,
//! excluding the git-dir and ignored paths. All paths handed out are
//! relative to the root; all mutation goes through here so checkout and
//! restore share one materialization path.

use crate::artifacts::ignore::IgnoreRules;
use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::index::index_entry::EntryMetadata;
use crate::artifacts::objects::blob::Blob;
use crate::errors::GitError;
use anyhow::Context;
use bytes::Bytes;
use std::fs::FileTimes;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct Workspace {
    /// Absolute repository root
    path: PathBuf,
    /// Git directory name, never walked
    git_dir: String,
    /// Exclusion rules from the ignore file
    ignore: IgnoreRules,
}

impl Workspace {
    pub fn new(path: PathBuf, git_dir: String, ignore: IgnoreRules) -> Self {
        Workspace {
            path,
            git_dir,
            ignore,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Root-relative candidate form the ignore rules match against:
    /// leading `/`, trailing `/` for directories
    fn ignore_candidate(&self, relative: &Path, is_dir: bool) -> String {
        let mut candidate = format!("/{}", relative.display());
        if is_dir {
            candidate.push('/');
        }
        candidate
    }

    pub fn is_ignored(&self, relative: &Path, is_dir: bool) -> bool {
        self.ignore
            .is_ignored(&self.ignore_candidate(relative, is_dir))
    }

    /// Recursively list all non-ignored files in the working tree,
    /// sorted ascending by path
    pub fn list_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        self.list_files_under(Path::new("."))
    }

    /// List non-ignored files beneath a pathspec relative to the root;
    /// `.` means the whole tree, a plain file yields itself
    pub fn list_files_under(&self, pathspec: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let start = if pathspec == Path::new(".") {
            self.path.clone()
        } else {
            self.path.join(pathspec)
        };

        if !start.exists() {
            return Err(
                GitError::PathspecNoMatch(pathspec.display().to_string()).into(),
            );
        }

        if start.is_file() {
            let relative = start
                .strip_prefix(&self.path)
                .context("pathspec escapes the repository root")?;
            return Ok(vec![relative.to_path_buf()]);
        }

        let git_dir = self.git_dir.clone();
        let mut files = WalkDir::new(&start)
            .into_iter()
            .filter_entry(move |entry| entry.file_name().to_string_lossy() != git_dir.as_str())
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(&self.path).ok()?;
                if self.is_ignored(relative, false) {
                    None
                } else {
                    Some(relative.to_path_buf())
                }
            })
            .collect::<Vec<_>>();

        files.sort();
        Ok(files)
    }

    pub fn file_exists(&self, relative: &Path) -> bool {
        self.path.join(relative).is_file()
    }

    pub fn read_file(&self, relative: &Path) -> anyhow::Result<Bytes> {
        let file_path = self.path.join(relative);

        let content = std::fs::read(&file_path)
            .context(format!("unable to read file {file_path:?}"))?;
        Ok(Bytes::from(content))
    }

    /// Read a working-tree file into a blob, carrying its file mode
    pub fn parse_blob(&self, relative: &Path) -> anyhow::Result<Blob> {
        let content = self.read_file(relative)?;
        let stat = self.stat_file(relative)?;
        let mode = FileMode::try_from(stat.mode).unwrap_or_default();

        Ok(Blob::new(content, mode))
    }

    pub fn stat_file(&self, relative: &Path) -> anyhow::Result<EntryMetadata> {
        let file_path = self.path.join(relative);
        let metadata = std::fs::metadata(&file_path)
            .context(format!("unable to stat file {file_path:?}"))?;

        (file_path.as_path(), metadata).try_into()
    }

    /// Write file content, creating parent directories and truncating any
    /// existing file
    pub fn write_file(&self, relative: &Path, content: &[u8]) -> anyhow::Result<()> {
        let file_path = self.path.join(relative);

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("unable to create directory {parent:?}"))?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&file_path)
            .context(format!("unable to open file {file_path:?}"))?;
        file.write_all(content)
            .context(format!("unable to write file {file_path:?}"))?;

        Ok(())
    }

    pub fn remove_file(&self, relative: &Path) -> anyhow::Result<()> {
        let file_path = self.path.join(relative);

        std::fs::remove_file(&file_path)
            .context(format!("unable to remove file {file_path:?}"))
    }

    /// Reset a file's modification time, so a restored file compares
    /// unchanged against its index entry
    pub fn set_file_mtime(&self, relative: &Path, mtime: u32, mtime_nsec: u32) -> anyhow::Result<()> {
        let file_path = self.path.join(relative);
        let modified = SystemTime::UNIX_EPOCH + Duration::new(mtime as u64, mtime_nsec);

        let file = std::fs::OpenOptions::new()
            .write(true)
            .open(&file_path)
            .context(format!("unable to open file {file_path:?}"))?;
        file.set_times(FileTimes::new().set_modified(modified))
            .context(format!("unable to set times on {file_path:?}"))?;

        Ok(())
    }
}
