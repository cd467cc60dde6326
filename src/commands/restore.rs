use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::status::file_status::{IndexStatus, WdStatus};
use crate::errors::GitError;
use std::path::Path;

impl Repository {
    /// Restore a path from the index (worktree restore) or unstage it
    /// (`--staged`)
    pub fn restore(&self, path: &str, staged: bool) -> anyhow::Result<()> {
        let relative = Path::new(path);

        if staged {
            return self.restore_staged(relative);
        }

        self.restore_worktree(relative)
    }

    /// Overwrite the working-tree file with the blob recorded in the
    /// index, then reset its mtime to the entry's so status sees it
    /// unchanged
    fn restore_worktree(&self, relative: &Path) -> anyhow::Result<()> {
        let status_set = self.current_status()?;

        let record = status_set
            .get(relative)
            .ok_or_else(|| GitError::PathspecNoMatch(relative.display().to_string()))?;
        if record.index_status == IndexStatus::Untracked {
            return Err(GitError::PathspecNoMatch(relative.display().to_string()).into());
        }

        // staged-but-never-committed and unmodified: nothing to restore
        if record.index_status == IndexStatus::AddedInIndex
            && record.wd_status != WdStatus::WorktreeChangedSinceIndex
        {
            return Ok(());
        }

        let mut index = self.index_mut();
        index.rehydrate()?;
        let entry = index
            .entry_by_path(relative)
            .ok_or_else(|| GitError::PathspecNoMatch(relative.display().to_string()))?
            .clone();
        drop(index);

        let payload = self.database().read_blob_payload(&entry.oid)?;
        self.workspace().write_file(relative, &payload)?;
        self.workspace()
            .set_file_mtime(relative, entry.metadata.mtime, entry.metadata.mtime_nsec)?;

        Ok(())
    }

    /// Unstage a path: re-point its index entry at the committed content,
    /// or drop the entry entirely when HEAD does not have the path
    fn restore_staged(&self, relative: &Path) -> anyhow::Result<()> {
        let head = self.refs().last_commit()?;
        let head_files = if head.is_set() {
            self.database().committed_files(&head)?
        } else {
            Default::default()
        };

        let mut index = self.index_mut();
        index.rehydrate()?;

        match head_files.get(relative) {
            Some(commit_entry) => {
                // back-date the stat by one second so the next status
                // rehashes the worktree file instead of trusting mtime
                let mut stat = match self.workspace().stat_file(relative) {
                    Ok(stat) => stat,
                    Err(_) => {
                        index
                            .entry_by_path(relative)
                            .map(|entry| entry.metadata)
                            .ok_or_else(|| {
                                GitError::PathspecNoMatch(relative.display().to_string())
                            })?
                    }
                };
                stat.mtime = stat.mtime.saturating_sub(1);

                index.add(IndexEntry::new(
                    relative.to_path_buf(),
                    commit_entry.oid,
                    stat,
                ));
            }
            None => {
                index.remove(relative)?;
            }
        }

        index.write_updates()
    }
}
