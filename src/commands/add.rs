use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::errors::GitError;
use std::path::Path;

impl Repository {
    /// Stage files under the given pathspecs (`.` stages everything)
    ///
    /// Hashes each file into the object database and upserts its index
    /// entry. Tracked files that no longer exist under a pathspec have
    /// their deletion staged. A pathspec matching neither the working
    /// tree nor the index is an error.
    pub fn add(&self, pathspecs: &[String]) -> anyhow::Result<()> {
        let mut index = self.index_mut();
        index.rehydrate()?;

        for pathspec in pathspecs {
            let spec_path = Path::new(pathspec);

            let worktree_files = match self.workspace().list_files_under(spec_path) {
                Ok(files) => files,
                Err(err)
                    if matches!(
                        err.downcast_ref::<GitError>(),
                        Some(GitError::PathspecNoMatch(_))
                    ) =>
                {
                    // the path is gone from the worktree; staging its
                    // deletion is still a match
                    let tracked = index.entries_under_path(spec_path);
                    if tracked.is_empty() {
                        return Err(err);
                    }
                    for path in tracked {
                        index.remove(&path)?;
                    }
                    continue;
                }
                Err(err) => return Err(err),
            };

            for path in worktree_files {
                // unreadable files are skipped rather than failing the batch
                let Ok(blob) = self.workspace().parse_blob(&path) else {
                    continue;
                };

                let oid = self.database().store(&blob)?;
                let stat = self.workspace().stat_file(&path)?;
                index.add(IndexEntry::new(path, oid, stat));
            }

            // files deleted from the worktree but still tracked under
            // this pathspec become staged deletions
            for tracked in index.entries_under_path(spec_path) {
                if !self.workspace().file_exists(&tracked) {
                    index.remove(&tracked)?;
                }
            }
        }

        index.write_updates()?;

        Ok(())
    }
}
